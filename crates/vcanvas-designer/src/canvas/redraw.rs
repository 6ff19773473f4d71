//! Debounced redraw scheduling with busy gating.
//!
//! Time is injected so hosts can drive the scheduler from their own timer
//! and tests can step it deterministically.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use vcanvas_core::EventBus;

use super::types::CanvasEvent;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub struct RedrawScheduler {
    debounce: Duration,
    due: Option<Instant>,
    /// A redraw was requested while busy.
    deferred: bool,
    busy: Rc<Cell<u32>>,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RedrawScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            due: None,
            deferred: false,
            busy: Rc::new(Cell::new(0)),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get() > 0
    }

    pub fn busy_count(&self) -> u32 {
        self.busy.get()
    }

    /// Whether a redraw is scheduled or deferred.
    pub fn is_pending(&self) -> bool {
        self.due.is_some() || self.deferred
    }

    /// Asks for a repaint. Requests arriving before the pending one fires
    /// are folded into it.
    pub fn request(&mut self, now: Instant) {
        if self.is_busy() {
            self.deferred = true;
            return;
        }
        if self.due.is_none() {
            self.due = Some(now + self.debounce);
        }
    }

    /// Returns true when a repaint should happen now.
    ///
    /// Nothing fires while busy. Requests deferred during a busy period
    /// fire once as soon as the scheduler is idle again.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.is_busy() {
            return false;
        }
        if std::mem::take(&mut self.deferred) {
            self.due = None;
            return true;
        }
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Enters a busy period that lasts until the guard is dropped.
    pub fn busy_guard(&self, events: Option<Rc<EventBus<CanvasEvent>>>) -> BusyGuard {
        BusyGuard::new(self.busy.clone(), events)
    }
}

/// Scoped busy marker. Guards nest; the outermost one publishes
/// [`CanvasEvent::BusyChanged`].
pub struct BusyGuard {
    counter: Rc<Cell<u32>>,
    events: Option<Rc<EventBus<CanvasEvent>>>,
}

impl BusyGuard {
    fn new(counter: Rc<Cell<u32>>, events: Option<Rc<EventBus<CanvasEvent>>>) -> Self {
        let count = counter.get() + 1;
        counter.set(count);
        if count == 1 {
            if let Some(events) = &events {
                events.publish(CanvasEvent::BusyChanged { busy: true });
            }
        }
        Self { counter, events }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let count = self.counter.get().saturating_sub(1);
        self.counter.set(count);
        if count == 0 {
            if let Some(events) = &self.events {
                events.publish(CanvasEvent::BusyChanged { busy: false });
            }
        }
    }
}

impl std::fmt::Debug for BusyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyGuard")
            .field("count", &self.counter.get())
            .finish()
    }
}
