//! Linear undo/redo log.
//!
//! `current` indexes the last executed command (`-1` when nothing can be
//! undone). Appending discards the redo tail. When the log grows past
//! `max_undo_step_count` the oldest command is evicted and
//! `overflow_max_undo_step_count` is raised.

mod commands;

pub use commands::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::Collection;
use crate::layer::Layer;
use vcanvas_core::{CategorizedEvent, EventBus, Result};

pub const DEFAULT_MAX_UNDO_STEP_COUNT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    Changed { can_undo: bool, can_redo: bool },
    /// The oldest command was evicted to respect the capacity.
    Overflow,
}

impl CategorizedEvent for HistoryEvent {
    type Category = ();

    fn category(&self) {}
}

fn default_enabled() -> bool {
    true
}

fn default_max_undo_step_count() -> usize {
    DEFAULT_MAX_UNDO_STEP_COUNT
}

fn default_current() -> isize {
    -1
}

/// Serialized snapshot of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default = "default_current")]
    pub current: isize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_undo_step_count")]
    pub max_undo_step_count: usize,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            current: -1,
            enabled: true,
            max_undo_step_count: DEFAULT_MAX_UNDO_STEP_COUNT,
        }
    }
}

pub struct History {
    commands: Vec<Command>,
    current: isize,
    enabled: bool,
    /// Raised while a command is being (un)executed so its side effects are
    /// not recorded.
    locked: bool,
    tracking: bool,
    /// Tracking value saved by `pause_tracking`. Single level only.
    saved_tracking: bool,
    max_undo_step_count: usize,
    overflow_max_undo_step_count: bool,
    group: Option<Vec<Command>>,
    events: EventBus<HistoryEvent>,
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("len", &self.commands.len())
            .field("current", &self.current)
            .field("enabled", &self.enabled)
            .field("locked", &self.locked)
            .field("tracking", &self.tracking)
            .field("max_undo_step_count", &self.max_undo_step_count)
            .finish()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_STEP_COUNT)
    }
}

impl History {
    pub fn new(max_undo_step_count: usize) -> Self {
        Self {
            commands: Vec::new(),
            current: -1,
            enabled: true,
            locked: false,
            tracking: true,
            saved_tracking: true,
            max_undo_step_count: max_undo_step_count.max(1),
            overflow_max_undo_step_count: false,
            group: None,
            events: EventBus::new(),
        }
    }

    pub fn events(&self) -> &EventBus<HistoryEvent> {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn current(&self) -> isize {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        self.current >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.current < self.commands.len() as isize - 1
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Whether a command added now would be recorded.
    pub fn is_recording(&self) -> bool {
        self.enabled && self.tracking && !self.locked
    }

    pub fn max_undo_step_count(&self) -> usize {
        self.max_undo_step_count
    }

    /// Changes the capacity, evicting the oldest commands if needed.
    pub fn set_max_undo_step_count(&mut self, count: usize) {
        self.max_undo_step_count = count.max(1);
        while self.commands.len() > self.max_undo_step_count {
            self.evict_oldest();
        }
    }

    pub fn overflow_max_undo_step_count(&self) -> bool {
        self.overflow_max_undo_step_count
    }

    pub fn clear_overflow(&mut self) {
        self.overflow_max_undo_step_count = false;
    }

    /// Suspends recording. Nested pauses are not stacked: the second pause
    /// overwrites the value saved by the first.
    pub fn pause_tracking(&mut self) {
        self.saved_tracking = self.tracking;
        self.tracking = false;
    }

    pub fn resume_tracking(&mut self) {
        self.tracking = self.saved_tracking;
    }

    /// Records an already-applied command.
    ///
    /// Returns false when recording is disabled, paused or locked.
    pub fn add_command(&mut self, command: Command) -> bool {
        if !self.is_recording() {
            return false;
        }
        if let Some(group) = self.group.as_mut() {
            group.push(command);
            return true;
        }
        self.push(command);
        true
    }

    /// Starts collecting subsequent commands into one group.
    pub fn start_group(&mut self) {
        if self.group.is_none() {
            self.group = Some(Vec::new());
        }
    }

    /// Closes the open group and records it. Empty groups are dropped.
    pub fn end_group(&mut self) {
        let Some(commands) = self.group.take() else {
            return;
        };
        match commands.len() {
            0 => {}
            1 => {
                let mut commands = commands;
                if let Some(command) = commands.pop() {
                    self.add_command(command);
                }
            }
            _ => {
                self.add_command(Command::group(commands));
            }
        }
    }

    pub fn is_group_open(&self) -> bool {
        self.group.is_some()
    }

    fn push(&mut self, command: Command) {
        let keep = (self.current + 1) as usize;
        self.commands.truncate(keep);
        debug!("History record: {}", command.name());
        self.commands.push(command);
        self.current += 1;
        if self.current + 1 > self.max_undo_step_count as isize {
            self.evict_oldest();
        }
        self.notify();
    }

    fn evict_oldest(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        self.commands.remove(0);
        self.current = (self.current - 1).max(-1);
        self.overflow_max_undo_step_count = true;
        self.events.publish(HistoryEvent::Overflow);
    }

    /// Reverts the command at the cursor. Returns the undone command.
    pub fn undo(&mut self, layers: &mut Collection<Layer>) -> Result<Option<&Command>> {
        if !self.can_undo() || self.locked {
            return Ok(None);
        }
        let index = self.current as usize;
        self.locked = true;
        let result = self.commands[index].un_execute(layers);
        self.locked = false;
        result?;
        self.current -= 1;
        debug!("History undo: {}", self.commands[index].name());
        self.notify();
        Ok(self.commands.get(index))
    }

    /// Re-applies the command after the cursor. Returns the redone command.
    pub fn redo(&mut self, layers: &mut Collection<Layer>) -> Result<Option<&Command>> {
        if !self.can_redo() || self.locked {
            return Ok(None);
        }
        let index = (self.current + 1) as usize;
        self.locked = true;
        let result = self.commands[index].execute(layers);
        self.locked = false;
        result?;
        self.current += 1;
        debug!("History redo: {}", self.commands[index].name());
        self.notify();
        Ok(self.commands.get(index))
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.current = -1;
        self.group = None;
        self.overflow_max_undo_step_count = false;
        self.notify();
    }

    fn notify(&self) {
        self.events.publish(HistoryEvent::Changed {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        });
    }

    pub fn to_state(&self) -> HistoryState {
        HistoryState {
            commands: self.commands.clone(),
            current: self.current,
            enabled: self.enabled,
            max_undo_step_count: self.max_undo_step_count,
        }
    }

    /// Replaces the log with a snapshot. The cursor is clamped into range.
    pub fn apply_state(&mut self, state: HistoryState) {
        self.commands = state.commands;
        self.enabled = state.enabled;
        self.max_undo_step_count = state.max_undo_step_count.max(1);
        self.current = state.current.clamp(-1, self.commands.len() as isize - 1);
        self.group = None;
        self.notify();
    }
}
