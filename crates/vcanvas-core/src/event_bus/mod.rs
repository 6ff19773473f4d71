//! # Event Bus Module
//!
//! Typed publish/subscribe for the single-threaded editing core. Every
//! producer owns an `EventBus<E>` for its own event type, so payload shapes
//! are checked at compile time instead of being looked up by name.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use vcanvas_core::event_bus::{CategorizedEvent, EventBus, EventFilter};
//!
//! #[derive(Debug, Clone)]
//! enum Ping {
//!     Hello,
//! }
//!
//! impl CategorizedEvent for Ping {
//!     type Category = ();
//!     fn category(&self) {}
//! }
//!
//! let bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let seen_in_handler = seen.clone();
//! let id = bus.subscribe(EventFilter::All, move |_: &Ping| {
//!     seen_in_handler.set(seen_in_handler.get() + 1)
//! });
//! bus.publish(Ping::Hello);
//! assert_eq!(seen.get(), 1);
//! bus.unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
