//! # VCanvas Core
//!
//! Core types shared by every VCanvas crate:
//! - error kinds for collection and history contract violations
//! - a typed, single-threaded event bus used in place of string-named
//!   handler lists
//! - shared-pointer aliases for event-thread state

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{CanvasError, Result};

pub use event_bus::{CategorizedEvent, EventBus, EventFilter, SubscriptionId};

pub use types::{shared, Shared};
