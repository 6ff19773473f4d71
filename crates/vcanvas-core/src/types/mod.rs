//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>` state shared on the
//!   event thread.

pub mod aliases;

pub use aliases::*;
