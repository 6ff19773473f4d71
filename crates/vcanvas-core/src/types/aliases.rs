//! Type aliases for single-threaded shared state.
//!
//! The editing core runs entirely on one event thread, so sharing is done
//! with `Rc<RefCell<T>>` rather than locks.
//!
//! ```rust
//! use vcanvas_core::types::{shared, Shared};
//!
//! let log: Shared<Vec<&str>> = shared(Vec::new());
//! log.borrow_mut().push("undo");
//! assert_eq!(log.borrow().len(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
pub type Shared<T> = Rc<RefCell<T>>;

/// Create a new `Shared<T>` from a value.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_clones_alias_same_value() {
        let a = shared(1);
        let b = a.clone();
        *b.borrow_mut() = 5;
        assert_eq!(*a.borrow(), 5);
    }
}
