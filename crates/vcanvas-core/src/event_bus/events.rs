//! Event classification used by subscription filters.

use std::fmt::Debug;

/// An event that can be routed by category.
///
/// Events without meaningful categories use `()`.
pub trait CategorizedEvent: Clone + Debug {
    /// The category type used by [`EventFilter::Categories`].
    type Category: PartialEq + Clone + Debug;

    /// Returns the category this event belongs to.
    fn category(&self) -> Self::Category;
}

/// Filter to receive only specific event categories
#[derive(Debug, Clone)]
pub enum EventFilter<C> {
    /// Receive all events.
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<C>),
}

impl<C> Default for EventFilter<C> {
    fn default() -> Self {
        Self::All
    }
}

impl<C: PartialEq> EventFilter<C> {
    /// Check if a category matches this filter
    pub fn matches(&self, category: &C) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(category),
        }
    }
}
