//! Single-threaded event bus.
//!
//! Handlers run synchronously on the event thread, in the order they
//! subscribed.

use std::cell::RefCell;
use uuid::Uuid;

use super::events::{CategorizedEvent, EventFilter};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0.simple())
    }
}

struct Subscriber<E: CategorizedEvent> {
    id: SubscriptionId,
    filter: EventFilter<E::Category>,
    callback: Box<dyn Fn(&E)>,
}

/// Typed observer list for one event type.
///
/// Handlers must not subscribe or unsubscribe on the same bus while it is
/// publishing. Publishing to another bus from a handler is fine.
pub struct EventBus<E: CategorizedEvent> {
    subscribers: RefCell<Vec<Subscriber<E>>>,
}

impl<E: CategorizedEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Delivers `event` to every subscriber whose filter accepts its
    /// category. Returns how many handlers ran.
    pub fn publish(&self, event: E) -> usize {
        let category = event.category();
        self.subscribers
            .borrow()
            .iter()
            .filter(|s| s.filter.matches(&category))
            .map(|s| (s.callback)(&event))
            .count()
    }

    pub fn subscribe<F>(&self, filter: EventFilter<E::Category>, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId::generate();
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            filter,
            callback: Box::new(handler),
        });
        tracing::trace!("{} subscribed", id);
        id
    }

    /// Removes a subscription. Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let Some(index) = subscribers.iter().position(|s| s.id == id) else {
            return false;
        };
        subscribers.remove(index);
        tracing::trace!("{} unsubscribed", id);
        true
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: CategorizedEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CategorizedEvent> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Kind {
        Selection,
        History,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Note {
        Picked(u32),
        Undone,
    }

    impl CategorizedEvent for Note {
        type Category = Kind;

        fn category(&self) -> Kind {
            match self {
                Note::Picked(_) => Kind::Selection,
                Note::Undone => Kind::History,
            }
        }
    }

    #[test]
    fn test_unsubscribe_twice() {
        let bus: EventBus<Note> = EventBus::new();
        assert!(bus.is_empty());

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.len(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_handlers_receive_payload() {
        let bus = EventBus::new();
        let total = Rc::new(Cell::new(0));
        let sink = total.clone();
        bus.subscribe(EventFilter::All, move |note: &Note| {
            if let Note::Picked(n) = note {
                sink.set(sink.get() + n);
            }
        });

        assert_eq!(bus.publish(Note::Picked(3)), 1);
        assert_eq!(bus.publish(Note::Picked(4)), 1);
        assert_eq!(total.get(), 7);
    }

    #[test]
    fn test_category_filter() {
        let bus = EventBus::new();
        let undos = Rc::new(Cell::new(0));
        let sink = undos.clone();
        bus.subscribe(
            EventFilter::Categories(vec![Kind::History]),
            move |_: &Note| sink.set(sink.get() + 1),
        );

        assert_eq!(bus.publish(Note::Picked(1)), 0);
        assert_eq!(bus.publish(Note::Undone), 1);
        assert_eq!(undos.get(), 1);
    }

    #[test]
    fn test_delivery_follows_subscription_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = order.clone();
            bus.subscribe(EventFilter::All, move |_: &Note| order.borrow_mut().push(tag));
        }
        bus.publish(Note::Undone);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }
}
