//! Ordered, owning containers with structural change notification.

use tracing::trace;
use vcanvas_core::{CanvasError, CategorizedEvent, EventBus, Result};

/// An item that belongs to at most one collection at a time.
pub trait Owned {
    fn unique_id(&self) -> &str;
    fn owner_id(&self) -> Option<&str>;
    fn set_owner_id(&mut self, owner: Option<String>);
}

/// Structural change of a [`Collection`].
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange {
    Inserted { index: usize, id: String },
    Removed { index: usize, id: String },
    Moved { from: usize, to: usize, id: String },
    Cleared,
}

impl CategorizedEvent for CollectionChange {
    type Category = ();

    fn category(&self) {}
}

/// Ordered collection owning its items.
///
/// Inserting sets the item's owner to the collection owner; removing clears
/// it. Items that already have an owner are rejected.
pub struct Collection<T: Owned> {
    owner_id: String,
    items: Vec<T>,
    events: EventBus<CollectionChange>,
}

impl<T: Owned> std::fmt::Debug for Collection<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("owner_id", &self.owner_id)
            .field("items", &self.items)
            .finish()
    }
}

impl<T: Owned> Collection<T> {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            items: Vec::new(),
            events: EventBus::new(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn events(&self) -> &EventBus<CollectionChange> {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Like [`Collection::get`] but a missing index is a contract error.
    pub fn item(&self, index: usize) -> Result<&T> {
        let len = self.items.len();
        self.items
            .get(index)
            .ok_or(CanvasError::IndexOutOfRange { index, len })
    }

    pub fn item_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(CanvasError::IndexOutOfRange { index, len })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.unique_id() == id)
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.unique_id() == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.unique_id() == id)
    }

    pub fn insert(&mut self, index: usize, mut item: T) -> Result<()> {
        if let Some(owner) = item.owner_id() {
            return Err(CanvasError::ItemAlreadyOwned {
                id: item.unique_id().to_string(),
                owner: owner.to_string(),
            });
        }
        let len = self.items.len();
        if index > len {
            return Err(CanvasError::IndexOutOfRange { index, len });
        }
        item.set_owner_id(Some(self.owner_id.clone()));
        let id = item.unique_id().to_string();
        self.items.insert(index, item);
        trace!("{} inserted into {} at {}", id, self.owner_id, index);
        self.events.publish(CollectionChange::Inserted { index, id });
        Ok(())
    }

    pub fn push(&mut self, item: T) -> Result<()> {
        self.insert(self.items.len(), item)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let len = self.items.len();
        if index >= len {
            return Err(CanvasError::IndexOutOfRange { index, len });
        }
        let mut item = self.items.remove(index);
        item.set_owner_id(None);
        let id = item.unique_id().to_string();
        trace!("{} removed from {} at {}", id, self.owner_id, index);
        self.events.publish(CollectionChange::Removed { index, id });
        Ok(item)
    }

    pub fn remove(&mut self, id: &str) -> Result<T> {
        let index = self.index_of(id).ok_or_else(|| CanvasError::not_found(id))?;
        self.remove_at(index)
    }

    /// Moves the item at `from` so that it ends up at index `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        if from >= len {
            return Err(CanvasError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(CanvasError::IndexOutOfRange { index: to, len });
        }
        if from == to {
            return Ok(());
        }
        let item = self.items.remove(from);
        let id = item.unique_id().to_string();
        self.items.insert(to, item);
        self.events.publish(CollectionChange::Moved { from, to, id });
        Ok(())
    }

    /// Removes every item, releasing ownership.
    pub fn clear(&mut self) -> Vec<T> {
        let mut items = std::mem::take(&mut self.items);
        for item in &mut items {
            item.set_owner_id(None);
        }
        self.events.publish(CollectionChange::Cleared);
        items
    }
}

impl<'a, T: Owned> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
