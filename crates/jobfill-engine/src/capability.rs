//! Named capabilities shared between components of one page context.
//!
//! Replaces ambient globals: a component publishes a capability under a
//! well-known name and others look it up instead of reaching into shared
//! mutable state.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::CapabilityError;

/// Something that can be published in a [`CapabilityRegistry`].
pub trait Capability: Send + Sync {
    /// Well-known name this capability is published under.
    fn capability_id(&self) -> &str;
}

/// Registry of capabilities keyed by name.
pub struct CapabilityRegistry<T: ?Sized + Capability> {
    items: DashMap<String, Arc<T>>,
}

impl<T: ?Sized + Capability> CapabilityRegistry<T> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Publish a capability. Names are unique.
    pub fn register(&self, item: Arc<T>) -> Result<(), CapabilityError> {
        let id = item.capability_id().to_string();
        if self.items.contains_key(&id) {
            return Err(CapabilityError::AlreadyRegistered(id));
        }
        self.items.insert(id, item);
        Ok(())
    }

    pub fn unregister(&self, id: &str) -> Result<(), CapabilityError> {
        self.items
            .remove(id)
            .ok_or_else(|| CapabilityError::NotFound(id.to_string()))?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.items.get(id).map(|item| item.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: ?Sized + Capability> Default for CapabilityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
