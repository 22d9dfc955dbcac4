use super::payload::{Payload, PayloadDescriptor};
use crate::error::DeployerError;
use std::collections::{BTreeMap, btree_map};

/// The set of payloads known to the deployer, keyed and ordered by priority index.
///
/// The registry exclusively owns its payloads. Iteration always yields ascending
/// indices, which is also the release order of a full deployment.
#[derive(Debug, Clone)]
pub struct PayloadRegistry {
    /// Payloads by priority index.
    items: BTreeMap<u16, Payload>,
    /// Maximum number of payloads the registry accepts.
    capacity: usize,
}

impl PayloadRegistry {
    /// Capacity used when no runtime parameter overrides it.
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self { Self { items: BTreeMap::new(), capacity } }

    /// Inserts a new payload.
    ///
    /// # Errors
    /// * [`DeployerError::DuplicateIndex`] if the index is already taken.
    /// * [`DeployerError::Allocation`] if the registry is at capacity.
    pub fn add(&mut self, payload: Payload) -> Result<(), DeployerError> {
        let index = payload.index();
        if self.items.contains_key(&index) {
            return Err(DeployerError::DuplicateIndex(index));
        }
        if self.items.len() >= self.capacity {
            return Err(DeployerError::Allocation { capacity: self.capacity });
        }
        self.items.insert(index, payload);
        Ok(())
    }

    pub fn find(&self, index: u16) -> Result<&Payload, DeployerError> {
        self.items.get(&index).ok_or(DeployerError::NotFound(index))
    }

    pub(super) fn find_mut(&mut self, index: u16) -> Result<&mut Payload, DeployerError> {
        self.items.get_mut(&index).ok_or(DeployerError::NotFound(index))
    }

    /// Removes and returns the payload. Removing an absent index is an error,
    /// not a no-op.
    pub fn remove(&mut self, index: u16) -> Result<Payload, DeployerError> {
        self.items.remove(&index).ok_or(DeployerError::NotFound(index))
    }

    /// Moves the payload stored under `from` to the key `to`. Callers make sure
    /// `to` is free and the payload already carries `to` as its index.
    pub(super) fn rekey(&mut self, from: u16, to: u16) {
        if let Some(payload) = self.items.remove(&from) {
            debug_assert_eq!(payload.index(), to);
            self.items.insert(to, payload);
        }
    }

    pub fn contains(&self, index: u16) -> bool { self.items.contains_key(&index) }

    /// Lazy ascending-index view. The iterator is `Clone`, so a consumer can
    /// restart it without touching the registry again.
    pub fn iter(&self) -> btree_map::Values<'_, u16, Payload> { self.items.values() }

    /// Owned copy of all payloads in ascending index order.
    pub fn snapshot(&self) -> Vec<Payload> { self.iter().cloned().collect() }

    /// Descriptor sequence for a full deployment, in release order.
    pub fn descriptors(&self) -> Vec<PayloadDescriptor> {
        self.iter().map(PayloadDescriptor::from).collect()
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    /// Changes the insertion limit. Existing payloads are never evicted, a lower
    /// limit only blocks further inserts.
    pub fn set_capacity(&mut self, capacity: usize) { self.capacity = capacity; }
}

impl Default for PayloadRegistry {
    fn default() -> Self { Self::new(Self::DEFAULT_CAPACITY) }
}
