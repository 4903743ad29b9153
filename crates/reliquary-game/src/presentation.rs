//! Presentation spawner interface
//!
//! The core never renders anything itself. It asks a spawner to create a
//! displayable copy of an item and later to destroy it through the handle
//! it got back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use reliquary_core::Transform;
use tracing::debug;

use crate::item::{Item, ItemId};

/// Opaque handle of a spawned presentation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub u64);

/// Creates and destroys displayable item instances
pub trait PresentationSpawner {
    fn spawn(&mut self, item: &Item, transform: Transform) -> InstanceHandle;

    fn despawn(&mut self, instance: InstanceHandle);

    /// Move a live instance. Spawners without movable instances ignore this.
    fn set_transform(&mut self, _instance: InstanceHandle, _transform: Transform) {}
}

/// Shared spawner, for callers that keep inspecting it after handing it over
impl<S: PresentationSpawner> PresentationSpawner for Rc<RefCell<S>> {
    fn spawn(&mut self, item: &Item, transform: Transform) -> InstanceHandle {
        self.borrow_mut().spawn(item, transform)
    }

    fn despawn(&mut self, instance: InstanceHandle) {
        self.borrow_mut().despawn(instance);
    }

    fn set_transform(&mut self, instance: InstanceHandle, transform: Transform) {
        self.borrow_mut().set_transform(instance, transform);
    }
}

/// A live instance tracked by [`InstanceLedger`]
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub item: ItemId,
    pub prefab: String,
    pub transform: Transform,
}

/// Headless spawner that keeps a ledger of live instances
#[derive(Debug, Default)]
pub struct InstanceLedger {
    live: HashMap<InstanceHandle, LedgerEntry>,
    next_handle: u64,
    spawned_total: u64,
}

impl InstanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instance: InstanceHandle) -> Option<&LedgerEntry> {
        self.live.get(&instance)
    }

    /// Number of instances currently alive
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of instances ever spawned
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Whether any live instance shows the given item
    pub fn shows(&self, item: ItemId) -> bool {
        self.live.values().any(|entry| entry.item == item)
    }
}

impl PresentationSpawner for InstanceLedger {
    fn spawn(&mut self, item: &Item, transform: Transform) -> InstanceHandle {
        let handle = InstanceHandle(self.next_handle);
        self.next_handle += 1;
        self.spawned_total += 1;
        self.live.insert(
            handle,
            LedgerEntry {
                item: item.id,
                prefab: item.prefab.clone(),
                transform,
            },
        );
        debug!("Spawned {} as {:?}", item.prefab, handle);
        handle
    }

    fn despawn(&mut self, instance: InstanceHandle) {
        if self.live.remove(&instance).is_some() {
            debug!("Despawned {:?}", instance);
        }
    }

    fn set_transform(&mut self, instance: InstanceHandle, transform: Transform) {
        if let Some(entry) = self.live.get_mut(&instance) {
            entry.transform = transform;
        }
    }
}
