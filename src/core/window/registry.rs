//! Window registry.
//!
//! One process-wide ordered index from window handle to [`WindowRecord`],
//! guarded by a single mutex. Access goes through two guard types:
//!
//! - [`RegistryGuard`]: the whole index, locked. Dropping it unlocks.
//! - [`RecordGuard`]: the index locked *and* positioned on one record.
//!   Returned still-locked by [`Registry::create`] and [`Registry::get`];
//!   dropping it (or calling [`RecordGuard::release`]) unlocks exactly once.
//!
//! [`Registry::destroy`] consumes a `RecordGuard`, removes the record and
//! unlocks the index before tearing the record's surface down, so
//! compositor teardown never blocks other window lookups.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use super::record::{WindowRecord, WindowRects};
use crate::platform::{WindowHandle, WindowSystem};
use crate::util::lock_unpoisoned;
use crate::wlog;
use crate::util::logging::REGISTRY;

#[derive(Default)]
pub struct Registry {
    records: Mutex<BTreeMap<WindowHandle, WindowRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the whole index.
    pub fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            records: lock_unpoisoned(&self.records),
        }
    }

    /// Create the record for `handle`, or return the one a concurrent
    /// caller inserted first. Returned locked.
    ///
    /// Desktop and message-only windows get no record.
    pub fn create(
        &self,
        windows: &dyn WindowSystem,
        handle: WindowHandle,
        rects: &WindowRects,
    ) -> Option<RecordGuard<'_>> {
        let parent = windows.parent(handle)?;
        if parent != windows.desktop_window() && windows.parent(parent).is_none() {
            return None;
        }

        let record = WindowRecord::new(handle, rects);

        let mut registry = self.lock();
        if registry.contains(handle) {
            // Lost the race; ours is dropped unused.
            tracing::trace!("Record for window {} already created", handle);
            return RecordGuard::new(registry, handle);
        }
        registry.records.insert(handle, record);
        tracing::debug!("Created record for window {}", handle);

        RecordGuard::new(registry, handle)
    }

    /// Look up `handle`. Returned locked.
    pub fn get(&self, handle: WindowHandle) -> Option<RecordGuard<'_>> {
        RecordGuard::new(self.lock(), handle)
    }

    /// Remove the record, unlock, then tear down what it owned.
    pub fn destroy(&self, record: RecordGuard<'_>) {
        let RecordGuard { mut registry, handle } = record;
        let removed = registry.records.remove(&handle);
        drop(registry);

        if let Some(record) = removed {
            tracing::debug!("Destroying record for window {}", handle);
            record.teardown();
        }
    }

    /// Drop every record. Surfaces are torn down outside the lock.
    pub fn teardown(&self) {
        let records = std::mem::take(&mut *self.lock().records);
        if !records.is_empty() {
            wlog!(REGISTRY, "Tearing down {} window records", records.len());
        }
        for (_, record) in records {
            record.teardown();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The locked registry index.
pub struct RegistryGuard<'a> {
    records: MutexGuard<'a, BTreeMap<WindowHandle, WindowRecord>>,
}

impl RegistryGuard<'_> {
    pub fn get(&self, handle: WindowHandle) -> Option<&WindowRecord> {
        self.records.get(&handle)
    }

    pub fn get_mut(&mut self, handle: WindowHandle) -> Option<&mut WindowRecord> {
        self.records.get_mut(&handle)
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.records.contains_key(&handle)
    }

    /// Visit every recorded window that structurally descends from
    /// `ancestor`, in handle order. `ancestor` itself is skipped.
    ///
    /// The set is fixed before the first visit; records the visitor
    /// removes are not visited afterwards.
    pub fn for_each_descendant(
        &mut self,
        windows: &dyn WindowSystem,
        ancestor: WindowHandle,
        mut visitor: impl FnMut(&mut Self, WindowHandle),
    ) {
        let descendants: Vec<WindowHandle> = self
            .records
            .keys()
            .copied()
            .filter(|&handle| handle != ancestor && windows.is_descendant(ancestor, handle))
            .collect();

        for handle in descendants {
            if self.contains(handle) {
                visitor(self, handle);
            }
        }
    }
}

/// The locked registry positioned on one existing record.
pub struct RecordGuard<'a> {
    registry: RegistryGuard<'a>,
    handle: WindowHandle,
}

impl<'a> RecordGuard<'a> {
    fn new(registry: RegistryGuard<'a>, handle: WindowHandle) -> Option<Self> {
        registry.contains(handle).then_some(Self { registry, handle })
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn registry(&self) -> &RegistryGuard<'a> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RegistryGuard<'a> {
        &mut self.registry
    }

    /// Unlock the registry.
    pub fn release(self) {}
}

impl Deref for RecordGuard<'_> {
    type Target = WindowRecord;

    fn deref(&self) -> &WindowRecord {
        match self.registry.records.get(&self.handle) {
            Some(record) => record,
            None => unreachable!("record {} removed under its guard", self.handle),
        }
    }
}

impl DerefMut for RecordGuard<'_> {
    fn deref_mut(&mut self) -> &mut WindowRecord {
        let handle = self.handle;
        match self.registry.records.get_mut(&handle) {
            Some(record) => record,
            None => unreachable!("record {} removed under its guard", handle),
        }
    }
}
