//! Instance groups and the manager that buckets instances into them.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use glam::{Mat4, Vec3};
use tracing::{debug, trace};

use crate::order::OrderInfo;

use super::buffer::InstanceBuffer;
use super::{Instance, InstanceAttributes};

/// Key that decides which group an instance is drawn with.
pub trait GroupKey: Clone + Eq + Hash + Ord + Debug + 'static {
    fn order(&self) -> OrderInfo;
}

/// Identifies one registered instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceHandle<K> {
    key: K,
    id: u64,
}

impl<K> InstanceHandle<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// =============================================================================
// Group
// =============================================================================

/// All instances sharing one key, drawn with one instanced call.
#[derive(Debug)]
pub struct InstanceGroup<T: Instance> {
    buffer: InstanceBuffer<T>,
    slots: HashMap<u64, usize>,
    owners: HashMap<usize, u64>,
    dirty: InstanceAttributes,
    needs_sort: bool,
    empty_since: Option<f32>,
    destroyed: bool,
}

impl<T: Instance> Default for InstanceGroup<T> {
    fn default() -> Self {
        Self {
            buffer: InstanceBuffer::default(),
            slots: HashMap::new(),
            owners: HashMap::new(),
            dirty: InstanceAttributes::empty(),
            needs_sort: false,
            empty_since: None,
            destroyed: false,
        }
    }
}

impl<T: Instance> InstanceGroup<T> {
    /// Panics if `id` is already registered or the group was destroyed.
    pub fn insert(&mut self, id: u64, instance: T) {
        assert!(!self.destroyed, "instance registered into a destroyed group");
        assert!(!self.slots.contains_key(&id), "instance {id} registered twice");

        let slot = self.buffer.allocate(instance);
        self.slots.insert(id, slot);
        self.owners.insert(slot, id);
        self.dirty = InstanceAttributes::all();
        self.needs_sort = true;
        self.empty_since = None;
    }

    pub fn update(&mut self, id: u64, instance: T, changed: InstanceAttributes) {
        let Some(&slot) = self.slots.get(&id) else { return };
        self.buffer.set(slot, instance);
        self.dirty |= changed;
        if changed.contains(InstanceAttributes::MATRIX) {
            self.needs_sort = true;
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let Some(slot) = self.slots.remove(&id) else { return false };
        self.owners.remove(&slot);
        self.buffer.release(slot);
        self.dirty = InstanceAttributes::all();
        self.needs_sort = true;
        true
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.slots.get(&id).and_then(|slot| self.buffer.get(*slot))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn buffer(&self) -> &InstanceBuffer<T> {
        &self.buffer
    }

    /// Attributes changed since the last call.
    pub fn take_dirty(&mut self) -> InstanceAttributes {
        std::mem::take(&mut self.dirty)
    }

    /// Slot of `id`; changes when the group is compacted or sorted.
    pub fn slot(&self, id: u64) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// Compact and order instances back to front from `camera`. Without a
    /// camera every distance is zero and registration order is kept.
    pub fn sort(&mut self, camera: Option<Vec3>) {
        if !self.needs_sort && camera.is_none() {
            return;
        }

        let mut entries: Vec<(u64, usize, T, f32)> = self
            .owners
            .iter()
            .filter_map(|(&slot, &id)| {
                let instance = *self.buffer.get(slot)?;
                let distance = camera.map_or(0.0, |c| instance.position().distance_squared(c));
                Some((id, slot, instance, distance))
            })
            .collect();
        entries.sort_by(|a, b| b.3.total_cmp(&a.3).then(a.1.cmp(&b.1)));

        let before: Vec<u64> = {
            let mut slots: Vec<_> = self.owners.iter().map(|(s, id)| (*s, *id)).collect();
            slots.sort_unstable();
            slots.into_iter().map(|(_, id)| id).collect()
        };
        let after: Vec<u64> = entries.iter().map(|e| e.0).collect();
        if before == after && self.buffer.is_compact() && !self.needs_sort {
            return;
        }

        self.slots.clear();
        self.owners.clear();
        for (slot, (id, ..)) in entries.iter().enumerate() {
            self.slots.insert(*id, slot);
            self.owners.insert(slot, *id);
        }
        self.buffer.rewrite(entries.into_iter().map(|e| e.2));
        self.dirty = InstanceAttributes::all();
        self.needs_sort = false;
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.slots.clear();
        self.owners.clear();
        self.buffer = InstanceBuffer::default();
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Buckets instances into groups by key.
///
/// Groups are created on first registration, compacted and sorted on the
/// frame pass, and released after staying empty for `release_delay`
/// seconds.
#[derive(Debug)]
pub struct GroupManager<K: GroupKey, T: Instance> {
    groups: HashMap<K, InstanceGroup<T>>,
    next_id: u64,
    elapsed: f32,
    release_delay: f32,
    destroyed: bool,
}

impl<K: GroupKey, T: Instance> GroupManager<K, T> {
    pub fn new(release_delay: f32) -> Self {
        Self { groups: HashMap::new(), next_id: 0, elapsed: 0.0, release_delay, destroyed: false }
    }

    /// Panics if the manager was destroyed.
    pub fn register(&mut self, key: K, instance: T) -> InstanceHandle<K> {
        assert!(!self.destroyed, "instance registered into a destroyed group manager");
        self.next_id += 1;
        let id = self.next_id;

        let group = self.groups.entry(key.clone()).or_insert_with(|| {
            debug!(target: "spark_spatial::batching", ?key, "instance group created");
            InstanceGroup::default()
        });
        group.insert(id, instance);
        InstanceHandle { key, id }
    }

    pub fn update(&mut self, handle: &InstanceHandle<K>, instance: T, changed: InstanceAttributes) {
        if let Some(group) = self.groups.get_mut(&handle.key) {
            group.update(handle.id, instance, changed);
        }
    }

    pub fn unregister(&mut self, handle: &InstanceHandle<K>) {
        let Some(group) = self.groups.get_mut(&handle.key) else { return };
        if group.remove(handle.id) && group.is_empty() {
            group.empty_since = Some(self.elapsed);
        }
    }

    /// Move an instance to another group; the handle keeps its id.
    pub fn change_key(&mut self, handle: &InstanceHandle<K>, key: K) -> InstanceHandle<K> {
        if handle.key == key {
            return handle.clone();
        }
        let instance = self.get(handle).copied().unwrap_or_else(T::zeroed);
        self.unregister(handle);

        assert!(!self.destroyed, "instance registered into a destroyed group manager");
        self.groups.entry(key.clone()).or_default().insert(handle.id, instance);
        InstanceHandle { key, id: handle.id }
    }

    pub fn get(&self, handle: &InstanceHandle<K>) -> Option<&T> {
        self.groups.get(&handle.key)?.get(handle.id)
    }

    pub fn group(&self, key: &K) -> Option<&InstanceGroup<T>> {
        self.groups.get(key)
    }

    pub fn group_mut(&mut self, key: &K) -> Option<&mut InstanceGroup<T>> {
        self.groups.get_mut(key)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn instance_count(&self) -> usize {
        self.groups.values().map(InstanceGroup::len).sum()
    }

    /// Frame pass: release long-empty groups, compact and sort the rest.
    ///
    /// `camera` is the camera matrix in root space. Returns group keys in
    /// draw order.
    pub fn on_frame(&mut self, delta: f32, camera: Option<&Mat4>) -> Vec<K> {
        self.elapsed += delta.max(0.0);
        let elapsed = self.elapsed;
        let release_delay = self.release_delay;

        self.groups.retain(|key, group| {
            let expired = group.is_empty()
                && group.empty_since.is_some_and(|since| elapsed - since >= release_delay);
            if expired {
                debug!(target: "spark_spatial::batching", ?key, "instance group released");
            }
            !expired
        });

        let camera = camera.map(|m| m.w_axis.truncate());
        for group in self.groups.values_mut() {
            group.sort(camera);
        }

        let mut keys: Vec<K> = self.groups.keys().cloned().collect();
        keys.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.cmp(b)));
        trace!(target: "spark_spatial::batching", groups = keys.len(), "instance groups ordered");
        keys
    }

    /// Destroy every group; later registrations panic.
    pub fn destroy(&mut self) {
        for group in self.groups.values_mut() {
            group.destroy();
        }
        self.destroyed = true;
        debug!(target: "spark_spatial::batching", "group manager destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
