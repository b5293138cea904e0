//! Instance registrations owned by one element.

use std::cell::RefCell;
use std::rc::Rc;

use super::group::{GroupKey, GroupManager, InstanceHandle};
use super::Instance;

/// The instances one element currently has registered in a shared manager.
///
/// [`InstanceSlots::sync`] reconciles them with the desired list: handles
/// are reused in order, moved when their key changed, and surplus ones are
/// unregistered.
pub struct InstanceSlots<K: GroupKey, T: Instance> {
    manager: Rc<RefCell<GroupManager<K, T>>>,
    handles: RefCell<Vec<InstanceHandle<K>>>,
}

impl<K: GroupKey, T: Instance> std::fmt::Debug for InstanceSlots<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceSlots").field("handles", &self.handles.borrow().len()).finish()
    }
}

impl<K: GroupKey, T: Instance> InstanceSlots<K, T> {
    pub fn new(manager: Rc<RefCell<GroupManager<K, T>>>) -> Self {
        Self { manager, handles: RefCell::new(Vec::new()) }
    }

    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }

    pub fn handles(&self) -> Vec<InstanceHandle<K>> {
        self.handles.borrow().clone()
    }

    pub fn sync(&self, desired: impl IntoIterator<Item = (K, T)>) {
        let mut manager = self.manager.borrow_mut();
        let mut handles = self.handles.borrow_mut();
        let previous = std::mem::take(&mut *handles);
        let mut previous = previous.into_iter();

        for (key, instance) in desired {
            let handle = match previous.next() {
                Some(handle) => {
                    let handle = manager.change_key(&handle, key);
                    let changed = match manager.get(&handle) {
                        Some(current) => instance.changes(current),
                        None => super::InstanceAttributes::all(),
                    };
                    if !changed.is_empty() {
                        manager.update(&handle, instance, changed);
                    }
                    handle
                }
                None => manager.register(key, instance),
            };
            handles.push(handle);
        }

        for surplus in previous {
            manager.unregister(&surplus);
        }
    }

    /// Unregister everything.
    pub fn clear(&self) {
        let handles = std::mem::take(&mut *self.handles.borrow_mut());
        let mut manager = self.manager.borrow_mut();
        for handle in &handles {
            manager.unregister(handle);
        }
    }
}
