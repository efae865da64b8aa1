//! Per-owner mutual exclusion
//!
//! Every mutation of an owner's seed pairs runs inside that owner's lock.
//! Different owners never contend. A slot lives only while some caller
//! holds or waits on it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct OwnerLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `owner_id`
    ///
    /// Not reentrant: `f` must not call back into `with_owner` for the same
    /// owner.
    pub fn with_owner<R>(&self, owner_id: &str, f: impl FnOnce() -> R) -> R {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(owner_id.to_string()).or_default())
        };
        let result = {
            let _guard = slot.lock();
            f()
        };

        // Slots are cloned under the map lock, so a count of two (map plus
        // ours) means nobody else holds or waits on this one
        let mut slots = self.slots.lock();
        if Arc::strong_count(&slot) == 2 {
            slots.remove(owner_id);
        }
        result
    }
}
