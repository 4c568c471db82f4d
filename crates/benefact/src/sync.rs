//! Keyed serialization for check-then-act storage sequences.
//!
//! The eligibility re-check before a benefit request insert and the
//! duplicate-proposal probe before a modification insert are both
//! read-then-write races unless submissions for the same natural key are
//! serialized. With an embedded store there is no database transaction to
//! lean on, so the services hand out one mutex per key instead of taking a
//! global lock.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

pub struct KeyedMutex<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedMutex<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mutex owned by `key`, creating it on first use. Callers
    /// lock the returned handle for the duration of their critical section.
    pub fn slot(&self, key: &K) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().expect("keyed mutex table poisoned");
        slots.entry(key.clone()).or_default().clone()
    }
}
