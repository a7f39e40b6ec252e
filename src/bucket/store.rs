use dashmap::DashMap;
use std::hash::Hash;

/// Last-write-wins buffer shared by producers and the worker.
pub(crate) struct EntryStore<K, V> {
    entries: DashMap<K, V>,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    // false when the entry was dropped
    pub(crate) fn insert(&self, key: K, value: V, max_capacity: usize) -> bool {
        if self.entries.len() >= max_capacity {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn drain(&self) -> Vec<V> {
        let keys: Vec<K> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.iter()
            .filter_map(|key| self.entries.remove(key))
            .map(|(_, value)| value)
            .collect()
    }
}
