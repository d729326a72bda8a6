/// Remembers the most recently resolved key-value pair.
///
/// The cache is never persisted. It is valid only until the next mutation
/// that touches its key.
pub struct EntryCache<K: Ord, V> {
    entry: Option<(K, V)>,
}

impl<K: Ord, V> Default for EntryCache<K, V> {
    fn default() -> Self {
        EntryCache { entry: None }
    }
}

impl<K: Ord, V> EntryCache<K, V> {
    pub fn look_up(&self, key: &K) -> Option<&V> {
        match &self.entry {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entry = Some((key, value));
    }

    /// Forget the cached entry if it belongs to `key`.
    pub fn erase(&mut self, key: &K) {
        if matches!(&self.entry, Some((k, _)) if k == key) {
            self.entry = None;
        }
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
