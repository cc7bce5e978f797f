use parking_lot::{RwLock, RwLockReadGuard};
use smol_str::SmolStr;

use crate::types::KeywordIndex;

/// Ordered store of keyword payloads, addressed by keyword index.
///
/// Keyword strings and byte lengths are frozen at build time. The value
/// slice sits behind its own lock so a payload can be replaced after the
/// build without touching automaton topology.
#[derive(Debug)]
pub struct ValueStore<V> {
    keywords: Vec<SmolStr>,
    lengths: Vec<u32>,
    values: RwLock<Vec<V>>,
}

impl<V> ValueStore<V> {
    pub fn new() -> ValueStore<V> {
        ValueStore {
            keywords: Vec::new(),
            lengths: Vec::new(),
            values: RwLock::new(Vec::new()),
        }
    }

    /// Appends a keyword with its payload, returning its index.
    pub fn push(&mut self, keyword: &str, value: V) -> KeywordIndex {
        let index = self.keywords.len() as KeywordIndex;
        self.keywords.push(SmolStr::new(keyword));
        self.lengths.push(keyword.len() as u32);
        self.values.get_mut().push(value);
        index
    }

    /// Build-time overwrite for a re-inserted keyword.
    pub fn replace(&mut self, index: KeywordIndex, value: V) {
        self.values.get_mut()[index as usize] = value;
    }

    /// Post-build overwrite through the write lock.
    pub fn replace_shared(&self, index: KeywordIndex, value: V) {
        self.values.write()[index as usize] = value;
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// byte length of the keyword at `index`.
    #[inline(always)]
    pub fn length(&self, index: KeywordIndex) -> u32 {
        self.lengths[index as usize]
    }

    pub fn keyword(&self, index: KeywordIndex) -> Option<&str> {
        self.keywords.get(index as usize).map(|k| k.as_str())
    }

    pub fn value(&self, index: KeywordIndex) -> Option<V>
    where
        V: Clone,
    {
        self.values.read().get(index as usize).cloned()
    }

    /// Read guard over the value slice, held for the duration of a scan.
    pub fn read_values(&self) -> RwLockReadGuard<'_, Vec<V>> {
        self.values.read()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.as_str())
    }
}

impl<V> Default for ValueStore<V> {
    fn default() -> ValueStore<V> {
        ValueStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut store: ValueStore<&str> = ValueStore::new();
        let first = store.push("mark", "pos");
        let second = store.push("känd", "adj");
        assert_eq!(store.len(), 2);
        assert_eq!(store.keyword(first), Some("mark"));
        assert_eq!(store.length(first), 4);
        assert_eq!(store.length(second), 5);
        assert_eq!(store.value(second), Some("adj"));
    }

    #[test]
    fn replace_keeps_length_and_order() {
        let mut store: ValueStore<u32> = ValueStore::new();
        let index = store.push("word", 1);
        store.replace(index, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.value(index), Some(2));
        store.replace_shared(index, 3);
        assert_eq!(store.value(index), Some(3));
        assert_eq!(store.length(index), 4);
    }
}
