use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::config::TableConfig;
use crate::cursor::Cursor;
use crate::cursor::CursorMut;
use crate::error::KeyNotFound;
use crate::hash_table::HashTable;

/// A hash map implemented on top of the Robin Hood [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and hashes them with the `BuildHasher` `S`. Iteration visits entries in
/// slot order, which follows hash order loosely but not exactly.
///
/// Two behaviours differ from `std::collections::HashMap`:
///
/// - [`insert`](Self::insert) keeps the first value stored under a key. Use
///   [`insert_or_assign`](Self::insert_or_assign) to overwrite.
/// - [`at`](Self::at) is the read-only accessor and reports a missing key as an
///   error, while [`get_or_insert_default`](Self::get_or_insert_default) is the
///   indexing accessor that inserts on a miss.
///
/// Cloning copies the slot array as-is, so a clone has the same capacity and
/// iteration order as the original.
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    pub(crate) table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.table.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the current number of slots.
    ///
    /// This starts at the configured initial capacity and only changes by
    /// doubling, or by resetting on [`clear`](Self::clear).
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the sizing parameters this map was created with.
    pub fn config(&self) -> &TableConfig {
        self.table.config()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements and returns the map to its initial capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// for i in 0..32 {
    ///     map.insert(i, i);
    /// }
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 4);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns a cursor at the first occupied slot, or the end cursor if the
    /// map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V, S> {
        let index = self.table.first_occupied_from(0);
        Cursor::new(self, index)
    }

    /// Returns the past-the-end cursor.
    ///
    /// Its slot index equals the map's capacity. It points at no entry.
    pub fn end(&self) -> Cursor<'_, K, V, S> {
        Cursor::new(self, self.table.capacity())
    }

    /// Mutable form of [`begin`](Self::begin).
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let index = self.table.first_occupied_from(0);
        CursorMut::new(self, index)
    }

    /// Mutable form of [`end`](Self::end).
    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let index = self.table.capacity();
        CursorMut::new(self, index)
    }

    /// Returns an iterator over the key-value pairs of the map, in slot
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let map = HashMap::from([(1, "a"), (2, "b")]);
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(map.iter().len(), 2);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes and yields every key-value pair, leaving the map empty at its
    /// initial capacity.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Counts entries by probe distance. See [`HashTable::probe_histogram`].
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram()
    }

    /// Probe-length statistics. See [`HashTable::debug_stats`].
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder and the default
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use robin_map::HashMap;
    ///
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_config_and_hasher(TableConfig::DEFAULT, hash_builder)
    }

    /// Creates an empty map with the given configuration and hasher builder.
    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_config(config),
            hash_builder,
        }
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_index(hash, |(k, _)| k == key)
    }

    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Returns `true` if the pair was added. If the key is present the map is
    /// left untouched, including the stored value, and `false` is returned.
    /// Adding an entry may grow the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert!(map.insert(5, "x"));
    /// assert!(!map.insert(5, "y"));
    /// assert_eq!(map.get(&5), Some(&"x"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_builder.hash_one(&key);
        if self.table.find_index(hash, |(k, _)| *k == key).is_some() {
            return false;
        }
        self.table.insert_unique(hash, (key, value));
        true
    }

    /// Inserts a key-value pair, replacing the value of an existing entry.
    ///
    /// Returns the previous value if the key was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert_or_assign(37, "a"), None);
    /// assert_eq!(map.insert_or_assign(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # }
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.find_mut(hash, |(k, _)| *k == key) {
            Some((_, existing)) => Some(core::mem::replace(existing, value)),
            None => {
                self.table.insert_unique(hash, (key, value));
                None
            }
        }
    }

    /// Returns a cursor at the entry for `key`, or the end cursor if the key
    /// is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let map = HashMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.find(&1).key_value(), Some((&1, &"a")));
    /// assert!(map.find(&3) == map.end());
    /// # }
    /// ```
    pub fn find(&self, key: &K) -> Cursor<'_, K, V, S> {
        let index = self.index_of(key).unwrap_or(self.table.capacity());
        Cursor::new(self, index)
    }

    /// Returns a mutable cursor at the entry for `key`, or the end cursor if
    /// the key is absent.
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, S> {
        let index = self.index_of(key).unwrap_or(self.table.capacity());
        CursorMut::new(self, index)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| k == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    /// Returns the value stored under `key`, or [`KeyNotFound`] if there is
    /// none. Never modifies the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    /// use robin_map::KeyNotFound;
    ///
    /// let map = HashMap::from([("one", 1)]);
    /// assert_eq!(map.at(&"one"), Ok(&1));
    /// assert_eq!(map.at(&"two"), Err(KeyNotFound));
    /// # }
    /// ```
    pub fn at(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, first inserting
    /// the value produced by `default` if the key is absent.
    ///
    /// A miss performs a full insert, which may grow the table.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        let hash = self.hash_builder.hash_one(&key);
        let index = match self.table.find_index(hash, |(k, _)| *k == key) {
            Some(index) => index,
            None => self.table.insert_unique(hash, (key, default())),
        };
        &mut self.table.occupied_mut(index).1
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// Entries following the removed one in its probe run shift back by one
    /// slot, so cursor positions are not stable across removals.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Removes `key` if present. Absent keys are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let mut map = HashMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// map.erase(&2);
    /// map.erase(&2);
    /// assert!(map.find(&2) == map.end());
    /// assert_eq!(map.len(), 2);
    /// # }
    /// ```
    pub fn erase(&mut self, key: &K) {
        self.remove_entry(key);
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Default,
    S: BuildHasher,
{
    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// This is the indexing accessor: it mutates the map on a miss, including
    /// possibly growing it. Use [`at`](Self::at) or [`get`](Self::get) for a
    /// lookup without side effects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// *counts.get_or_insert_default("apple") += 1;
    /// *counts.get_or_insert_default("apple") += 1;
    /// assert_eq!(counts.at(&"apple"), Ok(&2));
    /// # }
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V {
        self.get_or_insert_with(key, V::default)
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty map using the default hasher builder and
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 4);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map with the given configuration using the default
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_map::HashMap;
    /// use robin_map::TableConfig;
    ///
    /// let config = TableConfig::new(64, 0.8).unwrap();
    /// let map: HashMap<u64, u64> = HashMap::with_config(config);
    /// assert_eq!(map.capacity(), 64);
    /// # }
    /// ```
    pub fn with_config(config: TableConfig) -> Self {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V, const N: usize> From<[(K, V); N]> for HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the key-value pairs of a `HashMap` with mutable values.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

/// A consuming iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::cursor::tests::IdentityBuildHasher;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    fn identity_map<V>() -> HashMap<u64, V, IdentityBuildHasher> {
        HashMap::with_hasher(IdentityBuildHasher)
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.config(), &TableConfig::DEFAULT);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = TableConfig::new(16, 0.5).unwrap();
        let mut map = HashMap::with_config_and_hasher(config, SipHashBuilder::default());
        assert_eq!(map.capacity(), 16);

        for i in 0..8 {
            map.insert(i, i);
        }
        assert_eq!(map.capacity(), 16);
        map.insert(8, 8);
        assert_eq!(map.capacity(), 32);
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert!(map.insert(1, "hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);
    }

    #[test]
    fn test_first_write_wins() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(map.insert(5, "x"));
        assert!(!map.insert(5, "y"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.find(&5).value(), Some(&"x"));
    }

    #[test]
    fn test_insert_or_assign() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert_eq!(map.insert_or_assign(1, "a"), None);
        assert_eq!(map.insert_or_assign(1, "b"), Some("a"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"b"));
    }

    #[test]
    fn test_growth_scenario() {
        let mut map = identity_map();
        assert_eq!(map.capacity(), 4);

        map.insert(1, "a");
        assert_eq!(map.capacity(), 4);
        map.insert(2, "b");
        assert_eq!(map.capacity(), 8);
        map.insert(3, "c");
        assert_eq!(map.len(), 3);
        assert_eq!(map.capacity(), 8);

        map.insert(4, "d");
        assert_eq!(map.capacity(), 16);
        for (k, v) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
            assert_eq!(map.find(&k).key_value(), Some((&k, &v)));
        }
        map.table.assert_invariants();
    }

    #[test]
    fn test_erase() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, 'a');
        map.insert(2, 'b');
        map.insert(3, 'c');

        map.erase(&2);
        assert!(map.find(&2) == map.end());
        assert_eq!(map.find(&1).value(), Some(&'a'));
        assert_eq!(map.find(&3).value(), Some(&'c'));
        assert_eq!(map.len(), 2);

        let before: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        map.erase(&2);
        map.erase(&42);
        let after: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_erase_shifts_collisions() {
        let mut map = identity_map();
        // All of these share ideal slot 0 once the table has 16 slots.
        for k in [0u64, 16, 32, 48] {
            map.insert(k, k);
        }
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.find(&48).index(), 3);

        map.erase(&0);
        assert_eq!(map.find(&16).index(), 0);
        assert_eq!(map.find(&32).index(), 1);
        assert_eq!(map.find(&48).index(), 2);
        map.table.assert_invariants();
    }

    #[test]
    fn test_at_and_get_or_insert_default() {
        let mut map: HashMap<&str, i32, SipHashBuilder> = HashMap::default();
        assert_eq!(map.at(&"missing"), Err(KeyNotFound));
        assert!(map.is_empty());

        let value = map.get_or_insert_default("missing");
        assert_eq!(*value, 0);
        *value = 17;

        assert_eq!(map.len(), 1);
        assert_eq!(map.at(&"missing"), Ok(&17));
        assert_eq!(*map.get_or_insert_default("missing"), 17);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get_or_insert_default_survives_growth() {
        let mut map: HashMap<u64, Vec<u64>, SipHashBuilder> = HashMap::default();
        for k in 0..300 {
            let capacity = map.capacity();
            map.get_or_insert_default(k).push(k);
            if map.capacity() != capacity {
                assert_eq!(map.get(&k), Some(&vec![k]));
            }
        }
        for k in 0..300 {
            assert_eq!(map.at(&k), Ok(&vec![k]));
        }
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        let mut calls = 0;
        *map.get_or_insert_with("k", || {
            calls += 1;
            10
        }) += 1;
        *map.get_or_insert_with("k", || {
            calls += 1;
            10
        }) += 1;
        assert_eq!(calls, 1);
        assert_eq!(map.get(&"k"), Some(&12));
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.remove_entry(&2), Some((2, "world".to_string())));
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..64 {
            map.insert(i, i.to_string());
        }
        assert!(map.capacity() > 4);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 4);
        assert!(!map.contains_key(&1));
        assert!(map.begin() == map.end());
    }

    #[test]
    fn test_clone_is_deep_and_layout_preserving() {
        let mut original = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..40 {
            original.insert(i, i.to_string());
        }
        for i in (0..40).step_by(3) {
            original.erase(&i);
        }

        let mut copy = original.clone();
        assert_eq!(copy.capacity(), original.capacity());
        assert_eq!(copy.len(), original.len());
        assert!(copy.iter().eq(original.iter()));

        copy.get_mut(&1).unwrap().push('!');
        assert_eq!(original.get(&1), Some(&"1".to_string()));
        assert_eq!(copy.get(&1), Some(&"1!".to_string()));

        let mut assigned = HashMap::with_hasher(SipHashBuilder::default());
        assigned.insert(999, String::new());
        assigned.clone_from(&original);
        assert!(assigned.iter().eq(original.iter()));
        assert!(!assigned.contains_key(&999));
    }

    #[test]
    fn test_iterators() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let pairs: std::collections::HashMap<i32, String> =
            map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&2), Some(&"two".to_string()));

        let keys: std::collections::HashSet<i32> = map.keys().copied().collect();
        assert_eq!(keys, [1, 2, 3].into_iter().collect());

        let values: std::collections::HashSet<String> = map.values().cloned().collect();
        assert!(values.contains("three"));

        for value in map.values_mut() {
            value.make_ascii_uppercase();
        }
        for (_, value) in &mut map {
            value.push('!');
        }
        assert_eq!(map.get(&3), Some(&"THREE!".to_string()));

        let forward: Vec<_> = map.keys().copied().collect();
        let mut backward: Vec<_> = map.iter().rev().map(|(k, _)| *k).collect();
        backward.reverse();
        assert_eq!(forward, backward);

        let mut reversed_keys: Vec<_> = map.keys().rev().copied().collect();
        reversed_keys.reverse();
        assert_eq!(forward, reversed_keys);

        let forward_values: Vec<_> = map.values().cloned().collect();
        let mut reversed_values: Vec<_> = map.values().rev().cloned().collect();
        reversed_values.reverse();
        assert_eq!(forward_values, reversed_values);

        let mut values = map.values_mut();
        assert_eq!(values.len(), 3);
        let last = values.next_back().unwrap();
        last.push('?');
        assert_eq!(values.len(), 2);
        let last_key = *map.keys().next_back().unwrap();
        assert!(map.get(&last_key).unwrap().ends_with("!?"));
    }

    #[test]
    fn test_iteration_is_slot_order() {
        let mut map = identity_map();
        for k in [9u64, 3, 14, 1] {
            map.insert(k, ());
        }
        assert_eq!(map.capacity(), 16);
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 9, 14]);
    }

    #[test]
    fn test_drain_and_into_iter() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            map.insert(i, i * 10);
        }

        let drain = map.drain();
        assert_eq!(drain.len(), 10);
        let drained: std::collections::HashMap<i32, i32> = drain.collect();
        assert_eq!(drained.len(), 10);
        assert_eq!(drained.get(&7), Some(&70));
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 4);

        map.extend([(1, 1), (2, 2)]);
        let mut owned: Vec<_> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![(1, 1), (2, 2)]);
    }

    #[test]
    #[cfg(feature = "stats")]
    fn test_stats_passthrough() {
        let mut map = identity_map();
        // Every key has ideal slot 0 once the table has 16 slots.
        for k in [0u64, 16, 32, 48] {
            map.insert(k, k);
        }
        assert_eq!(map.probe_histogram(), vec![1, 1, 1, 1]);

        let stats = map.debug_stats();
        assert_eq!(stats.populated, 4);
        assert_eq!(stats.capacity, 16);
        assert_eq!(stats.max_len, 6);
        assert_eq!(stats.max_probe_distance, 3);
        assert!((stats.mean_probe_distance - 1.5).abs() < 1e-9);
        assert!((stats.load_factor - 0.25).abs() < 1e-9);

        map.clear();
        assert!(map.probe_histogram().is_empty());
        assert_eq!(map.debug_stats().populated, 0);
    }

    #[test]
    fn test_construction_drops_duplicates() {
        let from_array: HashMap<i32, &str> =
            HashMap::from([(1, "first"), (2, "two"), (1, "second")]);
        assert_eq!(from_array.len(), 2);
        assert_eq!(from_array.get(&1), Some(&"first"));

        let source = vec![(7, 'x'), (8, 'y'), (7, 'z')];
        let from_iter: HashMap<i32, char, SipHashBuilder> = source.iter().copied().collect();
        assert_eq!(from_iter.len(), 2);
        assert_eq!(from_iter.get(&7), Some(&'x'));

        let mut extended = from_iter.clone();
        extended.extend([(8, 'q'), (9, 'w')]);
        assert_eq!(extended.get(&8), Some(&'y'));
        assert_eq!(extended.get(&9), Some(&'w'));
    }

    #[test]
    fn test_equality_ignores_layout() {
        let config = TableConfig::new(64, 0.5).unwrap();
        let mut big = HashMap::with_config_and_hasher(config, SipHashBuilder::default());
        let mut small = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            big.insert(i, i);
            small.insert(4 - i, 4 - i);
        }
        assert!(big == small);

        small.insert_or_assign(0, 100);
        assert!(big != small);
    }

    #[test]
    fn test_debug_format() {
        let mut map = identity_map();
        map.insert(2, "b");
        map.insert(1, "a");
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn test_collision_handling() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        for i in 0..1000 {
            map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 1000);

        for i in (0..1000).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }
        assert_eq!(map.len(), 500);

        for i in (1..1000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
        map.table.assert_invariants();
    }

    #[test]
    fn test_string_keys() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);
        map.insert("rust".to_string(), 3);

        assert_eq!(map.get(&"hello".to_string()), Some(&1));
        assert_eq!(map.get(&"rust".to_string()), Some(&3));
        assert_eq!(map.get(&"missing".to_string()), None);
    }

    #[test]
    fn test_hasher_accessor() {
        let builder = SipHashBuilder { k1: 1, k2: 2 };
        let map: HashMap<u8, u8, _> = HashMap::with_hasher(builder);

        let mut expected = SipHasher::new_with_keys(1, 2);
        expected.write_u8(7);
        let mut actual = map.hasher().build_hasher();
        actual.write_u8(7);
        assert_eq!(actual.finish(), expected.finish());
    }
}
