use core::fmt::Debug;

use crate::HashMap;

/// A read-only position in a [`HashMap`]'s slot array.
///
/// A cursor is either on an occupied slot or on the end sentinel, whose index
/// equals the map's capacity. Cursors are produced by [`HashMap::begin`],
/// [`HashMap::end`] and [`HashMap::find`]. Two cursors compare equal when they
/// point into the same map at the same slot.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use robin_map::HashMap;
///
/// let map = HashMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
///
/// let mut seen = 0;
/// let mut cursor = map.begin();
/// while cursor != map.end() {
///     assert!(cursor.key_value().is_some());
///     seen += 1;
///     cursor.move_next();
/// }
/// assert_eq!(seen, map.len());
/// # }
/// ```
pub struct Cursor<'a, K, V, S> {
    map: &'a HashMap<K, V, S>,
    index: usize,
}

impl<'a, K, V, S> Cursor<'a, K, V, S> {
    pub(crate) fn new(map: &'a HashMap<K, V, S>, index: usize) -> Self {
        Self { map, index }
    }

    /// Slot index this cursor points at. The end sentinel reports the map's
    /// capacity.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if this is the end sentinel.
    pub fn is_end(&self) -> bool {
        self.index >= self.map.table.capacity()
    }

    /// The entry under the cursor, or `None` at the end sentinel.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.map.table.get_at(self.index).map(|(k, v)| (k, v))
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, v)| v)
    }

    /// Advances to the next occupied slot, or to the end sentinel if there is
    /// none. Does nothing at the end sentinel.
    pub fn move_next(&mut self) {
        self.index = next_index(self.map, self.index);
    }

    /// Steps back to the previous occupied slot.
    ///
    /// Stepping back from the end sentinel lands on the last entry. Stepping
    /// back from the first entry is a logic error: debug builds panic, release
    /// builds leave the cursor on the end sentinel.
    pub fn move_prev(&mut self) {
        self.index = prev_index(self.map, self.index);
    }
}

impl<K, V, S> Clone for Cursor<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for Cursor<'_, K, V, S> {}

impl<K, V, S> PartialEq for Cursor<'_, K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.map, other.map) && self.index == other.index
    }
}

impl<K, V, S> Eq for Cursor<'_, K, V, S> {}

impl<K: Debug, V: Debug, S> Debug for Cursor<'_, K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("entry", &self.key_value())
            .finish()
    }
}

/// A position in a [`HashMap`] that allows modifying the value under it.
///
/// Produced by [`HashMap::begin_mut`], [`HashMap::end_mut`] and
/// [`HashMap::find_mut`]. Keys are only ever exposed by shared reference.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use robin_map::HashMap;
///
/// let mut map = HashMap::from([("a", 1), ("b", 2)]);
/// if let Some(value) = map.find_mut(&"a").value_mut() {
///     *value += 10;
/// }
/// assert_eq!(map.at(&"a"), Ok(&11));
/// # }
/// ```
pub struct CursorMut<'a, K, V, S> {
    map: &'a mut HashMap<K, V, S>,
    index: usize,
}

impl<'a, K, V, S> CursorMut<'a, K, V, S> {
    pub(crate) fn new(map: &'a mut HashMap<K, V, S>, index: usize) -> Self {
        Self { map, index }
    }

    /// Slot index this cursor points at.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if this is the end sentinel.
    pub fn is_end(&self) -> bool {
        self.index >= self.map.table.capacity()
    }

    /// The entry under the cursor.
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.map.table.get_at(self.index).map(|(k, v)| (k, v))
    }

    /// The entry under the cursor, with the value borrowed mutably.
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.map
            .table
            .get_at_mut(self.index)
            .map(|(k, v)| (&*k, v))
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&K> {
        self.key_value().map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&V> {
        self.key_value().map(|(_, v)| v)
    }

    /// The value under the cursor, borrowed mutably.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.key_value_mut().map(|(_, v)| v)
    }

    /// See [`Cursor::move_next`].
    pub fn move_next(&mut self) {
        self.index = next_index(&*self.map, self.index);
    }

    /// See [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.index = prev_index(&*self.map, self.index);
    }

    /// Reborrows as a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, K, V, S> {
        Cursor::new(&*self.map, self.index)
    }
}

impl<K: Debug, V: Debug, S> Debug for CursorMut<'_, K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index)
            .field("entry", &self.key_value())
            .finish()
    }
}

fn next_index<K, V, S>(map: &HashMap<K, V, S>, index: usize) -> usize {
    let capacity = map.table.capacity();
    if index >= capacity {
        return capacity;
    }
    map.table.first_occupied_from(index + 1)
}

fn prev_index<K, V, S>(map: &HashMap<K, V, S>, index: usize) -> usize {
    match map.table.last_occupied_before(index) {
        Some(prev) => prev,
        None => {
            debug_assert!(false, "cursor moved before the first entry");
            map.table.capacity()
        }
    }
}
