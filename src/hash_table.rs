//! The raw Robin Hood table underneath [`HashMap`](crate::HashMap).
//!
//! [`HashTable<V>`] stores arbitrary values together with their 64-bit hash.
//! It never hashes anything itself: callers hand it a hash and an equality
//! predicate for every keyed operation, which keeps the table independent of
//! any particular key type or hasher.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::config::TableConfig;

/// Forward distance from the ideal slot of `hash` to `index`, wrapping around
/// the end of a table with `capacity` slots.
#[inline(always)]
fn probe_distance(hash: u64, index: usize, capacity: usize) -> usize {
    let ideal = ideal_index(hash, capacity);
    (index + capacity - ideal) % capacity
}

#[inline(always)]
fn ideal_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

fn empty_slots<V>(capacity: usize) -> Vec<Option<Slot<V>>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}

#[derive(Clone)]
struct Slot<V> {
    hash: u64,
    value: V,
}

/// Probe-length statistics for a table.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Number of slots
    pub capacity: usize,
    /// Entry count at which the next insert grows the table
    pub max_len: usize,
    /// Longest distance between an entry and its ideal slot
    pub max_probe_distance: usize,
    /// Average distance between an entry and its ideal slot
    pub mean_probe_distance: f64,
    /// populated / capacity
    pub load_factor: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Robin Hood Table Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load, grows past {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.max_len
        );
        println!(
            "Probe distance: max {}, mean {:.3}",
            self.max_probe_distance, self.mean_probe_distance
        );
    }
}

/// An open-addressing hash table using Robin Hood displacement.
///
/// Every entry lives in one slot of a contiguous array. An entry's ideal slot
/// is `hash % capacity`; collisions are resolved by linear probing, and an
/// inserting entry takes the slot of any resident that is closer to its own
/// ideal slot than the inserting entry is to its ideal slot. Removal slides
/// the following entries of the same run back by one slot, so the table never
/// holds tombstones.
///
/// The table doubles its slot count whenever an insert leaves more than
/// `floor(capacity * max_load_factor)` entries, rehashing every entry from
/// scratch. It never shrinks, except through [`clear`](Self::clear) and
/// [`drain`](Self::drain), which return it to the configured starting
/// capacity.
///
/// ## Example
///
/// ```rust
/// use robin_map::HashTable;
///
/// let mut table: HashTable<(u32, &str)> = HashTable::new();
///
/// // Hashes are supplied by the caller; any u64 will do.
/// table.insert_unique(7, (7, "seven"));
/// table.insert_unique(11, (11, "eleven"));
///
/// assert_eq!(table.find(7, |&(k, _)| k == 7), Some(&(7, "seven")));
/// assert_eq!(table.find(3, |&(k, _)| k == 3), None);
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Option<Slot<V>>>,
    populated: usize,
    config: TableConfig,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        let capacity = self.capacity();
        let distances = self
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(slot) => format!("{:02}", probe_distance(slot.hash, index, capacity)),
                None => String::from(".."),
            })
            .collect::<Vec<_>>()
            .join(" ");

        f.debug_struct("HashTable")
            .field("distances", &distances)
            .field("populated", &self.populated)
            .field("capacity", &capacity)
            .field("config", &self.config)
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with the default configuration (4 slots, 0.42
    /// maximum load factor).
    pub fn new() -> Self {
        Self::with_config(TableConfig::DEFAULT)
    }

    /// Creates an empty table that starts at `config.initial_capacity()` slots
    /// and grows according to `config.max_load_factor()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::HashTable;
    /// # use robin_map::TableConfig;
    /// #
    /// let config = TableConfig::new(32, 0.75).unwrap();
    /// let table: HashTable<u64> = HashTable::with_config(config);
    /// assert_eq!(table.capacity(), 32);
    /// ```
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            slots: empty_slots(config.initial_capacity()),
            populated: 0,
            config,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the sizing parameters this table was created with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Drops every entry and returns the table to its configured starting
    /// capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in 0..100u64 {
    ///     table.insert_unique(n, n);
    /// }
    /// assert!(table.capacity() > 4);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 4);
    /// ```
    pub fn clear(&mut self) {
        log::trace!(
            "clearing {} entries, resetting capacity {} -> {}",
            self.populated,
            self.capacity(),
            self.config.initial_capacity()
        );
        self.slots = empty_slots(self.config.initial_capacity());
        self.populated = 0;
    }

    /// Returns the slot index of the entry matching `hash` and `eq`.
    ///
    /// Probing starts at the ideal slot of `hash` and walks forward until it
    /// finds a match or an empty slot.
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let capacity = self.capacity();
        let mut index = ideal_index(hash, capacity);
        while let Some(slot) = &self.slots[index] {
            if slot.hash == hash && eq(&slot.value) {
                return Some(index);
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// Returns a reference to the entry matching `hash` and `eq`.
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find_index(hash, eq).and_then(|index| self.get_at(index))
    }

    /// Returns a mutable reference to the entry matching `hash` and `eq`.
    ///
    /// The caller must not change the parts of the value that `hash` was
    /// derived from.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        self.get_at_mut(index)
    }

    /// Returns the entry stored in slot `index`, or `None` if that slot is
    /// empty or out of range.
    pub fn get_at(&self, index: usize) -> Option<&V> {
        self.slots.get(index)?.as_ref().map(|slot| &slot.value)
    }

    /// Mutable form of [`get_at`](Self::get_at).
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.slots.get_mut(index)?.as_mut().map(|slot| &mut slot.value)
    }

    /// Value in a slot the caller knows to be occupied.
    pub(crate) fn occupied_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Some(slot) => &mut slot.value,
            None => unreachable!("slot {index} expected to be occupied"),
        }
    }

    /// Index of the first occupied slot at or after `from`, or
    /// [`capacity`](Self::capacity) if there is none.
    pub fn first_occupied_from(&self, from: usize) -> usize {
        let capacity = self.capacity();
        (from.min(capacity)..capacity)
            .find(|&index| self.slots[index].is_some())
            .unwrap_or(capacity)
    }

    /// Index of the last occupied slot strictly before `before`.
    pub fn last_occupied_before(&self, before: usize) -> Option<usize> {
        (0..before.min(self.capacity()))
            .rev()
            .find(|&index| self.slots[index].is_some())
    }

    /// Inserts `value` without checking whether an equal entry is present.
    ///
    /// Returns the slot index `value` occupies once the call returns, taking
    /// any growth triggered by this insert into account. Inserting an entry
    /// that is equal to an existing one leaves both in the table, so callers
    /// that need uniqueness must look the value up first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// let index = table.insert_unique(42, "answer");
    /// assert_eq!(table.get_at(index), Some(&"answer"));
    /// ```
    pub fn insert_unique(&mut self, hash: u64, value: V) -> usize {
        let index = self.place(hash, value, &mut None);
        self.populated += 1;

        if self.populated > self.config.max_len_for(self.capacity()) {
            return self.grow(index);
        }
        index
    }

    /// Removes and returns the entry matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_map::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(9, 9u8);
    ///
    /// assert_eq!(table.remove(9, |&v| v == 9), Some(9));
    /// assert_eq!(table.remove(9, |&v| v == 9), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        self.remove_at(index)
    }

    /// Removes the entry in slot `index` and repairs the run behind it.
    ///
    /// Every following entry that is not in its ideal slot moves back by one
    /// slot, stopping at the first empty slot or the first entry already at
    /// distance zero.
    pub fn remove_at(&mut self, index: usize) -> Option<V> {
        let removed = self.slots.get_mut(index)?.take()?;
        self.populated -= 1;

        let capacity = self.capacity();
        let mut hole = index;
        loop {
            let next = (hole + 1) % capacity;
            let displaced = match &self.slots[next] {
                Some(slot) => probe_distance(slot.hash, next, capacity) > 0,
                None => false,
            };
            if !displaced {
                break;
            }
            self.slots[hole] = self.slots[next].take();
            hole = next;
        }

        Some(removed.value)
    }

    /// Returns an iterator over the entries in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to the entries in slot
    /// order.
    ///
    /// The caller must not change the parts of a value its hash was derived
    /// from.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Removes every entry, yielding them in slot order.
    ///
    /// Like [`clear`](Self::clear), the table returns to its starting
    /// capacity. Entries not consumed by the iterator are dropped with it.
    pub fn drain(&mut self) -> Drain<'_, V> {
        let slots = core::mem::replace(
            &mut self.slots,
            empty_slots(self.config.initial_capacity()),
        );
        let remaining = core::mem::take(&mut self.populated);
        Drain {
            inner: IntoIter {
                slots: slots.into_iter(),
                remaining,
            },
            _table: PhantomData,
        }
    }

    /// Robin Hood placement of a value known to be absent.
    ///
    /// Returns the slot the incoming value came to rest in. If `watched` names
    /// an occupied slot and the entry there is pushed along by this placement,
    /// `watched` is updated to the entry's new slot.
    ///
    /// Requires at least one empty slot.
    fn place(&mut self, hash: u64, value: V, watched: &mut Option<usize>) -> usize {
        let capacity = self.capacity();
        let mut candidate = Slot { hash, value };
        let mut index = ideal_index(hash, capacity);
        let mut landed = None;
        let mut carrying_watched = false;

        loop {
            let slot = &mut self.slots[index];
            match slot {
                None => {
                    *slot = Some(candidate);
                    if carrying_watched {
                        *watched = Some(index);
                    }
                    return landed.unwrap_or(index);
                }
                Some(resident) => {
                    let incoming = probe_distance(candidate.hash, index, capacity);
                    let settled = probe_distance(resident.hash, index, capacity);
                    if incoming > settled {
                        core::mem::swap(resident, &mut candidate);
                        if landed.is_none() {
                            landed = Some(index);
                        }

                        let evicted_watched = !carrying_watched && *watched == Some(index);
                        if carrying_watched {
                            *watched = Some(index);
                        }
                        carrying_watched = evicted_watched;
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    /// Rehashes every entry into a larger slot array and returns the new slot
    /// of the entry that was in slot `tracked`.
    fn grow(&mut self, tracked: usize) -> usize {
        let old_capacity = self.capacity();
        let new_capacity = self.config.grown_capacity(old_capacity, self.populated);
        log::debug!(
            "growing table from {old_capacity} to {new_capacity} slots for {} entries",
            self.populated
        );

        let old_slots = core::mem::replace(&mut self.slots, empty_slots(new_capacity));
        let mut watched = None;
        for (old_index, slot) in old_slots.into_iter().enumerate() {
            let Some(Slot { hash, value }) = slot else {
                continue;
            };
            let landed = self.place(hash, value, &mut watched);
            if old_index == tracked {
                watched = Some(landed);
            }
        }

        match watched {
            Some(index) => index,
            None => unreachable!("tracked slot {tracked} was empty before growth"),
        }
    }

    /// Counts entries by their distance from their ideal slot.
    ///
    /// Index `d` of the result holds the number of entries `d` slots away from
    /// their ideal slot. The vector is as long as the largest distance plus
    /// one, and empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let capacity = self.capacity();
        let mut hist = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                let distance = probe_distance(slot.hash, index, capacity);
                if distance >= hist.len() {
                    hist.resize(distance + 1, 0);
                }
                hist[distance] += 1;
            }
        }
        hist
    }

    /// Returns probe-length and utilization statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let total_distance: usize = hist
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            max_len: self.config.max_len_for(self.capacity()),
            max_probe_distance: hist.len().saturating_sub(1),
            mean_probe_distance: if self.populated == 0 {
                0.0
            } else {
                total_distance as f64 / self.populated as f64
            },
            load_factor: self.populated as f64 / self.capacity() as f64,
        }
    }

    /// Prints the probe-distance histogram as a horizontal bar chart.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];
        const MAX_BAR: usize = 60;

        let hist = self.probe_histogram();
        let Some(&max) = hist.iter().max() else {
            println!("probe histogram: empty");
            return;
        };

        println!("probe histogram ({} entries):", self.populated);
        for (distance, &count) in hist.iter().enumerate() {
            let units = (count * MAX_BAR * 8).div_ceil(max);
            let mut bar = "█".repeat(units / 8);
            if units % 8 > 0 {
                bar.push(EIGHTHS[units % 8]);
            }
            println!("{distance:>3} | {bar} ({count})");
        }
    }

    /// Checks the structural invariants of the table.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.capacity();
        let mut occupied = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else {
                continue;
            };
            occupied += 1;

            let distance = probe_distance(slot.hash, index, capacity);
            let ideal = ideal_index(slot.hash, capacity);
            for step in 0..distance {
                assert!(
                    self.slots[(ideal + step) % capacity].is_some(),
                    "gap between ideal slot {ideal} and slot {index}: {self:?}"
                );
            }

            let prev = (index + capacity - 1) % capacity;
            match &self.slots[prev] {
                None => assert_eq!(distance, 0, "run starts off-home at {index}: {self:?}"),
                Some(before) => assert!(
                    distance <= probe_distance(before.hash, prev, capacity) + 1,
                    "robin hood order broken at slot {index}: {self:?}"
                ),
            }
        }

        assert_eq!(occupied, self.populated);
        assert!(self.populated <= self.config.max_len_for(capacity));
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots.into_iter(),
            remaining: self.populated,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`HashTable`], in slot order.
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Option<Slot<V>>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some(&slot.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some(&slot.value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over the entries of a [`HashTable`], in slot order.
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Option<Slot<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some(&mut slot.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some(&mut slot.value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// An owning iterator over the entries of a [`HashTable`], in slot order.
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Option<Slot<V>>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some(slot.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some(slot.value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

/// A draining iterator over the entries of a [`HashTable`].
///
/// This struct is created by [`HashTable::drain`]. The table is already empty
/// by the time the iterator is handed out.
pub struct Drain<'a, V> {
    inner: IntoIter<V>,
    _table: PhantomData<&'a mut HashTable<V>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
