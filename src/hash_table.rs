//! The group-probed table itself.
//!
//! Slots are laid out in two parallel arrays: one control byte per slot (plus
//! a [`GROUP_SIZE`] tail of `EMPTY` padding so the last group can be loaded
//! in one piece) and one entry per slot. Both arrays are replaced together on
//! growth.

use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::control::EMPTY;
use crate::control::GROUP_SIZE;
use crate::control::Group;
use crate::control::h1;
use crate::control::h2;
use crate::error::Error;
use crate::hasher::DefaultKeyHasher;
use crate::hasher::KeyHasher;
use crate::probe::LinearProbe;
use crate::probe::ProbePolicy;
use crate::probe::ProbeSeq;

/// `true` once the table holds 7/8 of its slots, or has none.
#[inline(always)]
fn over_load_factor(size: usize, capacity: usize) -> bool {
    (size as u128) * 8 >= (capacity as u128) * 7
}

/// Smallest power-of-two multiple of `GROUP_SIZE`, no smaller than `current`,
/// that can take `items` entries without the last insert triggering growth.
fn capacity_for(items: usize, current: usize) -> Result<usize, Error> {
    let mut capacity = current.max(GROUP_SIZE);
    while (items as u128) * 8 > (capacity as u128) * 7 {
        capacity = capacity.checked_mul(2).ok_or(Error::CapacityOverflow)?;
    }
    Ok(capacity)
}

#[derive(Clone)]
struct Entry<K> {
    key: K,
    value: i64,
    hash: u64,
}

type Arrays<K> = (Vec<u8>, Vec<Option<Entry<K>>>);

/// Allocates the control and entry arrays for `capacity` slots.
///
/// Nothing is written to the table here, so a failure leaves the caller's
/// arrays untouched.
fn allocate<K>(capacity: usize) -> Result<Arrays<K>, Error> {
    let ctrl_len = capacity
        .checked_add(GROUP_SIZE)
        .ok_or(Error::CapacityOverflow)?;
    let ctrl_layout = Layout::array::<u8>(ctrl_len).map_err(|_| Error::CapacityOverflow)?;
    let entries_layout =
        Layout::array::<Option<Entry<K>>>(capacity).map_err(|_| Error::CapacityOverflow)?;

    let mut ctrl = Vec::new();
    ctrl.try_reserve_exact(ctrl_len).map_err(|_| Error::AllocError {
        layout: ctrl_layout,
    })?;
    ctrl.resize(ctrl_len, EMPTY);

    let mut entries = Vec::new();
    entries
        .try_reserve_exact(capacity)
        .map_err(|_| Error::AllocError {
            layout: entries_layout,
        })?;
    entries.resize_with(capacity, || None);

    Ok((ctrl, entries))
}

/// A swiss table mapping byte-string keys to `i64` values.
///
/// Keys may be any `K: AsRef<[u8]>`: owned (`Vec<u8>`, `String`,
/// `Box<[u8]>`) or borrowed (`&[u8]`, `&str`). Only the bytes take part in
/// hashing and equality.
///
/// The table starts without any allocation. The first insert allocates one
/// group of [`GROUP_SIZE`] slots, and the capacity doubles whenever an insert
/// finds the table at 7/8 load. Entries are never removed.
///
/// ## Performance Characteristics
///
/// - **Memory**: 1 control byte per slot plus the entry (key, value and the
///   full 64-bit hash, kept so growth never re-hashes keys).
/// - **Lookups**: one 16-byte SIMD compare per visited group; key bytes are
///   only compared for slots whose 7-bit tag matches.
///
/// ## Example
///
/// ```rust
/// use swiss_tbl::SwissTable;
///
/// let mut table = SwissTable::new();
/// table.insert("apple", 1);
/// table.insert("banana", 2);
/// assert_eq!(table.insert("apple", 3), Some(1));
///
/// assert_eq!(table.get("apple"), Some(3));
/// assert_eq!(table.get("banana"), Some(2));
/// assert_eq!(table.get("cherry"), None);
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Clone)]
pub struct SwissTable<K, S = DefaultKeyHasher, P = LinearProbe> {
    ctrl: Vec<u8>,
    entries: Vec<Option<Entry<K>>>,

    capacity: usize,
    size: usize,

    hasher: S,
    probe: P,
}

impl<K, S, P> Debug for SwissTable<K, S, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        if self.capacity == 0 {
            return f
                .debug_struct("SwissTable")
                .field("ctrl", &"unallocated")
                .field("size", &self.size)
                .field("capacity", &self.capacity)
                .finish();
        }

        f.debug_struct("SwissTable")
            .field(
                "ctrl",
                &self.ctrl[..self.capacity]
                    .chunks(GROUP_SIZE)
                    .map(|group| {
                        group
                            .iter()
                            .map(|&b| {
                                if b == EMPTY {
                                    "..".to_string()
                                } else {
                                    format!("{b:02x}")
                                }
                            })
                            .collect::<Vec<String>>()
                            .join(" ")
                    })
                    .collect::<Vec<_>>(),
            )
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<K, S, P> Default for SwissTable<K, S, P>
where
    S: Default,
    P: Default,
{
    fn default() -> Self {
        Self::with_hasher_and_probe(S::default(), P::default())
    }
}

impl<K> SwissTable<K> {
    /// Creates an empty table using the default hasher and linear probing.
    ///
    /// No memory is allocated until the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let table: SwissTable<Vec<u8>> = SwissTable::new();
    /// assert_eq!(table.capacity(), 0);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }
}

impl<K, S> SwissTable<K, S> {
    /// Creates an empty table that hashes keys with `hasher`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SipKeyHasher;
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let mut table = SwissTable::with_hasher(SipKeyHasher::with_seed(7));
    /// table.insert(b"key".to_vec(), 10);
    /// assert_eq!(table.get(b"key"), Some(10));
    /// ```
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_and_probe(hasher, LinearProbe)
    }

    /// Creates a table with room for at least `capacity` entries before it
    /// needs to grow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SipKeyHasher;
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let table: SwissTable<Vec<u8>, _> =
    ///     SwissTable::with_capacity_and_hasher(100, SipKeyHasher::default());
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let mut table = Self::with_hasher(hasher);
        table.reserve(capacity);
        table
    }
}

impl<K, S, P> SwissTable<K, S, P> {
    /// Creates an empty table with an explicit hasher and probe policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SipKeyHasher;
    /// # use swiss_tbl::SwissTable;
    /// # use swiss_tbl::TriangularProbe;
    /// #
    /// let mut table = SwissTable::with_hasher_and_probe(SipKeyHasher::default(), TriangularProbe);
    /// table.insert("k", 1);
    /// assert_eq!(table.get("k"), Some(1));
    /// ```
    pub fn with_hasher_and_probe(hasher: S, probe: P) -> Self {
        SwissTable {
            ctrl: Vec::new(),
            entries: Vec::new(),
            capacity: 0,
            size: 0,
            hasher,
            probe,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots.
    ///
    /// This is `0` for a table that has never been written to, and otherwise
    /// a power-of-two multiple of [`GROUP_SIZE`]. The table grows once
    /// `len() * 8 >= capacity() * 7` at the start of an insert.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of [`GROUP_SIZE`]-slot groups.
    pub fn num_groups(&self) -> usize {
        self.capacity / GROUP_SIZE
    }

    /// Returns the key hasher.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns an iterator over `(key bytes, value)` pairs in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let table: SwissTable<&str> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let mut pairs: Vec<_> = table.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(&b"a"[..], 1), (&b"b"[..], 2)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            entries: self.entries.iter(),
            remaining: self.size,
        }
    }

    /// Returns an iterator over the keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_
    where
        K: AsRef<[u8]>,
    {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in arbitrary order.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_
    where
        K: AsRef<[u8]>,
    {
        self.iter().map(|(_, value)| value)
    }

    #[inline(always)]
    fn home_group(&self, hash: u64) -> usize {
        debug_assert!(self.capacity.is_power_of_two());
        (h1(hash) & (self.capacity - 1)) / GROUP_SIZE
    }

    #[inline(always)]
    fn group(&self, group: usize) -> Group {
        Group::load(&self.ctrl[group * GROUP_SIZE..])
    }

    #[inline(always)]
    fn claim(&mut self, index: usize, tag: u8, entry: Entry<K>) {
        debug_assert_eq!(self.ctrl[index], EMPTY);
        debug_assert_eq!(tag, h2(entry.hash));
        self.ctrl[index] = tag;
        self.entries[index] = Some(entry);
        self.size += 1;
    }
}

impl<K, S, P> SwissTable<K, S, P>
where
    P: ProbePolicy,
{
    /// Reserves room for `additional` more entries, failing without touching
    /// the table if the storage cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::Error;
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let mut table: SwissTable<Vec<u8>> = SwissTable::new();
    /// table.try_reserve(20).unwrap();
    /// assert_eq!(table.capacity(), 32);
    ///
    /// assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    /// assert_eq!(table.capacity(), 32);
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .size
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if required == 0 {
            return Ok(());
        }

        let target = capacity_for(required, self.capacity)?;
        if target > self.capacity {
            self.resize(target)?;
        }
        Ok(())
    }

    /// Like [`try_reserve`](Self::try_reserve), but aborts through the global
    /// allocation error handler on failure.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            err.escalate();
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) -> Result<(), Error> {
        let new_capacity = if self.capacity == 0 {
            GROUP_SIZE
        } else {
            self.capacity
                .checked_mul(2)
                .ok_or(Error::CapacityOverflow)?
        };
        self.resize(new_capacity)
    }

    /// Moves every entry into freshly allocated arrays of `new_capacity`
    /// slots, placing each one by its stored hash.
    fn resize(&mut self, new_capacity: usize) -> Result<(), Error> {
        debug_assert!(new_capacity.is_power_of_two() && new_capacity % GROUP_SIZE == 0);
        debug_assert!(new_capacity > self.capacity);

        let (ctrl, entries) = allocate::<K>(new_capacity).inspect_err(|err| {
            tracing::warn!(
                target: "swiss_tbl::resize",
                old_capacity = self.capacity,
                new_capacity,
                %err,
                "hash table growth failed"
            );
        })?;

        let old_ctrl = core::mem::replace(&mut self.ctrl, ctrl);
        let mut old_entries = core::mem::replace(&mut self.entries, entries);
        let old_capacity = core::mem::replace(&mut self.capacity, new_capacity);
        let expected = core::mem::replace(&mut self.size, 0);

        for base in (0..old_capacity).step_by(GROUP_SIZE) {
            for offset in Group::load(&old_ctrl[base..]).match_full() {
                if let Some(entry) = old_entries[base + offset].take() {
                    self.place(entry);
                }
            }
        }
        debug_assert_eq!(self.size, expected);

        tracing::debug!(
            target: "swiss_tbl::resize",
            old_capacity,
            new_capacity,
            migrated = self.size,
            "grew hash table"
        );
        Ok(())
    }

    /// Puts an entry known to be absent into the first empty slot along its
    /// probe sequence.
    fn place(&mut self, entry: Entry<K>) {
        let tag = h2(entry.hash);
        let num_groups = self.num_groups();
        let mut probe = ProbeSeq::new(self.home_group(entry.hash));
        loop {
            if let Some(offset) = self.group(probe.group).match_empty().lowest_set_bit() {
                self.claim(probe.group * GROUP_SIZE + offset, tag, entry);
                return;
            }
            probe.move_next(&self.probe, num_groups);
        }
    }
}

impl<K, S, P> SwissTable<K, S, P>
where
    K: AsRef<[u8]>,
    S: KeyHasher,
    P: ProbePolicy,
{
    /// Inserts `key` with `value`, returning the previous value if the key
    /// was already present.
    ///
    /// Growth happens before the slot is searched, and only when the table is
    /// at 7/8 load or unallocated. If growth fails the table is unchanged and
    /// the error is returned. Overwriting keeps the stored key and only
    /// replaces the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let mut table = SwissTable::new();
    /// assert_eq!(table.try_insert(b"k".to_vec(), 1), Ok(None));
    /// assert_eq!(table.try_insert(b"k".to_vec(), 2), Ok(Some(1)));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn try_insert(&mut self, key: K, value: i64) -> Result<Option<i64>, Error> {
        if over_load_factor(self.size, self.capacity) {
            self.grow()?;
        }

        let hash = self.hasher.hash_bytes(key.as_ref());
        let tag = h2(hash);
        let num_groups = self.num_groups();
        let mut probe = ProbeSeq::new(self.home_group(hash));

        // Terminates: growth keeps at least one slot in the table EMPTY.
        loop {
            let base = probe.group * GROUP_SIZE;
            let group = self.group(probe.group);

            for offset in group.match_byte(tag) {
                if let Some(entry) = &mut self.entries[base + offset]
                    && entry.key.as_ref() == key.as_ref()
                {
                    entry.hash = hash;
                    return Ok(Some(core::mem::replace(&mut entry.value, value)));
                }
            }

            if let Some(offset) = group.match_empty().lowest_set_bit() {
                self.claim(base + offset, tag, Entry { key, value, hash });
                return Ok(None);
            }

            probe.move_next(&self.probe, num_groups);
        }
    }

    /// Like [`try_insert`](Self::try_insert), but aborts through the global
    /// allocation error handler if the table cannot grow.
    pub fn insert(&mut self, key: K, value: i64) -> Option<i64> {
        self.try_insert(key, value)
            .unwrap_or_else(|err| err.escalate())
    }

    /// Looks up the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let mut table = SwissTable::new();
    /// table.insert("apple", 1);
    /// assert_eq!(table.get("apple"), Some(1));
    /// assert_eq!(table.get(b"apple"), Some(1));
    /// assert_eq!(table.get("pear"), None);
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<i64>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.find_index(key.as_ref())?;
        self.entries[index].as_ref().map(|entry| entry.value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let mut table = SwissTable::new();
    /// table.insert("hits", 1);
    /// if let Some(hits) = table.get_mut("hits") {
    ///     *hits += 1;
    /// }
    /// assert_eq!(table.get("hits"), Some(2));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut i64>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.find_index(key.as_ref())?;
        self.entries[index].as_mut().map(|entry| &mut entry.value)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.find_index(key.as_ref()).is_some()
    }

    /// Slot index holding `key`.
    ///
    /// The search stops at the first group that still has an `EMPTY` slot:
    /// inserts fill groups along a probe sequence in order and nothing is
    /// ever removed, so the key cannot live further along.
    #[inline]
    fn find_index(&self, key: &[u8]) -> Option<usize> {
        if self.size == 0 {
            return None;
        }

        let hash = self.hasher.hash_bytes(key);
        let tag = h2(hash);
        let num_groups = self.num_groups();
        let mut probe = ProbeSeq::new(self.home_group(hash));

        loop {
            let base = probe.group * GROUP_SIZE;
            let group = self.group(probe.group);

            for offset in group.match_byte(tag) {
                if let Some(entry) = &self.entries[base + offset]
                    && entry.key.as_ref() == key
                {
                    return Some(base + offset);
                }
            }

            if group.match_empty().any_bit_set() {
                return None;
            }

            probe.move_next(&self.probe, num_groups);
        }
    }

    /// Inserts every entry of `src` into this table, `src`'s values winning
    /// on shared keys.
    ///
    /// `src` is not modified and may use a different hasher or probe policy;
    /// keys are re-hashed with this table's hasher. If an insert fails to
    /// grow the table, the entries merged so far stay and the error is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use swiss_tbl::SwissTable;
    /// #
    /// let mut dest: SwissTable<&str> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let src: SwissTable<&str> = [("b", 20), ("c", 30)].into_iter().collect();
    ///
    /// dest.try_merge(&src).unwrap();
    /// assert_eq!(dest.len(), 3);
    /// assert_eq!(dest.get("b"), Some(20));
    /// assert_eq!(src.len(), 2);
    /// ```
    pub fn try_merge<S2, P2>(&mut self, src: &SwissTable<K, S2, P2>) -> Result<(), Error>
    where
        K: Clone,
    {
        for entry in src.entries.iter().flatten() {
            self.try_insert(entry.key.clone(), entry.value)?;
        }
        Ok(())
    }

    /// Like [`try_merge`](Self::try_merge), but aborts through the global
    /// allocation error handler if the table cannot grow.
    pub fn merge<S2, P2>(&mut self, src: &SwissTable<K, S2, P2>)
    where
        K: Clone,
    {
        if let Err(err) = self.try_merge(src) {
            err.escalate();
        }
    }
}

impl<K, S, P> Extend<(K, i64)> for SwissTable<K, S, P>
where
    K: AsRef<[u8]>,
    S: KeyHasher,
    P: ProbePolicy,
{
    fn extend<I: IntoIterator<Item = (K, i64)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, S, P> FromIterator<(K, i64)> for SwissTable<K, S, P>
where
    K: AsRef<[u8]>,
    S: KeyHasher + Default,
    P: ProbePolicy + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<'a, K, S, P> IntoIterator for &'a SwissTable<K, S, P>
where
    K: AsRef<[u8]>,
{
    type Item = (&'a [u8], i64);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// An iterator over the entries of a [`SwissTable`].
///
/// This struct is created by [`SwissTable::iter`].
pub struct Iter<'a, K> {
    entries: core::slice::Iter<'a, Option<Entry<K>>>,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K>
where
    K: AsRef<[u8]>,
{
    type Item = (&'a [u8], i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.entries.by_ref() {
            if let Some(entry) = slot {
                self.remaining -= 1;
                return Some((entry.key.as_ref(), entry.value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> where K: AsRef<[u8]> {}

impl<K> FusedIterator for Iter<'_, K> where K: AsRef<[u8]> {}

/// Distribution of entries by how far they sit from their home group.
///
/// `counts()[n]` is the number of entries found `n` steps along their probe
/// sequence; `0` means the entry is in its home group.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Entry counts indexed by displacement in groups.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest displacement of any entry, or `None` for an empty table.
    pub fn max_displacement(&self) -> Option<usize> {
        self.counts.iter().rposition(|&count| count != 0)
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> String {
            if count == 0 {
                return String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (displacement, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", displacement, make_bar(count), count);
        }
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the table
    pub populated: usize,
    /// Number of slots
    pub capacity: usize,
    /// Number of groups
    pub groups: usize,
    /// Groups with no empty slot left
    pub full_groups: usize,
    /// Entries at which the next insert grows the table
    pub grow_at: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Bytes held by the control and entry arrays
    pub total_bytes: usize,
    /// Bytes held by empty entry slots and control padding
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor, grows at {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.grow_at
        );
        println!("Groups: {} ({} full)", self.groups, self.full_groups);
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

#[cfg(any(test, feature = "stats"))]
impl<K, S, P> SwissTable<K, S, P>
where
    P: ProbePolicy,
{
    /// Computes how far each entry sits from its home group, walking the
    /// table's probe sequence.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = Vec::new();
        let num_groups = self.num_groups();

        for (index, slot) in self.entries.iter().enumerate() {
            let Some(entry) = slot else {
                continue;
            };

            let target = index / GROUP_SIZE;
            let mut probe = ProbeSeq::new(self.home_group(entry.hash));
            while probe.group != target {
                probe.move_next(&self.probe, num_groups);
            }

            let displacement = probe.step();
            if counts.len() <= displacement {
                counts.resize(displacement + 1, 0);
            }
            counts[displacement] += 1;
        }

        ProbeHistogram { counts }
    }

    /// Returns detailed utilization statistics for debugging.
    pub fn debug_stats(&self) -> DebugStats {
        let full_groups = (0..self.num_groups())
            .filter(|&group| !self.group(group).match_empty().any_bit_set())
            .count();
        let entry_size = core::mem::size_of::<Option<Entry<K>>>();

        DebugStats {
            populated: self.size,
            capacity: self.capacity,
            groups: self.num_groups(),
            full_groups,
            grow_at: self.capacity * 7 / 8,
            load_factor: if self.capacity == 0 {
                0.0
            } else {
                self.size as f64 / self.capacity as f64
            },
            total_bytes: self.ctrl.len() + self.entries.len() * entry_size,
            wasted_bytes: (self.capacity - self.size) * (entry_size + 1)
                + self.ctrl.len().saturating_sub(self.capacity),
        }
    }
}
