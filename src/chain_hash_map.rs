//! ChainHashMap: fixed-array, separate-chaining table from string keys to elements.

use crate::config::{GrowthPolicy, TableConfig, MIN_CAPACITY};
use crate::error::{Result, TableError};
use crate::hashing::{bucket_index, BuildPolyHasher};
use crate::key_cursor::{KeyCursor, Keys};
use crate::seq_list::SeqList;
use core::fmt;
use core::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback that receives each element as its entry leaves the table.
pub type Destructor<V> = Box<dyn FnMut(V)>;

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a table, checked by cursors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct TableId(u64);

impl TableId {
    fn fresh() -> Self {
        TableId(NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: String,
    pub(crate) element: V,
    hash: u64,
}

pub(crate) type Bucket<V> = Option<SeqList<Entry<V>>>;

/// Separate-chaining table from owned string keys to elements of type `V`.
pub struct ChainHashMap<V, S = BuildPolyHasher> {
    buckets: Vec<Bucket<V>>,
    len: usize,
    generation: u64,
    id: TableId,
    growth: GrowthPolicy,
    hasher: S,
    destructor: Option<Destructor<V>>,
}

fn empty_buckets<V>(capacity: usize) -> Result<Vec<Bucket<V>>> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(TableError::allocation("bucket array"))?;
    buckets.resize_with(capacity, || None);
    Ok(buckets)
}

// Takes the destructor field alone so callers can keep a bucket borrowed.
fn release<V>(destructor: &mut Option<Destructor<V>>, entry: Entry<V>) {
    if let Some(d) = destructor.as_mut() {
        d(entry.element);
    }
}

impl<V> ChainHashMap<V> {
    /// Table with `max(3, capacity)` buckets, no destructor and fixed capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::from_config(TableConfig::new(capacity), None)
    }

    /// Table whose removed, overwritten and remaining elements are passed to `destructor`.
    pub fn with_destructor<F>(capacity: usize, destructor: F) -> Result<Self>
    where
        F: FnMut(V) + 'static,
    {
        Self::from_config(TableConfig::new(capacity), Some(Box::new(destructor)))
    }

    /// Table built from `config` with the default FNV-1a hasher.
    pub fn from_config(config: TableConfig, destructor: Option<Destructor<V>>) -> Result<Self> {
        Self::with_config_and_hasher(config, BuildPolyHasher::default(), destructor)
    }
}

impl<V> Default for ChainHashMap<V> {
    /// Table from `TableConfig::default()` without a destructor.
    ///
    /// Panics if the bucket array cannot be allocated, like `Vec::with_capacity`.
    fn default() -> Self {
        Self::from_config(TableConfig::default(), None)
            .unwrap_or_else(|err| panic!("default table: {err}"))
    }
}

impl<V, S> ChainHashMap<V, S> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    pub(crate) fn id(&self) -> TableId {
        self.id
    }

    /// Bumped by every insert, overwrite, removal and rehash.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn buckets(&self) -> &[Bucket<V>] {
        &self.buckets
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Visit every stored key in bucket order, then chain order.
    ///
    /// Stops as soon as `visit` returns `true`. Returns how many times
    /// `visit` was called.
    pub fn for_each_key<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&Self, &str) -> bool,
    {
        let mut visited = 0;
        for chain in self.buckets.iter().flatten() {
            for entry in chain {
                visited += 1;
                if visit(self, &entry.key) {
                    return visited;
                }
            }
        }
        visited
    }

    /// Detached cursor over the keys; see `KeyCursor`.
    pub fn cursor(&self) -> KeyCursor {
        KeyCursor::new(self)
    }

    /// Borrowing iterator over the keys.
    pub fn keys(&self) -> Keys<'_, V, S> {
        Keys::new(self)
    }
}

impl<V, S> ChainHashMap<V, S>
where
    S: BuildHasher,
{
    /// Table built from `config`, hashing keys with `hasher`.
    pub fn with_config_and_hasher(
        config: TableConfig,
        hasher: S,
        destructor: Option<Destructor<V>>,
    ) -> Result<Self> {
        config.validate()?;
        let capacity = config.effective_capacity();
        if capacity != config.capacity() {
            log::debug!(
                "requested capacity {} raised to minimum {}",
                config.capacity(),
                capacity
            );
        }
        let buckets = empty_buckets(capacity)?;
        let id = TableId::fresh();
        log::debug!(
            "created table {:?}: capacity={} growth={:?} destructor={}",
            id,
            capacity,
            config.growth(),
            destructor.is_some()
        );
        Ok(Self {
            buckets,
            len: 0,
            generation: 0,
            id,
            growth: config.growth(),
            hasher,
            destructor,
        })
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    fn chain(&self, key: &str) -> Option<&SeqList<Entry<V>>> {
        let b = bucket_index(self.make_hash(key), self.capacity());
        self.buckets.get(b)?.as_ref()
    }

    fn find(&self, key: &str) -> Option<&Entry<V>> {
        self.chain(key)?.iter().find(|e| e.key == key)
    }

    /// Store `element` under a copy of `key`.
    ///
    /// An existing entry for `key` is released first (its element goes to
    /// the destructor) and the new entry is appended to the chain. On error
    /// the table is unchanged and `element` is dropped.
    pub fn insert(&mut self, key: &str, element: V) -> Result<()> {
        let hash = self.make_hash(key);
        let mut owned = String::new();
        owned
            .try_reserve_exact(key.len())
            .map_err(TableError::allocation("key copy"))?;
        owned.push_str(key);

        let b = bucket_index(hash, self.capacity());
        let chain = self.buckets[b].get_or_insert_with(SeqList::new);
        if let Some(old) = chain.remove_first(|e| e.key == key) {
            log::trace!("overwriting entry for key {:?} in bucket {}", key, b);
            self.len -= 1;
            release(&mut self.destructor, old);
        }
        chain.push_back(Entry {
            key: owned,
            element,
            hash,
        });
        self.len += 1;
        self.bump_generation();
        self.grow_if_needed();
        Ok(())
    }

    /// Remove the entry for `key`, passing its element to the destructor.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let b = bucket_index(self.make_hash(key), self.capacity());
        let chain = match self.buckets[b].as_mut() {
            Some(chain) if !chain.is_empty() => chain,
            _ => return Err(TableError::not_found(key)),
        };
        let entry = chain
            .remove_first(|e| e.key == key)
            .ok_or_else(|| TableError::not_found(key))?;
        self.len -= 1;
        self.bump_generation();
        release(&mut self.destructor, entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|e| &e.element)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Move every entry into a new array of `max(3, new_capacity)` buckets.
    ///
    /// Entries keep their relative order within a chain. No element is
    /// passed to the destructor. Invalidates outstanding cursors.
    pub fn rehash(&mut self, new_capacity: usize) -> Result<()> {
        let new_capacity = new_capacity.max(MIN_CAPACITY);
        let mut fresh = empty_buckets(new_capacity)?;
        let old_capacity = self.capacity();
        for chain in self.buckets.drain(..).flatten() {
            for entry in chain {
                let b = bucket_index(entry.hash, new_capacity);
                fresh[b].get_or_insert_with(SeqList::new).push_back(entry);
            }
        }
        self.buckets = fresh;
        self.bump_generation();
        log::debug!(
            "rehashed table {:?}: {} -> {} buckets, {} entries",
            self.id,
            old_capacity,
            new_capacity,
            self.len
        );
        Ok(())
    }

    fn grow_if_needed(&mut self) {
        let GrowthPolicy::MaxLoadFactor(max) = self.growth else {
            return;
        };
        if self.load_factor() <= max {
            return;
        }
        let target = self.capacity().saturating_mul(2);
        if let Err(err) = self.rehash(target) {
            log::warn!(
                "table {:?} keeps {} buckets: {}",
                self.id,
                self.capacity(),
                err
            );
        }
    }
}

impl<V, S> Drop for ChainHashMap<V, S> {
    fn drop(&mut self) {
        let released = self.len;
        for chain in self.buckets.drain(..).flatten() {
            for entry in chain {
                release(&mut self.destructor, entry);
            }
        }
        log::trace!("table {:?} dropped, released {} entries", self.id, released);
    }
}

impl<V, S> fmt::Debug for ChainHashMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainHashMap")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("generation", &self.generation)
            .field("growth", &self.growth)
            .field("destructor", &self.destructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    fn logged_table(cap: usize) -> (ChainHashMap<i32>, Rc<RefCell<Vec<i32>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let t = ChainHashMap::with_destructor(cap, move |v| sink.borrow_mut().push(v)).unwrap();
        (t, log)
    }

    /// Invariant: a duplicate key overwrites, releasing the old element once.
    #[test]
    fn duplicate_insert_overwrites() {
        let (mut t, log) = logged_table(3);
        t.insert("k", 1).unwrap();
        t.insert("k", 2).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("k"), Some(&2));
        assert_eq!(*log.borrow(), vec![1]);
    }

    /// Invariant: `len` equals the sum of chain lengths.
    #[test]
    fn len_matches_chain_lengths() {
        let mut t: ChainHashMap<usize> = ChainHashMap::with_capacity(3).unwrap();
        for i in 0..40 {
            t.insert(&format!("k{i}"), i).unwrap();
        }
        for i in (0..40).step_by(3) {
            t.remove(&format!("k{i}")).unwrap();
        }
        let chained: usize = t.buckets().iter().flatten().map(|c| c.len()).sum();
        assert_eq!(chained, t.len());
    }

    /// Invariant: every entry sits in the bucket its stored hash selects.
    #[test]
    fn entries_live_in_their_bucket() {
        let mut t: ChainHashMap<()> = ChainHashMap::with_capacity(5).unwrap();
        for i in 0..30 {
            t.insert(&format!("key{i}"), ()).unwrap();
        }
        t.rehash(11).unwrap();
        for (b, chain) in t.buckets().iter().enumerate() {
            for e in chain.iter().flatten() {
                assert_eq!(bucket_index(e.hash, t.capacity()), b);
                assert_eq!(e.hash, t.make_hash(&e.key));
            }
        }
    }

    /// Invariant: buckets are created lazily on first insert.
    #[test]
    fn buckets_created_lazily() {
        let mut t: ChainHashMap<i32> = ChainHashMap::with_capacity(7).unwrap();
        assert!(t.buckets().iter().all(Option::is_none));
        t.insert("only", 1).unwrap();
        assert_eq!(t.buckets().iter().filter(|b| b.is_some()).count(), 1);
    }

    /// Invariant: emptied chains report NotFound on removal.
    #[test]
    fn remove_from_emptied_bucket() {
        let mut t: ChainHashMap<i32> = ChainHashMap::with_capacity(3).unwrap();
        t.insert("x", 1).unwrap();
        t.remove("x").unwrap();
        assert_eq!(t.remove("x"), Err(TableError::not_found("x")));
        assert_eq!(t.len(), 0);
    }

    /// Invariant: mutations bump the generation, reads do not.
    #[test]
    fn generation_tracks_structural_changes() {
        let mut t: ChainHashMap<i32> = ChainHashMap::with_capacity(3).unwrap();
        let g0 = t.generation();
        t.insert("a", 1).unwrap();
        let g1 = t.generation();
        assert!(g1 != g0);
        let _ = t.get("a");
        let _ = t.contains("a");
        t.for_each_key(|_, _| false);
        assert_eq!(t.generation(), g1);
        assert!(t.remove("zz").is_err());
        assert_eq!(t.generation(), g1);
        t.remove("a").unwrap();
        assert!(t.generation() != g1);
    }

    /// Invariant: growth doubles capacity past the threshold and loses nothing.
    #[test]
    fn load_factor_growth() {
        let cfg = TableConfig::new(3).with_growth(GrowthPolicy::MaxLoadFactor(1.0));
        let mut t: ChainHashMap<usize> = ChainHashMap::from_config(cfg, None).unwrap();
        for i in 0..4 {
            t.insert(&format!("g{i}"), i).unwrap();
        }
        assert_eq!(t.capacity(), 6);
        for i in 4..100 {
            t.insert(&format!("g{i}"), i).unwrap();
        }
        assert!(t.load_factor() <= 1.0);
        for i in 0..100 {
            assert_eq!(t.get(&format!("g{i}")), Some(&i));
        }
        let keys: BTreeSet<&str> = t.keys().collect();
        assert_eq!(keys.len(), 100);
    }

    /// Invariant: rehash never calls the destructor.
    #[test]
    fn rehash_keeps_elements() {
        let (mut t, log) = logged_table(3);
        for i in 0..10 {
            t.insert(&i.to_string(), i).unwrap();
        }
        t.rehash(1).unwrap();
        assert_eq!(t.capacity(), MIN_CAPACITY);
        t.rehash(64).unwrap();
        assert_eq!(t.capacity(), 64);
        assert!(log.borrow().is_empty());
        assert_eq!(t.len(), 10);
    }

    #[test]
    fn default_table_is_usable() {
        let mut t: ChainHashMap<&str> = ChainHashMap::default();
        assert_eq!(t.capacity(), crate::config::DEFAULT_CAPACITY);
        t.insert("a", "alpha").unwrap();
        assert_eq!(t.get("a"), Some(&"alpha"));
    }

    #[test]
    fn debug_output_summarizes() {
        let (mut t, _log) = logged_table(4);
        t.insert("a", 1).unwrap();
        let s = format!("{t:?}");
        assert!(s.contains("len: 1"));
        assert!(s.contains("capacity: 4"));
        assert!(s.contains("destructor: true"));
    }
}
