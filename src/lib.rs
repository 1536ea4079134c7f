//! chain-hashmap: a single-threaded, separate-chaining hash table from
//! owned string keys to caller-supplied elements.
//!
//! Internal Design:
//!
//! Summary
//! - A fixed array of buckets, each lazily holding a `SeqList` chain of
//!   entries. An entry owns a copy of its key, the element, and the key's
//!   hash.
//! - Layers:
//!   - `SeqList<T>`: insertion-ordered chain whose nodes live in a
//!     `slotmap` arena and are linked by generational keys.
//!   - `ChainHashMap<V, S>`: bucket array, entry count, growth policy and
//!     optional destructor; insert/remove/get/contains and traversal.
//!   - `KeyCursor` / `Keys`: step-wise external iteration over the keys.
//!
//! Constraints
//! - Single-threaded: the destructor is a `Box<dyn FnMut(V)>`, so the
//!   table is `!Send`/`!Sync`.
//! - Keys are unique per table. Inserting an existing key overwrites: the
//!   old element is released and the new entry is appended to the chain.
//! - Keys are always deep-copied; callers keep ownership of their buffers.
//!
//! Element disposal
//! - The destructor receives the element by value exactly once, when its
//!   entry is removed, overwritten, or released by `Drop`. Without a
//!   destructor the element is dropped at the same points.
//! - Rehashing moves entries and never releases them.
//!
//! Hashing
//! - `PolyHasher` (FNV-1a) depends on key content only. Any
//!   `BuildHasher` may be substituted. Each entry stores its hash, so a
//!   rehash never calls the hasher again.
//!
//! Capacity
//! - Tables have at least `MIN_CAPACITY` (3) buckets. The default
//!   `GrowthPolicy::Fixed` keeps the bucket count for the table's life;
//!   `GrowthPolicy::MaxLoadFactor` doubles it once the load factor passes
//!   the threshold. `rehash` resizes explicitly.
//!
//! Iteration
//! - `for_each_key` visits bucket order, then chain order, and stops when
//!   the visitor returns `true`.
//! - Every structural mutation bumps a generation counter. A detached
//!   `KeyCursor` fails with `StaleCursor` after one, and with
//!   `ForeignCursor` when handed another table.
//!
//! ```
//! use chain_hashmap::ChainHashMap;
//!
//! let mut t = ChainHashMap::with_capacity(3)?;
//! t.insert("a", 1)?;
//! t.insert("b", 2)?;
//! t.insert("c", 3)?;
//! t.remove("b")?;
//! assert_eq!(t.len(), 2);
//! assert_eq!(t.get("b"), None);
//!
//! let mut keys: Vec<&str> = t.keys().collect();
//! keys.sort();
//! assert_eq!(keys, ["a", "c"]);
//! # Ok::<(), chain_hashmap::TableError>(())
//! ```

pub mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod config;
mod error;
pub mod hashing;
pub mod key_cursor;
pub mod seq_list;

// Public surface
pub use chain_hash_map::{ChainHashMap, Destructor};
pub use config::{GrowthPolicy, TableConfig, DEFAULT_CAPACITY, MIN_CAPACITY};
pub use error::{Result, TableError};
pub use hashing::{BuildPolyHasher, PolyHasher};
pub use key_cursor::{KeyCursor, Keys};
pub use seq_list::SeqList;
