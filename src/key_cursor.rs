//! External iteration over the keys of a `ChainHashMap`.
//!
//! Both forms walk buckets `0..capacity` and each chain front to back,
//! one step per call:
//! - a step on an empty or never-created bucket moves to the next bucket
//!   and yields nothing;
//! - a step on a chain with keys left yields the next key;
//! - a step on a finished chain moves to the next bucket and yields nothing.
//!
//! A `None` step is therefore not the end of iteration; callers loop while
//! `has_next()` is true. `Keys` also implements `Iterator`, which hides the
//! empty steps.
//!
//! `KeyCursor` does not borrow the table. It records the table identity
//! and generation at creation and refuses to step once either differs.
//! `Keys` borrows the table, so mutation cannot happen while it lives.

use crate::chain_hash_map::{Bucket, ChainHashMap, TableId};
use crate::error::{Result, TableError};
use crate::seq_list::NodeHandle;
use core::iter::FusedIterator;

/// Where the cursor stands inside the current chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ChainPos {
    Start,
    At(NodeHandle),
    Done,
}

#[derive(Clone, Debug)]
pub struct KeyCursor {
    table: TableId,
    generation: u64,
    capacity: usize,
    bucket: usize,
    pos: ChainPos,
}

impl KeyCursor {
    pub(crate) fn new<V, S>(table: &ChainHashMap<V, S>) -> Self {
        Self {
            table: table.id(),
            generation: table.generation(),
            capacity: table.capacity(),
            bucket: 0,
            pos: ChainPos::Start,
        }
    }

    /// True until every bucket has been stepped past.
    pub fn has_next(&self) -> bool {
        self.bucket < self.capacity
    }

    /// Take one step over `table`.
    ///
    /// Fails with `ForeignCursor` if `table` did not create this cursor and
    /// with `StaleCursor` if it was mutated since.
    pub fn next_key<'t, V, S>(&mut self, table: &'t ChainHashMap<V, S>) -> Result<Option<&'t str>> {
        if table.id() != self.table {
            return Err(TableError::ForeignCursor);
        }
        if table.generation() != self.generation {
            return Err(TableError::StaleCursor {
                created: self.generation,
                current: table.generation(),
            });
        }
        Ok(self.step(table.buckets()))
    }

    fn step<'t, V>(&mut self, buckets: &'t [Bucket<V>]) -> Option<&'t str> {
        if !self.has_next() {
            return None;
        }
        let chain = match buckets.get(self.bucket).and_then(Option::as_ref) {
            Some(chain) if !chain.is_empty() => chain,
            _ => {
                self.bucket += 1;
                return None;
            }
        };
        // Each step resolves one node handle; the generation check keeps
        // handles from outliving a mutation.
        let here = match self.pos {
            ChainPos::Start => chain.front(),
            ChainPos::At(h) => Some(h),
            ChainPos::Done => None,
        };
        match here.and_then(|h| chain.node(h)) {
            Some((entry, next)) => {
                self.pos = next.map_or(ChainPos::Done, ChainPos::At);
                Some(&entry.key)
            }
            None => {
                self.bucket += 1;
                self.pos = ChainPos::Start;
                None
            }
        }
    }
}

/// Borrowing key iterator.
pub struct Keys<'a, V, S> {
    table: &'a ChainHashMap<V, S>,
    cursor: KeyCursor,
}

impl<'a, V, S> Keys<'a, V, S> {
    pub(crate) fn new(table: &'a ChainHashMap<V, S>) -> Self {
        Self {
            table,
            cursor: KeyCursor::new(table),
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    /// One step; `None` may only mean an empty or finished bucket.
    pub fn next_key(&mut self) -> Option<&'a str> {
        let table = self.table;
        self.cursor.step(table.buckets())
    }
}

impl<'a, V, S> Iterator for Keys<'a, V, S> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.has_next() {
            if let Some(k) = self.next_key() {
                return Some(k);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.table.len()))
    }
}

impl<V, S> FusedIterator for Keys<'_, V, S> {}
