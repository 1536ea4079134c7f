//! SeqList: insertion-ordered sequence used as a bucket chain.
//!
//! Nodes live in a `SlotMap` arena and are doubly linked through their
//! generational keys, so removal anywhere in the chain relinks neighbours
//! without shifting storage. Position-indexed access walks from the head;
//! `NodeHandle` lets a caller resume a walk in O(1) per step.

use core::fmt;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

/// Generational reference to one node of a `SeqList`.
///
/// Resolves to `None` once the node has been removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NodeHandle(DefaultKey);

pub struct SeqList<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> SeqList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `value` after the current last element.
    pub fn push_back(&mut self, value: T) {
        let prev = self.tail;
        let k = self.nodes.insert(Node {
            value,
            prev,
            next: None,
        });
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let k = self.head?;
        self.unlink(k)
    }

    fn key_at(&self, index: usize) -> Option<DefaultKey> {
        if index >= self.len() {
            return None;
        }
        let mut cur = self.head;
        for _ in 0..index {
            cur = cur.and_then(|k| self.nodes.get(k)).and_then(|n| n.next);
        }
        cur
    }

    /// Element at `index`, counting from the front.
    pub fn get(&self, index: usize) -> Option<&T> {
        let k = self.key_at(index)?;
        self.nodes.get(k).map(|n| &n.value)
    }

    /// Remove and return the element at `index`; later elements move up by one.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        let k = self.key_at(index)?;
        self.unlink(k)
    }

    /// Index of the first element matching `pred`.
    pub fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().position(|v| pred(v))
    }

    /// Remove and return the first element matching `pred`, in one walk.
    pub fn remove_first<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = self.nodes.get(k)?;
            if pred(&node.value) {
                return self.unlink(k);
            }
            cur = node.next;
        }
        None
    }

    pub fn front(&self) -> Option<NodeHandle> {
        self.head.map(NodeHandle)
    }

    /// The element behind `handle` and the handle of the node after it.
    pub fn node(&self, handle: NodeHandle) -> Option<(&T, Option<NodeHandle>)> {
        self.nodes
            .get(handle.0)
            .map(|n| (&n.value, n.next.map(NodeHandle)))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cur: self.head,
            remaining: self.len(),
        }
    }

    fn unlink(&mut self, k: DefaultKey) -> Option<T> {
        let node = self.nodes.remove(k)?;
        match node.prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.nodes.get_mut(n)) {
            Some(n) => n.prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.value)
    }
}

impl<T> Default for SeqList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SeqList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Front-to-back iterator over a `SeqList`.
///
/// Borrowing the list keeps it from being mutated while the iterator lives.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<DefaultKey, Node<T>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cur?)?;
        self.cur = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SeqList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consuming iterator, yields elements front to back.
pub struct IntoIter<T>(SeqList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for SeqList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}
