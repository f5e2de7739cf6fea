//! Skip list over fixed-size byte records.
//!
//! Records are ordered by a caller-supplied [`Comparator`]. Lookups, inserts
//! and deletes all descend through the same search, which records the
//! rightmost node visited at each level before overshooting the probe:
//!
//! ```text
//! Level 2:  HEAD ─────────────────────► 50 ───────────────► NIL
//!             │                          │
//! Level 1:  HEAD ────────► 20 ──────────► 50 ───────────────► NIL
//!             │            │              │
//! Level 0:  HEAD ──► 10 ──► 20 ──► 30 ──► 50 ──► 60 ──► NIL
//! ```
//!
//! The head sentinel is the `head` array: one link per level, up to
//! [`MAX_LEVEL`]. In the predecessor array a `NONE` entry means "the head".
//!
//! # Example
//!
//! ```
//! use skipmap::{KeyPrefix, SkipList};
//!
//! // 2-byte key, 2-byte value.
//! let mut list = SkipList::new(4, KeyPrefix::new(2));
//!
//! list.insert(&[0, 2, 0xAA, 0xAA]).unwrap();
//! list.insert(&[0, 1, 0xBB, 0xBB]).unwrap();
//! list.insert(&[0, 2, 0xCC, 0xCC]).unwrap(); // same key: value overwritten
//!
//! assert_eq!(list.len(), 2);
//! assert_eq!(list.get(&[0, 2]), Some(&[0, 2, 0xCC, 0xCC][..]));
//!
//! let keys: Vec<_> = list.iter().map(|rec| rec[1]).collect();
//! assert_eq!(keys, vec![1, 2]);
//!
//! assert!(list.delete(&[0, 1]));
//! assert!(!list.delete(&[0, 1]));
//! assert_eq!(list.len(), 1);
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use rand_core::RngCore;

use crate::alloc::{Heap, NodeAlloc};
use crate::compare::Comparator;
use crate::error::SizeMismatch;
use crate::index::NodeId;
use crate::level::{LevelGenerator, Lcg, MAX_LEVEL};
use crate::node::NodeStore;

// ============================================================================
// Search
// ============================================================================

/// Result of a descent from the head.
struct Search {
    /// Rightmost node at each level whose record orders before the probe.
    /// `NONE` is the head. Entries at or above the current level are `NONE`.
    update: [NodeId; MAX_LEVEL],
    /// Level-0 successor of `update[0]`: the first record not before the probe.
    candidate: NodeId,
    /// `candidate` compares equal to the probe.
    found: bool,
}

// ============================================================================
// SkipList
// ============================================================================

/// An ordered container of fixed-size byte records.
///
/// Not safe for concurrent mutation; wrap it in a lock to share it.
///
/// # Type Parameters
///
/// - `C`: record ordering, see [`Comparator`]
/// - `A`: allocation policy for nodes, see [`NodeAlloc`]; defaults to [`Heap`]
/// - `R`: random source for tower heights; defaults to the deterministic [`Lcg`]
pub struct SkipList<C, A: NodeAlloc = Heap, R = Lcg> {
    /// Head sentinel links. `head[i]` is the first node at level i.
    head: [NodeId; MAX_LEVEL],
    store: NodeStore<A>,
    levels: LevelGenerator<R>,
    cmp: C,
    /// Levels in use, `1..=MAX_LEVEL`. Tracks the tallest live node.
    level: usize,
    len: usize,
}

impl<C: Comparator> SkipList<C> {
    /// Creates an empty list of `element_size`-byte records, using the heap and
    /// the default height seed.
    ///
    /// # Panics
    ///
    /// Panics if `element_size` is 0.
    pub fn new(element_size: usize, cmp: C) -> Self {
        Self::with_allocator_and_rng(element_size, cmp, Heap, Lcg::default())
    }

    /// Creates an empty list whose tower heights derive from `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `element_size` is 0.
    pub fn with_seed(element_size: usize, cmp: C, seed: u32) -> Self {
        Self::with_allocator_and_rng(element_size, cmp, Heap, Lcg::new(seed))
    }
}

impl<C: Comparator, A: NodeAlloc> SkipList<C, A> {
    /// Creates an empty list that obtains all node memory from `alloc`.
    ///
    /// # Panics
    ///
    /// Panics if `element_size` is 0.
    pub fn with_allocator(element_size: usize, cmp: C, alloc: A) -> Self {
        Self::with_allocator_and_rng(element_size, cmp, alloc, Lcg::default())
    }
}

impl<C: Comparator, A: NodeAlloc, R: RngCore> SkipList<C, A, R> {
    /// Creates an empty list with every policy supplied by the caller.
    ///
    /// # Panics
    ///
    /// Panics if `element_size` is 0.
    pub fn with_allocator_and_rng(element_size: usize, cmp: C, alloc: A, rng: R) -> Self {
        assert!(element_size > 0, "element size must be > 0");
        debug_log!(element_size, max_level = MAX_LEVEL, "skip list created");

        Self {
            head: [NodeId::NONE; MAX_LEVEL],
            store: NodeStore::new(element_size, alloc),
            levels: LevelGenerator::new(rng),
            cmp,
            level: 1,
            len: 0,
        }
    }

    /// Returns the stored record that compares equal to `probe`.
    ///
    /// The probe only needs as many bytes as the comparator reads. The returned
    /// slice is valid until the next mutation.
    #[inline]
    pub fn get(&self, probe: &[u8]) -> Option<&[u8]> {
        let search = self.search(probe);
        search.found.then(|| self.store.element(search.candidate))
    }

    /// Returns `true` if a record compares equal to `probe`.
    #[inline]
    pub fn contains(&self, probe: &[u8]) -> bool {
        self.search(probe).found
    }

    /// Inserts `element`, or overwrites the record with an equal key.
    ///
    /// Overwriting copies the new bytes into the existing node; its height and
    /// position do not change, and neither does [`len`](Self::len).
    pub fn insert(&mut self, element: &[u8]) -> Result<(), SizeMismatch> {
        let expected = self.store.element_size();
        if element.len() != expected {
            return Err(SizeMismatch {
                expected,
                actual: element.len(),
            });
        }

        let mut search = self.search(element);
        if search.found {
            self.store.overwrite(search.candidate, element);
            return Ok(());
        }

        // Allocate before touching any list state: a policy may panic here.
        let height = self.levels.next_height();
        let id = self.store.create(height, element);

        if height > self.level {
            // Nothing spans the new levels yet, so the head precedes the node.
            for pred in &mut search.update[self.level..height] {
                *pred = NodeId::NONE;
            }
            trace_log!(from = self.level, to = height, "level grown");
            self.level = height;
        }

        for level in 0..height {
            let pred = search.update[level];
            let next = self.next(pred, level);
            self.store.set_forward(id, level, next);
            self.set_next(pred, level, id);
        }

        self.len += 1;
        Ok(())
    }

    /// Removes the record that compares equal to `probe`.
    ///
    /// Returns `false`, leaving the list untouched, if there is none.
    pub fn delete(&mut self, probe: &[u8]) -> bool {
        let search = self.search(probe);
        if !search.found {
            return false;
        }
        let victim = search.candidate;

        // A node's links end at its own height: stop at the first level where
        // the predecessor no longer points at it.
        for level in 0..self.level {
            let pred = search.update[level];
            if self.next(pred, level) != victim {
                break;
            }
            let next = self.store.forward(victim, level);
            self.set_next(pred, level, next);
        }
        self.store.release(victim);

        let before = self.level;
        while self.level > 1 && self.head[self.level - 1].is_none() {
            self.level -= 1;
        }
        if self.level != before {
            trace_log!(from = before, to = self.level, "level shrunk");
        }

        self.len -= 1;
        true
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Descends from the top active level to level 0, recording the
    /// predecessor at each level. The one traversal behind get, insert and
    /// delete.
    fn search(&self, probe: &[u8]) -> Search {
        let mut update = [NodeId::NONE; MAX_LEVEL];
        let mut current = NodeId::NONE;

        for level in (0..self.level).rev() {
            let mut next = self.next(current, level);
            while next.is_some()
                && self.cmp.compare(self.store.element(next), probe) == Ordering::Less
            {
                current = next;
                next = self.store.forward(next, level);
            }
            update[level] = current;
        }

        let candidate = self.next(current, 0);
        let found = candidate.is_some()
            && self.cmp.compare(self.store.element(candidate), probe) == Ordering::Equal;

        Search {
            update,
            candidate,
            found,
        }
    }
}

impl<C, A: NodeAlloc, R> SkipList<C, A, R> {
    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.len, self.store.len());
        self.len
    }

    /// Returns `true` if the list holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels in use: the height of the tallest node,
    /// or 1 when empty.
    #[inline]
    pub fn height(&self) -> usize {
        self.level
    }

    /// Returns the fixed record width.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.store.element_size()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.store.clear();
        self.head = [NodeId::NONE; MAX_LEVEL];
        self.level = 1;
        self.len = 0;
    }

    /// Returns an iterator over records in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, A> {
        Iter {
            store: &self.store,
            current: self.head[0],
            remaining: self.len,
        }
    }

    /// Successor of `pred` at `level`, where `NONE` is the head.
    #[inline]
    fn next(&self, pred: NodeId, level: usize) -> NodeId {
        if pred.is_none() {
            self.head[level]
        } else {
            self.store.forward(pred, level)
        }
    }

    #[inline]
    fn set_next(&mut self, pred: NodeId, level: usize, to: NodeId) {
        if pred.is_none() {
            self.head[level] = to;
        } else {
            self.store.set_forward(pred, level, to);
        }
    }
}

impl<C, A: NodeAlloc, R> fmt::Debug for SkipList<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, C, A: NodeAlloc, R> IntoIterator for &'a SkipList<C, A, R> {
    type Item = &'a [u8];
    type IntoIter = Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iterator
// ============================================================================

/// Ascending iterator over a list's records.
///
/// Walks the level-0 chain. Once it returns `None` it keeps returning `None`.
pub struct Iter<'a, A: NodeAlloc> {
    store: &'a NodeStore<A>,
    current: NodeId,
    remaining: usize,
}

impl<'a, A: NodeAlloc> Iterator for Iter<'a, A> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let store = self.store;
        let node = store.get(self.current);
        self.current = node.forward(0);
        self.remaining -= 1;
        Some(node.element())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<A: NodeAlloc> ExactSizeIterator for Iter<'_, A> {}

impl<A: NodeAlloc> FusedIterator for Iter<'_, A> {}
