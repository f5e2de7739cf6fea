//! Ordered in-memory skip list over fixed-size byte records.
//!
//! A record is an opaque `element_size`-byte value, typically a key prefix
//! followed by a value. The container orders records with a caller-supplied
//! [`Comparator`] and keeps at most one record per key: inserting a record
//! whose key is already present overwrites the stored bytes.
//!
//! # Design
//!
//! ```text
//! SkipList
//!   head: [NodeId; MAX_LEVEL]   first node per level
//!   store: Slab<Node>           arena, nodes named by index
//!       Node { tower: [NodeId; height], element: [u8; element_size] }
//! ```
//!
//! Forward links are arena indices, so unlinking a node never leaves a
//! dangling reference behind. Tower and element memory is sized exactly at
//! creation and comes from the container's own [`NodeAlloc`]. Heights are drawn
//! from a deterministic [`Lcg`] by default, so identical inputs give identical
//! shapes.
//!
//! | Operation | Expected cost |
//! |-----------|---------------|
//! | [`insert`](SkipList::insert) | O(log n) |
//! | [`get`](SkipList::get) | O(log n) |
//! | [`delete`](SkipList::delete) | O(log n) |
//! | [`iter`](SkipList::iter) | O(1) per record |
//!
//! # Quick Start
//!
//! ```
//! use skipmap::{KeyPrefix, SkipList};
//!
//! // 4-byte big-endian key, 4-byte value.
//! fn record(key: u32, val: u32) -> [u8; 8] {
//!     let mut rec = [0; 8];
//!     rec[..4].copy_from_slice(&key.to_be_bytes());
//!     rec[4..].copy_from_slice(&val.to_be_bytes());
//!     rec
//! }
//!
//! let mut list = SkipList::new(8, KeyPrefix::new(4));
//! for key in [3, 1, 2] {
//!     list.insert(&record(key, key * 10)).unwrap();
//! }
//!
//! assert_eq!(list.get(&2u32.to_be_bytes()), Some(&record(2, 20)[..]));
//! assert!(list.delete(&1u32.to_be_bytes()));
//!
//! let remaining: Vec<_> = list.iter().map(|rec| rec[3]).collect();
//! assert_eq!(remaining, vec![2, 3]);
//! ```
//!
//! # Thread Safety
//!
//! Not synchronized. Mutation takes `&mut self`, so sharing a list across
//! threads requires an external lock.
//!
//! # Features
//!
//! - `tracing`: emit `tracing` events for construction, level changes and node
//!   lifecycle.

#![warn(missing_docs)]

#[macro_use]
mod tracing_helpers;

mod alloc;
mod compare;
mod error;
mod index;
mod level;
mod node;
mod skiplist;

pub use alloc::{AllocFn, FnAlloc, FreeFn, Heap, NodeAlloc};
pub use compare::{Bytewise, Comparator, KeyPrefix};
pub use error::SizeMismatch;
pub use level::{BRANCHING, DEFAULT_SEED, Lcg, MAX_LEVEL};
pub use skiplist::{Iter, SkipList};
