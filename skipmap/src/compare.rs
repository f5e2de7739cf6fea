//! Ordering over stored records.
//!
//! The container never interprets record bytes itself. Every ordering decision
//! goes through a [`Comparator`], which usually looks at a fixed key prefix
//! and ignores the value suffix.
//!
//! A comparator must be a total order and must not change for the lifetime of
//! the container. Violating that does not cause memory unsafety, but lookups,
//! inserts and deletes stop meaning anything.

use core::cmp::Ordering;

/// Total order over record bytes.
///
/// `stored` is always a full record held by the container. `probe` is the
/// caller's argument: a full record for inserts, or any prefix the comparator
/// understands for lookups and deletes.
///
/// Closures of type `Fn(&[u8], &[u8]) -> Ordering` implement this trait.
pub trait Comparator {
    /// Compares a stored record against a probe.
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering;
}

impl<F> Comparator for F
where
    F: Fn(&[u8], &[u8]) -> Ordering,
{
    #[inline]
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering {
        self(stored, probe)
    }
}

/// Lexicographic byte order over the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bytewise;

impl Comparator for Bytewise {
    #[inline]
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering {
        stored.cmp(probe)
    }
}

/// Lexicographic byte order over the first `len` bytes.
///
/// Records that share a key prefix compare equal, so inserting one overwrites
/// the other.
///
/// A probe must carry the whole `len`-byte key; any value bytes after it are
/// ignored. A shorter probe is not a prefix search: it orders before every
/// record whose key extends it, and so never matches a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPrefix {
    len: usize,
}

impl KeyPrefix {
    /// Orders records by their first `len` bytes.
    pub const fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Comparator for KeyPrefix {
    #[inline]
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering {
        let a = &stored[..self.len.min(stored.len())];
        let b = &probe[..self.len.min(probe.len())];
        a.cmp(b)
    }
}
