//! End-to-end scenarios on `(i32 key, i32 value)` records.
//!
//! Records are eight bytes: a little-endian key followed by a little-endian
//! value. Only the key takes part in ordering.

use std::alloc::{Layout, alloc, dealloc};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering as AtomicOrdering};

use skipmap::{FnAlloc, SkipList};

// ============================================================================
//  Fixtures
// ============================================================================

fn record(key: i32, val: i32) -> [u8; 8] {
    let mut rec = [0; 8];
    rec[..4].copy_from_slice(&key.to_le_bytes());
    rec[4..].copy_from_slice(&val.to_le_bytes());
    rec
}

fn key_of(rec: &[u8]) -> i32 {
    i32::from_le_bytes(rec[..4].try_into().unwrap())
}

fn val_of(rec: &[u8]) -> i32 {
    i32::from_le_bytes(rec[4..8].try_into().unwrap())
}

fn by_key(stored: &[u8], probe: &[u8]) -> Ordering {
    key_of(stored).cmp(&key_of(probe))
}

fn get_val<C: skipmap::Comparator>(list: &SkipList<C>, key: i32) -> Option<i32> {
    list.get(&key.to_le_bytes()).map(val_of)
}

fn keys<C>(list: &SkipList<C>) -> Vec<i32> {
    list.iter().map(key_of).collect()
}

// ============================================================================
//  Scenarios
// ============================================================================

#[test]
fn lifecycle() {
    let mut list = SkipList::new(8, by_key);

    // Ten in-order inserts.
    for i in 0..10 {
        list.insert(&record(i, i)).unwrap();
    }
    assert_eq!(list.len(), 10);
    for i in 0..10 {
        assert_eq!(get_val(&list, i), Some(i));
    }
    assert_eq!(keys(&list), (0..10).collect::<Vec<_>>());

    // Same keys again: values replaced, count unchanged.
    for i in 0..10 {
        list.insert(&record(i, i + 1)).unwrap();
    }
    assert_eq!(list.len(), 10);
    for i in 0..10 {
        assert_eq!(get_val(&list, i), Some(i + 1));
    }

    // Minimum.
    assert!(list.delete(&0i32.to_le_bytes()));
    assert_eq!(get_val(&list, 0), None);
    assert_eq!(list.len(), 9);

    // Maximum, then again as a no-op.
    assert!(list.delete(&9i32.to_le_bytes()));
    assert_eq!(get_val(&list, 9), None);
    assert_eq!(list.len(), 8);
    assert!(!list.delete(&9i32.to_le_bytes()));
    assert_eq!(list.len(), 8);

    // Survivors untouched.
    for i in 1..9 {
        assert_eq!(get_val(&list, i), Some(i + 1));
    }

    // Interior.
    assert!(list.delete(&5i32.to_le_bytes()));
    assert_eq!(get_val(&list, 5), None);
    assert_eq!(list.len(), 7);
    assert_eq!(keys(&list), vec![1, 2, 3, 4, 6, 7, 8]);
}

#[test]
fn reverse_and_interleaved_inserts() {
    let mut list = SkipList::new(8, by_key);

    for i in (0..50).rev() {
        list.insert(&record(i * 2, i)).unwrap();
    }
    for i in 0..50 {
        list.insert(&record(i * 2 + 1, -i)).unwrap();
    }

    assert_eq!(list.len(), 100);
    assert_eq!(keys(&list), (0..100).collect::<Vec<_>>());
    assert_eq!(get_val(&list, 41), Some(-20));
    assert_eq!(get_val(&list, 40), Some(20));
}

#[test]
fn negative_keys_order_numerically() {
    let mut list = SkipList::new(8, by_key);
    for key in [0, -1, i32::MIN, i32::MAX, 7, -300] {
        list.insert(&record(key, 0)).unwrap();
    }

    assert_eq!(keys(&list), vec![i32::MIN, -300, -1, 0, 7, i32::MAX]);
}

#[test]
fn wrong_size_is_rejected() {
    let mut list = SkipList::new(8, by_key);
    list.insert(&record(1, 1)).unwrap();

    let err = list.insert(&[0; 12]).unwrap_err();

    assert_eq!(err.expected, 8);
    assert_eq!(err.actual, 12);
    assert_eq!(list.len(), 1);
    assert_eq!(get_val(&list, 1), Some(1));
}

#[test]
fn iterator_is_one_pass() {
    let mut list = SkipList::new(8, by_key);
    for i in 0..3 {
        list.insert(&record(i, i)).unwrap();
    }

    let mut iter = list.iter();
    assert_eq!(iter.by_ref().count(), 3);
    assert_eq!(iter.next(), None);

    // A fresh iterator starts over.
    assert_eq!(list.iter().count(), 3);
}

#[test]
fn empty_list_operations() {
    let mut list = SkipList::new(8, by_key);

    assert_eq!(list.len(), 0);
    assert_eq!(get_val(&list, 0), None);
    assert!(!list.delete(&0i32.to_le_bytes()));
    assert_eq!(list.iter().next(), None);
    assert_eq!(list.height(), 1);
}

// ============================================================================
//  Allocator Accounting
// ============================================================================

static LIVE_BLOCKS: AtomicIsize = AtomicIsize::new(0);
static TOTAL_ALLOCS: AtomicUsize = AtomicUsize::new(0);

fn counting_alloc(layout: Layout) -> *mut u8 {
    LIVE_BLOCKS.fetch_add(1, AtomicOrdering::SeqCst);
    TOTAL_ALLOCS.fetch_add(1, AtomicOrdering::SeqCst);
    unsafe { alloc(layout) }
}

fn counting_free(ptr: *mut u8, layout: Layout) {
    LIVE_BLOCKS.fetch_sub(1, AtomicOrdering::SeqCst);
    unsafe { dealloc(ptr, layout) }
}

// The only test touching the counters above, so parallel tests do not skew them.
#[test]
fn fn_alloc_pair_sees_every_node() {
    // SAFETY: the counting pair forwards to the global allocator.
    let pair = unsafe { FnAlloc::new(counting_alloc, counting_free) };
    {
        let mut list = SkipList::with_allocator(8, by_key, pair);
        for i in 0..64 {
            list.insert(&record(i, i)).unwrap();
        }
        // Tower and element per node.
        assert_eq!(LIVE_BLOCKS.load(AtomicOrdering::SeqCst), 128);

        // Updates reuse the node.
        for i in 0..64 {
            list.insert(&record(i, -i)).unwrap();
        }
        assert_eq!(TOTAL_ALLOCS.load(AtomicOrdering::SeqCst), 128);

        for i in (0..64i32).step_by(2) {
            assert!(list.delete(&i.to_le_bytes()));
        }
        assert_eq!(LIVE_BLOCKS.load(AtomicOrdering::SeqCst), 64);

        // Heap-backed list alongside: not routed through the pair.
        let mut other = SkipList::new(8, by_key);
        other.insert(&record(1, 1)).unwrap();
        assert_eq!(TOTAL_ALLOCS.load(AtomicOrdering::SeqCst), 128);
    }
    assert_eq!(LIVE_BLOCKS.load(AtomicOrdering::SeqCst), 0);
}
