//! Allocation policy for node payloads.
//!
//! Every node's tower and element bytes are obtained from the container's
//! [`NodeAlloc`]. The policy is a constructor argument owned by one container,
//! so swapping allocators for one instance never affects another.
//!
//! | Policy | Backing |
//! |--------|---------|
//! | [`Heap`] | `std::alloc::alloc` / `dealloc` (default) |
//! | [`FnAlloc`] | caller-supplied `alloc` / `free` function pair |
//! | `&A` | borrow of any policy, to share one allocator across containers |
//!
//! Allocation is infallible from the container's point of view: a policy that
//! cannot satisfy a request must diverge, normally via
//! [`handle_alloc_error`].
//!
//! The container writes node data straight through the returned pointers, so
//! implementing the trait, or wrapping a function pair, is `unsafe`.

use core::ptr::NonNull;
use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};

/// Source of memory for node towers and element payloads.
///
/// Requests always have a non-zero size. `deallocate` receives only pointers
/// produced by `allocate` on the same policy value, with the same layout,
/// exactly once.
///
/// # Safety
///
/// Implementors guarantee that `allocate` either returns a pointer to a fresh
/// block that is readable and writable for `layout.size()` bytes, aligned to
/// `layout.align()`, and not aliased by any other live block, or does not
/// return (aborts or panics). The block stays valid until it is passed to
/// `deallocate`.
///
/// # Example
///
/// ```
/// use std::alloc::Layout;
/// use std::ptr::NonNull;
/// use skipmap::{Heap, NodeAlloc};
///
/// struct Logged;
///
/// // SAFETY: forwards to `Heap`, which upholds the contract.
/// unsafe impl NodeAlloc for Logged {
///     fn allocate(&self, layout: Layout) -> NonNull<u8> {
///         println!("alloc {} bytes", layout.size());
///         Heap.allocate(layout)
///     }
///
///     unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
///         unsafe { Heap.deallocate(ptr, layout) }
///     }
/// }
/// ```
///
/// A plain `impl` is rejected:
///
/// ```compile_fail
/// use std::alloc::Layout;
/// use std::ptr::NonNull;
/// use skipmap::NodeAlloc;
///
/// struct Bogus;
///
/// impl NodeAlloc for Bogus {
///     fn allocate(&self, _: Layout) -> NonNull<u8> {
///         NonNull::dangling()
///     }
///
///     unsafe fn deallocate(&self, _: NonNull<u8>, _: Layout) {}
/// }
/// ```
pub unsafe trait NodeAlloc {
    /// Allocates a block fitting `layout`.
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`allocate`](NodeAlloc::allocate) on this policy
    /// with the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: forwards to `A`.
unsafe impl<A: NodeAlloc + ?Sized> NodeAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

// =============================================================================
// Heap
// =============================================================================

/// The ambient heap allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heap;

// SAFETY: `alloc` returns a block fitting `layout` or null, and null diverges.
unsafe impl NodeAlloc for Heap {
    #[inline]
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        debug_assert!(layout.size() > 0);
        let ptr = unsafe { alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

// =============================================================================
// FnAlloc
// =============================================================================

/// Allocation half of a caller-supplied pair. Returns null on failure.
pub type AllocFn = fn(Layout) -> *mut u8;

/// Release half of a caller-supplied pair.
pub type FreeFn = fn(*mut u8, Layout);

/// A caller-supplied allocation function pair.
///
/// The pair is stored in the container that receives it; there is no global
/// registration step.
///
/// # Example
///
/// ```
/// use std::alloc::{Layout, alloc, dealloc};
/// use skipmap::{FnAlloc, SkipList};
///
/// fn my_alloc(layout: Layout) -> *mut u8 {
///     unsafe { alloc(layout) }
/// }
///
/// fn my_free(ptr: *mut u8, layout: Layout) {
///     unsafe { dealloc(ptr, layout) }
/// }
///
/// // SAFETY: `my_alloc` returns heap blocks for the requested layout and
/// // `my_free` releases them with the same layout.
/// let pair = unsafe { FnAlloc::new(my_alloc, my_free) };
/// let mut list = SkipList::with_allocator(4, |a: &[u8], b: &[u8]| a.cmp(b), pair);
/// list.insert(&[0, 0, 0, 1]).unwrap();
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnAlloc {
    alloc: AllocFn,
    free: FreeFn,
}

impl FnAlloc {
    /// Wraps an `alloc` / `free` pair.
    ///
    /// # Safety
    ///
    /// For every layout it is given, `alloc` must return either null or a
    /// fresh block readable and writable for `layout.size()` bytes and aligned
    /// to `layout.align()`, valid until handed to `free`. `free` must accept
    /// every block `alloc` returned, with the layout it was requested with.
    ///
    /// Calling it outside `unsafe` is rejected:
    ///
    /// ```compile_fail
    /// use std::alloc::Layout;
    /// use skipmap::FnAlloc;
    ///
    /// fn bogus_alloc(_: Layout) -> *mut u8 {
    ///     8 as *mut u8
    /// }
    ///
    /// fn bogus_free(_: *mut u8, _: Layout) {}
    ///
    /// let _pair = FnAlloc::new(bogus_alloc, bogus_free);
    /// ```
    pub const unsafe fn new(alloc: AllocFn, free: FreeFn) -> Self {
        Self { alloc, free }
    }
}

// SAFETY: the pair's guarantees come from `FnAlloc::new`; null diverges.
unsafe impl NodeAlloc for FnAlloc {
    #[inline]
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        let ptr = (self.alloc)(layout);
        match NonNull::new(ptr) {
            Some(ptr) => {
                debug_assert_eq!(ptr.as_ptr() as usize % layout.align(), 0, "misaligned block");
                ptr
            }
            None => handle_alloc_error(layout),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (self.free)(ptr.as_ptr(), layout)
    }
}
