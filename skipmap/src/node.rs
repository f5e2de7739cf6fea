//! Node store: exact-size node payloads in an index arena.
//!
//! A node is two blocks obtained from the container's [`NodeAlloc`]:
//!
//! ```text
//! tower:   [ NodeId; height ]         forward link per level, fixed at creation
//! element: [ u8; element_size ]       the whole key+value record
//! ```
//!
//! Nodes live in a [`Slab`] and are named by [`NodeId`]. Forward slots hold
//! indices, never owning references, so unlinking a node can not leave a
//! dangling pointer behind: a stale index either names a released slot (and
//! the slab lookup fails loudly) or a live node.

use core::marker::PhantomData;
use core::ptr::NonNull;
use std::alloc::Layout;

use slab::Slab;

use crate::alloc::NodeAlloc;
use crate::index::NodeId;

// =============================================================================
// Block
// =============================================================================

/// A fixed-length array of `T` whose memory belongs to a [`NodeAlloc`].
///
/// A block does not free itself; the owning [`NodeStore`] hands it back to the
/// allocator that produced it.
struct Block<T: Copy> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy> Block<T> {
    fn layout(len: usize) -> Layout {
        match Layout::array::<T>(len) {
            Ok(layout) => layout,
            Err(_) => panic!("node block of {len} elements overflows the address space"),
        }
    }

    /// Allocates `len` slots, each set to `fill`.
    fn filled<A: NodeAlloc>(alloc: &A, len: usize, fill: T) -> Self {
        let ptr = alloc.allocate(Self::layout(len)).cast::<T>();
        for i in 0..len {
            unsafe { ptr.as_ptr().add(i).write(fill) };
        }
        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }

    /// Allocates a copy of `src`.
    fn copied<A: NodeAlloc>(alloc: &A, src: &[T]) -> Self {
        let ptr = alloc.allocate(Self::layout(src.len())).cast::<T>();
        unsafe { core::ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len()) };
        Self {
            ptr,
            len: src.len(),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn as_slice(&self) -> &[T] {
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// # Safety
    ///
    /// `alloc` must be the policy that produced this block.
    unsafe fn release<A: NodeAlloc>(self, alloc: &A) {
        unsafe { alloc.deallocate(self.ptr.cast::<u8>(), Self::layout(self.len)) }
    }
}

/// Returns a block to its allocator if dropped before [`defuse`](Self::defuse),
/// so a panic from a later allocation does not leak it.
struct BlockGuard<'a, T: Copy, A: NodeAlloc> {
    block: Option<Block<T>>,
    alloc: &'a A,
}

impl<'a, T: Copy, A: NodeAlloc> BlockGuard<'a, T, A> {
    fn new(block: Block<T>, alloc: &'a A) -> Self {
        Self {
            block: Some(block),
            alloc,
        }
    }

    fn defuse(mut self) -> Block<T> {
        match self.block.take() {
            Some(block) => block,
            None => unreachable!("block guard emptied before defuse"),
        }
    }
}

impl<T: Copy, A: NodeAlloc> Drop for BlockGuard<'_, T, A> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            // Safety: the guard was built with the block's own allocator.
            unsafe { block.release(self.alloc) };
        }
    }
}

// Safety: a block is uniquely owned memory holding plain `Copy` data.
unsafe impl<T: Copy + Send> Send for Block<T> {}
unsafe impl<T: Copy + Sync> Sync for Block<T> {}

// =============================================================================
// Node
// =============================================================================

/// One stored record and its forward links.
pub(crate) struct Node {
    tower: Block<NodeId>,
    element: Block<u8>,
}

impl Node {
    /// Number of levels this node participates in.
    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.tower.len
    }

    #[inline]
    pub(crate) fn element(&self) -> &[u8] {
        self.element.as_slice()
    }

    /// Successor at `level`, or `NONE`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= height`.
    #[inline]
    pub(crate) fn forward(&self, level: usize) -> NodeId {
        self.tower.as_slice()[level]
    }
}

// =============================================================================
// NodeStore
// =============================================================================

/// Arena of nodes sharing one element size and one allocation policy.
pub(crate) struct NodeStore<A: NodeAlloc> {
    slots: Slab<Node>,
    alloc: A,
    element_size: usize,
}

impl<A: NodeAlloc> NodeStore<A> {
    pub(crate) fn new(element_size: usize, alloc: A) -> Self {
        Self {
            slots: Slab::new(),
            alloc,
            element_size,
        }
    }

    #[inline]
    pub(crate) fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Creates an unlinked node of `height` levels holding a copy of `element`.
    pub(crate) fn create(&mut self, height: usize, element: &[u8]) -> NodeId {
        debug_assert!(height > 0);
        debug_assert_eq!(element.len(), self.element_size);

        let element = BlockGuard::new(Block::copied(&self.alloc, element), &self.alloc);
        let tower = Block::filled(&self.alloc, height, NodeId::NONE);
        let node = Node {
            tower,
            element: element.defuse(),
        };
        let id = NodeId::from_slot(self.slots.insert(node));
        trace_log!(?id, height, "node created");
        id
    }

    /// Returns a node's memory to the allocator. The node must already be
    /// unlinked from every level.
    pub(crate) fn release(&mut self, id: NodeId) {
        let node = self
            .slots
            .try_remove(id.slot())
            .unwrap_or_else(|| panic!("release of dead node {id:?}"));
        trace_log!(?id, height = node.height(), "node released");
        self.free(node);
    }

    /// Releases every node.
    pub(crate) fn clear(&mut self) {
        for (_, node) in core::mem::take(&mut self.slots) {
            self.free(node);
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        match self.slots.get(id.slot()) {
            Some(node) => node,
            None => panic!("dangling node index {id:?}"),
        }
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.slot()) {
            Some(node) => node,
            None => panic!("dangling node index {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn element(&self, id: NodeId) -> &[u8] {
        self.get(id).element()
    }

    /// Overwrites a node's record in place.
    #[inline]
    pub(crate) fn overwrite(&mut self, id: NodeId, element: &[u8]) {
        self.get_mut(id).element.as_mut_slice().copy_from_slice(element);
    }

    #[inline]
    pub(crate) fn forward(&self, id: NodeId, level: usize) -> NodeId {
        self.get(id).forward(level)
    }

    #[inline]
    pub(crate) fn set_forward(&mut self, id: NodeId, level: usize, next: NodeId) {
        self.get_mut(id).tower.as_mut_slice()[level] = next;
    }

    fn free(&self, node: Node) {
        // Safety: both blocks were allocated by `self.alloc` in `create`.
        unsafe {
            node.tower.release(&self.alloc);
            node.element.release(&self.alloc);
        }
    }
}

impl<A: NodeAlloc> Drop for NodeStore<A> {
    fn drop(&mut self) {
        self.clear();
    }
}
