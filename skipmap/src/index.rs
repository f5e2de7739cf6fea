//! Sentinel-based node index.
//!
//! Links between nodes are arena slot numbers rather than pointers. A reserved
//! sentinel (`u32::MAX`) stands in for "no successor", which keeps every
//! forward slot at four bytes instead of the eight an `Option<usize>` costs.

use core::fmt;

/// Index of a node in the arena, or [`NodeId::NONE`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// The null link. In a predecessor array it names the head sentinel.
    pub(crate) const NONE: Self = NodeId(u32::MAX);

    /// Converts an arena slot key.
    ///
    /// # Panics
    ///
    /// Panics if `slot` collides with the sentinel. The arena would need four
    /// billion live nodes to get there, so this is treated like allocation
    /// failure.
    #[inline]
    pub(crate) fn from_slot(slot: usize) -> Self {
        assert!(slot < u32::MAX as usize, "node arena exhausted index space");
        NodeId(slot as u32)
    }

    /// Returns the arena slot key.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub(crate) fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}
