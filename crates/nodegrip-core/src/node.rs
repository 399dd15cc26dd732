#![forbid(unsafe_code)]

//! Node identity.
//!
//! A [`NodeIndex`] names a slot in the externally owned instance buffers. It
//! is only meaningful until the next full rebuild of those buffers; callers
//! re-assign colors and re-sync instances whenever the node count changes.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;

/// Dense index of a node in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a node index from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Index as a `usize` for slice access.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Whether this index falls inside `[0, count)`.
    #[inline]
    #[must_use]
    pub const fn is_within(self, count: usize) -> bool {
        (self.0 as usize) < count
    }
}

impl From<u32> for NodeIndex {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of a node, resolved through the external node store.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Slot in the instance buffers.
    pub index: NodeIndex,
    /// Stable external identifier (survives re-indexing).
    pub id: Arc<str>,
    /// Position at the time of resolution.
    pub position: Vec3,
    /// Whether the layout simulation currently treats the node as fixed.
    pub pinned: bool,
}

impl NodeRecord {
    /// Create a record for an unpinned node.
    #[must_use]
    pub fn new(index: NodeIndex, id: impl Into<Arc<str>>, position: Vec3) -> Self {
        Self {
            index,
            id: id.into(),
            position,
            pinned: false,
        }
    }
}

/// Resolves a node index to its record, or `None` for unknown indices.
pub type NodeLookup = Box<dyn Fn(NodeIndex) -> Option<NodeRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_bounds() {
        assert!(NodeIndex::new(0).is_within(1));
        assert!(!NodeIndex::new(1).is_within(1));
        assert!(!NodeIndex::new(0).is_within(0));
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(NodeIndex::new(42).to_string(), "#42");
    }

    #[test]
    fn record_defaults_unpinned() {
        let rec = NodeRecord::new(NodeIndex::new(3), "n3", Vec3::ZERO);
        assert!(!rec.pinned);
        assert_eq!(&*rec.id, "n3");
    }
}
