#![forbid(unsafe_code)]

//! Host-owned node storage seams.

use nodegrip_core::{NodeIndex, Vec2, Vec3};

/// Node positions and fixed-position overrides, owned by the host.
///
/// The layout simulation treats a node with `fixed(i) == Some(_)` as pinned
/// at that x/y and stops integrating its position.
pub trait NodeStore {
    /// Number of nodes; valid indices are `[0, node_count())`.
    fn node_count(&self) -> usize;

    /// Current position, or `None` for an unknown index.
    fn position(&self, node: NodeIndex) -> Option<Vec3>;

    /// Overwrite a node's position. Unknown indices are ignored.
    fn set_position(&mut self, node: NodeIndex, position: Vec3);

    /// Set (`Some`) or release (`None`) the fixed-position override.
    fn set_fixed(&mut self, node: NodeIndex, fixed: Option<Vec2>);

    /// Current fixed-position override.
    fn fixed(&self, node: NodeIndex) -> Option<Vec2>;
}

/// The layout engine's own position accessor, when it keeps positions apart
/// from the node store.
pub trait PositionAccessor {
    fn get(&self, node: NodeIndex) -> Option<Vec3>;
    fn set(&mut self, node: NodeIndex, position: Vec3);
}

/// Dense in-memory [`NodeStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VecNodeStore {
    positions: Vec<Vec3>,
    fixed: Vec<Option<Vec2>>,
}

impl VecNodeStore {
    /// Store with the given positions and no overrides.
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        let fixed = vec![None; positions.len()];
        Self { positions, fixed }
    }

    /// All positions, indexed by node.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Append a node, returning its index.
    pub fn push(&mut self, position: Vec3) -> NodeIndex {
        self.positions.push(position);
        self.fixed.push(None);
        NodeIndex::new((self.positions.len() - 1) as u32)
    }
}

impl NodeStore for VecNodeStore {
    fn node_count(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, node: NodeIndex) -> Option<Vec3> {
        self.positions.get(node.as_usize()).copied()
    }

    fn set_position(&mut self, node: NodeIndex, position: Vec3) {
        if let Some(slot) = self.positions.get_mut(node.as_usize()) {
            *slot = position;
        }
    }

    fn set_fixed(&mut self, node: NodeIndex, fixed: Option<Vec2>) {
        if let Some(slot) = self.fixed.get_mut(node.as_usize()) {
            *slot = fixed;
        }
    }

    fn fixed(&self, node: NodeIndex) -> Option<Vec2> {
        self.fixed.get(node.as_usize()).copied().flatten()
    }
}
