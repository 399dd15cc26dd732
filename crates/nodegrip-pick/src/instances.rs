#![forbid(unsafe_code)]

//! Instance transforms mirrored from the visible scene.
//!
//! The renderer draws nodes as instanced meshes, typically one instanced mesh
//! per shape/style group. [`InstanceSource`] is how the hit tester sees those
//! groups without owning them.

use nodegrip_core::{NodeIndex, Quat, Vec3};

/// Per-instance transform of a node mesh.
///
/// Node meshes are modeled as unit discs (radius `1.0` in local space) facing
/// the camera, so the picked footprint is `scale.max_element()` world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
}

impl InstanceTransform {
    /// Uniformly scaled, unrotated instance.
    #[must_use]
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            scale: Vec3::splat(radius),
            rotation: Quat::IDENTITY,
        }
    }

    /// World-space radius of the instance footprint.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.scale.abs().max_element()
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

/// Identifies one instanced mesh group of the visible scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GroupKey(pub u32);

/// One instanced mesh: the node each instance slot belongs to, and its
/// transform. `nodes[i]` is drawn with `transforms[i]`.
#[derive(Debug, Clone, Copy)]
pub struct InstanceBatch<'a> {
    pub group: GroupKey,
    pub nodes: &'a [NodeIndex],
    pub transforms: &'a [InstanceTransform],
}

impl InstanceBatch<'_> {
    /// Number of instances, clamped to the shorter of the two slices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len().min(self.transforms.len())
    }

    /// Whether the batch has no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only view of the visible scene's instance buffers.
pub trait InstanceSource {
    /// Visit every instanced mesh group.
    fn for_each_batch(&self, visit: &mut dyn FnMut(InstanceBatch<'_>));
}

/// Owned instance buffers, usable as an [`InstanceSource`].
#[derive(Debug, Clone, Default)]
pub struct InstanceSnapshot {
    groups: Vec<(GroupKey, Vec<NodeIndex>, Vec<InstanceTransform>)>,
}

impl InstanceSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instance to `group`, creating the group on first use.
    pub fn push(&mut self, group: GroupKey, node: NodeIndex, transform: InstanceTransform) {
        if let Some((_, nodes, transforms)) = self.groups.iter_mut().find(|(key, _, _)| *key == group) {
            nodes.push(node);
            transforms.push(transform);
        } else {
            self.groups.push((group, vec![node], vec![transform]));
        }
    }

    /// Build a single-group snapshot where instance `i` is node `i`.
    #[must_use]
    pub fn from_positions(positions: &[Vec3], radius: f32) -> Self {
        let mut snapshot = Self::new();
        for (raw, position) in positions.iter().enumerate() {
            snapshot.push(
                GroupKey::default(),
                NodeIndex::new(raw as u32),
                InstanceTransform::new(*position, radius),
            );
        }
        snapshot
    }

    /// Mutable transform of the first instance belonging to `node`.
    pub fn transform_mut(&mut self, node: NodeIndex) -> Option<&mut InstanceTransform> {
        self.groups.iter_mut().find_map(|(_, nodes, transforms)| {
            nodes
                .iter()
                .position(|n| *n == node)
                .and_then(|slot| transforms.get_mut(slot))
        })
    }

    /// Total number of instances across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, nodes, _)| nodes.len()).sum()
    }

    /// Whether there are no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InstanceSource for InstanceSnapshot {
    fn for_each_batch(&self, visit: &mut dyn FnMut(InstanceBatch<'_>)) {
        for (group, nodes, transforms) in &self.groups {
            visit(InstanceBatch {
                group: *group,
                nodes,
                transforms,
            });
        }
    }
}
