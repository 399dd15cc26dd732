#![forbid(unsafe_code)]

//! The invisible pick scene.
//!
//! Mirrors the visible scene's instance groups one to one, replacing each
//! instance's color with its node's [`ColorKey`]. Instances whose node has
//! no assigned color are left out entirely, so they can never be picked.

use nodegrip_core::{NodeIndex, Vec3};
use tracing::trace;

use crate::color_key::ColorKey;
use crate::color_map::PickColorMap;
use crate::instances::{GroupKey, InstanceSource, InstanceTransform};

/// One mirrored instanced mesh.
#[derive(Debug, Clone, Default)]
pub struct OffscreenGroup {
    pub key: GroupKey,
    pub nodes: Vec<NodeIndex>,
    pub transforms: Vec<InstanceTransform>,
    pub colors: Vec<ColorKey>,
}

impl OffscreenGroup {
    /// Iterate `(node, transform, color)` per instance.
    pub fn instances(&self) -> impl Iterator<Item = (NodeIndex, &InstanceTransform, ColorKey)> {
        self.nodes
            .iter()
            .zip(&self.transforms)
            .zip(&self.colors)
            .map(|((node, transform), color)| (*node, transform, *color))
    }
}

/// Offscreen copy of the visible scene, flat-colored by node.
#[derive(Debug, Clone, Default)]
pub struct OffscreenScene {
    groups: Vec<OffscreenGroup>,
    /// World position per node index, `NAN` where no instance was mirrored.
    positions: Vec<Vec3>,
    mapping_generation: u64,
    /// Bumped on every change so render targets can skip re-uploads.
    revision: u64,
}

impl OffscreenScene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-mirror transforms and colors from `source`.
    ///
    /// Returns the number of instances mirrored.
    pub fn sync<S: InstanceSource + ?Sized>(&mut self, source: &S, map: &PickColorMap) -> usize {
        let mut spare = std::mem::take(&mut self.groups);
        self.positions.clear();
        self.positions.resize(map.len(), Vec3::NAN);

        let mut mirrored = 0usize;
        let mut skipped = 0usize;
        source.for_each_batch(&mut |batch| {
            let mut group = spare.pop().unwrap_or_default();
            group.key = batch.group;
            group.nodes.clear();
            group.transforms.clear();
            group.colors.clear();

            for (node, transform) in batch.nodes.iter().zip(batch.transforms) {
                let Some(color) = map.color_of(*node) else {
                    skipped += 1;
                    continue;
                };
                group.nodes.push(*node);
                group.transforms.push(*transform);
                group.colors.push(color);
                if let Some(slot) = self.positions.get_mut(node.as_usize())
                    && !slot.is_finite()
                {
                    *slot = transform.position;
                }
            }
            mirrored += group.nodes.len();
            self.groups.push(group);
        });

        self.mapping_generation = map.generation();
        self.revision += 1;
        trace!(
            groups = self.groups.len(),
            mirrored, skipped, "pick scene synced"
        );
        mirrored
    }

    /// Mirrored groups, in source order.
    #[must_use]
    pub fn groups(&self) -> &[OffscreenGroup] {
        &self.groups
    }

    /// Mirrored world positions indexed by node (`NAN` when absent).
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Total mirrored instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(|g| g.nodes.len()).sum()
    }

    /// Generation of the color mapping the scene was last synced against.
    #[must_use]
    pub fn mapping_generation(&self) -> u64 {
        self.mapping_generation
    }

    /// Change counter, bumped by every sync and clear.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop every mirrored instance.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.positions.clear();
        self.revision += 1;
    }
}
