#![forbid(unsafe_code)]

//! Linear nearest-node search in world space.

use nodegrip_core::{NodeIndex, Vec3};

/// Closest node to `world_point` within `tolerance` world units.
///
/// Only the first `node_count` entries of `positions` are considered.
/// Distances are compared squared against `tolerance²`; an exact tie goes to
/// the lowest index. Non-finite positions (unmirrored nodes) are skipped, and
/// a negative or non-finite tolerance matches nothing.
#[must_use]
pub fn pick_nearest_in_world_space(
    world_point: Vec3,
    positions: &[Vec3],
    node_count: usize,
    tolerance: f32,
) -> Option<NodeIndex> {
    if !(tolerance.is_finite() && tolerance >= 0.0) || !world_point.is_finite() {
        return None;
    }
    let limit = tolerance * tolerance;
    let mut best: Option<(usize, f32)> = None;

    for (i, position) in positions.iter().take(node_count).enumerate() {
        if !position.is_finite() {
            continue;
        }
        let d2 = position.distance_squared(world_point);
        if d2 > limit {
            continue;
        }
        if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
            best = Some((i, d2));
        }
    }

    best.map(|(i, _)| NodeIndex::new(i as u32))
}
