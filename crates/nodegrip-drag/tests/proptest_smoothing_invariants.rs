//! Property-based invariant tests for drag smoothing and deferred release.
//!
//! 1. Against a constant target, the distance to the target never grows.
//! 2. After enough updates the node sits within epsilon of the target.
//! 3. The grab offset is preserved: with zero smoothing the node tracks
//!    `pointer + offset` exactly.
//! 4. A released pin survives every tick before its deadline and is gone at
//!    the deadline.
//! 5. Re-dragging before the deadline cancels the pending release.

use nodegrip_core::{NodeIndex, Vec3};
use nodegrip_drag::{DragConfig, DragCoordinator, NodeStore, VecNodeStore};
use proptest::prelude::*;
use web_time::{Duration, Instant};

// ── Helpers ─────────────────────────────────────────────────────────────

fn point() -> impl Strategy<Value = Vec3> {
    (-1000.0f32..1000.0, -1000.0f32..1000.0, -100.0f32..100.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn single(start: Vec3) -> (VecNodeStore, NodeIndex) {
    (VecNodeStore::new(vec![start]), NodeIndex::new(0))
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Monotone convergence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn smoothing_converges_monotonically(
        start in point(),
        pointer in point(),
        smoothing in 0.0f32..0.9,
    ) {
        let (mut store, node) = single(start);
        let mut drag = DragCoordinator::new(DragConfig {
            smoothing,
            ..DragConfig::default()
        });
        // Grab at the node itself so the target is the pointer.
        drag.start_drag(&mut store, node, start);

        let mut previous = start.distance(pointer);
        for _ in 0..400 {
            let Some(position) = drag.update_drag(&mut store, pointer) else {
                return Err(TestCaseError::fail("drag not active"));
            };
            let distance = position.distance(pointer);
            prop_assert!(
                distance <= previous + 1e-3,
                "distance grew from {} to {}",
                previous,
                distance
            );
            previous = distance;
        }
        prop_assert!(previous < 1e-2, "final distance {}", previous);
        prop_assert_eq!(store.position(node).map(|p| p.distance(pointer) < 1e-2), Some(true));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Offset preservation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zero_smoothing_tracks_pointer_plus_offset(
        start in point(),
        grab in point(),
        moves in proptest::collection::vec(point(), 1..8),
    ) {
        let (mut store, node) = single(start);
        let mut drag = DragCoordinator::new(DragConfig {
            smoothing: 0.0,
            ..DragConfig::default()
        });
        drag.start_drag(&mut store, node, grab);
        let offset = start - grab;
        for pointer in moves {
            let position = drag.update_drag(&mut store, pointer);
            let expected = pointer + offset;
            prop_assert!(position.is_some_and(|p| p.distance(expected) < 1e-2));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Deferred release
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pin_held_until_deadline(
        delay_ms in 1u64..5000,
        checkpoints in proptest::collection::vec(0.0f64..1.0, 0..6),
    ) {
        let (mut store, node) = single(Vec3::ZERO);
        let delay = Duration::from_millis(delay_ms);
        let mut drag = DragCoordinator::new(DragConfig {
            unpin_delay: delay,
            ..DragConfig::default()
        });
        let t = Instant::now();
        drag.start_drag(&mut store, node, Vec3::ZERO);
        drag.end_drag(&mut store, t);

        let mut checkpoints = checkpoints;
        checkpoints.sort_by(f64::total_cmp);
        for frac in checkpoints {
            let at = t + delay.mul_f64(frac).min(delay - Duration::from_millis(1));
            prop_assert!(drag.tick(&mut store, at).is_empty());
            prop_assert!(store.fixed(node).is_some());
        }
        prop_assert_eq!(drag.tick(&mut store, t + delay), vec![node]);
        prop_assert!(store.fixed(node).is_none());
    }

    #[test]
    fn redrag_before_deadline_cancels_release(
        delay_ms in 2u64..5000,
        frac in 0.0f64..1.0,
    ) {
        let (mut store, node) = single(Vec3::ZERO);
        let delay = Duration::from_millis(delay_ms);
        let mut drag = DragCoordinator::new(DragConfig {
            unpin_delay: delay,
            ..DragConfig::default()
        });
        let t = Instant::now();
        drag.start_drag(&mut store, node, Vec3::ZERO);
        drag.end_drag(&mut store, t);

        let regrab = t + delay.mul_f64(frac).min(delay - Duration::from_millis(1));
        prop_assert!(drag.tick(&mut store, regrab).is_empty());
        drag.start_drag(&mut store, node, Vec3::ZERO);
        prop_assert_eq!(drag.pending_unpin(node), None);
        prop_assert!(drag.tick(&mut store, t + delay * 4).is_empty());
        prop_assert!(store.fixed(node).is_some());
    }
}
