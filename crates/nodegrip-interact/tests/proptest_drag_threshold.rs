//! Property-based invariant tests for click/drag classification.
//!
//! 1. A press released within the threshold is exactly one `Click`, never a
//!    drag.
//! 2. A press that moves beyond the threshold yields exactly one `DragStart`
//!    and, on release, exactly one `DragEnd` and no `Click`.
//! 3. Every `DragStart` is balanced by a `DragEnd` or `DragCancel`.
//! 4. Moves inside one throttle period trigger at most one hover lookup.

use std::cell::Cell;
use std::rc::Rc;

use nodegrip_core::{InputEvent, KeyCode, KeyEvent, NodeIndex, PointerEvent};
use nodegrip_interact::{ControllerConfig, InteractionKind, ManipulationController};
use proptest::prelude::*;
use web_time::{Duration, Instant};

// ── Helpers ─────────────────────────────────────────────────────────────

fn controller(threshold: f32) -> ManipulationController {
    let mut ctl = ManipulationController::new(ControllerConfig {
        drag_threshold: threshold,
        ..ControllerConfig::default()
    });
    ctl.set_lookup(|_, _| Some(NodeIndex::new(0)));
    ctl
}

fn count(events: &[nodegrip_interact::InteractionEvent], kind: InteractionKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

/// `(threshold, dx, dy)` with `|(dx, dy)|` strictly inside the threshold.
fn threshold_and_offset() -> impl Strategy<Value = (f32, f32, f32)> {
    (1.0f32..20.0, 0.0f32..std::f32::consts::TAU, 0.0f32..0.99).prop_map(
        |(threshold, angle, frac)| {
            let r = threshold * frac;
            (threshold, r * angle.cos(), r * angle.sin())
        },
    )
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Within threshold → click
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn within_threshold_is_click(
        (threshold, dx, dy) in threshold_and_offset(),
        x in 0.0f32..500.0,
        y in 0.0f32..500.0,
    ) {
        let mut ctl = controller(threshold);
        let t = Instant::now();
        let mut events = ctl.handle(&PointerEvent::down(x, y).into(), t);
        events.extend(ctl.handle(&PointerEvent::moved(x + dx, y + dy).into(), t));
        events.extend(ctl.handle(&PointerEvent::up(x + dx, y + dy).into(), t));
        prop_assert_eq!(count(&events, InteractionKind::Click), 1);
        prop_assert_eq!(count(&events, InteractionKind::DragStart), 0);
        prop_assert_eq!(count(&events, InteractionKind::DragEnd), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Beyond threshold → one balanced drag
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn beyond_threshold_is_one_drag(
        threshold in 0.0f32..20.0,
        path in proptest::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 1..20),
        cancel in any::<bool>(),
    ) {
        let mut ctl = controller(threshold);
        let t = Instant::now();
        let mut events = ctl.handle(&PointerEvent::down(0.0, 0.0).into(), t);
        // Guarantee one excursion past the threshold.
        events.extend(ctl.handle(&PointerEvent::moved(threshold + 1.0, 0.0).into(), t));
        for (x, y) in &path {
            events.extend(ctl.handle(&PointerEvent::moved(*x, *y).into(), t));
        }
        let finish: InputEvent = if cancel {
            KeyEvent::new(KeyCode::Escape).into()
        } else {
            PointerEvent::up(0.0, 0.0).into()
        };
        events.extend(ctl.handle(&finish, t));

        prop_assert_eq!(count(&events, InteractionKind::DragStart), 1);
        prop_assert_eq!(count(&events, InteractionKind::Drag), path.len());
        prop_assert_eq!(
            count(&events, InteractionKind::DragEnd) + count(&events, InteractionKind::DragCancel),
            1
        );
        prop_assert_eq!(count(&events, InteractionKind::Click), 0);
        prop_assert!(!ctl.is_dragging());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Hover throttle
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn moves_within_period_do_one_lookup(
        gaps in proptest::collection::vec(0u64..4, 1..10),
    ) {
        let calls = Rc::new(Cell::new(0u32));
        let seen = calls.clone();
        let mut ctl = ManipulationController::default();
        ctl.set_lookup(move |_, _| {
            seen.set(seen.get() + 1);
            None
        });
        let start = Instant::now();
        let mut elapsed = 0u64;
        for (i, gap) in gaps.iter().enumerate() {
            elapsed += gap;
            let at = start + Duration::from_millis(elapsed);
            ctl.handle(&PointerEvent::moved(i as f32, 0.0).into(), at);
        }
        // At most 9 gaps of 3ms stay inside one 33ms period.
        prop_assert!(elapsed < 33);
        prop_assert_eq!(calls.get(), 1);
    }
}
