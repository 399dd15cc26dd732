#![forbid(unsafe_code)]

//! Logging policy checks for the interaction session.
//!
//! - Listener panics are logged at WARN with the listener id and kind.
//! - Drag lifecycle and pin changes are logged at DEBUG with a `node` field.
//! - Per-move updates stay at TRACE.
//! - Picks run inside a `pick` span.
//!
//! Run:
//!   cargo test -p nodegrip --test log_capture

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nodegrip::prelude::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use web_time::Instant;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
            parent_span_name,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message() == message).collect()
}

fn session() -> (GraphInteraction, VecNodeStore) {
    let positions = vec![Vec3::new(50.0, 50.0, 0.0)];
    let mut s = GraphInteraction::software(InteractionConfig::default()).unwrap();
    s.set_camera(Camera::screen_space(Viewport::new(200.0, 200.0)));
    s.assign_colors(positions.len()).unwrap();
    s.sync_instances(&InstanceSnapshot::from_positions(&positions, 4.0));
    (s, VecNodeStore::new(positions))
}

fn drag(s: &mut GraphInteraction, store: &mut VecNodeStore) {
    let t = Instant::now();
    s.handle(store, &PointerEvent::down(50.0, 50.0).into(), t);
    s.handle(store, &PointerEvent::moved(60.0, 50.0).into(), t);
    s.handle(store, &PointerEvent::moved(70.0, 50.0).into(), t);
    s.handle(store, &PointerEvent::up(70.0, 50.0).into(), t);
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn listener_panic_is_warned_and_isolated() {
    let (mut s, mut store) = session();
    s.on(InteractionKind::Hover, |_| panic!("listener bug"));
    let hits = std::rc::Rc::new(std::cell::Cell::new(0));
    let h = hits.clone();
    s.on_any(move |_| h.set(h.get() + 1));

    let events = with_captured_events(|| {
        s.handle(&mut store, &PointerEvent::moved(50.0, 50.0).into(), Instant::now());
    });

    assert_eq!(hits.get(), 1);
    assert_eq!(s.controller().listener_failures(), 1);
    let warnings = find(&events, "listener panicked; continuing dispatch");
    assert_eq!(warnings.len(), 1);
    let warning = warnings[0];
    assert_eq!(warning.level, tracing::Level::WARN);
    assert_eq!(warning.fields.get("kind").map(String::as_str), Some("Hover"));
    assert!(warning.fields.contains_key("listener"));
    assert_eq!(warning.parent_span_name.as_deref(), Some("controller.handle"));
}

#[test]
fn drag_lifecycle_levels() {
    let (mut s, mut store) = session();
    let events = with_captured_events(|| drag(&mut s, &mut store));

    for message in ["drag started", "drag ended", "node pinned", "unpin scheduled"] {
        let matching = find(&events, message);
        assert!(!matching.is_empty(), "missing '{message}'");
        for event in matching {
            assert_eq!(event.level, tracing::Level::DEBUG, "'{message}'");
            assert!(event.fields.contains_key("node"), "'{message}' lacks node");
        }
    }
    let updates = find(&events, "drag update");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].level, tracing::Level::TRACE);
}

#[test]
fn picks_are_spanned() {
    let (mut s, _) = session();
    let events = with_captured_events(|| {
        s.pick(50.0, 50.0);
    });
    let hits = find(&events, "pick hit");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].parent_span_name.as_deref(), Some("pick"));
    assert_eq!(hits[0].fields.get("node").map(String::as_str), Some("0"));
}

#[test]
fn capacity_rejection_is_warned() {
    let (mut s, _) = session();
    let events = with_captured_events(|| {
        assert!(s.assign_colors(1 << 24).is_err());
    });
    let warnings = find(&events, "pick color assignment rejected");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, tracing::Level::WARN);
}
