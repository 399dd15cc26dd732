#![forbid(unsafe_code)]

//! Drag notifications.

use nodegrip_core::{NodeIndex, Vec3};

/// Kind of a [`DragEvent`], used as the listener filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    Start,
    Move,
    End,
    Cancel,
}

/// Position updates produced by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// A drag began; `position` is the node's start position.
    Start { node: NodeIndex, position: Vec3 },
    /// The smoothed position advanced by `delta`.
    Move {
        node: NodeIndex,
        position: Vec3,
        delta: Vec3,
    },
    /// The drag finished at `position`.
    End { node: NodeIndex, position: Vec3 },
    /// The drag was aborted and the node restored to `position`.
    Cancel { node: NodeIndex, position: Vec3 },
}

impl DragEvent {
    /// The event's kind.
    #[must_use]
    pub const fn kind(&self) -> DragEventKind {
        match self {
            Self::Start { .. } => DragEventKind::Start,
            Self::Move { .. } => DragEventKind::Move,
            Self::End { .. } => DragEventKind::End,
            Self::Cancel { .. } => DragEventKind::Cancel,
        }
    }

    /// The dragged node.
    #[must_use]
    pub const fn node(&self) -> NodeIndex {
        match self {
            Self::Start { node, .. }
            | Self::Move { node, .. }
            | Self::End { node, .. }
            | Self::Cancel { node, .. } => *node,
        }
    }

    /// Node position carried by the event.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        match self {
            Self::Start { position, .. }
            | Self::Move { position, .. }
            | Self::End { position, .. }
            | Self::Cancel { position, .. } => *position,
        }
    }

    /// Per-update delta; zero for everything but `Move`.
    #[must_use]
    pub const fn delta(&self) -> Vec3 {
        match self {
            Self::Move { delta, .. } => *delta,
            _ => Vec3::ZERO,
        }
    }
}
