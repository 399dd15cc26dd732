#![forbid(unsafe_code)]

//! State of the drag in progress.

use nodegrip_core::{NodeIndex, Vec3};

use crate::config::DragConfig;

/// Exists only while a node is being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub node: NodeIndex,
    /// Node position when the drag started.
    pub start: Vec3,
    /// Smoothed position written to the node.
    pub current: Vec3,
    /// Smoothed position before the latest update.
    pub last: Vec3,
    /// `node position - pointer world position` at drag start, so the node
    /// does not jump to the cursor.
    pub offset: Vec3,
    /// Configuration captured at drag start.
    pub config: DragConfig,
}

impl DragSession {
    pub(crate) fn new(node: NodeIndex, start: Vec3, pointer: Vec3, config: DragConfig) -> Self {
        Self {
            node,
            start,
            current: start,
            last: start,
            offset: start - pointer,
            config,
        }
    }

    /// Where the node would sit with the pointer at `pointer`.
    #[inline]
    #[must_use]
    pub fn target(&self, pointer: Vec3) -> Vec3 {
        pointer + self.offset
    }

    /// Advance one smoothing step towards the pointer; returns the delta.
    pub(crate) fn advance(&mut self, pointer: Vec3) -> Vec3 {
        let target = self.target(pointer);
        let next = self.current.lerp(target, self.config.follow_factor());
        self.last = self.current;
        self.current = next;
        next - self.last
    }

    /// Total displacement since the drag started.
    #[must_use]
    pub fn displacement(&self) -> Vec3 {
        self.current - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_keeps_grab_point() {
        let session = DragSession::new(
            NodeIndex::new(0),
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::new(12.0, 9.0, 0.0),
            DragConfig::default(),
        );
        assert_eq!(session.target(Vec3::new(12.0, 9.0, 0.0)), Vec3::new(10.0, 10.0, 0.0));
        assert_eq!(session.target(Vec3::new(22.0, 9.0, 0.0)), Vec3::new(20.0, 10.0, 0.0));
    }

    #[test]
    fn advance_applies_smoothing() {
        let mut session = DragSession::new(
            NodeIndex::new(0),
            Vec3::ZERO,
            Vec3::ZERO,
            DragConfig::default(),
        );
        let delta = session.advance(Vec3::new(10.0, 0.0, 0.0));
        assert!((session.current.x - 7.0).abs() < 1e-5);
        assert!((delta.x - 7.0).abs() < 1e-5);
        assert_eq!(session.last, Vec3::ZERO);
        assert!((session.displacement().x - 7.0).abs() < 1e-5);
    }

    #[test]
    fn zero_smoothing_follows_exactly() {
        let config = DragConfig {
            smoothing: 0.0,
            ..DragConfig::default()
        };
        let mut session = DragSession::new(NodeIndex::new(0), Vec3::ZERO, Vec3::ZERO, config);
        session.advance(Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(session.current, Vec3::new(3.0, 4.0, 0.0));
    }
}
