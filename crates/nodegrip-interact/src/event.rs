#![forbid(unsafe_code)]

//! Semantic interaction events emitted by the controller.

use std::fmt;

use nodegrip_core::{InputEvent, NodeIndex, NodeRecord, Vec2, Vec3};

/// Kind of an [`InteractionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// The cursor entered a node.
    Hover,
    /// The cursor left every node; carries the node it left.
    HoverEnd,
    /// Pointer down + up without crossing the drag threshold.
    Click,
    /// A pressed node moved past the drag threshold.
    DragStart,
    /// The dragged node's cursor moved.
    Drag,
    /// The dragged node was released.
    DragEnd,
    /// The drag was aborted (Escape, focus loss, touch cancel, detach).
    DragCancel,
    /// A node became the selection.
    Select,
    /// A node stopped being the selection.
    Deselect,
}

impl InteractionKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Hover,
        Self::HoverEnd,
        Self::Click,
        Self::DragStart,
        Self::Drag,
        Self::DragEnd,
        Self::DragCancel,
        Self::Select,
        Self::Deselect,
    ];

    /// camelCase name used by host integrations.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::HoverEnd => "hoverEnd",
            Self::Click => "click",
            Self::DragStart => "dragStart",
            Self::Drag => "drag",
            Self::DragEnd => "dragEnd",
            Self::DragCancel => "dragCancel",
            Self::Select => "select",
            Self::Deselect => "deselect",
        }
    }

    /// Whether this kind belongs to the drag lifecycle.
    #[must_use]
    pub const fn is_drag(self) -> bool {
        matches!(
            self,
            Self::DragStart | Self::Drag | Self::DragEnd | Self::DragCancel
        )
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    /// Node the interaction concerns, if any (a background click has none).
    pub node: Option<NodeIndex>,
    /// The node resolved through the node lookup, when one is registered.
    pub record: Option<NodeRecord>,
    /// Cursor position in screen pixels.
    pub screen: Vec2,
    /// Cursor position unprojected onto the interaction plane.
    pub world: Vec3,
    /// The raw input that produced this event.
    pub source: InputEvent,
}
