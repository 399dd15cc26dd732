#![forbid(unsafe_code)]

//! The index↔color table owned by the hit tester.
//!
//! The table is rebuilt only by [`PickColorMap::assign`]. Lookups never
//! insert: an index outside the current assignment has no color, and a color
//! that was not issued by the current assignment decodes to nothing, even if
//! it is arithmetically valid.

use ahash::AHashMap;
use nodegrip_core::NodeIndex;

use crate::color_key::{ColorKey, MAX_PICKABLE_NODES};
use crate::error::PickError;

/// Bijective mapping between node indices and pick colors.
#[derive(Debug, Clone, Default)]
pub struct PickColorMap {
    colors: Vec<ColorKey>,
    index_by_color: AHashMap<u32, NodeIndex>,
    generation: u64,
}

impl PickColorMap {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate the mapping for `node_count` nodes.
    ///
    /// Invalidates every previously issued color. On error the previous
    /// mapping is left untouched.
    pub fn assign(&mut self, node_count: usize) -> Result<(), PickError> {
        if node_count > MAX_PICKABLE_NODES as usize {
            return Err(PickError::CapacityExceeded {
                requested: node_count,
                max: MAX_PICKABLE_NODES,
            });
        }

        self.colors.clear();
        self.colors.reserve(node_count);
        self.index_by_color.clear();
        self.index_by_color.reserve(node_count);

        for raw in 0..node_count as u32 {
            let index = NodeIndex::new(raw);
            // Bounded by the capacity check above.
            let Some(color) = ColorKey::encode(index) else {
                break;
            };
            self.colors.push(color);
            self.index_by_color.insert(color.to_u32(), index);
        }
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    /// Color issued for `index`, if it is part of the current assignment.
    #[inline]
    #[must_use]
    pub fn color_of(&self, index: NodeIndex) -> Option<ColorKey> {
        self.colors.get(index.as_usize()).copied()
    }

    /// Node registered for `color`, if any.
    #[inline]
    #[must_use]
    pub fn index_of(&self, color: ColorKey) -> Option<NodeIndex> {
        if color.is_background() {
            return None;
        }
        self.index_by_color.get(&color.to_u32()).copied()
    }

    /// Number of nodes in the current assignment.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no colors are assigned.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Incremented on every successful [`assign`](Self::assign).
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
