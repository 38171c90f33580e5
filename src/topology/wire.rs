use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Key of a wire in the topology store.
    pub struct WireId;
}

/// An edge as used by one loop, with the direction it is walked in.
#[derive(Debug, Clone, Copy)]
pub struct OrientedEdge {
    pub edge: EdgeId,
    /// `true` walks the edge from its start vertex to its end vertex.
    pub forward: bool,
}

impl OrientedEdge {
    #[must_use]
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        Self { edge, forward }
    }

    /// The same edge walked the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self::new(self.edge, !self.forward)
    }
}

/// A chain of oriented edges. Face boundaries are always closed chains.
#[derive(Debug, Clone)]
pub struct WireData {
    pub edges: Vec<OrientedEdge>,
    pub is_closed: bool,
}

impl WireData {
    /// A loop that returns to its first vertex.
    #[must_use]
    pub fn closed(edges: Vec<OrientedEdge>) -> Self {
        Self { edges, is_closed: true }
    }
}
