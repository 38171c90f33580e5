pub mod body;
pub mod edge;
pub mod face;
pub mod wire;

pub use body::{ShellData, ShellId, SolidData, SolidId};
pub use edge::{EdgeCurve, EdgeData, EdgeId, VertexData, VertexId};
pub use face::{FaceData, FaceId, FaceSurface, MaterialId};
pub use wire::{OrientedEdge, WireData, WireId};

use std::collections::HashMap;

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    solids: SlotMap<SolidId, SolidData>,
}

macro_rules! arena_access {
    ($field:ident, $id:ty, $data:ty, $add:ident, $get:ident, $get_mut:ident, $name:literal) => {
        #[doc = concat!("Inserts a ", $name, " and returns its ID.")]
        pub fn $add(&mut self, data: $data) -> $id {
            self.$field.insert(data)
        }

        #[doc = concat!("Returns the ", $name, " data.")]
        ///
        /// # Errors
        ///
        /// Returns an error if the entity is not found in the store.
        pub fn $get(&self, id: $id) -> Result<&$data, TopologyError> {
            self.$field
                .get(id)
                .ok_or_else(|| TopologyError::EntityNotFound($name.into()))
        }

        #[doc = concat!("Returns the ", $name, " data mutably.")]
        ///
        /// # Errors
        ///
        /// Returns an error if the entity is not found in the store.
        pub fn $get_mut(&mut self, id: $id) -> Result<&mut $data, TopologyError> {
            self.$field
                .get_mut(id)
                .ok_or_else(|| TopologyError::EntityNotFound($name.into()))
        }
    };
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    arena_access!(vertices, VertexId, VertexData, add_vertex, vertex, vertex_mut, "vertex");
    arena_access!(edges, EdgeId, EdgeData, add_edge, edge, edge_mut, "edge");
    arena_access!(wires, WireId, WireData, add_wire, wire, wire_mut, "wire");
    arena_access!(faces, FaceId, FaceData, add_face, face, face_mut, "face");
    arena_access!(shells, ShellId, ShellData, add_shell, shell, shell_mut, "shell");
    arena_access!(solids, SolidId, SolidData, add_solid, solid, solid_mut, "solid");

    /// Number of vertices in the store.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn point(&self, id: VertexId) -> Result<Point3, TopologyError> {
        Ok(self.vertex(id)?.point)
    }

    /// Shells of a solid, outer first.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not found.
    pub fn solid_shells(&self, id: SolidId) -> Result<Vec<ShellId>, TopologyError> {
        Ok(self.solid(id)?.shells().collect())
    }

    /// Every face of a solid, outer shell first, in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its shells is not found.
    pub fn solid_faces(&self, id: SolidId) -> Result<Vec<FaceId>, TopologyError> {
        let mut faces = Vec::new();
        for shell in self.solid_shells(id)? {
            faces.extend_from_slice(&self.shell(shell)?.faces);
        }
        Ok(faces)
    }

    /// Vertex where an oriented edge starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found.
    pub fn oriented_start(&self, oe: OrientedEdge) -> Result<VertexId, TopologyError> {
        let e = self.edge(oe.edge)?;
        Ok(if oe.forward { e.start } else { e.end })
    }

    /// Vertex where an oriented edge ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found.
    pub fn oriented_end(&self, oe: OrientedEdge) -> Result<VertexId, TopologyError> {
        let e = self.edge(oe.edge)?;
        Ok(if oe.forward { e.end } else { e.start })
    }

    /// Start vertex of each oriented edge of a wire, in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire or one of its edges is not found.
    pub fn wire_vertices(&self, id: WireId) -> Result<Vec<VertexId>, TopologyError> {
        self.wire(id)?
            .edges
            .iter()
            .map(|oe| self.oriented_start(*oe))
            .collect()
    }

    /// Number of face-side uses of every edge of a solid.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced entity is missing.
    pub fn edge_use_counts(&self, id: SolidId) -> Result<HashMap<EdgeId, usize>, TopologyError> {
        let mut counts = HashMap::new();
        for face in self.solid_faces(id)? {
            for wire in self.face(face)?.wires() {
                for oe in &self.wire(wire)?.edges {
                    *counts.entry(oe.edge).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }

    /// Use count of the first edge of a solid not shared by exactly two
    /// face sides, or `None` when every edge is.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced entity is missing.
    pub fn open_edge_uses(&self, id: SolidId) -> Result<Option<usize>, TopologyError> {
        Ok(self.edge_use_counts(id)?.into_values().find(|&uses| uses != 2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;

    #[test]
    fn missing_entity_is_reported() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(VertexData::new(Point3::origin()));
        let other = TopologyStore::new();
        assert!(other.vertex(v).is_err());
        assert!(store.vertex_mut(v).is_ok());
    }

    #[test]
    fn box_edges_are_used_twice() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.solid_faces(solid).unwrap().len(), 6);
        let counts = store.edge_use_counts(solid).unwrap();
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&c| c == 2));
        assert_eq!(store.open_edge_uses(solid).unwrap(), None);

        let shell = store.solid(solid).unwrap().outer_shell;
        store.shell_mut(shell).unwrap().faces.pop();
        assert_eq!(store.open_edge_uses(solid).unwrap(), Some(1));
    }

    #[test]
    fn wire_vertices_follow_orientation() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let face = store.solid_faces(solid).unwrap()[0];
        let wire = store.face(face).unwrap().outer_wire;
        let verts = store.wire_vertices(wire).unwrap();
        let edges = &store.wire(wire).unwrap().edges;
        for (i, oe) in edges.iter().enumerate() {
            let next = verts[(i + 1) % verts.len()];
            assert_eq!(store.oriented_end(*oe).unwrap(), next);
        }
    }
}
