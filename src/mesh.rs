//! Coupling meshes
//!
//! A coupling mesh is the ordered list of nodes registered with the coupling
//! service for one role (read or write). Node `i` belongs to the `i`-th
//! quadrature point in face-then-point order over the tagged boundary faces.

mod registrar;

pub use registrar::MeshRegistrar;

use crate::types::{CouplingError, FaceId, MeshHandle, MeshRole, NodeId, RealScalar, Result};
use std::collections::HashMap;
use std::ops::Range;

/// A node of a coupling mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceNode<'a, T: RealScalar> {
    /// The id assigned by the coupling service
    pub id: NodeId,
    /// The physical position at registration
    pub position: &'a [T],
}

/// The nodes registered for one coupling mesh
#[derive(Debug, Clone)]
pub struct InterfaceMesh<T: RealScalar> {
    role: MeshRole,
    handle: MeshHandle,
    dim: usize,
    node_ids: Vec<NodeId>,
    positions: Vec<T>,
}

impl<T: RealScalar> InterfaceMesh<T> {
    pub(crate) fn new(role: MeshRole, handle: MeshHandle, dim: usize) -> Self {
        Self {
            role,
            handle,
            dim,
            node_ids: vec![],
            positions: vec![],
        }
    }

    pub(crate) fn push(&mut self, id: NodeId, position: &[T]) {
        debug_assert_eq!(position.len(), self.dim);
        self.node_ids.push(id);
        self.positions.extend_from_slice(position);
    }

    /// The role of the mesh
    pub fn role(&self) -> MeshRole {
        self.role
    }

    /// The handle of the mesh
    pub fn handle(&self) -> MeshHandle {
        self.handle
    }

    /// The spatial dimension of the node positions
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of nodes
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    /// Check if the mesh has no nodes
    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// The node ids in registration order
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    /// The node positions, stored node by node
    pub fn positions(&self) -> &[T] {
        &self.positions
    }

    /// Get a node from its index in registration order
    pub fn node(&self, index: usize) -> Option<InterfaceNode<'_, T>> {
        self.node_ids.get(index).map(|id| InterfaceNode {
            id: *id,
            position: &self.positions[index * self.dim..(index + 1) * self.dim],
        })
    }

    /// Iterate over the nodes in registration order
    pub fn iter(&self) -> impl Iterator<Item = InterfaceNode<'_, T>> {
        self.node_ids
            .iter()
            .zip(self.positions.chunks_exact(self.dim))
            .map(|(id, position)| InterfaceNode { id: *id, position })
    }
}

/// Lookup from a face to the nodes registered for it on the read mesh
#[derive(Debug, Clone, Default)]
pub struct FaceNodeIndex {
    ranges: HashMap<FaceId, (usize, usize)>,
}

impl FaceNodeIndex {
    pub(crate) fn insert(&mut self, face: FaceId, offset: usize, count: usize) -> Result<()> {
        if self.ranges.insert(face, (offset, count)).is_some() {
            return Err(CouplingError::ContractViolation(format!(
                "face {face} is enumerated more than once"
            )));
        }
        Ok(())
    }

    /// The position of the first node of a face in the read node sequence
    pub fn offset(&self, face: FaceId) -> Option<usize> {
        self.ranges.get(&face).map(|(offset, _)| *offset)
    }

    /// The positions of all nodes of a face in the read node sequence
    pub fn node_range(&self, face: FaceId) -> Option<Range<usize>> {
        self.ranges
            .get(&face)
            .map(|(offset, count)| *offset..*offset + *count)
    }

    /// The number of faces
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if no faces are indexed
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interface_mesh() {
        let mut mesh = InterfaceMesh::<f64>::new(MeshRole::Write, MeshHandle(2), 2);
        mesh.push(7, &[0.0, 1.0]);
        mesh.push(8, &[0.5, 1.0]);
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.node_ids(), &[7, 8]);
        assert_eq!(mesh.node(1).unwrap().position, &[0.5, 1.0]);
        assert!(mesh.node(2).is_none());
        let ids = mesh.iter().map(|n| n.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn test_face_node_index() {
        let mut index = FaceNodeIndex::default();
        index.insert(4, 0, 3).unwrap();
        index.insert(1, 3, 3).unwrap();
        assert_eq!(index.offset(1), Some(3));
        assert_eq!(index.node_range(4), Some(0..3));
        assert_eq!(index.offset(2), None);
        assert!(index.insert(4, 6, 3).is_err());
    }
}
