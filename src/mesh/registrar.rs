//! Registration of coupling meshes

use crate::mesh::{FaceNodeIndex, InterfaceMesh};
use crate::quadrature::FaceQuadrature;
use crate::traits::{CouplingService, InterfaceGeometry};
use crate::types::{BoundaryTag, CouplingError, MeshHandle, MeshRole, RealScalar, Result};
use log::{debug, info};

/// Registers the quadrature points of the tagged boundary as coupling nodes.
#[derive(Debug, Clone, Copy)]
pub struct MeshRegistrar {
    tag: BoundaryTag,
}

impl MeshRegistrar {
    /// Create a registrar for the faces carrying `tag`
    pub fn new(tag: BoundaryTag) -> Self {
        Self { tag }
    }

    /// The boundary tag of the interface
    pub fn tag(&self) -> BoundaryTag {
        self.tag
    }

    /// Check that the solver dimension can be coupled with the service
    pub fn check_dimension<S: CouplingService>(service: &S, solver_dimension: usize) -> Result<()> {
        if solver_dimension != service.dimensions() {
            return Err(CouplingError::ConfigurationMismatch(format!(
                "the solver works in {solver_dimension}D, but the coupling service is configured \
                 for {}D",
                service.dimensions()
            )));
        }
        if solver_dimension < 2 {
            return Err(CouplingError::ConfigurationMismatch(
                "coupling meshes must be at least two-dimensional".to_string(),
            ));
        }
        Ok(())
    }

    /// Register the write mesh
    pub fn register_write_mesh<T, S, G>(
        &self,
        service: &mut S,
        geometry: &G,
        mesh: MeshHandle,
        quadrature: &FaceQuadrature<T>,
    ) -> Result<InterfaceMesh<T>>
    where
        T: RealScalar,
        S: CouplingService<T = T>,
        G: InterfaceGeometry<T = T>,
    {
        self.register(service, geometry, mesh, quadrature, MeshRole::Write, None)
    }

    /// Register the read mesh and index its nodes by face
    pub fn register_read_mesh<T, S, G>(
        &self,
        service: &mut S,
        geometry: &G,
        mesh: MeshHandle,
        quadrature: &FaceQuadrature<T>,
    ) -> Result<(InterfaceMesh<T>, FaceNodeIndex)>
    where
        T: RealScalar,
        S: CouplingService<T = T>,
        G: InterfaceGeometry<T = T>,
    {
        let mut face_index = FaceNodeIndex::default();
        let nodes = self.register(
            service,
            geometry,
            mesh,
            quadrature,
            MeshRole::Read,
            Some(&mut face_index),
        )?;
        Ok((nodes, face_index))
    }

    fn register<T, S, G>(
        &self,
        service: &mut S,
        geometry: &G,
        mesh: MeshHandle,
        quadrature: &FaceQuadrature<T>,
        role: MeshRole,
        mut face_index: Option<&mut FaceNodeIndex>,
    ) -> Result<InterfaceMesh<T>>
    where
        T: RealScalar,
        S: CouplingService<T = T>,
        G: InterfaceGeometry<T = T>,
    {
        let dim = geometry.physical_dimension();
        Self::check_dimension(service, dim)?;

        let mut nodes = InterfaceMesh::new(role, mesh, dim);
        let mut vertices = vec![T::zero(); quadrature.npoints * dim];

        for face in geometry.interface_faces(self.tag) {
            let face_type = geometry.face_type(face);
            if face_type != quadrature.cell_type {
                return Err(CouplingError::ConfigurationMismatch(format!(
                    "face {face} is a {face_type:?}, but the {role} quadrature is defined on a {:?}",
                    quadrature.cell_type
                )));
            }
            geometry.map_to_physical(face, &quadrature.points, &mut vertices)?;

            if let Some(index) = face_index.as_deref_mut() {
                index.insert(face, nodes.len(), quadrature.npoints)?;
            }
            for vertex in vertices.chunks_exact(dim) {
                let id = service.register_vertex(mesh, vertex)?;
                nodes.push(id, vertex);
            }
        }

        if nodes.is_empty() {
            debug!("No faces carry the interface tag {}", self.tag);
        }
        info!("Number of {role} nodes: {}", nodes.len());
        Ok(nodes)
    }
}
