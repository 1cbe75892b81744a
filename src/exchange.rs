//! Exchange of field data at coupling nodes

use crate::quadrature::FaceQuadrature;
use crate::traits::{CouplingService, InterfaceGeometry};
use crate::types::{BoundaryTag, CouplingError, DataHandle, NodeId, RealScalar, Result};
use log::warn;

/// Values received for all read nodes, stored node by node
#[derive(Debug, Clone)]
pub struct ReadDataBuffer<T: RealScalar> {
    dim: usize,
    values: Vec<T>,
}

impl<T: RealScalar> ReadDataBuffer<T> {
    /// Create an empty buffer for vectors of dimension `dim`
    pub fn new(dim: usize) -> Self {
        Self { dim, values: vec![] }
    }

    /// Resize the buffer to hold `nnodes` vectors
    pub fn resize(&mut self, nnodes: usize) {
        self.values.resize(nnodes * self.dim, T::zero());
    }

    /// The dimension of the vectors
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of vectors held
    pub fn number_of_nodes(&self) -> usize {
        self.values.len() / self.dim
    }

    /// All values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The vector of the node at position `index` in the read node sequence
    pub fn vector(&self, index: usize) -> Result<&[T]> {
        let len = self.number_of_nodes();
        if index >= len {
            return Err(CouplingError::IndexOutOfRange { index, len });
        }
        Ok(&self.values[index * self.dim..(index + 1) * self.dim])
    }
}

/// Pushes solver values to the write nodes and pulls values from the read nodes
#[derive(Debug, Clone)]
pub struct DataExchanger<T: RealScalar> {
    dim: usize,
    read_data: DataHandle,
    write_data: DataHandle,
    buffer: ReadDataBuffer<T>,
}

impl<T: RealScalar> DataExchanger<T> {
    /// Create an exchanger for the given read and write data
    pub fn new(dim: usize, read_data: DataHandle, write_data: DataHandle) -> Self {
        Self {
            dim,
            read_data,
            write_data,
            buffer: ReadDataBuffer::new(dim),
        }
    }

    /// The dimension of the exchanged vectors
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The handle of the read data
    pub fn read_data(&self) -> DataHandle {
        self.read_data
    }

    /// The handle of the write data
    pub fn write_data(&self) -> DataHandle {
        self.write_data
    }

    /// The values received at the last refresh
    pub fn buffer(&self) -> &ReadDataBuffer<T> {
        &self.buffer
    }

    /// Size the read buffer for a number of read nodes
    pub fn resize_buffer(&mut self, nnodes: usize) {
        self.buffer.resize(nnodes);
    }

    /// Evaluate a field at the write quadrature points of all interface faces and send the values
    ///
    /// Node ids are consumed in order, one per quadrature point, walking the
    /// faces in the order the geometry enumerates them. Returns the number of
    /// vectors sent.
    pub fn write_all_quadrature_nodes<S, G>(
        &self,
        service: &mut S,
        geometry: &G,
        tag: BoundaryTag,
        quadrature: &FaceQuadrature<T>,
        field: &G::Field,
        write_nodes: &[NodeId],
    ) -> Result<usize>
    where
        S: CouplingService<T = T>,
        G: InterfaceGeometry<T = T>,
    {
        let mut values = vec![T::zero(); quadrature.npoints * self.dim];
        let mut ids = write_nodes.iter();
        let mut count = 0;

        for face in geometry.interface_faces(tag) {
            geometry.evaluate_field(face, &quadrature.points, field, &mut values)?;
            for value in values.chunks_exact(self.dim) {
                let id = ids.next().ok_or(CouplingError::IndexOutOfRange {
                    index: count,
                    len: write_nodes.len(),
                })?;
                service.write_vector(self.write_data, *id, value)?;
                count += 1;
            }
        }

        if count < write_nodes.len() {
            warn!(
                "{} of {} write nodes were not written",
                write_nodes.len() - count,
                write_nodes.len()
            );
        }
        Ok(count)
    }

    /// Replace the read buffer with the current values of all read nodes
    pub fn refresh<S: CouplingService<T = T>>(
        &mut self,
        service: &S,
        read_nodes: &[NodeId],
    ) -> Result<()> {
        self.buffer.resize(read_nodes.len());
        service.read_block(self.read_data, read_nodes, &mut self.buffer.values)
    }

    /// Read the current value of a single read node from the service
    pub fn read_on_quadrature_point<S: CouplingService<T = T>>(
        &self,
        service: &S,
        node: NodeId,
        value: &mut [T],
    ) -> Result<()> {
        if value.len() != self.dim {
            return Err(CouplingError::ContractViolation(format!(
                "output of length {} for a vector of dimension {}",
                value.len(),
                self.dim
            )));
        }
        service.read_vector(self.read_data, node, value)
    }

    /// The buffered value at position `index` in the read node sequence
    pub fn read_on_quadrature_point_with_id(&self, index: usize) -> Result<&[T]> {
        self.buffer.vector(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::shapes::flap_boundary;
    use crate::mesh::MeshRegistrar;
    use crate::quadrature::gauss_rule;
    use crate::scripted::{ScriptedService, ServiceCall};
    use crate::types::MeshHandle;
    use approx::*;
    use ndelement::types::ReferenceCellType;

    fn setup() -> (ScriptedService<f64>, MeshHandle, DataHandle, DataHandle) {
        let mut service = ScriptedService::new(2, 1.0, 1.0);
        let mesh = service.add_mesh("Solid-Mesh");
        let read = service.add_data("Force", mesh);
        let write = service.add_data("Displacement", mesh);
        (service, mesh, read, write)
    }

    #[test]
    fn test_write_pass() {
        let (mut service, mesh, read, write) = setup();
        let grid = flap_boundary::<f64>(1.0, 2.0, 2, 2, 1, 0);
        let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
        let nodes = MeshRegistrar::new(1)
            .register_write_mesh(&mut service, &grid, mesh, &rule)
            .unwrap();
        service.initialize().unwrap();
        service.clear_calls();

        let field = grid.interpolate(|p, v| {
            v[0] = p[1];
            v[1] = -p[0];
        });
        let exchanger = DataExchanger::new(2, read, write);
        let count = exchanger
            .write_all_quadrature_nodes(&mut service, &grid, 1, &rule, &field, nodes.node_ids())
            .unwrap();
        assert_eq!(count, nodes.len());
        assert_eq!(service.calls().len(), nodes.len());

        for node in nodes.iter() {
            let value = service.vector(write, node.id).unwrap();
            assert_relative_eq!(value[0], node.position[1], epsilon = 1e-14);
            assert_relative_eq!(value[1], -node.position[0], epsilon = 1e-14);
        }
        if let ServiceCall::WriteVector(data, id, _) = &service.calls()[0] {
            assert_eq!(*data, write);
            assert_eq!(*id, nodes.node_ids()[0]);
        } else {
            panic!("Expected a write");
        }
    }

    #[test]
    fn test_exhausted_write_nodes() {
        let (mut service, mesh, read, write) = setup();
        let grid = flap_boundary::<f64>(1.0, 1.0, 1, 1, 1, 0);
        let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
        let nodes = MeshRegistrar::new(1)
            .register_write_mesh(&mut service, &grid, mesh, &rule)
            .unwrap();
        service.initialize().unwrap();

        let field = vec![0.0; grid.field_size()];
        let exchanger = DataExchanger::new(2, read, write);
        let short = &nodes.node_ids()[..nodes.len() - 1];
        assert!(matches!(
            exchanger.write_all_quadrature_nodes(&mut service, &grid, 1, &rule, &field, short),
            Err(CouplingError::IndexOutOfRange { index, len }) if index == short.len() && len == short.len()
        ));
    }

    #[test]
    fn test_refresh_and_buffered_reads() {
        let (mut service, mesh, read, write) = setup();
        let ids = (0..3)
            .map(|i| service.register_vertex(mesh, &[i as f64, 0.0]).unwrap())
            .collect::<Vec<_>>();
        service.initialize().unwrap();
        for id in &ids {
            service
                .set_peer_vector(read, *id, &[*id as f64, 10.0 * *id as f64])
                .unwrap();
        }

        let mut exchanger = DataExchanger::new(2, read, write);
        exchanger.refresh(&service, &ids).unwrap();
        assert_eq!(exchanger.buffer().values().len(), 6);
        assert_eq!(exchanger.read_on_quadrature_point_with_id(2).unwrap(), &[2.0, 20.0]);
        assert!(matches!(
            exchanger.read_on_quadrature_point_with_id(3),
            Err(CouplingError::IndexOutOfRange { index: 3, len: 3 })
        ));

        let mut value = [0.0; 2];
        exchanger
            .read_on_quadrature_point(&service, ids[1], &mut value)
            .unwrap();
        assert_eq!(value, [1.0, 10.0]);
        assert!(exchanger
            .read_on_quadrature_point(&service, ids[1], &mut [0.0; 3])
            .is_err());
    }
}
