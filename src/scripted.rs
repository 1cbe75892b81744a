//! An in-process coupling service following a fixed script
//!
//! [`ScriptedService`] plays the part of the coupling service and of all other
//! participants. Coupling windows have a fixed length, implicit coupling is
//! emulated by a fixed number of iterations per window, and the data of the
//! other participants is set directly. Every call that changes the state of
//! the coupling is recorded so that the interaction of a solver with the
//! service can be inspected.

use crate::traits::CouplingService;
use crate::types::{Action, CouplingError, DataHandle, MeshHandle, NodeId, RealScalar, Result};
use log::debug;
use std::collections::HashSet;

/// A call made to a [`ScriptedService`]
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall<T: RealScalar> {
    /// A vertex was registered
    RegisterVertex(MeshHandle, NodeId),
    /// The coupling was initialized
    Initialize,
    /// The initial data was exchanged
    InitializeData,
    /// An action was acknowledged
    MarkActionFulfilled(Action),
    /// A single vector was written
    WriteVector(DataHandle, NodeId, Vec<T>),
    /// The coupled simulation was advanced by a time step
    Advance(T),
    /// The coupling was ended
    Finalize,
}

struct ScriptedMesh<T: RealScalar> {
    name: String,
    positions: Vec<T>,
}

struct ScriptedData<T: RealScalar> {
    name: String,
    mesh: MeshHandle,
    values: Vec<T>,
}

/// A coupling service that follows a fixed script
pub struct ScriptedService<T: RealScalar> {
    dim: usize,
    window_size: T,
    end_time: T,
    iterations: usize,
    initial_data: bool,
    write_data_required: Option<bool>,

    meshes: Vec<ScriptedMesh<T>>,
    data: Vec<ScriptedData<T>>,

    time: T,
    window_time: T,
    iteration: usize,
    required: HashSet<Action>,
    read_data_available: bool,
    initialized: bool,
    finalized: bool,
    calls: Vec<ServiceCall<T>>,
}

impl<T: RealScalar> ScriptedService<T> {
    /// Create a service with explicit coupling windows of length `window_size`, ending at `end_time`
    pub fn new(dim: usize, window_size: T, end_time: T) -> Self {
        Self {
            dim,
            window_size,
            end_time,
            iterations: 1,
            initial_data: false,
            write_data_required: None,
            meshes: vec![],
            data: vec![],
            time: T::zero(),
            window_time: T::zero(),
            iteration: 0,
            required: HashSet::new(),
            read_data_available: false,
            initialized: false,
            finalized: false,
            calls: vec![],
        }
    }

    /// Add a mesh
    pub fn add_mesh(&mut self, name: impl Into<String>) -> MeshHandle {
        self.meshes.push(ScriptedMesh {
            name: name.into(),
            positions: vec![],
        });
        MeshHandle(self.meshes.len() as i32 - 1)
    }

    /// Add a data field on a mesh
    pub fn add_data(&mut self, name: impl Into<String>, mesh: MeshHandle) -> DataHandle {
        self.data.push(ScriptedData {
            name: name.into(),
            mesh,
            values: vec![],
        });
        DataHandle(self.data.len() as i32 - 1)
    }

    /// Ask for initial data at initialization
    pub fn set_initial_data_required(&mut self, initial_data: bool) {
        self.initial_data = initial_data;
    }

    /// Emulate implicit coupling with a fixed number of iterations per window
    ///
    /// Every window is repeated until it has been computed `iterations` times.
    pub fn set_implicit_iterations(&mut self, iterations: usize) {
        self.iterations = iterations.max(1);
    }

    /// Override whether write data is required, regardless of the window position
    pub fn set_write_data_required(&mut self, required: Option<bool>) {
        self.write_data_required = required;
    }

    /// Set the vector of a node, as another participant would
    pub fn set_peer_vector(&mut self, data: DataHandle, node: NodeId, value: &[T]) -> Result<()> {
        let range = self.node_range(data, node)?;
        if value.len() != self.dim {
            return Err(CouplingError::Service(format!(
                "vector of dimension {} set on a {}D mesh",
                value.len(),
                self.dim
            )));
        }
        self.data[data.0 as usize].values[range].copy_from_slice(value);
        Ok(())
    }

    /// The current vector of a node
    pub fn vector(&self, data: DataHandle, node: NodeId) -> Result<&[T]> {
        let range = self.node_range(data, node)?;
        Ok(&self.data[data.0 as usize].values[range])
    }

    /// The positions of the vertices of a mesh, stored vertex by vertex
    pub fn mesh_positions(&self, mesh: MeshHandle) -> &[T] {
        &self.meshes[mesh.0 as usize].positions
    }

    /// The number of vertices of a mesh
    pub fn vertex_count(&self, mesh: MeshHandle) -> usize {
        self.meshes[mesh.0 as usize].positions.len() / self.dim
    }

    /// The calls made so far
    pub fn calls(&self) -> &[ServiceCall<T>] {
        &self.calls
    }

    /// Forget the calls made so far
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The time at the start of the current window
    pub fn time(&self) -> T {
        self.time
    }

    /// The iteration within the current window
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Check if the coupling has been ended
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn tolerance(&self) -> T {
        self.window_size * T::from(1e-10).unwrap()
    }

    fn data_entry(&self, data: DataHandle) -> Result<&ScriptedData<T>> {
        usize::try_from(data.0)
            .ok()
            .and_then(|i| self.data.get(i))
            .ok_or_else(|| CouplingError::Service(format!("unknown data handle {}", data.0)))
    }

    fn node_range(&self, data: DataHandle, node: NodeId) -> Result<std::ops::Range<usize>> {
        let entry = self.data_entry(data)?;
        let nvertices = self.vertex_count(entry.mesh);
        match usize::try_from(node) {
            Ok(n) if n < nvertices && entry.values.len() == nvertices * self.dim => {
                Ok(n * self.dim..(n + 1) * self.dim)
            }
            _ => Err(CouplingError::Service(format!(
                "vertex {node} is not available for data '{}'",
                entry.name
            ))),
        }
    }

    fn check_running(&self) -> Result<()> {
        if !self.initialized {
            Err(CouplingError::Service("the coupling is not initialized".to_string()))
        } else if self.finalized {
            Err(CouplingError::Service("the coupling has been finalized".to_string()))
        } else {
            Ok(())
        }
    }
}

impl<T: RealScalar> CouplingService for ScriptedService<T> {
    type T = T;

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn mesh_handle(&self, mesh_name: &str) -> Result<MeshHandle> {
        self.meshes
            .iter()
            .position(|m| m.name == mesh_name)
            .map(|i| MeshHandle(i as i32))
            .ok_or_else(|| CouplingError::Service(format!("unknown mesh '{mesh_name}'")))
    }

    fn data_handle(&self, data_name: &str, mesh: MeshHandle) -> Result<DataHandle> {
        self.data
            .iter()
            .position(|d| d.name == data_name && d.mesh == mesh)
            .map(|i| DataHandle(i as i32))
            .ok_or_else(|| {
                CouplingError::Service(format!(
                    "unknown data '{data_name}' on mesh {}",
                    mesh.0
                ))
            })
    }

    fn register_vertex(&mut self, mesh: MeshHandle, position: &[T]) -> Result<NodeId> {
        if self.initialized {
            return Err(CouplingError::Service(
                "vertices must be registered before initialization".to_string(),
            ));
        }
        if position.len() != self.dim {
            return Err(CouplingError::Service(format!(
                "vertex of dimension {} on a {}D mesh",
                position.len(),
                self.dim
            )));
        }
        let entry = self
            .meshes
            .get_mut(mesh.0 as usize)
            .ok_or_else(|| CouplingError::Service(format!("unknown mesh handle {}", mesh.0)))?;
        entry.positions.extend_from_slice(position);
        let id = (entry.positions.len() / self.dim - 1) as NodeId;
        self.calls.push(ServiceCall::RegisterVertex(mesh, id));
        Ok(id)
    }

    fn initialize(&mut self) -> Result<T> {
        if self.initialized {
            return Err(CouplingError::Service("initialized twice".to_string()));
        }
        for d in self.data.iter_mut() {
            let nvertices = self.meshes[d.mesh.0 as usize].positions.len() / self.dim;
            d.values.resize(nvertices * self.dim, T::zero());
        }
        self.initialized = true;
        if self.initial_data {
            self.required.insert(Action::WriteInitialData);
        }
        if self.iterations > 1 {
            self.required.insert(Action::WriteIterationCheckpoint);
        }
        self.calls.push(ServiceCall::Initialize);
        debug!("Scripted coupling initialized with window size {:?}", self.window_size);
        Ok(self.window_size)
    }

    fn initialize_data(&mut self) -> Result<()> {
        self.check_running()?;
        if self.required.contains(&Action::WriteInitialData) {
            return Err(CouplingError::Service(
                "initial data has not been written".to_string(),
            ));
        }
        self.read_data_available = true;
        self.calls.push(ServiceCall::InitializeData);
        Ok(())
    }

    fn is_action_required(&self, action: Action) -> bool {
        self.required.contains(&action)
    }

    fn mark_action_fulfilled(&mut self, action: Action) -> Result<()> {
        if !self.required.remove(&action) {
            return Err(CouplingError::Service(format!(
                "action '{action}' was not required"
            )));
        }
        self.calls.push(ServiceCall::MarkActionFulfilled(action));
        Ok(())
    }

    fn is_write_data_required(&self, computed_timestep_length: T) -> bool {
        self.write_data_required.unwrap_or_else(|| {
            self.window_time + computed_timestep_length >= self.window_size - self.tolerance()
        })
    }

    fn is_read_data_available(&self) -> bool {
        self.read_data_available
    }

    fn write_vector(&mut self, data: DataHandle, node: NodeId, value: &[T]) -> Result<()> {
        self.check_running()?;
        let range = self.node_range(data, node)?;
        if value.len() != self.dim {
            return Err(CouplingError::Service(format!(
                "vector of dimension {} written to a {}D mesh",
                value.len(),
                self.dim
            )));
        }
        self.data[data.0 as usize].values[range].copy_from_slice(value);
        self.calls
            .push(ServiceCall::WriteVector(data, node, value.to_vec()));
        Ok(())
    }

    fn read_vector(&self, data: DataHandle, node: NodeId, value: &mut [T]) -> Result<()> {
        self.check_running()?;
        let range = self.node_range(data, node)?;
        value.copy_from_slice(&self.data[data.0 as usize].values[range]);
        Ok(())
    }

    fn read_block(&self, data: DataHandle, nodes: &[NodeId], values: &mut [T]) -> Result<()> {
        self.check_running()?;
        if values.len() != nodes.len() * self.dim {
            return Err(CouplingError::Service(format!(
                "buffer of length {} for {} vectors",
                values.len(),
                nodes.len()
            )));
        }
        for (node, value) in nodes.iter().zip(values.chunks_exact_mut(self.dim)) {
            let range = self.node_range(data, *node)?;
            value.copy_from_slice(&self.data[data.0 as usize].values[range]);
        }
        Ok(())
    }

    fn advance(&mut self, computed_timestep_length: T) -> Result<T> {
        self.check_running()?;
        if let Some(action) = self.required.iter().next() {
            return Err(CouplingError::Service(format!(
                "action '{action}' has not been fulfilled"
            )));
        }
        let remaining = self.window_size - self.window_time;
        if computed_timestep_length > remaining + self.tolerance() {
            return Err(CouplingError::Service(format!(
                "time step {computed_timestep_length:?} exceeds the remaining window {remaining:?}"
            )));
        }
        self.calls
            .push(ServiceCall::Advance(computed_timestep_length));

        self.window_time = self.window_time + computed_timestep_length;
        if self.window_time >= self.window_size - self.tolerance() {
            self.window_time = T::zero();
            self.read_data_available = true;
            if self.iteration + 1 < self.iterations {
                self.iteration += 1;
                self.required.insert(Action::ReadIterationCheckpoint);
            } else {
                self.iteration = 0;
                self.time = self.time + self.window_size;
                if self.iterations > 1 && self.is_coupling_ongoing() {
                    self.required.insert(Action::WriteIterationCheckpoint);
                }
            }
        } else {
            self.read_data_available = false;
        }
        Ok(self.window_size - self.window_time)
    }

    fn is_coupling_ongoing(&self) -> bool {
        !self.finalized && self.time < self.end_time - self.tolerance()
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CouplingError::Service("finalized twice".to_string()));
        }
        self.finalized = true;
        self.calls.push(ServiceCall::Finalize);
        Ok(())
    }
}
