//! Definition of a coupling service

use crate::types::{Action, DataHandle, MeshHandle, NodeId, RealScalar, Result};

/// A coupling service that exchanges data between simulation participants.
///
/// The methods mirror the protocol of the service: meshes are set up by
/// registering vertices, then the service is initialized, and afterwards data
/// is written, the coupled simulation is advanced and data is read, once per
/// time step. Calls that exchange data or advance the simulation may block
/// until the other participants have caught up.
pub trait CouplingService {
    /// The floating point type used for coordinates and data
    type T: RealScalar;

    /// The spatial dimension the service is configured with
    fn dimensions(&self) -> usize;

    /// Get the handle of a mesh from its name
    fn mesh_handle(&self, mesh_name: &str) -> Result<MeshHandle>;

    /// Get the handle of a data field on a mesh from its name
    fn data_handle(&self, data_name: &str, mesh: MeshHandle) -> Result<DataHandle>;

    /// Register a vertex at the given position and return its id
    fn register_vertex(&mut self, mesh: MeshHandle, position: &[Self::T]) -> Result<NodeId>;

    /// Initialize the coupling and return the maximum length of the first time step
    fn initialize(&mut self) -> Result<Self::T>;

    /// Exchange the initial data written after [`Action::WriteInitialData`]
    fn initialize_data(&mut self) -> Result<()>;

    /// Check if the participant is asked to perform an action
    fn is_action_required(&self, action: Action) -> bool;

    /// Acknowledge that a required action has been performed
    fn mark_action_fulfilled(&mut self, action: Action) -> Result<()>;

    /// Check if write data is needed after a time step of the given length
    fn is_write_data_required(&self, computed_timestep_length: Self::T) -> bool;

    /// Check if new read data is available
    fn is_read_data_available(&self) -> bool;

    /// Write the vector of one node
    fn write_vector(&mut self, data: DataHandle, node: NodeId, value: &[Self::T]) -> Result<()>;

    /// Read the current vector of one node
    fn read_vector(&self, data: DataHandle, node: NodeId, value: &mut [Self::T]) -> Result<()>;

    /// Read the vectors of a set of nodes into one flat buffer
    ///
    /// The vector of `nodes[i]` is written to `values[i * dim..(i + 1) * dim]`.
    fn read_block(&self, data: DataHandle, nodes: &[NodeId], values: &mut [Self::T]) -> Result<()>;

    /// Advance the coupled simulation and return the maximum length of the next time step
    fn advance(&mut self, computed_timestep_length: Self::T) -> Result<Self::T>;

    /// Check if the coupled simulation is still running
    fn is_coupling_ongoing(&self) -> bool;

    /// End the coupling
    fn finalize(&mut self) -> Result<()>;
}
