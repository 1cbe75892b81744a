//! Coupling session

use crate::checkpoint::CheckpointStore;
use crate::config::AdapterConfiguration;
use crate::exchange::DataExchanger;
use crate::mesh::{FaceNodeIndex, InterfaceMesh, MeshRegistrar};
use crate::quadrature::{equidistant_rule, FaceQuadrature};
use crate::traits::{CouplingService, InterfaceGeometry, TimeSource};
use crate::types::{
    Action, BoundaryTag, CouplingError, FaceId, NodeId, RealScalar, Result, Topology,
};
use log::{debug, info, warn};

/// The lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, but not yet connected to the coupling
    Uninitialized,
    /// Connected; the coupled simulation can be advanced
    Initialized,
    /// The coupling has been ended
    Finalized,
}

/// The coupling interface established at initialization
struct Interface<T: RealScalar> {
    write_quadrature: FaceQuadrature<T>,
    write_mesh: InterfaceMesh<T>,
    read_mesh: InterfaceMesh<T>,
    face_index: FaceNodeIndex,
    exchanger: DataExchanger<T>,
}

/// A coupling session of one solver participant.
///
/// The session owns the coupling service. At initialization it registers the
/// quadrature points of the interface faces as coupling nodes; afterwards
/// each call to [`CouplingSession::advance`] sends the solver field at the
/// write nodes and receives the values at the read nodes. The state vectors
/// stored for implicit coupling have type `V`.
pub struct CouplingSession<S: CouplingService, V: Clone = Vec<<S as CouplingService>::T>> {
    service: S,
    config: AdapterConfiguration,
    registrar: MeshRegistrar,
    topology: Topology,
    state: SessionState,
    interface: Option<Interface<S::T>>,
    checkpoints: CheckpointStore<V, S::T>,
    max_time_step_length: S::T,
}

impl<S: CouplingService, V: Clone> CouplingSession<S, V> {
    /// Create a session coupling the faces carrying `interface_tag`
    pub fn new(
        service: S,
        config: &AdapterConfiguration,
        interface_tag: BoundaryTag,
        topology: Topology,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            service,
            config: config.clone(),
            registrar: MeshRegistrar::new(interface_tag),
            topology,
            state: SessionState::Uninitialized,
            interface: None,
            checkpoints: CheckpointStore::new(),
            max_time_step_length: <S::T as num::Zero>::zero(),
        })
    }

    /// Register the coupling meshes and exchange the initial data
    ///
    /// The write quadrature is kept and used for every later write. Returns
    /// the maximum time step length allowed by the coupling.
    pub fn initialize<G: InterfaceGeometry<T = S::T>>(
        &mut self,
        geometry: &G,
        write_quadrature: &FaceQuadrature<S::T>,
        read_quadrature: &FaceQuadrature<S::T>,
        field: &G::Field,
    ) -> Result<S::T> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Initialized => {
                return Err(CouplingError::ContractViolation(
                    "the session has already been initialized".to_string(),
                ))
            }
            SessionState::Finalized => {
                return Err(CouplingError::ContractViolation(
                    "the session has been finalized".to_string(),
                ))
            }
        }
        self.topology.check_supported()?;
        let dim = geometry.physical_dimension();
        MeshRegistrar::check_dimension(&self.service, dim)?;

        let names = self.config.mesh_names()?;
        let read_mesh_handle = self.service.mesh_handle(&names.read)?;
        let read_data = self
            .service
            .data_handle(self.config.read_data_name(), read_mesh_handle)?;
        let write_mesh_handle = self.service.mesh_handle(&names.write)?;
        let write_data = self
            .service
            .data_handle(self.config.write_data_name(), write_mesh_handle)?;

        let write_quadrature = match self.config.write_sampling() {
            Some(n) => {
                debug!("Sampling the write mesh with {n} points per face direction");
                equidistant_rule(write_quadrature.cell_type, n)?
            }
            None => write_quadrature.clone(),
        };

        let write_mesh = self.registrar.register_write_mesh(
            &mut self.service,
            geometry,
            write_mesh_handle,
            &write_quadrature,
        )?;
        let (read_mesh, face_index) = self.registrar.register_read_mesh(
            &mut self.service,
            geometry,
            read_mesh_handle,
            read_quadrature,
        )?;

        let mut exchanger = DataExchanger::new(dim, read_data, write_data);
        exchanger.resize_buffer(read_mesh.len());

        self.max_time_step_length = self.service.initialize()?;
        info!(
            "Participant '{}' initialized the coupling",
            self.config.participant_name()
        );

        if let Err(e) = self.exchange_initial_data(
            geometry,
            &mut exchanger,
            &write_quadrature,
            &write_mesh,
            &read_mesh,
            field,
        ) {
            // The service has been initialized, so the session cannot be set up again
            self.state = SessionState::Finalized;
            if let Err(finalize_error) = self.service.finalize() {
                warn!("Finalizing the coupling failed: {finalize_error}");
            }
            return Err(e);
        }

        self.interface = Some(Interface {
            write_quadrature,
            write_mesh,
            read_mesh,
            face_index,
            exchanger,
        });
        self.state = SessionState::Initialized;
        Ok(self.max_time_step_length)
    }

    /// Advance the coupled simulation by one solver time step
    ///
    /// The field is sent if the coupling needs data for this step, and the
    /// read values are refreshed if new values are available. Returns the
    /// maximum length of the next time step.
    pub fn advance<G: InterfaceGeometry<T = S::T>>(
        &mut self,
        geometry: &G,
        field: &G::Field,
        computed_timestep_length: S::T,
    ) -> Result<S::T> {
        self.check_initialized()?;
        let Some(interface) = self.interface.as_mut() else {
            return Err(not_initialized());
        };

        if self
            .service
            .is_write_data_required(computed_timestep_length)
        {
            interface.exchanger.write_all_quadrature_nodes(
                &mut self.service,
                geometry,
                self.registrar.tag(),
                &interface.write_quadrature,
                field,
                interface.write_mesh.node_ids(),
            )?;
        }

        self.max_time_step_length = self.service.advance(computed_timestep_length)?;

        if self.service.is_read_data_available() {
            interface
                .exchanger
                .refresh(&self.service, interface.read_mesh.node_ids())?;
        }
        Ok(self.max_time_step_length)
    }

    /// Store the state vectors if the coupling asks for a checkpoint
    pub fn save_current_state_if_required<C: TimeSource<T = S::T>>(
        &mut self,
        state: &[&V],
        time: &C,
    ) -> Result<bool> {
        self.check_initialized()?;
        self.checkpoints
            .save_current_state_if_required(&mut self.service, state, time)
    }

    /// Restore the state vectors and time if the coupling asks for it
    pub fn reload_old_state_if_required<C: TimeSource<T = S::T>>(
        &mut self,
        state: &mut [&mut V],
        time: &mut C,
    ) -> Result<bool> {
        self.check_initialized()?;
        self.checkpoints
            .reload_old_state_if_required(&mut self.service, state, time)
    }

    /// Read the current value at a read node from the coupling service
    pub fn read_on_quadrature_point(&self, node: NodeId, value: &mut [S::T]) -> Result<()> {
        self.check_initialized()?;
        self.interface()?
            .exchanger
            .read_on_quadrature_point(&self.service, node, value)
    }

    /// The value received at the last refresh for position `index` in the read node sequence
    pub fn read_on_quadrature_point_with_id(&self, index: usize) -> Result<&[S::T]> {
        self.check_initialized()?;
        self.interface()?
            .exchanger
            .read_on_quadrature_point_with_id(index)
    }

    /// The position of the first read node of a face in the read node sequence
    pub fn node_offset(&self, face: FaceId) -> Option<usize> {
        self.interface
            .as_ref()
            .and_then(|i| i.face_index.offset(face))
    }

    /// The read node ids, one per read quadrature point
    pub fn read_node_ids(&self) -> &[NodeId] {
        self.interface
            .as_ref()
            .map(|i| i.read_mesh.node_ids())
            .unwrap_or(&[])
    }

    /// The write node ids, one per write quadrature point
    pub fn write_node_ids(&self) -> &[NodeId] {
        self.interface
            .as_ref()
            .map(|i| i.write_mesh.node_ids())
            .unwrap_or(&[])
    }

    /// The read mesh
    pub fn read_mesh(&self) -> Option<&InterfaceMesh<S::T>> {
        self.interface.as_ref().map(|i| &i.read_mesh)
    }

    /// The write mesh
    pub fn write_mesh(&self) -> Option<&InterfaceMesh<S::T>> {
        self.interface.as_ref().map(|i| &i.write_mesh)
    }

    /// The quadrature used for the write mesh
    pub fn write_quadrature(&self) -> Option<&FaceQuadrature<S::T>> {
        self.interface.as_ref().map(|i| &i.write_quadrature)
    }

    /// The boundary tag of the interface
    pub fn interface_tag(&self) -> BoundaryTag {
        self.registrar.tag()
    }

    /// The configuration of the session
    pub fn config(&self) -> &AdapterConfiguration {
        &self.config
    }

    /// The lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The coupling service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The coupling service, mutably
    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Check if the coupled simulation continues
    pub fn is_coupling_ongoing(&self) -> bool {
        self.state == SessionState::Initialized && self.service.is_coupling_ongoing()
    }

    /// The maximum time step length last reported by the coupling
    pub fn max_time_step_length(&self) -> S::T {
        self.max_time_step_length
    }

    /// End the coupling
    pub fn finalize(&mut self) -> Result<()> {
        match self.state {
            SessionState::Finalized => Err(CouplingError::ContractViolation(
                "the session has already been finalized".to_string(),
            )),
            SessionState::Uninitialized => {
                self.state = SessionState::Finalized;
                Ok(())
            }
            SessionState::Initialized => {
                self.state = SessionState::Finalized;
                self.service.finalize()
            }
        }
    }

    /// Write the initial data if the coupling asks for it, then fill the read buffer
    fn exchange_initial_data<G: InterfaceGeometry<T = S::T>>(
        &mut self,
        geometry: &G,
        exchanger: &mut DataExchanger<S::T>,
        write_quadrature: &FaceQuadrature<S::T>,
        write_mesh: &InterfaceMesh<S::T>,
        read_mesh: &InterfaceMesh<S::T>,
        field: &G::Field,
    ) -> Result<()> {
        if self.service.is_action_required(Action::WriteInitialData) {
            exchanger.write_all_quadrature_nodes(
                &mut self.service,
                geometry,
                self.registrar.tag(),
                write_quadrature,
                field,
                write_mesh.node_ids(),
            )?;
            self.service
                .mark_action_fulfilled(Action::WriteInitialData)?;
            self.service.initialize_data()?;
        }
        exchanger.refresh(&self.service, read_mesh.node_ids())
    }

    fn check_initialized(&self) -> Result<()> {
        match self.state {
            SessionState::Initialized => Ok(()),
            SessionState::Uninitialized => Err(not_initialized()),
            SessionState::Finalized => Err(CouplingError::ContractViolation(
                "the session has been finalized".to_string(),
            )),
        }
    }

    fn interface(&self) -> Result<&Interface<S::T>> {
        self.interface.as_ref().ok_or_else(not_initialized)
    }
}

fn not_initialized() -> CouplingError {
    CouplingError::ContractViolation("the session has not been initialized".to_string())
}

impl<S: CouplingService, V: Clone> Drop for CouplingSession<S, V> {
    fn drop(&mut self) {
        if self.state == SessionState::Initialized {
            self.state = SessionState::Finalized;
            if let Err(e) = self.service.finalize() {
                warn!("Finalizing the coupling failed: {e}");
            }
        }
    }
}
