//! Types specific to ndcoupling

use crate::quadrature::QuadratureError;
use std::fmt;

/// Scalar type used for coordinates and field values.
pub trait RealScalar: num::Float + fmt::Debug + Send + Sync + 'static {}

impl<T: num::Float + fmt::Debug + Send + Sync + 'static> RealScalar for T {}

/// Identifier of a coupling node, as assigned by the coupling service.
pub type NodeId = i32;

/// Opaque handle of a coupling mesh, resolved from its name by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub i32);

/// Opaque handle of a data field living on a coupling mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataHandle(pub i32);

/// Marker attached to the boundary faces that take part in the coupling.
pub type BoundaryTag = usize;

/// Local identifier of a boundary face.
pub type FaceId = usize;

/// Role of a coupling mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshRole {
    /// Nodes the solver receives data on
    Read,
    /// Nodes the solver sends data from
    Write,
}

impl fmt::Display for MeshRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshRole::Read => write!(f, "read"),
            MeshRole::Write => write!(f, "write"),
        }
    }
}

/// Actions a coupling service can ask the participant to perform.
///
/// The participant must query each action before acting on it and
/// acknowledge it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Initial values of the write data must be provided before the first exchange
    WriteInitialData,
    /// The solver state must be stored at the start of a coupling window
    WriteIterationCheckpoint,
    /// The solver state must be rolled back to the last stored checkpoint
    ReadIterationCheckpoint,
}

impl Action {
    /// The token the coupling service uses for this action.
    pub fn token(&self) -> &'static str {
        match self {
            Action::WriteInitialData => "write-initial-data",
            Action::WriteIterationCheckpoint => "write-iteration-checkpoint",
            Action::ReadIterationCheckpoint => "read-iteration-checkpoint",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Process layout of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// A single process holds the whole interface
    #[default]
    SingleRank,
    /// The interface is split over `size` processes
    Distributed {
        /// Rank of this process
        rank: usize,
        /// Number of processes
        size: usize,
    },
}

impl Topology {
    /// Rank of this process.
    pub fn rank(&self) -> usize {
        match self {
            Topology::SingleRank => 0,
            Topology::Distributed { rank, .. } => *rank,
        }
    }

    /// Number of processes.
    pub fn size(&self) -> usize {
        match self {
            Topology::SingleRank => 1,
            Topology::Distributed { size, .. } => *size,
        }
    }

    /// Check that this topology can be handled by a coupling session.
    ///
    /// Only one process per participant is supported; a distributed layout
    /// with a single rank is accepted.
    pub fn check_supported(&self) -> Result<()> {
        match self {
            Topology::SingleRank => Ok(()),
            Topology::Distributed { rank, size } => {
                if rank >= size {
                    Err(CouplingError::ConfigurationMismatch(format!(
                        "rank {rank} is out of range for {size} processes"
                    )))
                } else if *size > 1 {
                    Err(CouplingError::ConfigurationMismatch(format!(
                        "coupling over {size} processes is not supported"
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Create the topology of an MPI communicator.
    #[cfg(feature = "mpi")]
    pub fn from_communicator<C: mpi::topology::Communicator>(comm: &C) -> Self {
        if comm.size() == 1 {
            Topology::SingleRank
        } else {
            Topology::Distributed {
                rank: comm.rank() as usize,
                size: comm.size() as usize,
            }
        }
    }
}

/// Coupling error
#[derive(thiserror::Error, Debug)]
pub enum CouplingError {
    /// The solver and the coupling setup disagree
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),
    /// A node sequence or data buffer was indexed past its end
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Length of the indexed sequence
        len: usize,
    },
    /// The caller broke the usage contract of an operation
    #[error("Contract violation: {0}")]
    ContractViolation(String),
    /// Failure reported by the coupling service
    #[error("Coupling service error: {0}")]
    Service(String),
    /// A quadrature rule could not be created
    #[error("Quadrature error: {0}")]
    Quadrature(#[from] QuadratureError),
}

/// Result type
pub type Result<T> = std::result::Result<T, CouplingError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_action_tokens() {
        assert_eq!(Action::WriteInitialData.token(), "write-initial-data");
        assert_eq!(
            Action::WriteIterationCheckpoint.to_string(),
            "write-iteration-checkpoint"
        );
        assert_eq!(
            Action::ReadIterationCheckpoint.to_string(),
            "read-iteration-checkpoint"
        );
    }

    #[test]
    fn test_topology() {
        assert!(Topology::SingleRank.check_supported().is_ok());
        assert!(Topology::Distributed { rank: 0, size: 1 }
            .check_supported()
            .is_ok());
        assert!(matches!(
            Topology::Distributed { rank: 1, size: 4 }.check_supported(),
            Err(CouplingError::ConfigurationMismatch(_))
        ));
        assert!(matches!(
            Topology::Distributed { rank: 2, size: 2 }.check_supported(),
            Err(CouplingError::ConfigurationMismatch(_))
        ));
        assert_eq!(Topology::Distributed { rank: 1, size: 4 }.rank(), 1);
        assert_eq!(Topology::SingleRank.size(), 1);
    }
}
