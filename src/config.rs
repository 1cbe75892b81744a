//! Adapter configuration

use crate::types::{CouplingError, Result};
use std::fmt;
use std::str::FromStr;

/// The benchmark case a solver participates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Flow around a cylinder with an attached elastic flap
    #[default]
    Fsi3,
    /// Perpendicular flap in a channel flow
    PerpendicularFlap,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Fsi3 => write!(f, "FSI3"),
            Scenario::PerpendicularFlap => write!(f, "PF"),
        }
    }
}

impl FromStr for Scenario {
    type Err = CouplingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FSI3" => Ok(Scenario::Fsi3),
            "PF" => Ok(Scenario::PerpendicularFlap),
            _ => Err(CouplingError::ConfigurationMismatch(format!(
                "unknown scenario '{s}', expected FSI3 or PF"
            ))),
        }
    }
}

/// Names of the read and write coupling meshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshNames {
    /// Mesh the solver receives data on
    pub read: String,
    /// Mesh the solver sends data from
    pub write: String,
}

/// Configuration of a coupling adapter.
///
/// Most of these values must agree with the configuration file of the
/// coupling service. The coupling meshes are given either by one shared
/// mesh name, used for reading and writing, or by separate read and write
/// mesh names; giving both forms, or neither, is invalid.
#[derive(Debug, Clone)]
pub struct AdapterConfiguration {
    scenario: Scenario,
    config_file: String,
    participant_name: String,
    mesh_name: Option<String>,
    read_mesh_name: Option<String>,
    write_mesh_name: Option<String>,
    write_sampling: Option<usize>,
    read_data_name: String,
    write_data_name: String,
}

impl Default for AdapterConfiguration {
    fn default() -> Self {
        Self {
            scenario: Scenario::default(),
            config_file: "coupling-config.xml".to_string(),
            participant_name: "Solid".to_string(),
            mesh_name: None,
            read_mesh_name: None,
            write_mesh_name: None,
            write_sampling: None,
            read_data_name: "received-data".to_string(),
            write_data_name: "calculated-data".to_string(),
        }
    }
}

impl AdapterConfiguration {
    /// Set the benchmark case
    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    /// Set the configuration file of the coupling service
    pub fn set_config_file(&mut self, config_file: impl Into<String>) {
        self.config_file = config_file.into();
    }

    /// Set the name of this participant
    pub fn set_participant_name(&mut self, participant_name: impl Into<String>) {
        self.participant_name = participant_name.into();
    }

    /// Set one mesh name used for reading and writing
    pub fn set_mesh_name(&mut self, mesh_name: impl Into<String>) {
        self.mesh_name = Some(mesh_name.into());
    }

    /// Set the name of the read mesh
    pub fn set_read_mesh_name(&mut self, read_mesh_name: impl Into<String>) {
        self.read_mesh_name = Some(read_mesh_name.into());
    }

    /// Set the name of the write mesh
    pub fn set_write_mesh_name(&mut self, write_mesh_name: impl Into<String>) {
        self.write_mesh_name = Some(write_mesh_name.into());
    }

    /// Set the number of write nodes per face direction
    pub fn set_write_sampling(&mut self, write_sampling: usize) {
        self.write_sampling = Some(write_sampling);
    }

    /// Set the name of the read data
    pub fn set_read_data_name(&mut self, read_data_name: impl Into<String>) {
        self.read_data_name = read_data_name.into();
    }

    /// Set the name of the write data
    pub fn set_write_data_name(&mut self, write_data_name: impl Into<String>) {
        self.write_data_name = write_data_name.into();
    }

    /// The benchmark case
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// The configuration file of the coupling service
    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// The name of this participant
    pub fn participant_name(&self) -> &str {
        &self.participant_name
    }

    /// The number of write nodes per face direction, if set
    pub fn write_sampling(&self) -> Option<usize> {
        self.write_sampling
    }

    /// The name of the read data
    pub fn read_data_name(&self) -> &str {
        &self.read_data_name
    }

    /// The name of the write data
    pub fn write_data_name(&self) -> &str {
        &self.write_data_name
    }

    /// Resolve the read and write mesh names
    pub fn mesh_names(&self) -> Result<MeshNames> {
        let invalid = || {
            CouplingError::ConfigurationMismatch(format!(
                "either specify a mesh name, which is used for the read and the write mesh, \
                 or a separate read mesh name and write mesh name; specifying both or none of \
                 these options is invalid. Make sure the settings agree with '{}'",
                self.config_file
            ))
        };
        match (
            &self.mesh_name,
            &self.read_mesh_name,
            &self.write_mesh_name,
        ) {
            (Some(shared), None, None) => Ok(MeshNames {
                read: shared.clone(),
                write: shared.clone(),
            }),
            (None, Some(read), Some(write)) => Ok(MeshNames {
                read: read.clone(),
                write: write.clone(),
            }),
            _ => Err(invalid()),
        }
    }

    /// Check that the configuration is complete and consistent
    pub fn validate(&self) -> Result<()> {
        self.mesh_names()?;
        if self.write_sampling == Some(0) {
            return Err(CouplingError::ConfigurationMismatch(
                "write sampling must be at least one node per face direction".to_string(),
            ));
        }
        Ok(())
    }
}
