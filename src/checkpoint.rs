//! Storage of solver state for implicit coupling

use crate::traits::{CouplingService, TimeSource};
use crate::types::{Action, CouplingError, RealScalar, Result};
use log::debug;

/// A stored copy of the solver state
#[derive(Debug, Clone)]
struct CheckpointRecord<V, T> {
    state: Vec<V>,
    time: T,
}

/// Holds the solver state at the start of a coupling window.
///
/// When the coupling service asks for a checkpoint, copies of the state
/// vectors and the absolute time are stored, replacing any earlier record.
/// When it asks for the checkpoint to be read, the state vectors are
/// overwritten in the order they were stored.
#[derive(Debug, Clone)]
pub struct CheckpointStore<V: Clone, T: RealScalar> {
    record: Option<CheckpointRecord<V, T>>,
}

impl<V: Clone, T: RealScalar> Default for CheckpointStore<V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone, T: RealScalar> CheckpointStore<V, T> {
    /// Create a store without a record
    pub fn new() -> Self {
        Self { record: None }
    }

    /// Check if a record is held
    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }

    /// The number of state vectors in the record
    pub fn len(&self) -> usize {
        self.record.as_ref().map_or(0, |r| r.state.len())
    }

    /// Check if the record holds no state vectors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The time of the record
    pub fn time(&self) -> Option<T> {
        self.record.as_ref().map(|r| r.time)
    }

    /// Store the state if the coupling service asks for a checkpoint
    ///
    /// Returns whether the state was stored.
    pub fn save_current_state_if_required<S, C>(
        &mut self,
        service: &mut S,
        state: &[&V],
        time: &C,
    ) -> Result<bool>
    where
        S: CouplingService<T = T>,
        C: TimeSource<T = T>,
    {
        if !service.is_action_required(Action::WriteIterationCheckpoint) {
            return Ok(false);
        }
        self.record = Some(CheckpointRecord {
            state: state.iter().map(|v| (*v).clone()).collect(),
            time: time.current(),
        });
        debug!("Stored {} state vectors at time {:?}", state.len(), time.current());
        service.mark_action_fulfilled(Action::WriteIterationCheckpoint)?;
        Ok(true)
    }

    /// Restore the stored state if the coupling service asks for it
    ///
    /// The state vectors must be given in the order they were stored. No
    /// vector is changed if the number of vectors differs from the record.
    /// Returns whether the state was restored.
    pub fn reload_old_state_if_required<S, C>(
        &mut self,
        service: &mut S,
        state: &mut [&mut V],
        time: &mut C,
    ) -> Result<bool>
    where
        S: CouplingService<T = T>,
        C: TimeSource<T = T>,
    {
        if !service.is_action_required(Action::ReadIterationCheckpoint) {
            return Ok(false);
        }
        let record = self.record.as_ref().ok_or_else(|| {
            CouplingError::ContractViolation(
                "a checkpoint must be stored before it can be read".to_string(),
            )
        })?;
        if state.len() != record.state.len() {
            return Err(CouplingError::ContractViolation(format!(
                "{} state vectors given to restore a checkpoint of {}",
                state.len(),
                record.state.len()
            )));
        }
        for (v, stored) in state.iter_mut().zip(&record.state) {
            v.clone_from(stored);
        }
        time.set_absolute_time(record.time);
        debug!("Restored {} state vectors at time {:?}", state.len(), record.time);
        service.mark_action_fulfilled(Action::ReadIterationCheckpoint)?;
        Ok(true)
    }
}
