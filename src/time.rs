//! Solver time keeping

use crate::traits::TimeSource;
use crate::types::RealScalar;

/// Time stepping state of a solver.
///
/// With sub-cycling, the absolute time is not a multiple of the step length,
/// so it is tracked separately from the step counter and can be reset when a
/// coupling iteration is rolled back.
#[derive(Debug, Clone, PartialEq)]
pub struct Time<T: RealScalar> {
    timestep: usize,
    time_current: T,
    time_end: T,
    delta_t: T,
}

impl<T: RealScalar> Time<T> {
    /// Create a new time keeper starting at zero
    pub fn new(time_end: T, delta_t: T) -> Self {
        Self {
            timestep: 0,
            time_current: T::zero(),
            time_end,
            delta_t,
        }
    }

    /// The end time of the simulation
    pub fn end(&self) -> T {
        self.time_end
    }

    /// The current step length
    pub fn get_delta_t(&self) -> T {
        self.delta_t
    }

    /// Set the step length, e.g. to the maximum allowed by the coupling
    pub fn set_delta_t(&mut self, delta_t: T) {
        self.delta_t = delta_t;
    }

    /// The number of steps taken
    pub fn get_timestep(&self) -> usize {
        self.timestep
    }

    /// Take a step of the current step length
    pub fn increment(&mut self) {
        self.time_current = self.time_current + self.delta_t;
        self.timestep += 1;
    }

    /// Check if the end time has been reached
    pub fn is_finished(&self) -> bool {
        self.time_current >= self.time_end
    }
}

impl<T: RealScalar> TimeSource for Time<T> {
    type T = T;

    fn current(&self) -> T {
        self.time_current
    }

    fn set_absolute_time(&mut self, time: T) {
        self.time_current = time;
    }
}
