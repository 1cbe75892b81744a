//! Definition of a time source

use crate::types::RealScalar;

/// The time keeping of a solver.
pub trait TimeSource {
    /// The floating point type used for time values
    type T: RealScalar;

    /// The current absolute time
    fn current(&self) -> Self::T;

    /// Reset the absolute time, e.g. when rolling back to a checkpoint
    fn set_absolute_time(&mut self, time: Self::T);
}
