//! Grid creation and storage

pub mod boundary_grid;
pub mod shapes;

pub use boundary_grid::{BoundaryFace, BoundaryGrid, BoundaryGridBuilder};
