//! A boundary grid
//!
//! In this grid, every cell is a face on the boundary of a solver domain

mod builder;
mod grid;

pub use self::builder::BoundaryGridBuilder;
pub use self::grid::{BoundaryFace, BoundaryGrid, TaggedFaceIter};
