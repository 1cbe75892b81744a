//! Type definitions.
use crate::types::RealScalar;
use ndelement::types::ReferenceCellType;
use std::fmt;

/// Quadrature error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadratureError {
    /// No rule with the requested number of points exists
    RuleNotFound(ReferenceCellType, usize),
    /// Rules are not defined for this cell type
    UnsupportedCell(ReferenceCellType),
}

impl fmt::Display for QuadratureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadratureError::RuleNotFound(cell_type, npoints) => {
                write!(f, "no rule with {npoints} points per direction on {cell_type:?}")
            }
            QuadratureError::UnsupportedCell(cell_type) => {
                write!(f, "face rules are not defined on {cell_type:?}")
            }
        }
    }
}

impl std::error::Error for QuadratureError {}

/// The topological dimension of a face cell type, if face rules exist for it.
pub(crate) fn face_dimension(cell_type: ReferenceCellType) -> Result<usize, QuadratureError> {
    match cell_type {
        ReferenceCellType::Interval => Ok(1),
        ReferenceCellType::Triangle => Ok(2),
        ReferenceCellType::Quadrilateral => Ok(2),
        _ => Err(QuadratureError::UnsupportedCell(cell_type)),
    }
}

/// The volume of a reference face.
pub fn reference_volume(cell_type: ReferenceCellType) -> Result<f64, QuadratureError> {
    match cell_type {
        ReferenceCellType::Interval => Ok(1.0),
        ReferenceCellType::Triangle => Ok(0.5),
        ReferenceCellType::Quadrilateral => Ok(1.0),
        _ => Err(QuadratureError::UnsupportedCell(cell_type)),
    }
}

/// Definition of a quadrature rule on a reference face.
///
/// The points are given on the reference cell of `cell_type`, i.e. on
/// [0, 1] for intervals, on the triangle with vertices (0, 0), (1, 0), (0, 1)
/// and on the unit square.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceQuadrature<T: RealScalar> {
    /// The reference cell the rule is defined on.
    pub cell_type: ReferenceCellType,

    /// The dimension d of a single point.
    pub dim: usize,

    /// The polynomial degree the rule integrates exactly.
    pub order: usize,

    /// The number of points of the rule.
    pub npoints: usize,

    /// The weights of the rule.
    pub weights: Vec<T>,

    /// The point coordinates of the rule.
    ///
    /// A single point has the coordinates p_1, ..., p_d. The points are
    /// stored consecutively, so the second point starts at position d.
    pub points: Vec<T>,
}

impl<T: RealScalar> FaceQuadrature<T> {
    /// Create a rule from points and weights given in double precision.
    pub(crate) fn from_f64(
        cell_type: ReferenceCellType,
        order: usize,
        points: &[f64],
        weights: &[f64],
    ) -> Result<Self, QuadratureError> {
        let dim = face_dimension(cell_type)?;
        debug_assert_eq!(points.len(), dim * weights.len());
        Ok(Self {
            cell_type,
            dim,
            order,
            npoints: weights.len(),
            weights: weights.iter().map(|w| T::from(*w).unwrap()).collect(),
            points: points.iter().map(|p| T::from(*p).unwrap()).collect(),
        })
    }

    /// The reference coordinates of a point.
    pub fn point(&self, index: usize) -> &[T] {
        &self.points[index * self.dim..(index + 1) * self.dim]
    }

    /// Iterate over the points in rule order.
    pub fn iter_points(&self) -> std::slice::ChunksExact<'_, T> {
        self.points.chunks_exact(self.dim)
    }
}
