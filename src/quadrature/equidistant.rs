//! Equidistant sampling rules on reference faces.
//!
//! These rules place points at the midpoints of a uniform subdivision of the
//! reference face. They are used to control the density of the write mesh
//! independently of the quadrature the solver integrates with.

use crate::quadrature::types::{FaceQuadrature, QuadratureError};
use crate::types::RealScalar;
use ndelement::types::ReferenceCellType;

/// Return an equidistant rule with `npoints` points in each reference direction.
///
/// On intervals and quadrilaterals the points are the midpoints of a uniform
/// grid of `npoints` (per direction) sub-cells. On triangles the face is split
/// into `npoints * npoints` congruent sub-triangles and their centroids are used.
pub fn equidistant_rule<T: RealScalar>(
    cell_type: ReferenceCellType,
    npoints: usize,
) -> Result<FaceQuadrature<T>, QuadratureError> {
    if npoints == 0 {
        return Err(QuadratureError::RuleNotFound(cell_type, npoints));
    }
    let n = npoints as f64;
    let h = 1.0 / n;
    let midpoints = (0..npoints)
        .map(|i| (i as f64 + 0.5) * h)
        .collect::<Vec<_>>();

    match cell_type {
        ReferenceCellType::Interval => {
            FaceQuadrature::from_f64(cell_type, 1, &midpoints, &vec![h; npoints])
        }
        ReferenceCellType::Quadrilateral => {
            let mut points = Vec::with_capacity(2 * npoints * npoints);
            for y in &midpoints {
                for x in &midpoints {
                    points.push(*x);
                    points.push(*y);
                }
            }
            FaceQuadrature::from_f64(cell_type, 1, &points, &vec![h * h; npoints * npoints])
        }
        ReferenceCellType::Triangle => {
            let mut points = Vec::with_capacity(2 * npoints * npoints);
            for j in 0..npoints {
                for i in 0..npoints - j {
                    points.push((i as f64 + 1.0 / 3.0) * h);
                    points.push((j as f64 + 1.0 / 3.0) * h);
                    if i + j + 1 < npoints {
                        points.push((i as f64 + 2.0 / 3.0) * h);
                        points.push((j as f64 + 2.0 / 3.0) * h);
                    }
                }
            }
            FaceQuadrature::from_f64(
                cell_type,
                1,
                &points,
                &vec![0.5 * h * h; npoints * npoints],
            )
        }
        _ => Err(QuadratureError::UnsupportedCell(cell_type)),
    }
}
