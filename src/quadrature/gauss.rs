//! Gauss rules on reference faces.

use crate::quadrature::types::{FaceQuadrature, QuadratureError};
use crate::types::RealScalar;
use ndelement::types::ReferenceCellType;

/// The largest number of points per direction for which Gauss rules are created.
pub const MAX_GAUSS_POINTS: usize = 30;

/// Gauss-Legendre points and weights on [0, 1].
pub(crate) fn gauss_legendre(npoints: usize) -> (Vec<f64>, Vec<f64>) {
    let mut points = vec![0.0; npoints];
    let mut weights = vec![0.0; npoints];
    let n = npoints as f64;

    for i in 0..(npoints + 1) / 2 {
        // Newton iteration on the Legendre polynomial, starting from the
        // asymptotic estimate of the i-th largest root
        let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (n + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..100 {
            let mut p1 = 1.0;
            let mut p2 = 0.0;
            for j in 0..npoints {
                let p3 = p2;
                p2 = p1;
                let j = j as f64;
                p1 = ((2.0 * j + 1.0) * z * p2 - j * p3) / (j + 1.0);
            }
            dp = n * (z * p1 - p2) / (z * z - 1.0);
            let z_old = z;
            z = z_old - p1 / dp;
            if (z - z_old).abs() < 1e-15 {
                break;
            }
        }
        let w = 1.0 / ((1.0 - z * z) * dp * dp);
        points[i] = 0.5 * (1.0 - z);
        points[npoints - 1 - i] = 0.5 * (1.0 + z);
        weights[i] = w;
        weights[npoints - 1 - i] = w;
    }
    (points, weights)
}

/// Return a Gauss rule with `npoints` points in each reference direction.
///
/// Quadrilaterals use the tensor product rule with the first coordinate
/// running fastest. Triangles use the collapsed (Duffy) product rule, which
/// integrates polynomials of degree `2 * npoints - 2` exactly.
pub fn gauss_rule<T: RealScalar>(
    cell_type: ReferenceCellType,
    npoints: usize,
) -> Result<FaceQuadrature<T>, QuadratureError> {
    if npoints == 0 || npoints > MAX_GAUSS_POINTS {
        return Err(QuadratureError::RuleNotFound(cell_type, npoints));
    }
    let (x, w) = gauss_legendre(npoints);

    match cell_type {
        ReferenceCellType::Interval => FaceQuadrature::from_f64(cell_type, 2 * npoints - 1, &x, &w),
        ReferenceCellType::Quadrilateral => {
            let mut points = Vec::with_capacity(2 * npoints * npoints);
            let mut weights = Vec::with_capacity(npoints * npoints);
            for (py, wy) in x.iter().zip(&w) {
                for (px, wx) in x.iter().zip(&w) {
                    points.push(*px);
                    points.push(*py);
                    weights.push(wx * wy);
                }
            }
            FaceQuadrature::from_f64(cell_type, 2 * npoints - 1, &points, &weights)
        }
        ReferenceCellType::Triangle => {
            let mut points = Vec::with_capacity(2 * npoints * npoints);
            let mut weights = Vec::with_capacity(npoints * npoints);
            for (u, wu) in x.iter().zip(&w) {
                for (v, wv) in x.iter().zip(&w) {
                    points.push(*u);
                    points.push(*v * (1.0 - u));
                    weights.push(wu * wv * (1.0 - u));
                }
            }
            FaceQuadrature::from_f64(cell_type, 2 * npoints - 2, &points, &weights)
        }
        _ => Err(QuadratureError::UnsupportedCell(cell_type)),
    }
}

/// For a given cell type return the numbers of points per direction for which Gauss rules are available.
pub fn available_rules(cell_type: ReferenceCellType) -> Vec<usize> {
    match cell_type {
        ReferenceCellType::Interval
        | ReferenceCellType::Triangle
        | ReferenceCellType::Quadrilateral => (1..=MAX_GAUSS_POINTS).collect(),
        _ => vec![],
    }
}
