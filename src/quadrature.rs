//! Quadrature rules on reference faces

mod equidistant;
mod gauss;
mod types;

pub use equidistant::equidistant_rule;
pub use gauss::{available_rules, gauss_rule, MAX_GAUSS_POINTS};
pub use types::{reference_volume, FaceQuadrature, QuadratureError};
