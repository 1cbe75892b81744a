//! Trait definitions

mod geometry;
mod service;
mod time;

pub use geometry::InterfaceGeometry;
pub use service::CouplingService;
pub use time::TimeSource;
