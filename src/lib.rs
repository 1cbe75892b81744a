//! Coupling of finite element solvers through a multi-physics coupling service
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod checkpoint;
pub mod config;
pub mod exchange;
pub mod grid;
pub mod mesh;
pub mod quadrature;
pub mod scripted;
pub mod session;
pub mod time;
pub mod traits;
pub mod types;

pub use session::CouplingSession;
pub use types::{CouplingError, Result};
