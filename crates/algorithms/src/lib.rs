//! # rhoflow algorithms
//!
//! Flow-routing algorithms for rhoflow.
//!
//! ## Available Algorithm Categories
//!
//! - **hydrology**: Stochastic Rho4 / Rho8 flow directions

pub mod hydrology;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        compute_rho4, compute_rho8, flow_summary, rho4, rho8, FlowSummary, Rho4, Rho8, RhoParams,
        SeededSource, UniformSource,
    };
    pub use rhoflow_core::prelude::*;
    pub use rhoflow_parallel::ProcessingMode;
}
