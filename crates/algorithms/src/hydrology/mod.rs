//! Hydrological analysis algorithms
//!
//! Flow-direction algorithms for Digital Elevation Models:
//! - Rho4 / Rho8: stochastic single flow direction (Fairfield & Leymarie 1991)
//! - Uniform sources: per-row random streams for the stochastic corrections
//! - Summary: direction histograms of a routed grid

mod fairfield_leymarie;
mod summary;
pub mod uniform;

pub use fairfield_leymarie::{
    compute_rho4, compute_rho8, fairfield_leymarie_d4, fairfield_leymarie_d8, rho4, rho8, Rho4,
    Rho8, RhoParams,
};
pub use summary::{flow_summary, FlowSummary};
pub use uniform::{ConstantSource, EntropySource, SeededSource, Uniform01, UniformSource};
