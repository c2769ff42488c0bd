//! # rhoflow core
//!
//! Core types and traits shared by the rhoflow flow-routing algorithms.
//!
//! This crate provides:
//! - `Raster<T>`: Generic elevation grid with no-data handling
//! - `FlowProps`: Per-cell flow flag plus eight direction weights
//! - `Direction`: The shared 1..8 neighbor table
//! - `Progress`: Observational progress reporting
//! - Algorithm traits for consistent API

pub mod error;
pub mod flow;
pub mod progress;
pub mod raster;

pub use error::{Error, Result};
pub use flow::{CellFlow, Direction, FlowProps};
pub use progress::{NoProgress, Progress, ProgressCounter};
pub use raster::{Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::flow::{CellFlow, Direction, FlowProps};
    pub use crate::progress::{NoProgress, Progress};
    pub use crate::raster::{Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in rhoflow.
///
/// Algorithms transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
