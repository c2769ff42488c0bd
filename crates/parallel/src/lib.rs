//! # rhoflow parallel
//!
//! Execution strategies for row-parallel raster scans.
//!
//! Every algorithm in rhoflow maps a function over raster rows; the
//! [`ProcessingMode`] decides whether that happens on the calling thread,
//! on rayon's global pool, or on a dedicated pool of a given size.

pub mod strategy;

pub use strategy::{ParallelStrategy, ProcessingMode};
