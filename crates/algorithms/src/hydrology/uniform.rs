//! Uniform (0, 1) random sources
//!
//! The stochastic flow-direction methods draw one uniform sample per
//! corrected slope. Each raster row gets its own [`Uniform01`] stream,
//! keyed by the row index, so that a fixed seed gives the same result
//! whatever the thread count or scheduling.

use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rhoflow_core::{Error, Result};

/// A stream of samples from the open interval (0, 1).
pub trait Uniform01 {
    fn next_open01(&mut self) -> f64;
}

impl Uniform01 for ChaCha8Rng {
    #[inline]
    fn next_open01(&mut self) -> f64 {
        self.sample(Open01)
    }
}

impl Uniform01 for StdRng {
    #[inline]
    fn next_open01(&mut self) -> f64 {
        self.sample(Open01)
    }
}

/// Hands out independent uniform streams by index.
///
/// `stream(i)` must not share state with `stream(j)` for `i != j`; the
/// source itself is shared read-only between worker threads.
pub trait UniformSource: Sync {
    type Stream: Uniform01;

    fn stream(&self, index: u64) -> Self::Stream;
}

/// Reproducible source: one ChaCha8 stream per index under a root seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededSource {
    seed: u64,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl UniformSource for SeededSource {
    type Stream = ChaCha8Rng;

    fn stream(&self, index: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index);
        rng
    }
}

/// Non-reproducible source seeding every stream from OS entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropySource;

impl UniformSource for EntropySource {
    type Stream = StdRng;

    fn stream(&self, _index: u64) -> StdRng {
        StdRng::from_entropy()
    }
}

/// Degenerate source returning the same value forever.
///
/// Makes the correction factors exact, which is what the tests need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSource {
    value: f64,
}

impl ConstantSource {
    /// `value` must lie strictly between 0 and 1
    pub fn new(value: f64) -> Result<Self> {
        if !(value > 0.0 && value < 1.0) {
            return Err(Error::InvalidParameter {
                name: "value",
                value: value.to_string(),
                reason: "must lie in the open interval (0, 1)".into(),
            });
        }
        Ok(Self { value })
    }
}

/// Stream produced by [`ConstantSource`]
#[derive(Debug, Clone, Copy)]
pub struct ConstantStream(f64);

impl Uniform01 for ConstantStream {
    fn next_open01(&mut self) -> f64 {
        self.0
    }
}

impl UniformSource for ConstantSource {
    type Stream = ConstantStream;

    fn stream(&self, _index: u64) -> ConstantStream {
        ConstantStream(self.value)
    }
}
