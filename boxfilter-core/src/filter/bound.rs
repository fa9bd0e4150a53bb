//! Strategies that produce the `(lower, upper)` acceptance window of an overlap check.

use rand::{
    Rng, SeedableRng,
    distr::{Distribution, weighted::WeightedIndex},
    rngs::StdRng,
};
use snafu::ensure;

use crate::{
    consts::{OPEN_LOWER_BOUND, OPEN_UPPER_BOUND},
    error::{InvalidBoundsSnafu, InvalidConfigSnafu, Result},
};

/// Produces an overlap window `(lower, upper)` with `lower <= upper`.
///
/// A box filter samples once per call, so a random generator yields one
/// window per image. Implementations own whatever random state they need;
/// share a generator across threads only through one instance per worker.
pub trait BoundGenerator: std::fmt::Debug + Send {
    fn sample(&mut self) -> (f32, f32);
}

/// Checks a window satisfies `0 <= lower <= upper` with finite bounds.
pub fn validate_bounds(lower: f32, upper: f32) -> Result<()> {
    ensure!(
        lower.is_finite() && upper.is_finite() && lower >= 0.0 && lower <= upper,
        InvalidBoundsSnafu { lower, upper }
    );

    Ok(())
}

/// Always returns the same window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBounds {
    lower: f32,
    upper: f32,
}

impl FixedBounds {
    pub fn new(lower: f32, upper: f32) -> Result<Self> {
        validate_bounds(lower, upper)?;

        Ok(Self { lower, upper })
    }
}

impl BoundGenerator for FixedBounds {
    fn sample(&mut self) -> (f32, f32) {
        (self.lower, self.upper)
    }
}

/// Draws `lower` uniformly in `[min, max]`, then `upper` uniformly in `[lower, max]`.
#[derive(Debug, Clone)]
pub struct UniformBounds {
    min: f32,
    max: f32,
    rng: StdRng,
}

impl UniformBounds {
    pub fn new(min: f32, max: f32, rng: StdRng) -> Result<Self> {
        validate_bounds(min, max)?;

        Ok(Self { min, max, rng })
    }

    pub fn from_seed(min: f32, max: f32, seed: u64) -> Result<Self> {
        Self::new(min, max, StdRng::seed_from_u64(seed))
    }
}

impl BoundGenerator for UniformBounds {
    fn sample(&mut self) -> (f32, f32) {
        let lower = self.rng.random_range(self.min..=self.max);
        let upper = self.rng.random_range(lower..=self.max);

        (lower, upper)
    }
}

/// Picks one window out of a fixed sample space, optionally weighted.
///
/// Entries may leave either side open: a missing lower bound reads as `0.0`
/// and a missing upper bound as `1.0`. This is how random-crop augmentation
/// describes its "at least 0.3 overlap", "at most 0.7 overlap" style choices.
#[derive(Debug, Clone)]
pub struct SampleSpaceBounds {
    space: Vec<(f32, f32)>,
    weights: Option<WeightedIndex<f32>>,
    rng: StdRng,
}

impl SampleSpaceBounds {
    pub fn new(
        space: &[(Option<f32>, Option<f32>)],
        weights: Option<&[f32]>,
        rng: StdRng,
    ) -> Result<Self> {
        ensure!(
            !space.is_empty(),
            InvalidConfigSnafu {
                message: "bound sample space must not be empty",
            }
        );

        let space = space
            .iter()
            .map(|(lower, upper)| {
                let lower = lower.unwrap_or(OPEN_LOWER_BOUND);
                let upper = upper.unwrap_or(OPEN_UPPER_BOUND);
                validate_bounds(lower, upper).map(|_| (lower, upper))
            })
            .collect::<Result<Vec<_>>>()?;

        let weights = match weights {
            Some(weights) => {
                ensure!(
                    weights.len() == space.len(),
                    InvalidConfigSnafu {
                        message: format!(
                            "{} weights given for a sample space of {} bounds",
                            weights.len(),
                            space.len()
                        ),
                    }
                );
                let index = WeightedIndex::new(weights).map_err(|err| {
                    InvalidConfigSnafu {
                        message: format!("invalid bound weights: {err}"),
                    }
                    .build()
                })?;
                Some(index)
            }
            None => None,
        };

        Ok(Self {
            space,
            weights,
            rng,
        })
    }

    pub fn from_seed(
        space: &[(Option<f32>, Option<f32>)],
        weights: Option<&[f32]>,
        seed: u64,
    ) -> Result<Self> {
        Self::new(space, weights, StdRng::seed_from_u64(seed))
    }
}

impl BoundGenerator for SampleSpaceBounds {
    fn sample(&mut self) -> (f32, f32) {
        let idx = match &self.weights {
            Some(index) => index.sample(&mut self.rng),
            None => self.rng.random_range(0..self.space.len()),
        };

        self.space[idx]
    }
}
