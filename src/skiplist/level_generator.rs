// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use rand::{
    rngs::SmallRng,
    Rng,
    SeedableRng,
};

use crate::config::Config;

/// Upon the insertion of a new node in the list, the node is replicated to high
/// levels with a certain probability as determined by a `LevelGenerator`.
pub trait LevelGenerator {
    /// The highest level this generator will ever produce.
    fn max_level(&self) -> usize;
    /// Generate a random level for a new node in the range `[0, max_level]`.
    ///
    /// This must never return a level that is `> self.max_level()`.
    fn random(&mut self) -> usize;
}

/// Draw a geometrically distributed level from `rng`.
///
/// Starting at level 0, the level is advanced for as long as a uniform draw
/// from `[0, 1)` lands below `p` and `max_level` has not been reached, so
/// `P(level >= k) = p^k` up to the cap.
pub fn random_level<R: Rng + ?Sized>(rng: &mut R, max_level: usize, p: f64) -> usize {
    let mut level = 0;
    while rng.gen::<f64>() < p && level < max_level {
        level += 1;
    }
    level
}

/// A level generator which will produce geometrically distributed numbers.
///
/// The probability of generating level `n` is `p` times the probability of
/// generating level `n-1`, with the probability truncated at the maximum
/// level allowed.
#[derive(Debug, Clone)]
pub struct GeometricalLevelGenerator<R = SmallRng> {
    max_level: usize,
    p: f64,
    rng: R,
}

impl GeometricalLevelGenerator<SmallRng> {
    /// Create a generator seeded from the operating system's entropy source.
    pub fn new(config: Config) -> Self {
        GeometricalLevelGenerator::with_rng(config, SmallRng::from_entropy())
    }

    /// Create a generator whose sequence of levels is fully determined by
    /// `seed`.
    pub fn seeded(config: Config, seed: u64) -> Self {
        GeometricalLevelGenerator::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GeometricalLevelGenerator<R> {
    /// Create a generator drawing from a caller-supplied random source.
    pub fn with_rng(config: Config, rng: R) -> Self {
        GeometricalLevelGenerator {
            max_level: config.max_level(),
            p: config.promotion_probability(),
            rng,
        }
    }
}

impl<R: Rng> LevelGenerator for GeometricalLevelGenerator<R> {
    fn max_level(&self) -> usize {
        self.max_level
    }

    fn random(&mut self) -> usize {
        random_level(&mut self.rng, self.max_level, self.p)
    }
}
