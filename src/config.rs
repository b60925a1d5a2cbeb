// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use getset::CopyGetters;

use crate::errs::SkipListError;

/// The default highest level a node may reach. With a promotion probability
/// of one half this comfortably serves lists of ~2^16 elements.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// The default chance that a node is promoted one more level.
pub const DEFAULT_PROMOTION_PROBABILITY: f64 = 0.5;

/// The largest `max_level` a list can be built with. The head sentinel
/// allocates one link per level up front.
pub const MAX_LEVEL_LIMIT: usize = 63;

/// Construction parameters for a skip list and its level generator.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Config {
    /// Highest (0-indexed) level any node may occupy. Fixed for the lifetime
    /// of the list.
    max_level: usize,
    /// Probability that a node reaching level `n` also reaches `n + 1`.
    promotion_probability: f64,
}

impl Config {
    pub fn new(max_level: usize, promotion_probability: f64) -> Result<Self, SkipListError> {
        // written so that NaN is rejected too
        if !(promotion_probability > 0.0 && promotion_probability < 1.0) {
            return Err(SkipListError::InvalidProbability(promotion_probability));
        }
        if max_level > MAX_LEVEL_LIMIT {
            return Err(SkipListError::MaxLevelTooLarge {
                requested: max_level,
                limit: MAX_LEVEL_LIMIT,
            });
        }

        Ok(Config {
            max_level,
            promotion_probability,
        })
    }

    /// A config with the default promotion probability and the given
    /// `max_level`.
    pub fn with_max_level(max_level: usize) -> Result<Self, SkipListError> {
        Config::new(max_level, DEFAULT_PROMOTION_PROBABILITY)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_level: DEFAULT_MAX_LEVEL,
            promotion_probability: DEFAULT_PROMOTION_PROBABILITY,
        }
    }
}
