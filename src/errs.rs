// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipListError {
    #[error("promotion probability must be in (0, 1), got {0}")]
    InvalidProbability(f64),
    #[error("max level {requested} exceeds the limit of {limit}")]
    MaxLevelTooLarge { requested: usize, limit: usize },
    #[error("level {level} is not strictly ascending")]
    Unordered { level: usize },
    #[error("node on level {level} is missing from the level below")]
    BrokenTower { level: usize },
    #[error("length is {expected} but level 0 holds {found} nodes")]
    LengthMismatch { expected: usize, found: usize },
    #[error("height {height} exceeds max level {max_level}")]
    HeightOverflow { height: usize, max_level: usize },
    #[error("level {level} is linked but the height is {height}")]
    LinkAboveHeight { level: usize, height: usize },
    #[error("top level {height} holds no nodes")]
    EmptyTopLevel { height: usize },
}
