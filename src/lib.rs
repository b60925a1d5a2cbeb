/// Construction parameters shared by the list and its level generator.
pub mod config;
/// Errors raised by construction and invariant verification.
pub mod errs;
/// Column-aligned text rendering of a list's levels.
pub mod render;

/// A [`skip list`] backed ordered set with injectable level generation.
///
/// [`skip list`]: https://en.wikipedia.org/wiki/Skip_list
pub mod skiplist;

pub use config::Config;
pub use errs::SkipListError;
pub use render::render;
pub use skiplist::{
    level_generator::{
        random_level,
        GeometricalLevelGenerator,
        LevelGenerator,
    },
    skipset::SkipSet,
};
