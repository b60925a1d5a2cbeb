// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! An always-ordered set backed by a skip list.

use std::{
    collections::HashSet,
    fmt,
    iter::FusedIterator,
};

use tracing::{
    debug,
    instrument,
    trace,
};

use crate::{
    config::{
        Config,
        MAX_LEVEL_LIMIT,
    },
    errs::SkipListError,
    skiplist::{
        level_generator::{
            GeometricalLevelGenerator,
            LevelGenerator,
        },
        node::{
            Node,
            NodeArena,
            NodeId,
            HEAD,
        },
    },
};

/// The skip set stores distinct elements in ascending order and provides
/// expected `O(log n)` insertion, lookup and removal.
///
/// Elements are ordered by their own [`Ord`] implementation, which must be a
/// total order. The level each node reaches is drawn from the list's own
/// [`LevelGenerator`], so two lists never share a random source and a list
/// built from a seeded generator is fully reproducible.
pub struct SkipSet<T, G = GeometricalLevelGenerator> {
    arena: NodeArena<T>,
    /// Highest level currently holding at least one node.
    height: usize,
    /// Highest level any node may reach. Never changes after construction.
    max_level: usize,
    len: usize,
    generator: G,
}

impl<T: Ord> SkipSet<T> {
    /// Create an empty set with the default [`Config`], seeded from entropy.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.insert(3);
    /// assert!(set.contains(&3));
    /// ```
    pub fn new() -> Self {
        SkipSet::with_config(Config::default())
    }

    /// Create an empty set from `config`, seeded from entropy.
    pub fn with_config(config: Config) -> Self {
        SkipSet::with_generator(GeometricalLevelGenerator::new(config))
    }

    /// Create an empty set whose node levels are determined by `seed`.
    pub fn seeded(config: Config, seed: u64) -> Self {
        SkipSet::with_generator(GeometricalLevelGenerator::seeded(config, seed))
    }
}

impl<T: Ord, G: LevelGenerator> SkipSet<T, G> {
    /// Create an empty set drawing node levels from `generator`. The set's
    /// `max_level` is taken from the generator, capped at
    /// [`MAX_LEVEL_LIMIT`]. Levels drawn above the cap are clamped to it.
    pub fn with_generator(generator: G) -> Self {
        let max_level = generator.max_level().min(MAX_LEVEL_LIMIT);
        if max_level < generator.max_level() {
            debug!(
                requested = generator.max_level(),
                limit = MAX_LEVEL_LIMIT,
                "capping generator max level"
            );
        }
        SkipSet {
            arena: NodeArena::new(max_level),
            height: 0,
            max_level,
            len: 0,
            generator,
        }
    }

    /// Returns `true` if `value` is in the set.
    #[instrument(level = "trace", skip_all)]
    pub fn contains(&self, value: &T) -> bool {
        let before = self.descend(value, |_, _| {});
        self.matching_successor(before, value).is_some()
    }

    /// Adds `value` to the set. Returns `false`, leaving the set untouched,
    /// if an equal element is already present.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn insert(&mut self, value: T) -> bool {
        let mut update = self.update_vector(&value);
        if self.matching_successor(update[0], &value).is_some() {
            trace!("value already present");
            return false;
        }

        let level = self.draw_level();
        if level > self.height {
            // levels nobody occupied yet are spliced straight off the head
            update.resize(level + 1, HEAD);
            debug!(from = self.height, to = level, "raising skip list height");
            self.height = level;
        }

        let id = self.arena.alloc(Node::new(value, level));
        for (lvl, &prev) in update.iter().enumerate().take(level + 1) {
            let next = self.arena[prev].next(lvl);
            self.arena[id].set_next(lvl, next);
            self.arena[prev].set_next(lvl, Some(id));
        }

        self.len += 1;
        true
    }

    /// Removes `value` from the set. Returns whether it was present.
    pub fn delete(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes `value` from the set and hands back the stored element.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn take(&mut self, value: &T) -> Option<T> {
        let update = self.update_vector(value);
        let Some(target) = self.matching_successor(update[0], value) else {
            trace!("value not present");
            return None;
        };

        let level = self.arena[target].level();
        for (lvl, &prev) in update.iter().enumerate().take(level + 1) {
            if self.arena[prev].next(lvl) != Some(target) {
                break;
            }
            let next = self.arena[target].next(lvl);
            self.arena[prev].set_next(lvl, next);
        }

        let removed = self
            .arena
            .release(target)
            .and_then(|node| node.into_value());

        let before = self.height;
        while self.height > 0 && self.arena[HEAD].next(self.height).is_none() {
            self.height -= 1;
        }
        if self.height != before {
            debug!(from = before, to = self.height, "lowering skip list height");
        }

        self.len -= 1;
        removed
    }

    /// Walk from the head down to level 0, stopping on each level at the last
    /// node strictly less than `target`. `on_drop` sees every such node as
    /// the walk leaves its level. Returns the node the walk ends on, which is
    /// the head when nothing is less than `target`.
    fn descend<F>(&self, target: &T, mut on_drop: F) -> NodeId
    where
        F: FnMut(usize, NodeId), {
        let mut current = HEAD;
        for level in (0..=self.height).rev() {
            while let Some(next) = self.arena[current].next(level) {
                match self.arena[next].value() {
                    | Some(v) if v < target => current = next,
                    | _ => break,
                }
            }
            on_drop(level, current);
        }
        current
    }

    /// The per-level predecessors of `target`, indexed by level, covering
    /// `0..=height`.
    fn update_vector(&self, target: &T) -> Vec<NodeId> {
        let mut update = vec![HEAD; self.height + 1];
        self.descend(target, |level, node| update[level] = node);
        update
    }

    /// The level 0 successor of `before`, if it holds `target`.
    fn matching_successor(&self, before: NodeId, target: &T) -> Option<NodeId> {
        let next = self.arena[before].next(0)?;
        match self.arena[next].value() {
            | Some(v) if v == target => Some(next),
            | _ => None,
        }
    }

    fn draw_level(&mut self) -> usize {
        let level = self.generator.random();
        if level > self.max_level {
            debug!(level, max_level = self.max_level, "clamping overrunning level");
        }
        level.min(self.max_level)
    }

    /// Check every structural invariant of the list, reporting the first one
    /// found broken.
    pub fn verify(&self) -> Result<(), SkipListError> {
        if self.height > self.max_level {
            return Err(SkipListError::HeightOverflow {
                height: self.height,
                max_level: self.max_level,
            });
        }
        if self.height > 0 && self.arena[HEAD].next(self.height).is_none() {
            return Err(SkipListError::EmptyTopLevel {
                height: self.height,
            });
        }
        // nothing may be linked above the effective height
        if let Some(level) =
            (self.height + 1..=self.max_level).find(|&lvl| self.arena[HEAD].next(lvl).is_some())
        {
            return Err(SkipListError::LinkAboveHeight {
                level,
                height: self.height,
            });
        }

        let mut below: Option<HashSet<NodeId>> = None;
        for level in 0..=self.height {
            let mut members = HashSet::new();
            let mut prev: Option<&T> = None;
            let mut cursor = self.arena[HEAD].next(level);
            while let Some(id) = cursor {
                let node = &self.arena[id];
                let value = node.value();
                if node.level() < level {
                    return Err(SkipListError::BrokenTower { level });
                }
                if let Some(ref lower) = below {
                    if !lower.contains(&id) {
                        return Err(SkipListError::BrokenTower { level });
                    }
                }
                match (prev, value) {
                    | (Some(p), Some(v)) if p >= v => {
                        return Err(SkipListError::Unordered { level });
                    },
                    | (_, None) => return Err(SkipListError::Unordered { level }),
                    | _ => {},
                }
                members.insert(id);
                prev = value;
                cursor = node.next(level);
            }

            if level == 0 && members.len() != self.len {
                return Err(SkipListError::LengthMismatch {
                    expected: self.len,
                    found: members.len(),
                });
            }
            below = Some(members);
        }

        // every released node must have given its slot back
        let allocated = self.arena.live() - 1;
        if allocated != self.len {
            return Err(SkipListError::LengthMismatch {
                expected: self.len,
                found: allocated,
            });
        }

        Ok(())
    }
}

impl<T, G> SkipSet<T, G> {
    /// Number of elements in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level currently occupied by an element, 0 when empty.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Highest level any element may ever occupy.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// The smallest element, if any.
    pub fn first(&self) -> Option<&T> {
        let first = self.arena[HEAD].next(0)?;
        self.arena[first].value()
    }

    /// Removes every element. The level generator and `max_level` are kept.
    pub fn clear(&mut self) {
        self.arena.reset();
        self.height = 0;
        self.len = 0;
    }

    /// Iterate over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            cursor: self.arena[HEAD].next(0),
            remaining: self.len,
        }
    }

    /// Iterate over the elements in ascending order together with the
    /// highest level each one reaches.
    pub fn towers(&self) -> Towers<'_, T> {
        Towers {
            arena: &self.arena,
            cursor: self.arena[HEAD].next(0),
            remaining: self.len,
        }
    }
}

impl<T: Ord> Default for SkipSet<T> {
    fn default() -> Self {
        SkipSet::new()
    }
}

impl<T: Ord> FromIterator<T> for SkipSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = SkipSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord, G: LevelGenerator> Extend<T> for SkipSet<T, G> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: fmt::Debug, G> fmt::Debug for SkipSet<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, G> IntoIterator for &'a SkipSet<T, G> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, G> IntoIterator for SkipSet<T, G> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let mut values = Vec::with_capacity(self.len);
        let mut cursor = self.arena[HEAD].next(0);
        while let Some(id) = cursor {
            cursor = self.arena[id].next(0);
            if let Some(value) = self.arena.release(id).and_then(|node| node.into_value()) {
                values.push(value);
            }
        }
        IntoIter {
            inner: values.into_iter(),
        }
    }
}

/// Borrowing iterator over a [`SkipSet`], in ascending order.
pub struct Iter<'a, T> {
    arena: &'a NodeArena<T>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let node = &arena[self.cursor?];
        self.cursor = node.next(0);
        self.remaining = self.remaining.saturating_sub(1);
        node.value()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over `(element, level)` pairs of a [`SkipSet`], in ascending
/// order.
pub struct Towers<'a, T> {
    arena: &'a NodeArena<T>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Towers<'a, T> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let node = &arena[self.cursor?];
        self.cursor = node.next(0);
        self.remaining = self.remaining.saturating_sub(1);
        node.value().map(|v| (v, node.level()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Towers<'_, T> {}
impl<T> FusedIterator for Towers<'_, T> {}

/// Owning iterator over a [`SkipSet`], in ascending order.
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use crate::{
        config::{
            Config,
            MAX_LEVEL_LIMIT,
        },
        errs::SkipListError,
        skiplist::{
            level_generator::LevelGenerator,
            skipset::SkipSet,
        },
    };

    /// Hands out a scripted sequence of levels, then level 0 forever.
    pub(crate) struct ScriptedLevels {
        max_level: usize,
        levels: VecDeque<usize>,
    }

    impl ScriptedLevels {
        pub(crate) fn new(max_level: usize, levels: &[usize]) -> Self {
            ScriptedLevels {
                max_level,
                levels: levels.iter().copied().collect(),
            }
        }
    }

    impl LevelGenerator for ScriptedLevels {
        fn max_level(&self) -> usize {
            self.max_level
        }

        fn random(&mut self) -> usize {
            self.levels.pop_front().unwrap_or(0)
        }
    }

    const REFERENCE: [i32; 10] = [3, 6, 7, 9, 12, 19, 17, 26, 21, 25];

    #[test]
    fn test_empty() {
        let set = SkipSet::<i32>::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.height(), 0);
        assert_eq!(set.max_level(), 16);
        assert!(!set.contains(&1));
        assert!(set.first().is_none());
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_reference_scenario() {
        let mut set = SkipSet::seeded(Config::default(), 0xC0FFEE);
        for v in REFERENCE {
            assert!(set.insert(v));
        }
        assert_eq!(set.len(), 10);
        assert!(set.contains(&19));
        assert!(!set.contains(&20));
        assert!(set.verify().is_ok());

        assert!(set.delete(&19));
        assert!(set.delete(&25));
        assert_eq!(set.len(), 8);
        assert!(!set.contains(&19));
        assert!(!set.contains(&25));
        assert!(set.contains(&9));
        assert!(set.verify().is_ok());

        assert_eq!(
            set.iter().copied().collect::<Vec<_>>(),
            vec![3, 6, 7, 9, 12, 17, 21, 26]
        );
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut set = SkipSet::new();
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&5));
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut set = SkipSet::<u64>::new();
        assert!(!set.delete(&1));
        assert_eq!(set.len(), 0);

        set.insert(10);
        assert!(!set.delete(&9));
        assert!(!set.delete(&11));
        assert_eq!(set.len(), 1);
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_boundaries() {
        let set: SkipSet<i32> = [10, 20, 30].into_iter().collect();
        assert!(!set.contains(&5));
        assert!(!set.contains(&35));
        assert!(!set.contains(&15));
        assert_eq!(set.first(), Some(&10));
    }

    #[test]
    fn test_height_grows_and_shrinks() {
        let mut set = SkipSet::with_generator(ScriptedLevels::new(8, &[0, 3, 1]));
        set.insert(1);
        assert_eq!(set.height(), 0);
        set.insert(2);
        assert_eq!(set.height(), 3);
        set.insert(3);
        assert_eq!(set.height(), 3);
        assert!(set.verify().is_ok());

        assert!(set.delete(&2));
        assert_eq!(set.height(), 1);
        assert!(set.delete(&3));
        assert_eq!(set.height(), 0);
        assert_eq!(set.max_level(), 8, "max level must never shrink");
        assert!(set.verify().is_ok());

        // the full capacity is still reachable after shrinking
        let mut set = SkipSet::with_generator(ScriptedLevels::new(8, &[8]));
        set.insert(1);
        assert_eq!(set.height(), 8);
    }

    #[test]
    fn test_overrunning_generator_is_clamped() {
        let mut set = SkipSet::with_generator(ScriptedLevels::new(2, &[9, 0, 5]));
        set.insert(1);
        assert_eq!(set.height(), 2);
        set.insert(2);
        set.insert(3);
        assert_eq!(set.height(), 2);
        assert_eq!(set.towers().map(|(_, level)| level).collect::<Vec<_>>(), vec![2, 0, 2]);
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_oversized_generator_max_level_is_capped() {
        let mut set = SkipSet::with_generator(ScriptedLevels::new(usize::MAX, &[usize::MAX, 1]));
        assert_eq!(set.max_level(), MAX_LEVEL_LIMIT);
        set.insert(10);
        assert_eq!(set.height(), MAX_LEVEL_LIMIT);
        set.insert(20);
        assert!(set.contains(&10));
        assert!(set.delete(&10));
        assert_eq!(set.height(), 1);
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_zero_max_level() {
        let mut set = SkipSet::seeded(Config::with_max_level(0).unwrap(), 3);
        for v in (0..200).rev() {
            set.insert(v);
        }
        assert_eq!(set.height(), 0);
        assert_eq!(set.len(), 200);
        assert!(set.verify().is_ok());
        for v in (0..200).step_by(2) {
            assert!(set.delete(&v));
        }
        assert_eq!(set.len(), 100);
        assert!(set.contains(&1));
        assert!(!set.contains(&2));
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_delete_everything_resets_height() {
        let mut set = SkipSet::seeded(Config::default(), 11);
        for v in 0..500 {
            set.insert(v);
        }
        assert!(set.height() > 0);
        for v in 0..500 {
            assert!(set.delete(&v));
        }
        assert!(set.is_empty());
        assert_eq!(set.height(), 0);
        assert_eq!(set.max_level(), 16);
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_take_returns_value() {
        let mut set = SkipSet::new();
        set.insert(String::from("alpha"));
        set.insert(String::from("beta"));
        assert_eq!(set.take(&String::from("beta")), Some(String::from("beta")));
        assert_eq!(set.take(&String::from("beta")), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_slot_reuse_after_delete() {
        let mut set = SkipSet::seeded(Config::default(), 5);
        for round in 0..10 {
            for v in 0..50 {
                set.insert(v * 10 + round);
            }
            for v in 0..50 {
                assert!(set.delete(&(v * 10 + round)));
            }
            assert!(set.verify().is_ok());
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut set = SkipSet::seeded(Config::default(), 9);
        set.extend(0..100);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.height(), 0);
        assert!(!set.contains(&50));
        assert!(set.verify().is_ok());

        set.insert(4);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![&4]);
    }

    #[test]
    fn test_iterators() {
        let set: SkipSet<i32> = [5, 1, 4, 2, 3].into_iter().collect();
        assert_eq!(set.iter().len(), 5);
        assert_eq!((&set).into_iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(set.towers().all(|(_, level)| level <= set.height()));
        assert_eq!(set.into_iter().rev().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_debug() {
        let set: SkipSet<i32> = [2, 1].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{1, 2}");
    }

    #[test]
    fn test_verify_catches_bad_length() {
        let mut set: SkipSet<i32> = [1, 2, 3].into_iter().collect();
        set.len = 7;
        assert_eq!(
            set.verify(),
            Err(SkipListError::LengthMismatch {
                expected: 7,
                found: 3
            })
        );
    }

    #[test]
    fn test_verify_catches_stale_height() {
        let mut set = SkipSet::with_generator(ScriptedLevels::new(4, &[0]));
        set.insert(1);
        set.height = 2;
        assert_eq!(set.verify(), Err(SkipListError::EmptyTopLevel { height: 2 }));
    }
}
