// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Text rendering of a skip list's levels.
//!
//! Every level is printed on its own line, highest first. Each element gets a
//! fixed-width column in level 0 order, so an element reaching several levels
//! lines up vertically:
//!
//! ```text
//! Level  2:                 12
//! Level  1:     6           12          25
//! Level  0: 3   6   7   9   12  17  19  25
//! ```

use std::fmt;

use crate::skiplist::skipset::SkipSet;

/// Blank space added to the widest element's width to form a column.
pub const COLUMN_MARGIN: usize = 2;

/// Render `set` as one line per level, from the current height down to
/// level 0. Lines carry no trailing blanks.
pub fn render<T: fmt::Display, G>(set: &SkipSet<T, G>) -> String {
    set.to_string()
}

impl<T: fmt::Display, G> fmt::Display for SkipSet<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self
            .towers()
            .map(|(value, level)| (value.to_string(), level))
            .collect::<Vec<_>>();
        let width = cells
            .iter()
            .map(|(text, _)| text.chars().count())
            .max()
            .unwrap_or(0)
            + COLUMN_MARGIN;

        for level in (0..=self.height()).rev() {
            write!(f, "Level {:>2}:", level)?;
            // the last element reaching this level ends the line
            if let Some(last) = cells.iter().rposition(|(_, reach)| *reach >= level) {
                f.write_str(" ")?;
                for (text, reach) in cells[..last].iter() {
                    let cell = if *reach >= level { text.as_str() } else { "" };
                    write!(f, "{:<width$}", cell, width = width)?;
                }
                f.write_str(&cells[last].0)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
