//! Coordinate structures used to reference specific locations within parser input
#![allow(clippy::len_without_is_empty)]

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Sub;

/// A [Coords] represents a single location within the parser input
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Coords {
    /// The absolute character position
    pub absolute: usize,
    /// The row position
    pub line: usize,
    /// The column position
    pub column: usize,
}

impl Coords {
    /// Move the coordinates on past a given character. A newline bumps the line count and
    /// resets the column
    pub fn advance(&mut self, c: char) {
        self.absolute += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Display for Coords {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[abs: {}, line: {}, column: {}]",
            self.absolute, self.line, self.column
        )
    }
}

impl Default for Coords {
    /// The default set of coordinates are positioned at the start of the first row
    fn default() -> Self {
        Coords {
            absolute: 0,
            line: 0,
            column: 0,
        }
    }
}

impl PartialOrd<Self> for Coords {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coords {
    fn cmp(&self, other: &Self) -> Ordering {
        self.absolute.cmp(&other.absolute)
    }
}

impl Sub for Coords {
    type Output = usize;

    /// The absolute distance between two sets of coordinates
    fn sub(self, rhs: Self) -> Self::Output {
        self.absolute.abs_diff(rhs.absolute)
    }
}

/// A [Span] represents a linear interval within the parser input, between two different [Coords]
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
pub struct Span {
    /// Start [Coords] for the span
    pub start: Coords,
    /// End [Coords] for the span
    pub end: Coords,
}

impl Span {
    /// Get the length of the span, minimum is 1
    pub fn len(&self) -> usize {
        match self.start.cmp(&self.end) {
            Ordering::Less => self.end - self.start + 1,
            Ordering::Equal => 1,
            Ordering::Greater => self.start - self.end + 1,
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "start: {}, end: {}, length: {}",
            self.start,
            self.end,
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::coords::{Coords, Span};

    #[test]
    fn should_advance_over_newlines() {
        let mut coords = Coords::default();
        "ab\nc".chars().for_each(|c| coords.advance(c));
        assert_eq!(
            coords,
            Coords {
                absolute: 4,
                line: 1,
                column: 1
            }
        );
    }

    #[test]
    fn should_compute_inclusive_span_lengths() {
        let start = Coords {
            absolute: 3,
            line: 0,
            column: 3,
        };
        let end = Coords {
            absolute: 6,
            line: 0,
            column: 6,
        };
        assert_eq!(Span { start, end }.len(), 4);
        assert_eq!(Span { start, end: start }.len(), 1);
    }
}
