//! Card placement around the axis

use serde::{Deserialize, Serialize};

/// Which side of the axis a card sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Card left of the axis, connector leaves its right edge
    Left,
    /// Card right of the axis, connector leaves its left edge
    Right,
}

impl Side {
    /// Alternate by position in the visible set: even left, odd right
    #[inline]
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Horizontal direction from the card toward the axis
    #[inline]
    #[must_use]
    pub const fn toward_axis(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

/// Grid column a card is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Left column
    Left,
    /// Right column
    Right,
    /// Full width, narrow viewports
    Single,
}

impl Placement {
    /// Placement of the card at `index`; narrow viewports collapse to one column
    #[inline]
    #[must_use]
    pub const fn for_index(index: usize, narrow: bool) -> Self {
        if narrow {
            return Self::Single;
        }
        match Side::for_index(index) {
            Side::Left => Self::Left,
            Side::Right => Self::Right,
        }
    }

    /// CSS grid column of a three-column (left, axis, right) grid
    #[inline]
    #[must_use]
    pub const fn grid_column(self) -> &'static str {
        match self {
            Self::Left => "1",
            Self::Right => "3",
            Self::Single => "1 / -1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_alternate() {
        assert_eq!(Side::for_index(0), Side::Left);
        assert_eq!(Side::for_index(1), Side::Right);
        assert_eq!(Side::for_index(2), Side::Left);
    }

    #[test]
    fn narrow_collapses_to_single() {
        assert_eq!(Placement::for_index(1, true), Placement::Single);
        assert_eq!(Placement::for_index(1, false), Placement::Right);
        assert_eq!(Placement::Single.grid_column(), "1 / -1");
    }
}
