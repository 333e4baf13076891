//! Tile kinds and the fixed wall color layout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of the wall and the number of pattern lines.
pub const BOARD_SIZE: usize = 5;

/// Tiles of each color in a fresh bag.
pub const TILES_PER_COLOR: usize = 20;

/// Every drawable color, in bag fill order.
pub const COLORS: [Tile; 5] = [Tile::Red, Tile::Blue, Tile::Green, Tile::Yellow, Tile::Dark];

/// Color order along wall row 0. Each following row is the same order
/// shifted one column to the right.
pub const WALL_ORDER: [Tile; BOARD_SIZE] =
    [Tile::Blue, Tile::Yellow, Tile::Red, Tile::Dark, Tile::Green];

/// A single game piece.
///
/// Serialized with the upper-case names the client protocol uses
/// (`"RED"`, ..., `"START"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tile {
    Red,
    Blue,
    Green,
    Yellow,
    Dark,
    /// The first-player marker. Never lives in the bag or the lid.
    #[serde(rename = "START")]
    StartMarker,
}

impl Tile {
    /// Returns `true` for the five drawable colors.
    pub fn is_color(self) -> bool {
        !matches!(self, Self::StartMarker)
    }

    /// Position of this color in [`WALL_ORDER`], `None` for the marker.
    fn wall_index(self) -> Option<usize> {
        WALL_ORDER.iter().position(|t| *t == self)
    }

    /// Wall column that accepts this color on `row`.
    pub fn wall_column(self, row: usize) -> Option<usize> {
        self.wall_index().map(|idx| (idx + row) % BOARD_SIZE)
    }

    /// Single-character label used by text front-ends.
    pub fn symbol(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Blue => 'B',
            Self::Green => 'G',
            Self::Yellow => 'Y',
            Self::Dark => 'D',
            Self::StartMarker => '1',
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "Red"),
            Self::Blue => write!(f, "Blue"),
            Self::Green => write!(f, "Green"),
            Self::Yellow => write!(f, "Yellow"),
            Self::Dark => write!(f, "Dark"),
            Self::StartMarker => write!(f, "StartMarker"),
        }
    }
}

/// Color that wall cell `(row, col)` requires.
pub fn wall_color(row: usize, col: usize) -> Tile {
    WALL_ORDER[(col + BOARD_SIZE - row % BOARD_SIZE) % BOARD_SIZE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_color_follows_shifted_order() {
        assert_eq!(wall_color(0, 0), Tile::Blue);
        assert_eq!(wall_color(0, 4), Tile::Green);
        assert_eq!(wall_color(1, 0), Tile::Green);
        assert_eq!(wall_color(1, 1), Tile::Blue);
        assert_eq!(wall_color(4, 0), Tile::Yellow);
        assert_eq!(wall_color(3, 0), Tile::Red);
    }

    #[test]
    fn test_wall_column_inverts_wall_color() {
        for row in 0..BOARD_SIZE {
            for color in COLORS {
                let col = color.wall_column(row).unwrap();
                assert_eq!(wall_color(row, col), color);
            }
        }
        assert_eq!(Tile::StartMarker.wall_column(0), None);
    }

    #[test]
    fn test_every_color_once_per_row_and_column() {
        for i in 0..BOARD_SIZE {
            for color in COLORS {
                assert_eq!((0..BOARD_SIZE).filter(|c| wall_color(i, *c) == color).count(), 1);
                assert_eq!((0..BOARD_SIZE).filter(|r| wall_color(*r, i) == color).count(), 1);
            }
        }
    }

    #[test]
    fn test_tile_wire_names() {
        assert_eq!(serde_json::to_string(&Tile::Red).unwrap(), "\"RED\"");
        assert_eq!(serde_json::to_string(&Tile::Dark).unwrap(), "\"DARK\"");
        assert_eq!(serde_json::to_string(&Tile::StartMarker).unwrap(), "\"START\"");
        let parsed: Tile = serde_json::from_str("\"YELLOW\"").unwrap();
        assert_eq!(parsed, Tile::Yellow);
    }

    #[test]
    fn test_is_color() {
        assert!(Tile::Green.is_color());
        assert!(!Tile::StartMarker.is_color());
    }
}
