//! Factory displays and the table center.

use rand::Rng;

use crate::supply::{draw_for_display, Bag, Lid};
use crate::{MoveError, Tile};

/// Tiles per display after a refill.
pub const DISPLAY_CAPACITY: usize = 4;

/// Result of taking one color from a display or the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Take {
    /// Every tile of the chosen color.
    pub collected: Vec<Tile>,
    /// Whether the start marker came along (table takes only).
    pub took_start_marker: bool,
}

// ---------------------------------------------------------------------------
// FactoryDisplays
// ---------------------------------------------------------------------------

/// The ring of `2P + 1` factory displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryDisplays {
    displays: Vec<Vec<Tile>>,
}

impl FactoryDisplays {
    /// Empty displays for `player_count` players.
    pub fn new(player_count: usize) -> Self {
        Self {
            displays: vec![Vec::new(); 2 * player_count + 1],
        }
    }

    /// Fills every display with up to four tiles from the bag, falling back
    /// to the lid. A display stays short when both are empty.
    pub fn refill(&mut self, bag: &mut Bag, lid: &mut Lid, rng: &mut impl Rng) {
        for display in &mut self.displays {
            display.clear();
            for _ in 0..DISPLAY_CAPACITY {
                if let Some(tile) = draw_for_display(bag, lid, rng) {
                    display.push(tile);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn display(&self, index: usize) -> Option<&[Tile]> {
        self.displays.get(index).map(Vec::as_slice)
    }

    pub fn as_slices(&self) -> Vec<Vec<Tile>> {
        self.displays.clone()
    }

    /// `true` once every display has been emptied.
    pub fn is_empty(&self) -> bool {
        self.displays.iter().all(Vec::is_empty)
    }

    pub fn tile_count(&self) -> usize {
        self.displays.iter().map(Vec::len).sum()
    }

    /// Takes every tile matching the color at `tile_index`. The remaining
    /// tiles of that display are returned as spill for the table.
    ///
    /// An empty display yields `Ok(None)`.
    pub fn take(
        &mut self,
        index: usize,
        tile_index: usize,
    ) -> Result<Option<(Take, Vec<Tile>)>, MoveError> {
        let display = self
            .displays
            .get_mut(index)
            .ok_or(MoveError::InvalidDisplayIndex(index))?;
        if display.is_empty() {
            return Ok(None);
        }
        let color = *display
            .get(tile_index)
            .ok_or(MoveError::InvalidTileIndex(tile_index))?;

        let (collected, spill): (Vec<Tile>, Vec<Tile>) =
            display.drain(..).partition(|t| *t == color);
        Ok(Some((
            Take {
                collected,
                took_start_marker: false,
            },
            spill,
        )))
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, displays: Vec<Vec<Tile>>) {
        self.displays = displays;
    }
}

// ---------------------------------------------------------------------------
// GameTable
// ---------------------------------------------------------------------------

/// The shared center. Holds spilled tiles and, at round start, the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTable {
    tiles: Vec<Tile>,
}

impl Default for GameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTable {
    /// A table holding just the start marker.
    pub fn new() -> Self {
        Self {
            tiles: vec![Tile::StartMarker],
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Table holds no colored tile (it may still hold the marker).
    pub fn has_no_colors(&self) -> bool {
        !self.tiles.iter().any(|t| t.is_color())
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_color()).count()
    }

    pub fn spill(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        self.tiles.extend(tiles);
    }

    /// Puts the marker back in front for a new round.
    pub fn reset_start_marker(&mut self) {
        self.tiles.retain(|t| t.is_color());
        self.tiles.insert(0, Tile::StartMarker);
    }

    /// Takes every tile matching the color at `tile_index`, plus the
    /// start marker if it is still in front.
    ///
    /// A table without colored tiles yields `Ok(None)`. Nothing changes
    /// when an error is returned.
    pub fn take(&mut self, tile_index: usize) -> Result<Option<Take>, MoveError> {
        if self.has_no_colors() {
            return Ok(None);
        }
        let color = match self.tiles.get(tile_index) {
            Some(t) if t.is_color() => *t,
            _ => return Err(MoveError::InvalidTileIndex(tile_index)),
        };

        let took_start_marker = self.tiles.first() == Some(&Tile::StartMarker);
        if took_start_marker {
            self.tiles.remove(0);
        }
        let (collected, rest): (Vec<Tile>, Vec<Tile>) =
            self.tiles.drain(..).partition(|t| *t == color);
        self.tiles = rest;
        Ok(Some(Take {
            collected,
            took_start_marker,
        }))
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, tiles: Vec<Tile>) {
        self.tiles = tiles;
    }
}
