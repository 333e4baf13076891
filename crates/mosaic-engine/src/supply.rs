//! Bag and lid: where tiles come from and where they go.

use rand::Rng;

use crate::{EngineError, Tile, COLORS, TILES_PER_COLOR};

/// The draw bag. Starts with 20 tiles of every color and only shrinks.
#[derive(Debug, Clone)]
pub struct Bag {
    tiles: Vec<Tile>,
}

impl Bag {
    /// A fresh bag holding all 100 colored tiles.
    pub fn full() -> Self {
        let tiles = COLORS
            .iter()
            .flat_map(|color| std::iter::repeat_n(*color, TILES_PER_COLOR))
            .collect();
        Self { tiles }
    }

    /// Removes one tile chosen uniformly at random.
    pub fn draw_random(&mut self, rng: &mut impl Rng) -> Result<Tile, EngineError> {
        draw_from(&mut self.tiles, rng)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// The box lid. Collects discarded tiles and backs the bag once it runs dry.
#[derive(Debug, Clone, Default)]
pub struct Lid {
    tiles: Vec<Tile>,
}

impl Lid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds discarded tiles. The start marker is never stored here.
    pub fn discard(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        self.tiles.extend(tiles.into_iter().filter(|t| t.is_color()));
    }

    /// Removes one tile chosen uniformly at random.
    pub fn draw_random(&mut self, rng: &mut impl Rng) -> Result<Tile, EngineError> {
        draw_from(&mut self.tiles, rng)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Draws for one display slot: the bag first, then the lid.
///
/// Returns `None` when both are empty; the slot simply stays short.
pub fn draw_for_display(bag: &mut Bag, lid: &mut Lid, rng: &mut impl Rng) -> Option<Tile> {
    bag.draw_random(rng)
        .or_else(|_| lid.draw_random(rng))
        .ok()
}

fn draw_from(tiles: &mut Vec<Tile>, rng: &mut impl Rng) -> Result<Tile, EngineError> {
    if tiles.is_empty() {
        return Err(EngineError::EmptySupply);
    }
    let idx = rng.random_range(0..tiles.len());
    Ok(tiles.swap_remove(idx))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_full_bag_has_twenty_of_each_color() {
        let bag = Bag::full();
        assert_eq!(bag.len(), 100);
        for color in COLORS {
            assert_eq!(bag.tiles.iter().filter(|t| **t == color).count(), 20);
        }
    }

    #[test]
    fn test_draw_random_shrinks_bag() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bag = Bag::full();
        let tile = bag.draw_random(&mut rng).unwrap();
        assert!(tile.is_color());
        assert_eq!(bag.len(), 99);
    }

    #[test]
    fn test_draw_from_empty_is_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut lid = Lid::new();
        assert!(matches!(lid.draw_random(&mut rng), Err(EngineError::EmptySupply)));
    }

    #[test]
    fn test_lid_never_holds_start_marker() {
        let mut lid = Lid::new();
        lid.discard([Tile::StartMarker, Tile::Red, Tile::Blue]);
        assert_eq!(lid.len(), 2);
    }

    #[test]
    fn test_draw_for_display_falls_back_to_lid() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bag = Bag { tiles: Vec::new() };
        let mut lid = Lid::new();
        lid.discard([Tile::Green]);

        assert_eq!(draw_for_display(&mut bag, &mut lid, &mut rng), Some(Tile::Green));
        assert_eq!(draw_for_display(&mut bag, &mut lid, &mut rng), None);
    }
}
