//! A player's board: wall, pattern lines, floor line and score.

use std::fmt;

use crate::{wall_color, MoveError, Tile, BOARD_SIZE};

/// Tiles on the floor line that carry a penalty.
pub const FLOOR_CAPACITY: usize = 7;

/// Cumulative floor penalty indexed by the number of counted floor tiles.
pub const FLOOR_PENALTY: [u32; FLOOR_CAPACITY + 1] = [0, 1, 2, 4, 6, 8, 11, 14];

/// Bonus per completed wall row at game end.
pub const ROW_BONUS: u32 = 2;
/// Bonus per completed wall column at game end.
pub const COLUMN_BONUS: u32 = 7;
/// Bonus per color with all five wall cells placed at game end.
pub const COLOR_BONUS: u32 = 10;

// ---------------------------------------------------------------------------
// Wall
// ---------------------------------------------------------------------------

/// The 5x5 wall. Cells only ever go from empty to placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wall {
    placed: [[bool; BOARD_SIZE]; BOARD_SIZE],
}

impl Wall {
    pub fn is_placed(&self, row: usize, col: usize) -> bool {
        self.placed[row][col]
    }

    /// Returns `true` if `row` already holds `color`.
    pub fn row_has(&self, row: usize, color: Tile) -> bool {
        color
            .wall_column(row)
            .is_some_and(|col| self.placed[row][col])
    }

    /// Places `color` on `row` and returns `(column, points)`.
    ///
    /// Returns `None` for the start marker or when the cell is taken.
    pub fn place(&mut self, row: usize, color: Tile) -> Option<(usize, u32)> {
        let col = color.wall_column(row)?;
        if self.placed[row][col] {
            return None;
        }
        self.placed[row][col] = true;
        Some((col, self.score_placement(row, col)))
    }

    /// Points for the tile just placed at `(row, col)`.
    ///
    /// Each direction with at least one neighbor scores its whole
    /// contiguous run. A tile with no neighbors scores 1.
    pub fn score_placement(&self, row: usize, col: usize) -> u32 {
        let left = (0..col).rev().take_while(|c| self.placed[row][*c]).count();
        let right = (col + 1..BOARD_SIZE).take_while(|c| self.placed[row][*c]).count();
        let up = (0..row).rev().take_while(|r| self.placed[*r][col]).count();
        let down = (row + 1..BOARD_SIZE).take_while(|r| self.placed[*r][col]).count();

        let mut points = 0;
        if left + right > 0 {
            points += 1 + left + right;
        }
        if up + down > 0 {
            points += 1 + up + down;
        }
        points.max(1) as u32
    }

    pub fn completed_rows(&self) -> usize {
        self.placed.iter().filter(|row| row.iter().all(|p| *p)).count()
    }

    pub fn completed_columns(&self) -> usize {
        (0..BOARD_SIZE)
            .filter(|col| (0..BOARD_SIZE).all(|row| self.placed[row][*col]))
            .count()
    }

    /// Number of colors whose five cells are all placed.
    pub fn completed_colors(&self) -> usize {
        crate::COLORS
            .iter()
            .filter(|color| (0..BOARD_SIZE).all(|row| self.row_has(row, **color)))
            .count()
    }

    pub fn has_complete_row(&self) -> bool {
        self.completed_rows() > 0
    }

    /// Number of placed cells.
    pub fn tile_count(&self) -> usize {
        self.placed.iter().flatten().filter(|p| **p).count()
    }
}

// ---------------------------------------------------------------------------
// PatternLine
// ---------------------------------------------------------------------------

/// One staging row. Row `i` holds up to `i + 1` tiles of a single color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternLine {
    capacity: usize,
    color: Option<Tile>,
    count: usize,
}

impl PatternLine {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            color: None,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn color(&self) -> Option<Tile> {
        self.color
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Slot view, left to right. Tiles fill from the rightmost slot.
    pub fn slots(&self) -> Vec<Option<Tile>> {
        let free = self.capacity - self.count;
        (0..self.capacity)
            .map(|i| if i < free { None } else { self.color })
            .collect()
    }

    /// Adds up to the free capacity of `color` and returns how many fit.
    fn fill(&mut self, color: Tile, n: usize) -> usize {
        let added = n.min(self.capacity - self.count);
        if added > 0 {
            self.color = Some(color);
            self.count += added;
        }
        added
    }

    fn clear(&mut self) {
        self.color = None;
        self.count = 0;
    }
}

// ---------------------------------------------------------------------------
// FloorLine
// ---------------------------------------------------------------------------

/// Penalty row. Stores every tile dropped on it; only the first seven count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloorLine {
    tiles: Vec<Tile>,
}

impl FloorLine {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn holds_start_marker(&self) -> bool {
        self.tiles.contains(&Tile::StartMarker)
    }

    /// The start marker always goes in front.
    pub fn push_start_marker(&mut self) {
        self.tiles.insert(0, Tile::StartMarker);
    }

    pub fn extend(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        self.tiles.extend(tiles);
    }

    /// Penalty for the current floor, capped at seven tiles.
    pub fn penalty(&self) -> u32 {
        FLOOR_PENALTY[self.tiles.len().min(FLOOR_CAPACITY)]
    }

    /// Empties the floor line, returning everything that was on it.
    pub fn drain(&mut self) -> Vec<Tile> {
        std::mem::take(&mut self.tiles)
    }
}

// ---------------------------------------------------------------------------
// PlayerBoard
// ---------------------------------------------------------------------------

/// Tiles a placement moved onto the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub pattern_line: Vec<Tile>,
    pub floor_line: Vec<Tile>,
}

/// Outcome of moving full pattern lines onto the wall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallTiling {
    /// Wall cells placed this round, as `(row, column)`.
    pub placed: Vec<(usize, usize)>,
    /// Points gained from placements.
    pub gain: u32,
    /// Leftover pattern line tiles bound for the lid.
    pub discard: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBoard {
    wall: Wall,
    lines: [PatternLine; BOARD_SIZE],
    floor: FloorLine,
    score: u32,
}

impl Default for PlayerBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerBoard {
    pub fn new() -> Self {
        Self {
            wall: Wall::default(),
            lines: std::array::from_fn(|row| PatternLine::new(row + 1)),
            floor: FloorLine::default(),
            score: 0,
        }
    }

    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    pub fn pattern_line(&self, row: usize) -> &PatternLine {
        &self.lines[row]
    }

    pub fn pattern_lines(&self) -> &[PatternLine] {
        &self.lines
    }

    pub fn floor_line(&self) -> &FloorLine {
        &self.floor
    }

    pub(crate) fn floor_line_mut(&mut self) -> &mut FloorLine {
        &mut self.floor
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Returns `true` if some pattern line could take `color`: an empty
    /// line whose wall row lacks it, or a partly filled line of that color.
    pub fn has_line_for(&self, color: Tile) -> bool {
        self.lines.iter().enumerate().any(|(row, line)| {
            (line.is_empty() && !self.wall.row_has(row, color))
                || (line.color == Some(color) && !line.is_full())
        })
    }

    /// Checks whether `row` accepts `color` without touching the board.
    pub fn check_line(&self, row: usize, color: Tile) -> Result<(), MoveError> {
        let line = self.lines.get(row).ok_or(MoveError::InvalidRow(row))?;
        if self.wall.row_has(row, color) {
            return Err(MoveError::WallConflict(row));
        }
        if line.is_empty() {
            return Ok(());
        }
        match line.color {
            Some(c) if c == color && line.is_full() => Err(MoveError::LineFull(row)),
            Some(c) if c == color => Ok(()),
            _ => Err(MoveError::ColorMismatch(row)),
        }
    }

    /// Puts `tiles` (all one color) on pattern line `row`; overflow goes to
    /// the floor line.
    pub fn place_on_line(&mut self, row: usize, tiles: &[Tile]) -> Result<Placement, MoveError> {
        let Some(&color) = tiles.first() else {
            return Ok(Placement::default());
        };
        self.check_line(row, color)?;

        let added = self.lines[row].fill(color, tiles.len());
        let overflow = tiles[added..].to_vec();
        self.floor.extend(overflow.iter().copied());
        Ok(Placement {
            pattern_line: tiles[..added].to_vec(),
            floor_line: overflow,
        })
    }

    /// Drops `tiles` straight onto the floor line.
    pub fn place_on_floor(&mut self, tiles: &[Tile]) -> Placement {
        self.floor.extend(tiles.iter().copied());
        Placement {
            pattern_line: Vec::new(),
            floor_line: tiles.to_vec(),
        }
    }

    /// Moves every full pattern line onto the wall, top to bottom.
    pub fn tile_wall(&mut self) -> WallTiling {
        let mut tiling = WallTiling::default();
        for row in 0..BOARD_SIZE {
            let line = &mut self.lines[row];
            if !line.is_full() {
                continue;
            }
            let Some(color) = line.color else { continue };
            if let Some((col, points)) = self.wall.place(row, color) {
                tiling.placed.push((row, col));
                tiling.gain += points;
            }
            tiling
                .discard
                .extend(std::iter::repeat_n(color, line.capacity - 1));
            line.clear();
        }
        tiling
    }

    /// Applies a round's gain and floor penalty. The score never drops
    /// below zero.
    pub fn apply_round_score(&mut self, gain: u32) -> u32 {
        self.score = (self.score + gain).saturating_sub(self.floor.penalty());
        self.score
    }

    /// End-of-game bonus for completed rows, columns and colors.
    pub fn end_bonus(&self) -> u32 {
        self.wall.completed_rows() as u32 * ROW_BONUS
            + self.wall.completed_columns() as u32 * COLUMN_BONUS
            + self.wall.completed_colors() as u32 * COLOR_BONUS
    }

    pub(crate) fn add_bonus(&mut self, bonus: u32) {
        self.score += bonus;
    }

    /// Tiles held on the pattern lines and floor line (marker excluded).
    pub fn staged_tile_count(&self) -> usize {
        self.lines.iter().map(|l| l.count).sum::<usize>()
            + self.floor.tiles.iter().filter(|t| t.is_color()).count()
    }

    #[cfg(test)]
    pub(crate) fn wall_mut(&mut self) -> &mut Wall {
        &mut self.wall
    }
}

impl fmt::Display for PlayerBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score {}", self.score)?;
        for row in 0..BOARD_SIZE {
            let line = &self.lines[row];
            let pad = " ".repeat(2 * (BOARD_SIZE - line.capacity));
            write!(f, "{pad}")?;
            for slot in line.slots() {
                write!(f, "{} ", slot.map_or('.', Tile::symbol))?;
            }
            write!(f, "| ")?;
            for col in 0..BOARD_SIZE {
                let color = wall_color(row, col);
                let ch = if self.wall.placed[row][col] {
                    color.symbol()
                } else {
                    color.symbol().to_ascii_lowercase()
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "floor:")?;
        for tile in &self.floor.tiles {
            write!(f, " {}", tile.symbol())?;
        }
        write!(f, " (-{})", self.floor.penalty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_with(cells: &[(usize, usize)]) -> Wall {
        let mut wall = Wall::default();
        for (r, c) in cells {
            wall.placed[*r][*c] = true;
        }
        wall
    }

    #[test]
    fn test_score_placement_isolated() {
        let wall = wall_with(&[(2, 2)]);
        assert_eq!(wall.score_placement(2, 2), 1);
    }

    #[test]
    fn test_score_placement_two_to_the_left() {
        let wall = wall_with(&[(2, 0), (2, 1), (2, 2)]);
        assert_eq!(wall.score_placement(2, 2), 3);
    }

    #[test]
    fn test_score_placement_cross() {
        let wall = wall_with(&[(2, 1), (2, 2), (2, 3), (1, 2), (3, 2)]);
        assert_eq!(wall.score_placement(2, 2), 6);
    }

    #[test]
    fn test_score_placement_gap_breaks_run() {
        let wall = wall_with(&[(0, 0), (0, 2)]);
        assert_eq!(wall.score_placement(0, 2), 1);
    }

    #[test]
    fn test_floor_penalty_table() {
        let mut floor = FloorLine::default();
        let expected = [0, 1, 2, 4, 6, 8, 11, 14, 14, 14];
        for want in expected {
            assert_eq!(floor.penalty(), want);
            floor.extend([Tile::Red]);
        }
    }

    #[test]
    fn test_start_marker_counts_toward_penalty() {
        let mut floor = FloorLine::default();
        floor.push_start_marker();
        floor.extend([Tile::Blue]);
        assert_eq!(floor.tiles(), &[Tile::StartMarker, Tile::Blue]);
        assert_eq!(floor.penalty(), 2);
    }

    #[test]
    fn test_pattern_line_fills_rightmost_slots() {
        let mut board = PlayerBoard::new();
        board.place_on_line(3, &[Tile::Red, Tile::Red]).unwrap();
        assert_eq!(
            board.pattern_line(3).slots(),
            vec![None, None, Some(Tile::Red), Some(Tile::Red)]
        );
    }

    #[test]
    fn test_place_on_line_overflows_to_floor() {
        let mut board = PlayerBoard::new();
        let placement = board.place_on_line(1, &[Tile::Blue; 4]).unwrap();
        assert_eq!(placement.pattern_line.len(), 2);
        assert_eq!(placement.floor_line.len(), 2);
        assert!(board.pattern_line(1).is_full());
        assert_eq!(board.floor_line().len(), 2);
    }

    #[test]
    fn test_place_on_line_rejections() {
        let mut board = PlayerBoard::new();
        board.place_on_line(0, &[Tile::Red]).unwrap();
        assert_eq!(board.place_on_line(0, &[Tile::Red]), Err(MoveError::LineFull(0)));
        assert_eq!(board.place_on_line(0, &[Tile::Blue]), Err(MoveError::ColorMismatch(0)));

        board.place_on_line(2, &[Tile::Yellow]).unwrap();
        assert_eq!(board.place_on_line(2, &[Tile::Dark]), Err(MoveError::ColorMismatch(2)));
        assert_eq!(board.place_on_line(5, &[Tile::Dark]), Err(MoveError::InvalidRow(5)));

        board.wall.place(4, Tile::Green);
        assert_eq!(board.place_on_line(4, &[Tile::Green]), Err(MoveError::WallConflict(4)));
    }

    #[test]
    fn test_rejected_placement_leaves_board_untouched() {
        let mut board = PlayerBoard::new();
        board.place_on_line(1, &[Tile::Red]).unwrap();
        let before = board.clone();
        assert!(board.place_on_line(1, &[Tile::Blue, Tile::Blue]).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_has_line_for() {
        let mut board = PlayerBoard::new();
        assert!(board.has_line_for(Tile::Red));
        for row in 0..BOARD_SIZE {
            board.wall.place(row, Tile::Red);
        }
        assert!(!board.has_line_for(Tile::Red));
        assert!(board.has_line_for(Tile::Blue));
    }

    #[test]
    fn test_tile_wall_places_one_and_discards_rest() {
        let mut board = PlayerBoard::new();
        board.place_on_line(3, &[Tile::Dark; 4]).unwrap();
        board.place_on_line(2, &[Tile::Red; 2]).unwrap();

        let tiling = board.tile_wall();
        let col = Tile::Dark.wall_column(3).unwrap();
        assert_eq!(tiling.placed, vec![(3, col)]);
        assert_eq!(tiling.gain, 1);
        assert_eq!(tiling.discard, vec![Tile::Dark; 3]);
        assert!(board.pattern_line(3).is_empty());
        assert_eq!(board.pattern_line(2).count(), 2);
    }

    #[test]
    fn test_round_score_clamps_at_zero() {
        let mut board = PlayerBoard::new();
        board.place_on_floor(&[Tile::Red; 3]);
        assert_eq!(board.apply_round_score(1), 0);
    }

    #[test]
    fn test_end_bonus() {
        let mut board = PlayerBoard::new();
        for col in 0..BOARD_SIZE {
            board.wall.placed[0][col] = true;
        }
        for row in 0..BOARD_SIZE {
            board.wall.placed[row][0] = true;
        }
        // Blue sits on the diagonal.
        for i in 0..BOARD_SIZE {
            board.wall.placed[i][i] = true;
        }
        assert_eq!(board.wall.completed_rows(), 1);
        assert_eq!(board.wall.completed_columns(), 1);
        assert_eq!(board.wall.completed_colors(), 1);
        assert_eq!(board.end_bonus(), 2 + 7 + 10);
    }
}
