//! The game state machine.
//!
//! A [`Game`] owns every piece of mutable state for one match: boards,
//! bag, lid, displays, table, whose turn it is and the tiles the current
//! player is holding. Each turn has two steps:
//!
//! ```text
//! AwaitingSelection --collect--> HasSelection --place--> AwaitingSelection
//!                                                 |
//!                                   round finished? --> wall tiling
//!                                                 |
//!                                       any wall row complete? --> GameOver
//! ```
//!
//! Operations either return the events they caused or a [`MoveError`]. A
//! rejected operation leaves the game exactly as it was. Rejected
//! placements keep the selection, so the player must place again.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::PlayerBoard;
use crate::event::{BoardUpdate, CollectSource, GameEvent, PlaceTarget};
use crate::factory::{FactoryDisplays, GameTable};
use crate::ranking::rank_players;
use crate::supply::{Bag, Lid};
use crate::{EngineError, MoveError, Tile};

/// Fewest players a game supports.
pub const MIN_PLAYERS: usize = 2;
/// Most players a game supports.
pub const MAX_PLAYERS: usize = 4;

/// Game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Players are drafting tiles.
    Drafting,
    /// Terminal. Final boards stay readable; no more moves.
    GameOver,
}

#[derive(Debug, Clone)]
pub struct Game {
    boards: Vec<PlayerBoard>,
    bag: Bag,
    lid: Lid,
    displays: FactoryDisplays,
    table: GameTable,
    current_player: usize,
    collected: Vec<Tile>,
    phase: GamePhase,
    round: u32,
    rankings: Option<Vec<u32>>,
    rng: StdRng,
}

impl Game {
    /// Starts a game with a full bag, filled displays, the start marker
    /// on the table and a random starting player.
    pub fn new(player_count: usize) -> Result<Self, EngineError> {
        Self::with_rng(player_count, StdRng::from_os_rng())
    }

    /// Like [`Game::new`] but deterministic for a given seed.
    pub fn with_seed(player_count: usize, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(player_count, StdRng::seed_from_u64(seed))
    }

    fn with_rng(player_count: usize, mut rng: StdRng) -> Result<Self, EngineError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(EngineError::InvalidPlayerCount(player_count));
        }

        let mut bag = Bag::full();
        let mut lid = Lid::new();
        let mut displays = FactoryDisplays::new(player_count);
        displays.refill(&mut bag, &mut lid, &mut rng);
        let current_player = rng.random_range(0..player_count);

        tracing::debug!(players = player_count, current_player, "game created");

        Ok(Self {
            boards: vec![PlayerBoard::new(); player_count],
            bag,
            lid,
            displays,
            table: GameTable::new(),
            current_player,
            collected: Vec::new(),
            phase: GamePhase::Drafting,
            round: 1,
            rankings: None,
            rng,
        })
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn player_count(&self) -> usize {
        self.boards.len()
    }

    pub fn board(&self, player: usize) -> &PlayerBoard {
        &self.boards[player]
    }

    pub fn boards(&self) -> &[PlayerBoard] {
        &self.boards
    }

    pub fn displays(&self) -> &FactoryDisplays {
        &self.displays
    }

    pub fn table(&self) -> &GameTable {
        &self.table
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    /// Tiles the current player is holding, empty between turns.
    pub fn collected(&self) -> &[Tile] {
        &self.collected
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Rounds started so far, counting the current one.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Final ranks, set once the game is over.
    pub fn rankings(&self) -> Option<&[u32]> {
        self.rankings.as_deref()
    }

    pub fn bag_len(&self) -> usize {
        self.bag.len()
    }

    pub fn lid_len(&self) -> usize {
        self.lid.len()
    }

    /// Colored tiles across every location in the game. Always 100.
    pub fn total_tiles(&self) -> usize {
        self.bag.len()
            + self.lid.len()
            + self.displays.tile_count()
            + self.table.tile_count()
            + self.collected.len()
            + self
                .boards
                .iter()
                .map(|b| b.staged_tile_count() + b.wall().tile_count())
                .sum::<usize>()
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Collects from either source.
    pub fn collect(
        &mut self,
        player: usize,
        source: CollectSource,
        tile_index: usize,
    ) -> Result<Vec<GameEvent>, MoveError> {
        match source {
            CollectSource::Table => self.take_from_table(player, tile_index),
            CollectSource::Display(display) => {
                self.take_from_display(player, display, tile_index)
            }
        }
    }

    /// Places the current selection on either target.
    pub fn place(
        &mut self,
        player: usize,
        target: PlaceTarget,
    ) -> Result<Vec<GameEvent>, MoveError> {
        match target {
            PlaceTarget::FloorLine => self.place_on_floor_line(player),
            PlaceTarget::PatternLine(row) => self.place_on_pattern_line(player, row),
        }
    }

    /// Takes every tile of the color at `tile_index` from a display. The
    /// rest of the display spills onto the table.
    ///
    /// No-op while a selection is held or when the display is empty.
    pub fn take_from_display(
        &mut self,
        player: usize,
        display: usize,
        tile_index: usize,
    ) -> Result<Vec<GameEvent>, MoveError> {
        self.ensure_can_act(player)?;
        if !self.collected.is_empty() {
            return Ok(Vec::new());
        }
        let Some((take, spill)) = self.displays.take(display, tile_index)? else {
            return Ok(Vec::new());
        };

        self.table.spill(spill);
        self.collected = take.collected.clone();
        Ok(vec![GameEvent::TilesCollected {
            player,
            source: CollectSource::Display(display),
            tile_index,
            tiles: take.collected,
            took_start_marker: false,
        }])
    }

    /// Takes every tile of the color at `tile_index` from the table. The
    /// first player to do so in a round also takes the start marker, which
    /// goes to the front of their floor line.
    ///
    /// No-op while a selection is held or when the table has no colors.
    pub fn take_from_table(
        &mut self,
        player: usize,
        tile_index: usize,
    ) -> Result<Vec<GameEvent>, MoveError> {
        self.ensure_can_act(player)?;
        if !self.collected.is_empty() {
            return Ok(Vec::new());
        }
        let Some(take) = self.table.take(tile_index)? else {
            return Ok(Vec::new());
        };

        if take.took_start_marker {
            self.boards[player].floor_line_mut().push_start_marker();
        }
        self.collected = take.collected.clone();
        Ok(vec![GameEvent::TilesCollected {
            player,
            source: CollectSource::Table,
            tile_index,
            tiles: take.collected,
            took_start_marker: take.took_start_marker,
        }])
    }

    /// Puts the selection on pattern line `row`.
    ///
    /// If no line on the board can take the color at all, the selection
    /// drops to the floor line instead and the move still counts, whatever
    /// `row` says. A line that is merely the wrong choice, or a row past
    /// the board, is rejected and the selection stays.
    pub fn place_on_pattern_line(
        &mut self,
        player: usize,
        row: usize,
    ) -> Result<Vec<GameEvent>, MoveError> {
        self.ensure_can_act(player)?;
        let Some(&color) = self.collected.first() else {
            return Ok(Vec::new());
        };

        let board = &mut self.boards[player];
        let (target, placement) = if board.has_line_for(color) {
            let placement = board.place_on_line(row, &self.collected)?;
            (PlaceTarget::PatternLine(row), placement)
        } else {
            (PlaceTarget::FloorLine, board.place_on_floor(&self.collected))
        };
        Ok(self.finish_placement(player, target, placement))
    }

    /// Drops the selection onto the floor line.
    pub fn place_on_floor_line(&mut self, player: usize) -> Result<Vec<GameEvent>, MoveError> {
        self.ensure_can_act(player)?;
        if self.collected.is_empty() {
            return Ok(Vec::new());
        }
        let placement = self.boards[player].place_on_floor(&self.collected);
        Ok(self.finish_placement(player, PlaceTarget::FloorLine, placement))
    }

    // -----------------------------------------------------------------------
    // Turn and round flow
    // -----------------------------------------------------------------------

    fn ensure_can_act(&self, player: usize) -> Result<(), MoveError> {
        if self.phase == GamePhase::GameOver {
            return Err(MoveError::GameOver);
        }
        if player != self.current_player {
            return Err(MoveError::NotYourTurn {
                player,
                current: self.current_player,
            });
        }
        Ok(())
    }

    /// A round ends once the displays are empty and the table holds no
    /// colored tile.
    fn round_finished(&self) -> bool {
        self.displays.is_empty() && self.table.has_no_colors()
    }

    fn finish_placement(
        &mut self,
        player: usize,
        target: PlaceTarget,
        placement: crate::board::Placement,
    ) -> Vec<GameEvent> {
        self.collected.clear();
        let mut events = vec![GameEvent::TilesPlaced {
            player,
            target,
            pattern_line: placement.pattern_line,
            floor_line: placement.floor_line,
        }];

        if self.round_finished() {
            self.resolve_round(&mut events);
        } else {
            self.current_player = (self.current_player + 1) % self.boards.len();
            events.push(GameEvent::TurnChanged {
                current_player: self.current_player,
            });
        }
        events
    }

    /// Wall tiling, scoring, and then either the next round or game end.
    fn resolve_round(&mut self, events: &mut Vec<GameEvent>) {
        let mut placed = Vec::with_capacity(self.boards.len());
        for board in &mut self.boards {
            let tiling = board.tile_wall();
            self.lid.discard(tiling.discard);
            board.apply_round_score(tiling.gain);
            placed.push(tiling.placed);
        }

        let game_over = self.boards.iter().any(|b| b.wall().has_complete_row());
        if game_over {
            for board in &mut self.boards {
                let bonus = board.end_bonus();
                board.add_bonus(bonus);
            }
        }

        events.push(GameEvent::WallsAndScoresUpdated {
            boards: placed
                .into_iter()
                .zip(&self.boards)
                .map(|(placed, board)| BoardUpdate {
                    placed,
                    score: board.score(),
                })
                .collect(),
        });

        if game_over {
            self.end_game(events);
        } else {
            self.start_next_round(events);
        }
    }

    fn start_next_round(&mut self, events: &mut Vec<GameEvent>) {
        let mut next = self.current_player;
        for (player, board) in self.boards.iter_mut().enumerate() {
            let floor = board.floor_line_mut();
            if floor.holds_start_marker() {
                next = player;
            }
            self.lid.discard(floor.drain());
        }

        self.table.reset_start_marker();
        self.displays.refill(&mut self.bag, &mut self.lid, &mut self.rng);
        self.current_player = next;
        self.round += 1;

        tracing::debug!(round = self.round, current_player = next, "round started");

        events.push(GameEvent::RoundStarted {
            displays: self.displays.as_slices(),
            current_player: next,
        });
    }

    fn end_game(&mut self, events: &mut Vec<GameEvent>) {
        let scores: Vec<u32> = self.boards.iter().map(PlayerBoard::score).collect();
        let rows: Vec<usize> = self
            .boards
            .iter()
            .map(|b| b.wall().completed_rows())
            .collect();
        let rankings = rank_players(&scores, &rows);

        self.phase = GamePhase::GameOver;
        self.rankings = Some(rankings.clone());

        tracing::debug!(round = self.round, ?scores, ?rankings, "game over");

        events.push(GameEvent::GameEnded { rankings });
    }
}
