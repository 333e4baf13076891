//! Translation from engine events to protocol messages.
//!
//! The engine speaks in player indices; clients speak in nicknames. The
//! room passes its ordered nickname list so `player i` becomes
//! `nicks[i]`.

use mosaic_engine::{Game, GameEvent};
use mosaic_protocol::{
    collect_place, place_location, BoardContent, PlayerRanking, Recipient, ServerMessage,
};

/// Addressed messages for one engine event.
pub(crate) fn event_messages(event: GameEvent, nicks: &[String]) -> Vec<(Recipient, ServerMessage)> {
    match event {
        GameEvent::TilesCollected {
            player,
            source,
            tile_index,
            ..
        } => {
            let nick = nicks[player].clone();
            vec![(
                Recipient::AllExcept(nick.clone()),
                ServerMessage::SomebodyCollectedTiles {
                    nick,
                    collect_place: collect_place(source),
                    tile_index,
                },
            )]
        }

        GameEvent::TilesPlaced {
            player,
            target,
            pattern_line,
            floor_line,
        } => {
            let nick = nicks[player].clone();
            let location = place_location(target);
            vec![
                (
                    Recipient::Player(nick.clone()),
                    ServerMessage::ValidMove {
                        place_location: location,
                        pattern_line_tiles: pattern_line.clone(),
                        floor_line_tiles: floor_line.clone(),
                    },
                ),
                (
                    Recipient::AllExcept(nick.clone()),
                    ServerMessage::SomebodyPlacedTiles {
                        nick,
                        place_location: location,
                        pattern_line_tiles: pattern_line,
                        floor_line_tiles: floor_line,
                    },
                ),
            ]
        }

        GameEvent::TurnChanged { current_player } => {
            vec![(Recipient::All, ServerMessage::Turn { current_player })]
        }

        GameEvent::WallsAndScoresUpdated { boards } => vec![(
            Recipient::All,
            ServerMessage::UpdateWallsAndScores {
                updated_content: boards.iter().map(BoardContent::from).collect(),
            },
        )],

        GameEvent::RoundStarted {
            displays,
            current_player,
        } => vec![(
            Recipient::All,
            ServerMessage::StartNextRound {
                factory_displays: displays,
                current_player,
            },
        )],

        GameEvent::GameEnded { rankings } => vec![(
            Recipient::All,
            ServerMessage::EndOfGame {
                rankings: rankings
                    .into_iter()
                    .enumerate()
                    .map(|(player_id, ranking)| PlayerRanking { player_id, ranking })
                    .collect(),
            },
        )],
    }
}

/// `game start` for a freshly created game.
pub(crate) fn game_start(game: &Game) -> ServerMessage {
    ServerMessage::GameStart {
        factory_displays: game.displays().as_slices(),
        current_player: game.current_player(),
    }
}

/// `restart` for a game created by a passed restart vote.
pub(crate) fn restart(game: &Game) -> ServerMessage {
    ServerMessage::Restart {
        factory_displays: game.displays().as_slices(),
        current_player: game.current_player(),
    }
}

#[cfg(test)]
mod tests {
    use mosaic_engine::{BoardUpdate, CollectSource, PlaceTarget, Tile};

    use super::*;

    fn nicks() -> Vec<String> {
        vec!["ana".into(), "bo".into()]
    }

    #[test]
    fn test_collect_goes_to_everyone_else() {
        let msgs = event_messages(
            GameEvent::TilesCollected {
                player: 1,
                source: CollectSource::Table,
                tile_index: 2,
                tiles: vec![Tile::Red],
                took_start_marker: true,
            },
            &nicks(),
        );
        assert_eq!(
            msgs,
            vec![(
                Recipient::AllExcept("bo".into()),
                ServerMessage::SomebodyCollectedTiles {
                    nick: "bo".into(),
                    collect_place: -1,
                    tile_index: 2,
                },
            )]
        );
    }

    #[test]
    fn test_placement_splits_into_valid_move_and_broadcast() {
        let msgs = event_messages(
            GameEvent::TilesPlaced {
                player: 0,
                target: PlaceTarget::PatternLine(3),
                pattern_line: vec![Tile::Blue; 2],
                floor_line: vec![],
            },
            &nicks(),
        );
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].0, Recipient::Player("ana".into()));
        assert!(matches!(msgs[0].1, ServerMessage::ValidMove { place_location: 3, .. }));
        assert_eq!(msgs[1].0, Recipient::AllExcept("ana".into()));
        assert!(matches!(
            &msgs[1].1,
            ServerMessage::SomebodyPlacedTiles { nick, .. } if nick == "ana"
        ));
    }

    #[test]
    fn test_rankings_are_indexed_by_player() {
        let msgs = event_messages(GameEvent::GameEnded { rankings: vec![2, 1] }, &nicks());
        assert_eq!(
            msgs[0].1,
            ServerMessage::EndOfGame {
                rankings: vec![
                    PlayerRanking { player_id: 0, ranking: 2 },
                    PlayerRanking { player_id: 1, ranking: 1 },
                ],
            }
        );
    }

    #[test]
    fn test_wall_update_is_broadcast() {
        let msgs = event_messages(
            GameEvent::WallsAndScoresUpdated {
                boards: vec![BoardUpdate { placed: vec![(0, 0)], score: 1 }],
            },
            &nicks(),
        );
        assert_eq!(msgs[0].0, Recipient::All);
    }
}
