//! Offline hotseat Mosaic: every player shares one terminal.
//!
//! Usage: cargo run -p mosaic-hotseat -- [--players 3] [--seed 7]

use std::io::{self, BufRead, Write};

use clap::Parser;
use mosaic_engine::{CollectSource, Game, GameEvent, PlaceTarget, Tile};

#[derive(Parser, Debug)]
#[command(name = "mosaic-hotseat", about = "Play Mosaic with friends at one keyboard")]
struct Args {
    /// Number of players (2-4).
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Seed for the tile bag. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

/// One parsed line of player input.
enum Command {
    Collect(CollectSource, usize),
    Place(PlaceTarget),
    Quit,
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    let cmd = parts.next()?;
    let mut number = || parts.next().and_then(|p| p.parse::<usize>().ok());
    match cmd {
        "t" | "table" => Some(Command::Collect(CollectSource::Table, number()?)),
        "d" | "display" => {
            let display = number()?;
            Some(Command::Collect(CollectSource::Display(display), number()?))
        }
        "p" | "place" => Some(Command::Place(PlaceTarget::PatternLine(number()?))),
        "f" | "floor" => Some(Command::Place(PlaceTarget::FloorLine)),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn tiles(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.symbol().to_string()).collect::<Vec<_>>().join(" ")
}

fn print_state(game: &Game) {
    println!("\n=== round {} ===", game.round());
    for (i, display) in game.displays().as_slices().iter().enumerate() {
        println!("  display {i}: {}", tiles(display));
    }
    println!("  table:     {}", tiles(game.table().tiles()));
    for (i, board) in game.boards().iter().enumerate() {
        let marker = if i == game.current_player() { ">" } else { " " };
        println!("\n{marker} player {i}\n{board}");
    }
    if !game.collected().is_empty() {
        println!("\nin hand: {}", tiles(game.collected()));
    }
}

fn report(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::WallsAndScoresUpdated { boards } => {
                let scores: Vec<_> = boards.iter().map(|b| b.score).collect();
                println!("round scored: {scores:?}");
            }
            GameEvent::GameEnded { rankings } => {
                println!("\nGame over!");
                for (player, rank) in rankings.iter().enumerate() {
                    println!("  player {player}: rank {rank}");
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let mut game = match args.seed {
        Some(seed) => Game::with_seed(args.players, seed)?,
        None => Game::new(args.players)?,
    };

    println!("Commands: d <display> <tile> | t <tile> | p <row> | f | q");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        print_state(&game);
        print!("player {}> ", game.current_player());
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let player = game.current_player();

        let result = match parse_command(&line) {
            Some(Command::Collect(source, tile)) => game.collect(player, source, tile),
            Some(Command::Place(target)) => game.place(player, target),
            Some(Command::Quit) => break,
            None => {
                println!("unrecognized command");
                continue;
            }
        };

        match result {
            Ok(events) if events.is_empty() => println!("nothing happened"),
            Ok(events) => report(&events),
            Err(e) => println!("invalid move: {e}"),
        }
    }

    if game.is_over() {
        print_state(&game);
    }
    Ok(())
}
