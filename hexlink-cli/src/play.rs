//! Play command - headless bot players
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_one() - one bot's game loop
//! - Level 3: choose_move()
//! - Level 4: LogView rendering to tracing

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hexlink_core::{Board, BoardView, CellColor, Coord, Side, Slot};
use hexlink_net::{Client, ClientController, Phase, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Clone)]
pub struct PlayArgs {
    /// Number of bot players to launch
    #[arg(long, default_value = "2")]
    pub players: usize,

    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(long, default_value = "65431")]
    pub port: u16,

    /// Random seed (random if not set)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Paint move hints after every move
    #[arg(long)]
    pub hints: bool,

    /// Milliseconds between connection polls
    #[arg(long, default_value = "50")]
    pub poll_ms: u64,

    /// Milliseconds to stay connected after the game ends
    #[arg(long, default_value = "1000")]
    pub linger_ms: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Launch one thread per bot
/// 2. Wait for every game to finish and report how it ended
pub fn run(args: PlayArgs) -> Result<()> {
    if args.players % 2 == 1 {
        tracing::warn!("Odd number of players: the last one will wait for an opponent forever");
    }

    let addr = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        ..Default::default()
    }
    .addr();
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Launching {} players against {} (seed {})", args.players, addr, seed);

    let handles: Vec<_> = (1..=args.players)
        .map(|number| {
            let addr = addr.clone();
            let args = args.clone();
            let player_seed = seed.wrapping_add(number as u64);
            std::thread::spawn(move || play_one(number, &addr, player_seed, &args))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(phase)) => tracing::info!("Player {} finished: {:?}", i + 1, phase),
            Ok(Err(e)) => tracing::warn!("Player {} failed: {:#}", i + 1, e),
            Err(_) => tracing::error!("Player {} panicked", i + 1),
        }
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - GAME LOOP
// ============================================================================

fn play_one(number: usize, addr: &str, seed: u64, args: &PlayArgs) -> Result<Phase> {
    let client = Client::connect(addr)?;
    let mut controller = ClientController::start(client, LogView { number }, args.hints)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let poll = Duration::from_millis(args.poll_ms);

    tracing::info!("Player {} plays {:?}", number, controller.side());

    loop {
        match controller.update()? {
            Phase::Playing if controller.is_my_turn() => {
                let Some(coord) = choose_move(controller.board(), controller.side(), &mut rng)
                else {
                    break;
                };
                controller.click(coord)?;
            }
            Phase::Over(_) | Phase::OpponentGone => break,
            Phase::Waiting | Phase::Playing => std::thread::sleep(poll),
        }
    }

    // Keep the connection open so the final move reaches the opponent
    std::thread::sleep(Duration::from_millis(args.linger_ms));
    Ok(controller.phase())
}

// ============================================================================
// LEVEL 3 - MOVE CHOICE
// ============================================================================

/// Prefer a hint cell for our side, otherwise any free cell
fn choose_move(board: &Board, side: Side, rng: &mut ChaCha8Rng) -> Option<Coord> {
    let mut hints: Vec<_> = board.hints(side).into_iter().collect();
    hints.sort();
    if let Some(&coord) = hints.choose(rng) {
        return Some(coord);
    }

    let mut free: Vec<_> = board.active_area().into_iter().collect();
    free.sort();
    free.choose(rng).copied()
}

// ============================================================================
// LEVEL 4 - RENDERING
// ============================================================================

/// View that writes status text to the log
struct LogView {
    number: usize,
}

impl BoardView for LogView {
    fn draw_cell(&mut self, coord: Coord, color: CellColor) {
        tracing::trace!("Player {}: cell ({}, {}) -> {:?}", self.number, coord.x, coord.y, color);
    }

    fn draw_text(&mut self, slot: Slot, text: &str) {
        if slot == Slot::Comment {
            tracing::info!("Player {}: {}", self.number, text);
        }
    }

    fn draw_marker(&mut self, slot: Slot, color: CellColor) {
        tracing::debug!("Player {}: {:?} marker -> {:?}", self.number, slot, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_move_prefers_hints() {
        let mut board = Board::default();
        board.add_move(Coord::new(5, 4), Side::Blue);
        board.add_move(Coord::new(6, 5), Side::Blue);
        let hints = board.hints(Side::Blue);
        assert!(!hints.is_empty());

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..10 {
            let coord = choose_move(&board, Side::Blue, &mut rng).unwrap();
            assert!(hints.contains(&coord));
        }
    }

    #[test]
    fn test_choose_move_is_playable() {
        let board = Board::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let coord = choose_move(&board, Side::Red, &mut rng).unwrap();
        assert!(board.is_playable(coord));
    }

    #[test]
    fn test_choose_move_full_board() {
        let mut board = Board::new(1).unwrap();
        board.add_move(Coord::new(1, 1), Side::Red);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(choose_move(&board, Side::Blue, &mut rng), None);
    }
}
