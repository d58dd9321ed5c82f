//! Sides, results and the local two-player game driver

use crate::board::Board;
use crate::hex::Coord;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player side. Red joins the first and last rows, blue the first and last
/// columns. On the wire red is 0 and blue is 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red = 0,
    Blue = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Side {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::Red),
            1 => Ok(Side::Blue),
            other => Err(GameError::InvalidSide(other)),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    RedWins,
    BlueWins,
}

impl GameResult {
    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::Ongoing => None,
            GameResult::RedWins => Some(Side::Red),
            GameResult::BlueWins => Some(Side::Blue),
        }
    }

    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }
}

impl From<Side> for GameResult {
    fn from(side: Side) -> Self {
        match side {
            Side::Red => GameResult::RedWins,
            Side::Blue => GameResult::BlueWins,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Board size must be between 1 and {max}, got {size}")]
    InvalidSize { size: usize, max: usize },

    #[error("Cell ({}, {}) is not playable", .0.x, .0.y)]
    NotPlayable(Coord),

    #[error("Game is already over: {0:?}")]
    GameOver(GameResult),

    #[error("Invalid side value: {0}")]
    InvalidSide(u8),
}

// ============================================================================
// LOCAL GAME
// ============================================================================

/// Two players taking turns on one board
#[derive(Clone, Debug)]
pub struct LocalGame {
    board: Board,
    turn: Side,
    result: GameResult,
}

impl LocalGame {
    pub fn new(board: Board, first: Side) -> Self {
        Self {
            board,
            turn: first,
            result: GameResult::Ongoing,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move next
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Claim `coord` for the side to move, then check for a winner. The turn
    /// passes only while the game is still ongoing.
    pub fn play(&mut self, coord: Coord) -> Result<GameResult, GameError> {
        if self.result.is_over() {
            return Err(GameError::GameOver(self.result));
        }
        if !self.board.is_playable(coord) {
            return Err(GameError::NotPlayable(coord));
        }

        self.board.add_move(coord, self.turn);
        self.result = self.board.check_result();
        if !self.result.is_over() {
            self.turn = self.turn.opponent();
        }
        Ok(self.result)
    }
}
