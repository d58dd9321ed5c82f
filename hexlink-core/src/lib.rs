//! HEXLINK Core - Board geometry and game rules
//!
//! This crate provides the core game logic for HEXLINK:
//! - Hex geometry (odd-row offset and cube coordinates, pixel layout)
//! - Region search (range, ring, flood fill, connectivity)
//! - Board regions, win detection and move hints
//! - Sides, results and a local two-player driver
//! - The drawing interface used by front ends

pub mod hex;
pub mod path;
pub mod board;
pub mod game;
pub mod view;

// Re-exports for convenient access
pub use hex::{Coord, Cube, Layout, Point, CUBE_DIRECTIONS};
pub use path::{connects, range, reachable, ring, Region};
pub use board::{find_hints, Board, BOARD_SIZE, MAX_BOARD_SIZE};
pub use game::{GameError, GameResult, LocalGame, Side};
pub use view::{BoardView, CellColor, Slot};
