//! Drawing interface implemented by whatever renders the board

use crate::game::Side;
use crate::hex::Coord;

/// What a cell should look like
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellColor {
    Empty,
    Corner,
    Boundary(Side),
    Owned(Side),
    Hint(Side),
    WinningChain(Side),
    /// Turn indicator cell with nobody to move
    Idle,
}

/// Fixed places for status text and indicator cells, outside the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Turn,
    Side,
    Comment,
}

/// Rendering collaborator. Coordinates are board cells; implementations map
/// them to pixels with a [`Layout`](crate::hex::Layout).
pub trait BoardView {
    fn draw_cell(&mut self, coord: Coord, color: CellColor);

    fn draw_text(&mut self, slot: Slot, text: &str);

    /// Paint the indicator cell for a slot
    fn draw_marker(&mut self, slot: Slot, color: CellColor);
}
