//! Board regions, move bookkeeping, win detection and hints

use crate::game::{GameError, GameResult, Side};
use crate::hex::{Coord, Layout, Point};
use crate::path::{connects, ring, Region};
use crate::view::{BoardView, CellColor};

/// Playable side length of the standard board
pub const BOARD_SIZE: usize = 11;

/// Largest playable side length whose coordinates still fit the two-digit
/// protocol fields
pub const MAX_BOARD_SIZE: usize = 65;

/// A parallelogram board. Row `y` spans columns `y/2 .. y/2 + width`, where
/// width is the playable size plus one boundary cell on each end.
///
/// Every region except the occupied sets is fixed at construction. Occupied
/// sets only grow.
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    playground: Region,
    red_1: Region,
    red_2: Region,
    blue_1: Region,
    blue_2: Region,
    corners: Region,
    occupied_red: Region,
    occupied_blue: Region,
}

impl Default for Board {
    fn default() -> Self {
        Self::build(BOARD_SIZE)
    }
}

impl Board {
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(GameError::InvalidSize {
                size,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(Self::build(size))
    }

    fn build(size: usize) -> Self {
        let width = size as i32 + 2;
        let mut board = Self {
            size,
            playground: Region::default(),
            red_1: Region::default(),
            red_2: Region::default(),
            blue_1: Region::default(),
            blue_2: Region::default(),
            corners: Region::default(),
            occupied_red: Region::default(),
            occupied_blue: Region::default(),
        };

        for y in 0..width {
            let first = y / 2;
            let last = first + width - 1;
            for x in first..=last {
                let hex = Coord::new(x, y);
                board.playground.insert(hex);
                if y == 0 {
                    board.red_1.insert(hex);
                }
                if y == width - 1 {
                    board.red_2.insert(hex);
                }
                if x == first {
                    board.blue_1.insert(hex);
                }
                if x == last {
                    board.blue_2.insert(hex);
                }
            }
        }

        let red = &board.red_1 | &board.red_2;
        let blue = &board.blue_1 | &board.blue_2;
        let corners = &red & &blue;
        for edge in [
            &mut board.red_1,
            &mut board.red_2,
            &mut board.blue_1,
            &mut board.blue_2,
        ] {
            edge.retain(|c| !corners.contains(c));
        }
        board.corners = corners;
        board
    }

    // ========================================================================
    // REGIONS
    // ========================================================================

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn playground(&self) -> &Region {
        &self.playground
    }

    pub fn corners(&self) -> &Region {
        &self.corners
    }

    /// The two opposite edges `side` has to join
    pub fn edges(&self, side: Side) -> (&Region, &Region) {
        match side {
            Side::Red => (&self.red_1, &self.red_2),
            Side::Blue => (&self.blue_1, &self.blue_2),
        }
    }

    /// Both edges of `side`
    pub fn boundary(&self, side: Side) -> Region {
        let (a, b) = self.edges(side);
        a | b
    }

    pub fn occupied(&self, side: Side) -> &Region {
        match side {
            Side::Red => &self.occupied_red,
            Side::Blue => &self.occupied_blue,
        }
    }

    /// Boundary plus owned cells: everything a chain of `side` may use
    pub fn owned(&self, side: Side) -> Region {
        &self.boundary(side) | self.occupied(side)
    }

    /// Cells a move may target
    pub fn active_area(&self) -> Region {
        self.playground
            .iter()
            .filter(|c| self.is_playable(**c))
            .copied()
            .collect()
    }

    pub fn is_playable(&self, coord: Coord) -> bool {
        self.playground.contains(&coord)
            && !self.corners.contains(&coord)
            && !self.red_1.contains(&coord)
            && !self.red_2.contains(&coord)
            && !self.blue_1.contains(&coord)
            && !self.blue_2.contains(&coord)
            && !self.occupied_red.contains(&coord)
            && !self.occupied_blue.contains(&coord)
    }

    // ========================================================================
    // MOVES AND RESULT
    // ========================================================================

    /// Claim a cell for `side`. The caller checks [`Board::is_playable`]
    /// first; this only records the move.
    pub fn add_move(&mut self, coord: Coord, side: Side) {
        match side {
            Side::Red => self.occupied_red.insert(coord),
            Side::Blue => self.occupied_blue.insert(coord),
        };
    }

    /// Red is checked before blue. A red chain top to bottom separates the
    /// two blue edges, so both cannot hold at once and the order never
    /// decides a game.
    pub fn check_result(&self) -> GameResult {
        for side in [Side::Red, Side::Blue] {
            if self.winning_chain(side).is_some() {
                return GameResult::from(side);
            }
        }
        GameResult::Ongoing
    }

    /// Chain of cells joining the two edges of `side`, if one exists
    pub fn winning_chain(&self, side: Side) -> Option<Vec<Coord>> {
        let (edge_1, edge_2) = self.edges(side);
        let start = *edge_1.iter().min()?;
        let goal = *edge_2.iter().min()?;
        connects(start, goal, Some(&self.owned(side)))
    }

    /// Cells that would link two of `side`'s stones sitting two steps apart
    /// through a pair of shared empty neighbors
    pub fn hints(&self, side: Side) -> Region {
        find_hints(self.occupied(side), &self.active_area())
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    pub fn color_of(&self, coord: Coord) -> CellColor {
        if self.corners.contains(&coord) {
            CellColor::Corner
        } else if self.occupied_red.contains(&coord) {
            CellColor::Owned(Side::Red)
        } else if self.occupied_blue.contains(&coord) {
            CellColor::Owned(Side::Blue)
        } else if self.red_1.contains(&coord) || self.red_2.contains(&coord) {
            CellColor::Boundary(Side::Red)
        } else if self.blue_1.contains(&coord) || self.blue_2.contains(&coord) {
            CellColor::Boundary(Side::Blue)
        } else {
            CellColor::Empty
        }
    }

    pub fn render(&self, view: &mut impl BoardView) {
        let mut cells: Vec<_> = self.playground.iter().copied().collect();
        cells.sort();
        for cell in cells {
            view.draw_cell(cell, self.color_of(cell));
        }
    }

    /// Map a pointer position to a cell, only if a move may go there
    pub fn cell_at(&self, layout: &Layout, point: Point) -> Option<Coord> {
        let hex = layout.pixel_to_hex(point);
        self.is_playable(hex).then_some(hex)
    }
}

/// For every pair of owned cells two steps apart that share exactly two empty
/// neighbors, both neighbors are hints
pub fn find_hints(owned: &Region, active_area: &Region) -> Region {
    let mut hints = Region::default();
    for &a in owned {
        for b in ring(a, 2).intersection(owned) {
            let around_a = ring(a, 1);
            let around_b = ring(*b, 1);
            let between: Vec<_> = around_a
                .intersection(&around_b)
                .filter(|c| active_area.contains(c))
                .copied()
                .collect();
            if between.len() == 2 {
                hints.extend(between);
            }
        }
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_layout() {
        let board = Board::default();
        let width = BOARD_SIZE + 2;
        assert_eq!(board.playground().len(), width * width);
        assert_eq!(board.corners().len(), 4);
        for side in [Side::Red, Side::Blue] {
            let (a, b) = board.edges(side);
            assert_eq!(a.len(), BOARD_SIZE);
            assert_eq!(b.len(), BOARD_SIZE);
        }
        assert_eq!(board.active_area().len(), BOARD_SIZE * BOARD_SIZE);
    }

    #[test]
    fn test_regions_disjoint() {
        let board = Board::default();
        let red = board.boundary(Side::Red);
        let blue = board.boundary(Side::Blue);
        assert!(red.is_disjoint(&blue));
        assert!(red.is_disjoint(board.corners()));
        assert!(blue.is_disjoint(board.corners()));
        assert!(board.active_area().is_disjoint(&red));
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(Board::new(0).is_err());
        assert!(Board::new(MAX_BOARD_SIZE + 1).is_err());
        assert!(Board::new(MAX_BOARD_SIZE).is_ok());
    }

    #[test]
    fn test_empty_board_has_no_winner() {
        assert_eq!(Board::default().check_result(), GameResult::Ongoing);
        assert_eq!(Board::new(1).unwrap().check_result(), GameResult::Ongoing);
    }

    #[test]
    fn test_minimal_board_red_wins() {
        let mut board = Board::new(1).unwrap();
        let center = Coord::new(1, 1);
        assert_eq!(board.active_area().len(), 1);
        assert!(board.is_playable(center));

        board.add_move(center, Side::Red);
        assert_eq!(board.check_result(), GameResult::RedWins);
        assert!(!board.is_playable(center));
        assert!(board.winning_chain(Side::Blue).is_none());
    }

    #[test]
    fn test_minimal_board_blue_wins() {
        let mut board = Board::new(1).unwrap();
        board.add_move(Coord::new(1, 1), Side::Blue);
        assert_eq!(board.check_result(), GameResult::BlueWins);
    }

    #[test]
    fn test_red_column_wins() {
        let mut board = Board::new(3).unwrap();
        for cell in [Coord::new(1, 1), Coord::new(2, 2), Coord::new(2, 3)] {
            assert!(board.is_playable(cell));
            board.add_move(cell, Side::Red);
        }
        assert_eq!(board.check_result(), GameResult::RedWins);
    }

    #[test]
    fn test_broken_chain_does_not_win() {
        let mut board = Board::new(3).unwrap();
        board.add_move(Coord::new(1, 1), Side::Red);
        board.add_move(Coord::new(2, 3), Side::Red);
        board.add_move(Coord::new(2, 2), Side::Blue);
        assert_eq!(board.check_result(), GameResult::Ongoing);
    }

    #[test]
    fn test_hints_between_two_stones() {
        let mut board = Board::default();
        let a = Coord::new(5, 4);
        let b = Coord::new(6, 5);
        assert_eq!(a.distance_to(b), 2);
        board.add_move(a, Side::Blue);
        board.add_move(b, Side::Blue);

        let hints = board.hints(Side::Blue);
        let expected: Region = ring(a, 1).intersection(&ring(b, 1)).copied().collect();
        assert_eq!(expected.len(), 2);
        assert_eq!(hints, expected);
        assert!(board.hints(Side::Red).is_empty());
    }

    #[test]
    fn test_blocked_bridge_gives_no_hint() {
        let mut board = Board::default();
        let a = Coord::new(5, 4);
        let b = Coord::new(6, 5);
        board.add_move(a, Side::Blue);
        board.add_move(b, Side::Blue);
        let shared: Vec<_> = ring(a, 1).intersection(&ring(b, 1)).copied().collect();
        board.add_move(shared[0], Side::Red);
        assert!(board.hints(Side::Blue).is_empty());
    }

    #[test]
    fn test_cell_at_only_playable() {
        let board = Board::default();
        let layout = Layout::default();
        let inside = Coord::new(6, 5);
        assert_eq!(board.cell_at(&layout, layout.hex_to_pixel(inside)), Some(inside));
        let edge = Coord::new(3, 0);
        assert_eq!(board.cell_at(&layout, layout.hex_to_pixel(edge)), None);
    }
}
