//! Networked game flow for one player
//!
//! Glues a [`Client`] connection to a local [`Board`] and a [`BoardView`].
//! The front end calls [`ClientController::update`] periodically and
//! [`ClientController::click`] when the player picks a cell.

use crate::client::{Client, ClientError};
use hexlink_core::{Board, BoardView, CellColor, Coord, GameResult, Side, Slot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Connected, no opponent yet
    Waiting,
    Playing,
    OpponentGone,
    Over(GameResult),
}

pub struct ClientController<V: BoardView> {
    client: Client,
    view: V,
    board: Board,
    side: Side,
    turn: Side,
    phase: Phase,
    hints: bool,
}

impl<V: BoardView> ClientController<V> {
    /// Receive side and turn from the server and draw the empty board
    pub fn start(mut client: Client, mut view: V, hints: bool) -> Result<Self, ClientError> {
        let side = client.receive_side()?;
        let turn = client.receive_turn()?;

        let board = Board::default();
        board.render(&mut view);
        view.draw_text(Slot::Side, "Your side:");
        view.draw_marker(Slot::Side, CellColor::Owned(side));
        view.draw_marker(Slot::Turn, CellColor::Idle);
        view.draw_text(Slot::Comment, "Waiting.");

        Ok(Self {
            client,
            view,
            board,
            side,
            turn,
            phase: Phase::Waiting,
            hints,
        })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == Phase::Playing && self.turn == self.side
    }

    /// Poll the connection once: start when an opponent shows up, apply the
    /// opponent's move, notice when they leave. A relayed move outside the
    /// active area is a [`ClientError::InvalidMove`] and leaves the board
    /// untouched.
    pub fn update(&mut self) -> Result<Phase, ClientError> {
        match self.phase {
            Phase::Waiting => {
                if self.client.check_opponent()? {
                    self.phase = Phase::Playing;
                    self.draw_turn();
                }
            }
            Phase::Playing => {
                if self.turn != self.side {
                    if let Some(coord) = self.client.try_receive_move()? {
                        if !self.board.is_playable(coord) {
                            tracing::warn!("Rejecting opponent move to {:?}", coord);
                            return Err(ClientError::InvalidMove(coord));
                        }
                        self.apply(coord, self.side.opponent());
                    }
                }
                if self.phase == Phase::Playing && !self.client.check_opponent()? {
                    self.phase = Phase::OpponentGone;
                    self.view.draw_text(Slot::Comment, "Opponent has gone.");
                    self.view.draw_marker(Slot::Turn, CellColor::Idle);
                }
            }
            Phase::OpponentGone | Phase::Over(_) => {}
        }
        Ok(self.phase)
    }

    /// Play a cell for this player. Returns `false` without doing anything
    /// when it is not our turn or the cell is not playable.
    pub fn click(&mut self, coord: Coord) -> Result<bool, ClientError> {
        if !self.is_my_turn() || !self.board.is_playable(coord) {
            return Ok(false);
        }
        self.apply(coord, self.side);
        self.client.send_move(coord)?;
        Ok(true)
    }

    fn apply(&mut self, coord: Coord, side: Side) {
        self.board.add_move(coord, side);
        self.view.draw_cell(coord, CellColor::Owned(side));

        let result = self.board.check_result();
        match result.winner() {
            Some(winner) => {
                self.phase = Phase::Over(result);
                self.draw_game_over(winner);
            }
            None => {
                self.turn = self.turn.opponent();
                self.draw_turn();
            }
        }

        if self.hints {
            for side in [Side::Red, Side::Blue] {
                for hint in self.board.hints(side) {
                    self.view.draw_cell(hint, CellColor::Hint(side));
                }
            }
        }
    }

    fn draw_turn(&mut self) {
        self.view.draw_text(Slot::Turn, "Next turn:");
        self.view.draw_marker(Slot::Turn, CellColor::Owned(self.turn));
        let comment = if self.turn == self.side {
            "Your move"
        } else {
            "Opponent move"
        };
        self.view.draw_text(Slot::Comment, comment);
    }

    fn draw_game_over(&mut self, winner: Side) {
        if let Some(chain) = self.board.winning_chain(winner) {
            let edges = self.board.boundary(winner);
            for cell in chain.into_iter().filter(|c| !edges.contains(c)) {
                self.view.draw_cell(cell, CellColor::WinningChain(winner));
            }
        }
        let comment = if winner == self.side {
            "You win! Well done."
        } else {
            "Game over!"
        };
        self.view.draw_text(Slot::Comment, comment);
        self.view.draw_marker(Slot::Turn, CellColor::Idle);
    }
}
