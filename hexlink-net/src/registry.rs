//! Server-side pairing of players into two-player matches

use hexlink_core::{Coord, Side};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

pub type PlayerId = u32;

/// Per-player state kept by the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerRecord {
    pub side: Side,
    /// Side that moves first in this player's match
    pub turn: Side,
    /// Last move received from this player, not yet relayed to the opponent
    pub pending_move: Option<Coord>,
}

/// Waiting room, active matches and players whose opponent left.
///
/// The first player of a match plays red and the second blue; red always
/// moves first.
#[derive(Debug)]
pub struct MatchRegistry {
    next_id: PlayerId,
    waiting: VecDeque<PlayerId>,
    matches: Vec<(PlayerId, PlayerId)>,
    lost: Vec<PlayerId>,
    players: FxHashMap<PlayerId, PlayerRecord>,
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            waiting: VecDeque::new(),
            matches: Vec::new(),
            lost: Vec::new(),
            players: FxHashMap::default(),
        }
    }

    /// Register a new player. Pairs them with the longest-waiting player if
    /// there is one, otherwise puts them in the waiting room.
    pub fn add_player(&mut self) -> PlayerId {
        let id = self.next_id;
        self.next_id += 1;

        let side = match self.waiting.pop_front() {
            Some(waiting) => {
                self.matches.push((waiting, id));
                tracing::info!("Paired player {} with player {}", id, waiting);
                Side::Blue
            }
            None => {
                self.waiting.push_back(id);
                tracing::debug!("Player {} waiting for an opponent", id);
                Side::Red
            }
        };

        self.players.insert(
            id,
            PlayerRecord {
                side,
                turn: Side::Red,
                pending_move: None,
            },
        );
        id
    }

    /// Drop a player. A dissolved match leaves the other member recorded as
    /// having lost their opponent.
    pub fn remove_player(&mut self, id: PlayerId) {
        self.players.remove(&id);

        if let Some(pos) = self.waiting.iter().position(|&w| w == id) {
            self.waiting.remove(pos);
            return;
        }
        if let Some(pos) = self.lost.iter().position(|&l| l == id) {
            self.lost.remove(pos);
            return;
        }
        if let Some(pos) = self.matches.iter().position(|&(a, b)| a == id || b == id) {
            let (a, b) = self.matches.remove(pos);
            let survivor = if a == id { b } else { a };
            tracing::info!("Player {} lost opponent {}", survivor, id);
            self.lost.push(survivor);
        }
    }

    pub fn has_opponent(&self, id: PlayerId) -> bool {
        self.opponent_of(id).is_some()
    }

    /// True while `id` is waiting or has lost their opponent
    pub fn player_exists(&self, id: PlayerId) -> bool {
        self.waiting.contains(&id) || self.lost.contains(&id)
    }

    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        self.matches.iter().find_map(|&(a, b)| {
            if a == id {
                Some(b)
            } else if b == id {
                Some(a)
            } else {
                None
            }
        })
    }

    pub fn record(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    /// Store a move from `id` for relay to their opponent
    pub fn store_move(&mut self, id: PlayerId, coord: Coord) {
        if let Some(record) = self.players.get_mut(&id) {
            record.pending_move = Some(coord);
        }
    }

    /// Take the opponent's pending move, if `id` has an opponent and they
    /// have played since the last call
    pub fn take_opponent_move(&mut self, id: PlayerId) -> Option<Coord> {
        let opponent = self.opponent_of(id)?;
        self.players.get_mut(&opponent)?.pending_move.take()
    }

    pub fn waiting(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.waiting.iter().copied()
    }

    pub fn matches(&self) -> &[(PlayerId, PlayerId)] {
        &self.matches
    }

    pub fn lost(&self) -> &[PlayerId] {
        &self.lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired() -> MatchRegistry {
        let mut registry = MatchRegistry::new();
        registry.add_player();
        registry.add_player();
        registry
    }

    #[test]
    fn test_pairing() {
        let mut registry = MatchRegistry::new();

        let first = registry.add_player();
        assert_eq!(first, 1);
        assert_eq!(registry.record(1).unwrap().side, Side::Red);
        assert_eq!(registry.record(1).unwrap().turn, Side::Red);
        assert_eq!(registry.waiting().collect::<Vec<_>>(), vec![1]);
        assert!(!registry.has_opponent(1));

        let second = registry.add_player();
        assert_eq!(second, 2);
        assert_eq!(registry.record(2).unwrap().side, Side::Blue);
        assert_eq!(registry.record(2).unwrap().turn, Side::Red);
        assert_eq!(registry.waiting().count(), 0);
        assert_eq!(registry.matches(), &[(1, 2)]);
        assert!(registry.has_opponent(1));
        assert!(registry.has_opponent(2));
        assert_eq!(registry.opponent_of(1), Some(2));
        assert_eq!(registry.opponent_of(2), Some(1));
    }

    #[test]
    fn test_disconnect_while_paired() {
        let mut registry = paired();
        registry.remove_player(2);
        assert!(registry.matches().is_empty());
        assert_eq!(registry.lost(), &[1]);
        assert!(registry.player_exists(1));
        assert!(!registry.has_opponent(1));

        // The survivor leaving clears the lost record
        registry.remove_player(1);
        assert!(registry.lost().is_empty());
        assert!(!registry.player_exists(1));
    }

    #[test]
    fn test_disconnect_while_waiting() {
        let mut registry = MatchRegistry::new();
        registry.add_player();
        registry.remove_player(1);
        assert_eq!(registry.waiting().count(), 0);
        assert!(registry.lost().is_empty());

        // Ids keep increasing after a departure
        let next = registry.add_player();
        assert_eq!(next, 2);
        assert_eq!(registry.record(next).unwrap().side, Side::Red);
    }

    #[test]
    fn test_second_match() {
        let mut registry = paired();
        let third = registry.add_player();
        let fourth = registry.add_player();
        assert_eq!((third, fourth), (3, 4));
        assert_eq!(registry.opponent_of(3), Some(4));
        assert_eq!(registry.matches().len(), 2);
    }

    #[test]
    fn test_move_relay() {
        let mut registry = paired();
        assert_eq!(registry.take_opponent_move(2), None);

        registry.store_move(1, Coord::new(4, 5));
        assert_eq!(registry.take_opponent_move(1), None);
        assert_eq!(registry.take_opponent_move(2), Some(Coord::new(4, 5)));
        assert_eq!(registry.take_opponent_move(2), None);
    }
}
