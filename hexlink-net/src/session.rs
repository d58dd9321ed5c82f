//! Per-connection state machine on the server

use crate::protocol::{read_command, write_command, Command, ProtocolError};
use crate::registry::{MatchRegistry, PlayerId};
use crate::server::Shared;
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// What has already been told to one connected player
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub player: PlayerId,
    pub side_sent: bool,
    pub turn_sent: bool,
    /// Opponent presence as last reported to the player
    pub opponent_reported: bool,
}

impl Session {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            side_sent: false,
            turn_sent: false,
            opponent_reported: false,
        }
    }

    /// Next command owed to the player, at most one per call: side once,
    /// turn once, then any change in opponent presence, then the opponent's
    /// latest move.
    pub fn next_outbound(&mut self, registry: &mut MatchRegistry) -> Option<Command> {
        let record = registry.record(self.player)?;

        if !self.side_sent {
            self.side_sent = true;
            return Some(Command::Side(record.side));
        }
        if !self.turn_sent {
            self.turn_sent = true;
            return Some(Command::Turn(record.turn));
        }

        let present = registry.has_opponent(self.player);
        if present != self.opponent_reported {
            self.opponent_reported = present;
            return Some(Command::Opponent(present));
        }

        registry.take_opponent_move(self.player).map(Command::Move)
    }

    /// Apply a command received from the player
    pub fn handle_inbound(
        &self,
        registry: &mut MatchRegistry,
        command: Command,
    ) -> Result<(), ProtocolError> {
        match command {
            Command::Move(coord) => {
                tracing::debug!("Player {} played ({}, {})", self.player, coord.x, coord.y);
                registry.store_move(self.player, coord);
                Ok(())
            }
            other => Err(ProtocolError::UnexpectedCommand(other.head().as_char())),
        }
    }
}

/// Drive one connection until the player leaves or sends something invalid,
/// then remove them from the registry.
pub(crate) async fn serve<R, W>(
    reader: R,
    writer: W,
    player: PlayerId,
    shared: Rc<Shared>,
    tick: Duration,
)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = Session::new(player);

    let outcome = tokio::select! {
        res = receive_loop(reader, &session, &shared) => res,
        res = send_loop(writer, session.clone(), &shared, tick) => res,
    };

    match outcome {
        Ok(()) => tracing::info!("Player {} disconnected", player),
        Err(e) => tracing::warn!("Closing player {}: {}", player, e),
    }

    shared.registry.borrow_mut().remove_player(player);
    shared.changed.notify_waiters();
}

async fn receive_loop<R>(
    mut reader: R,
    session: &Session,
    shared: &Shared,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    while let Some(command) = read_command(&mut reader).await? {
        session.handle_inbound(&mut shared.registry.borrow_mut(), command)?;
        shared.changed.notify_waiters();
    }
    Ok(())
}

async fn send_loop<W>(
    mut writer: W,
    mut session: Session,
    shared: &Shared,
    tick: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let next = session.next_outbound(&mut shared.registry.borrow_mut());
        match next {
            Some(command) => {
                tracing::trace!("Player {} <- {:?}", session.player, command);
                write_command(&mut writer, &command).await?;
            }
            None => {
                tokio::select! {
                    _ = shared.changed.notified() => {}
                    _ = tokio::time::sleep(tick) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexlink_core::{Coord, Side};

    fn drain(session: &mut Session, registry: &mut MatchRegistry) -> Vec<Command> {
        std::iter::from_fn(|| session.next_outbound(registry)).collect()
    }

    #[test]
    fn test_waiting_player_gets_side_and_turn_only() {
        let mut registry = MatchRegistry::new();
        let id = registry.add_player();
        let mut session = Session::new(id);
        assert_eq!(
            drain(&mut session, &mut registry),
            vec![Command::Side(Side::Red), Command::Turn(Side::Red)]
        );
    }

    #[test]
    fn test_outbound_priority() {
        let mut registry = MatchRegistry::new();
        let first = registry.add_player();
        let second = registry.add_player();
        registry.store_move(first, Coord::new(3, 4));

        let mut session = Session::new(second);
        assert_eq!(
            drain(&mut session, &mut registry),
            vec![
                Command::Side(Side::Blue),
                Command::Turn(Side::Red),
                Command::Opponent(true),
                Command::Move(Coord::new(3, 4)),
            ]
        );
    }

    #[test]
    fn test_opponent_status_sent_on_change_only() {
        let mut registry = MatchRegistry::new();
        let first = registry.add_player();
        let mut session = Session::new(first);
        drain(&mut session, &mut registry);

        let second = registry.add_player();
        assert_eq!(drain(&mut session, &mut registry), vec![Command::Opponent(true)]);
        assert!(drain(&mut session, &mut registry).is_empty());

        registry.remove_player(second);
        assert_eq!(drain(&mut session, &mut registry), vec![Command::Opponent(false)]);
        assert!(drain(&mut session, &mut registry).is_empty());
    }

    #[test]
    fn test_inbound_move_is_stored() {
        let mut registry = MatchRegistry::new();
        let first = registry.add_player();
        let second = registry.add_player();
        let session = Session::new(first);

        session
            .handle_inbound(&mut registry, Command::Move(Coord::new(7, 2)))
            .unwrap();
        assert_eq!(registry.take_opponent_move(second), Some(Coord::new(7, 2)));
    }

    #[test]
    fn test_inbound_non_move_is_rejected() {
        let mut registry = MatchRegistry::new();
        let first = registry.add_player();
        let session = Session::new(first);
        assert!(matches!(
            session.handle_inbound(&mut registry, Command::Side(Side::Blue)),
            Err(ProtocolError::UnexpectedCommand('s'))
        ));
    }
}
