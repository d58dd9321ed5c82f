//! Client connection with a blocking API
//!
//! A background thread owns the socket and a current-thread runtime. Commands
//! from the server arrive over a channel; moves to send go back over another.
//! The blocking calls must not be made from inside an async runtime.

use crate::protocol::{read_command, write_command, Command, ProtocolError};
use hexlink_core::{Coord, Side};
use std::collections::VecDeque;
use std::io;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TryRecvError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Connection to server closed")]
    Disconnected,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Opponent move to unplayable cell {0:?}")]
    InvalidMove(Coord),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub struct Client {
    events: mpsc::UnboundedReceiver<Result<Command, ProtocolError>>,
    outgoing: mpsc::UnboundedSender<Coord>,
    side: Option<Side>,
    turn: Option<Side>,
    opponent: bool,
    moves: VecDeque<Coord>,
    closed: bool,
}

impl Client {
    pub fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = std::net::TcpStream::connect(addr).map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        stream.set_nonblocking(true)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (events_tx, events) = mpsc::unbounded_channel();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            runtime.block_on(async move {
                let stream = match TcpStream::from_std(stream) {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::warn!("Client socket setup failed: {}", e);
                        return;
                    }
                };
                let (reader, writer) = stream.into_split();
                tokio::select! {
                    _ = receive_loop(reader, events_tx) => {}
                    res = send_loop(writer, outgoing_rx) => {
                        if let Err(e) = res {
                            tracing::warn!("Client send failed: {}", e);
                        }
                    }
                }
                tracing::debug!("Client connection closed");
            });
        });

        tracing::debug!("Connected to {}", addr);
        Ok(Self {
            events,
            outgoing,
            side: None,
            turn: None,
            opponent: false,
            moves: VecDeque::new(),
            closed: false,
        })
    }

    /// Block until the server has assigned a side
    pub fn receive_side(&mut self) -> Result<Side, ClientError> {
        loop {
            if let Some(side) = self.side {
                return Ok(side);
            }
            self.wait_event()?;
        }
    }

    /// Block until the server has said who moves first
    pub fn receive_turn(&mut self) -> Result<Side, ClientError> {
        loop {
            if let Some(turn) = self.turn {
                return Ok(turn);
            }
            self.wait_event()?;
        }
    }

    /// Block until the opponent plays
    pub fn receive_move(&mut self) -> Result<Coord, ClientError> {
        loop {
            if let Some(coord) = self.moves.pop_front() {
                return Ok(coord);
            }
            self.wait_event()?;
        }
    }

    /// The opponent's next move, if one has arrived
    pub fn try_receive_move(&mut self) -> Result<Option<Coord>, ClientError> {
        self.poll_events()?;
        match self.moves.pop_front() {
            Some(coord) => Ok(Some(coord)),
            None if self.closed => Err(ClientError::Disconnected),
            None => Ok(None),
        }
    }

    /// Latest opponent presence reported by the server
    pub fn check_opponent(&mut self) -> Result<bool, ClientError> {
        self.poll_events()?;
        if self.closed {
            return Err(ClientError::Disconnected);
        }
        Ok(self.opponent)
    }

    /// Block until the server reports an opponent
    pub fn wait_for_opponent(&mut self) -> Result<(), ClientError> {
        self.poll_events()?;
        while !self.opponent {
            self.wait_event()?;
        }
        Ok(())
    }

    /// Queue a move for the I/O thread to send
    pub fn send_move(&mut self, coord: Coord) -> Result<(), ClientError> {
        self.outgoing
            .send(coord)
            .map_err(|_| ClientError::Disconnected)
    }

    fn wait_event(&mut self) -> Result<(), ClientError> {
        if self.closed {
            return Err(ClientError::Disconnected);
        }
        match self.events.blocking_recv() {
            Some(event) => self.absorb(event),
            None => {
                self.closed = true;
                Err(ClientError::Disconnected)
            }
        }
    }

    fn poll_events(&mut self) -> Result<(), ClientError> {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.absorb(event)?,
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    return Ok(());
                }
            }
        }
    }

    /// Fold one event from the I/O thread into the client state. A protocol
    /// error ends the connection.
    fn absorb(&mut self, event: Result<Command, ProtocolError>) -> Result<(), ClientError> {
        let command = match event {
            Ok(command) => command,
            Err(e) => {
                self.closed = true;
                return Err(e.into());
            }
        };
        tracing::trace!("Client received {:?}", command);
        match command {
            Command::Side(side) => self.side = Some(side),
            Command::Turn(turn) => self.turn = Some(turn),
            Command::Opponent(present) => self.opponent = present,
            Command::Move(coord) => self.moves.push_back(coord),
        }
        Ok(())
    }
}

/// Forward server commands until the connection closes. A protocol error is
/// handed to the caller as the last event.
async fn receive_loop(
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<Result<Command, ProtocolError>>,
) {
    loop {
        match read_command(&mut reader).await {
            Ok(Some(command)) => {
                if events.send(Ok(command)).is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Client received bad command: {}", e);
                let _ = events.send(Err(e));
                return;
            }
        }
    }
}

async fn send_loop(
    mut writer: OwnedWriteHalf,
    mut outgoing: mpsc::UnboundedReceiver<Coord>,
) -> Result<(), ProtocolError> {
    while let Some(coord) = outgoing.recv().await {
        write_command(&mut writer, &Command::Move(coord)).await?;
    }
    Ok(())
}
