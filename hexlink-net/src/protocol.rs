//! Fixed-width command codec
//!
//! Every command is exactly five ASCII bytes: one head byte followed by two
//! zero-padded two-digit decimal fields, e.g. `m0345` for a move to (3, 45).

use hexlink_core::{Coord, Side};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Bytes per command
pub const COMMAND_LEN: usize = 5;

/// Largest value a two-digit field can carry
pub const MAX_FIELD: i32 = 99;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown command head: {0:#04x}")]
    UnknownHead(u8),

    #[error("Malformed decimal field: {0:?}")]
    MalformedField(String),

    #[error("Field value out of range 0-99: {0}")]
    ValueOutOfRange(i32),

    #[error("Commands carry one or two values, got {0}")]
    InvalidArity(usize),

    #[error("Truncated command: expected 5 bytes, got {0}")]
    Truncated(usize),

    #[error("Invalid value {value} for '{head}' command")]
    InvalidValue { head: char, value: u8 },

    #[error("Unexpected '{0}' command")]
    UnexpectedCommand(char),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// RAW FRAMES
// ============================================================================

/// Command kind, carried in the head byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Head {
    Side,
    Turn,
    Opponent,
    Move,
}

impl Head {
    pub fn as_char(self) -> char {
        match self {
            Head::Side => 's',
            Head::Turn => 't',
            Head::Opponent => 'o',
            Head::Move => 'm',
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            b's' => Ok(Head::Side),
            b't' => Ok(Head::Turn),
            b'o' => Ok(Head::Opponent),
            b'm' => Ok(Head::Move),
            other => Err(ProtocolError::UnknownHead(other)),
        }
    }
}

/// A decoded command before its values are interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub head: Head,
    pub values: (u8, u8),
}

/// Encode a command. A single value goes in the second field with the first
/// set to zero; two values fill both fields.
pub fn encode(head: Head, values: &[i32]) -> Result<[u8; COMMAND_LEN], ProtocolError> {
    let (first, second) = match *values {
        [value] => (0, value),
        [first, second] => (first, second),
        _ => return Err(ProtocolError::InvalidArity(values.len())),
    };
    for value in [first, second] {
        if !(0..=MAX_FIELD).contains(&value) {
            return Err(ProtocolError::ValueOutOfRange(value));
        }
    }

    let text = format!("{}{:02}{:02}", head.as_char(), first, second);
    let mut bytes = [0u8; COMMAND_LEN];
    bytes.copy_from_slice(text.as_bytes());
    Ok(bytes)
}

/// Decode a command. An empty buffer means the peer closed the connection
/// and yields `Ok(None)`.
pub fn decode(bytes: &[u8]) -> Result<Option<Frame>, ProtocolError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    if bytes.len() != COMMAND_LEN {
        return Err(ProtocolError::Truncated(bytes.len()));
    }

    let head = Head::from_byte(bytes[0])?;
    let values = (parse_field(&bytes[1..3])?, parse_field(&bytes[3..5])?);
    Ok(Some(Frame { head, values }))
}

fn parse_field(field: &[u8]) -> Result<u8, ProtocolError> {
    if !field.iter().all(u8::is_ascii_digit) {
        return Err(ProtocolError::MalformedField(
            String::from_utf8_lossy(field).into_owned(),
        ));
    }
    Ok((field[0] - b'0') * 10 + (field[1] - b'0'))
}

// ============================================================================
// TYPED COMMANDS
// ============================================================================

/// A command with its values interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Side assigned to the receiving player
    Side(Side),
    /// Side that moves first
    Turn(Side),
    /// Whether the receiving player currently has an opponent
    Opponent(bool),
    /// A played cell
    Move(Coord),
}

impl Command {
    pub fn head(&self) -> Head {
        match self {
            Command::Side(_) => Head::Side,
            Command::Turn(_) => Head::Turn,
            Command::Opponent(_) => Head::Opponent,
            Command::Move(_) => Head::Move,
        }
    }

    pub fn encode(&self) -> Result<[u8; COMMAND_LEN], ProtocolError> {
        match *self {
            Command::Side(side) | Command::Turn(side) => {
                encode(self.head(), &[i32::from(side.index())])
            }
            Command::Opponent(present) => encode(self.head(), &[i32::from(present)]),
            Command::Move(coord) => encode(self.head(), &[coord.x, coord.y]),
        }
    }

    pub fn from_frame(frame: Frame) -> Result<Self, ProtocolError> {
        let (first, second) = frame.values;
        let invalid = || ProtocolError::InvalidValue {
            head: frame.head.as_char(),
            value: second,
        };
        match frame.head {
            Head::Side => Side::try_from(second).map(Command::Side).map_err(|_| invalid()),
            Head::Turn => Side::try_from(second).map(Command::Turn).map_err(|_| invalid()),
            Head::Opponent => match second {
                0 => Ok(Command::Opponent(false)),
                1 => Ok(Command::Opponent(true)),
                _ => Err(invalid()),
            },
            Head::Move => Ok(Command::Move(Coord::new(
                i32::from(first),
                i32::from(second),
            ))),
        }
    }
}

// ============================================================================
// STREAM I/O
// ============================================================================

/// Read one command. `Ok(None)` when the peer closed the connection before a
/// new command started.
pub async fn read_command<R>(reader: &mut R) -> Result<Option<Command>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; COMMAND_LEN];
    if reader.read(&mut buf[..1]).await? == 0 {
        return Ok(None);
    }

    let mut filled = 1;
    while filled < COMMAND_LEN {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(ProtocolError::Truncated(filled));
        }
        filled += n;
    }

    match decode(&buf)? {
        Some(frame) => Command::from_frame(frame).map(Some),
        None => Ok(None),
    }
}

pub async fn write_command<W>(writer: &mut W, command: &Command) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = command.encode()?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
