//! ASCII control commands.
//!
//! A command is a one-letter tag followed by a decimal integer, e.g. `B42`,
//! `C-7` or `B007`. There is no framing beyond the datagram itself.

use std::fmt;

use thiserror::Error;

use super::constants::{MAX_COMMAND_LEN, TAG_BRIGHTNESS, TAG_CONTRAST};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid command: {0:?}")]
    InvalidCommand(String),
    #[error("Invalid number in command: {0:?}")]
    InvalidNumber(String),
    #[error("Command too long: {len} bytes, maximum {max}")]
    TooLong { len: usize, max: usize },
}

/// A parsed control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Brightness(i32),
    Contrast(i32),
}

impl Command {
    pub fn value(&self) -> i32 {
        match self {
            Command::Brightness(v) | Command::Contrast(v) => *v,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Brightness(v) => write!(f, "brightness={}", v),
            Command::Contrast(v) => write!(f, "contrast={}", v),
        }
    }
}

/// Parse a command datagram using the default length limit.
pub fn parse(bytes: &[u8]) -> Result<Command, CommandError> {
    parse_with_limit(bytes, MAX_COMMAND_LEN)
}

/// Parse a command datagram, rejecting anything longer than `max_len`.
pub fn parse_with_limit(bytes: &[u8], max_len: usize) -> Result<Command, CommandError> {
    if bytes.len() > max_len {
        return Err(CommandError::TooLong {
            len: bytes.len(),
            max: max_len,
        });
    }

    let lossy = || String::from_utf8_lossy(bytes).into_owned();

    let Some((&tag, rest)) = bytes.split_first() else {
        return Err(CommandError::InvalidCommand(String::new()));
    };
    if tag != TAG_BRIGHTNESS && tag != TAG_CONTRAST {
        return Err(CommandError::InvalidCommand(lossy()));
    }

    let value: i32 = std::str::from_utf8(rest)
        .ok()
        .map(|s| s.trim_matches(|c: char| c.is_ascii_whitespace()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CommandError::InvalidNumber(lossy()))?;

    Ok(if tag == TAG_BRIGHTNESS {
        Command::Brightness(value)
    } else {
        Command::Contrast(value)
    })
}
