//! Protocol module - datagram tokens and command parsing.

pub mod command;
pub mod constants;

pub use command::{Command, CommandError, parse};
pub use constants::*;
