//! Common error type.

use crate::Pos;
use alloc::string::String;
use core::fmt::{self, Display};
use std::io;

/// Error with a message and the position where it occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub msg: String,
    pub pos: Pos,
}

impl ParseError {
    pub fn new(msg: impl Into<String>, pos: Pos) -> Self {
        let msg = msg.into();
        Self { msg, pos }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.msg.fmt(f)
    }
}

/// Common error type.
///
/// Parse and nested errors are recoverable:
/// the command driver reports them and continues with the next command.
/// Interrupts and I/O errors abort parsing.
#[derive(Debug)]
pub enum Error {
    /// malformed input
    Parse(ParseError),
    /// failure of a collaborator (elaborator, environment, script)
    /// while processing a command
    Nested(ParseError),
    Interrupt,
    Io(io::Error),
}

impl Error {
    pub fn parse(msg: impl Into<String>, pos: Pos) -> Self {
        Self::Parse(ParseError::new(msg, pos))
    }

    pub fn nested(msg: impl Display, pos: Pos) -> Self {
        Self::Nested(ParseError::new(msg.to_string(), pos))
    }

    /// Return true if the command driver can recover from the error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Nested(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(e) | Self::Nested(e) => e.fmt(f),
            Self::Interrupt => "interrupted".fmt(f),
            Self::Io(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<analizi_scan::Error> for Error {
    fn from(err: analizi_scan::Error) -> Self {
        Self::parse(err.to_string(), err.pos)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
