//! Error types shared by the terminal layer and the widgets.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    /// The terminal could not be switched into (or back out of) raw mode.
    #[error("raw mode unavailable: {0}")]
    RawModeUnavailable(#[source] io::Error),

    #[error("malformed escape sequence: {bytes:02x?}")]
    MalformedEscapeSequence { bytes: Vec<u8> },

    #[error("cursor position query failed: {0}")]
    CursorQueryFailed(String),

    /// The user pressed Ctrl+C.
    #[error("interrupt")]
    Interrupted,

    #[error("no options to choose from")]
    NoOptionsProvided,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PromptError {
    /// True for a user-initiated abort.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, PromptError::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, PromptError>;
