//! Terminal device access: raw mode, key decoding, cursor control.

pub mod cursor;
pub mod mode;
pub mod reader;

use std::io::{self, Read, Write};

use tracing::debug;

pub use cursor::{Coordinate, Cursor, EraseLine};
pub use mode::{Detached, Discipline, ModeController, RawModeSession, TermModeState};
pub use reader::{KeyEvent, RuneReader};

use crate::error::Result;

/// Columns assumed when the width cannot be measured.
pub const DEFAULT_WIDTH: u16 = 80;

/// Where the terminal width comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSource {
    /// Ask the OS, then the terminal itself, then fall back to 80 columns
    Detect,
    /// Always use this many columns
    Fixed(u16),
}

/// Input and output halves of the terminal.
pub struct TermIo {
    pub reader: RuneReader<Box<dyn Read>>,
    pub out: Box<dyn Write>,
    width: WidthSource,
    last_width: Option<u16>,
}

impl TermIo {
    /// Current width in columns. Only probes the terminal while in raw mode,
    /// otherwise the reply would be echoed.
    pub fn width(&mut self, raw: bool) -> u16 {
        let width = match self.width {
            WidthSource::Fixed(w) => w.max(1),
            WidthSource::Detect => match crossterm::terminal::size() {
                Ok((cols, _)) if cols > 0 => cols,
                _ if raw => match cursor::probe_size(&mut self.reader, &mut self.out) {
                    Ok(size) if size.column > 0 => size.column,
                    Ok(_) => DEFAULT_WIDTH,
                    Err(e) => {
                        debug!("Terminal size probe failed: {}", e);
                        DEFAULT_WIDTH
                    }
                },
                _ => self.last_width.unwrap_or(DEFAULT_WIDTH),
            },
        };
        self.last_width = Some(width);
        width
    }

    pub fn cursor(&mut self) -> Cursor<'_, Box<dyn Write>> {
        Cursor::new(&mut self.out)
    }

    /// Decode the next key press.
    pub fn next_key(&mut self) -> Result<KeyEvent> {
        self.reader.next_key()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// A terminal: the I/O streams plus the controller that owns its mode.
pub struct Terminal {
    io: TermIo,
    modes: Box<dyn ModeController>,
}

impl Terminal {
    pub fn new(
        input: Box<dyn Read>,
        output: Box<dyn Write>,
        modes: Box<dyn ModeController>,
    ) -> Self {
        Self {
            io: TermIo {
                reader: RuneReader::new(input),
                out: output,
                width: WidthSource::Detect,
                last_width: None,
            },
            modes,
        }
    }

    /// Standard input/output of this process.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::stdin()),
            Box::new(io::stdout()),
            mode::stdin_controller(),
        )
    }

    pub fn with_width(mut self, width: WidthSource) -> Self {
        self.io.width = width;
        self
    }

    /// Streams for non-interactive output (final renders).
    pub fn io(&mut self) -> &mut TermIo {
        &mut self.io
    }

    /// Run `f` with the device in raw mode. The previous mode is restored
    /// before returning, whatever `f` does.
    pub fn with_raw_mode<T>(&mut self, f: impl FnOnce(&mut TermIo) -> Result<T>) -> Result<T> {
        let session = RawModeSession::acquire(self.modes.as_mut())?;
        let result = f(&mut self.io);
        let released = session.release();
        let value = result?;
        released?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PromptError;
    use crate::testing::{scripted, SharedBuffer};

    #[test]
    fn test_fixed_width() {
        let (mut term, _) = scripted(b"");
        term = term.with_width(WidthSource::Fixed(0));
        assert_eq!(term.io().width(false), 1);
    }

    #[test]
    fn test_raw_mode_error_wins_over_release() {
        let (mut term, _) = scripted(b"");
        let result: Result<()> = term.with_raw_mode(|_| Err(PromptError::Interrupted));
        assert!(matches!(result, Err(PromptError::Interrupted)));
    }

    #[test]
    fn test_raw_mode_passes_value() {
        let out = SharedBuffer::default();
        let mut term = Terminal::new(
            Box::new(&b"x"[..]),
            Box::new(out.clone()),
            Box::new(Detached),
        );
        let key = term.with_raw_mode(|io| io.next_key()).unwrap();
        assert_eq!(key, KeyEvent::Rune('x'));
    }
}
