//! Cursor movement and position reporting
//!
//! Movement and erase sequences are queued through crossterm commands; the
//! position query (`ESC [ 6 n` answered by `ESC [ row ; col R`) is read back
//! through the same [`RuneReader`] that decodes key presses.

use std::fmt;
use std::io::{self, Read, Write};

use crossterm::{
    cursor::{
        Hide, MoveLeft, MoveRight, MoveTo, MoveToColumn, MoveToNextLine, MoveToPreviousLine,
        RestorePosition, SavePosition, Show,
    },
    queue,
    terminal::{Clear, ClearType},
    Command,
};
use tracing::debug;

use super::reader::RuneReader;
use crate::error::{PromptError, Result};

/// Give up on a position reply after this many unrelated bytes.
const MAX_QUERY_BYTES: usize = 4096;

/// 1-based terminal cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub column: u16,
    pub row: u16,
}

/// Which part of the current line to erase (`ESC [ n K`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseLine {
    /// Cursor to end of line
    ToEnd,
    /// Start of line to cursor
    ToStart,
    /// Whole line
    All,
}

impl Command for EraseLine {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            EraseLine::ToEnd => Clear(ClearType::UntilNewLine).write_ansi(f),
            EraseLine::ToStart => f.write_str("\x1b[1K"),
            EraseLine::All => Clear(ClearType::CurrentLine).write_ansi(f),
        }
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "line erase requires VT processing",
        ))
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Queue cursor movement on a writer. Nothing is flushed here.
pub struct Cursor<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> Cursor<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }

    pub fn up(&mut self, n: u16) -> io::Result<()> {
        if n > 0 {
            queue!(self.out, crossterm::cursor::MoveUp(n))?;
        }
        Ok(())
    }

    pub fn down(&mut self, n: u16) -> io::Result<()> {
        if n > 0 {
            queue!(self.out, crossterm::cursor::MoveDown(n))?;
        }
        Ok(())
    }

    pub fn forward(&mut self, n: u16) -> io::Result<()> {
        if n > 0 {
            queue!(self.out, MoveRight(n))?;
        }
        Ok(())
    }

    pub fn back(&mut self, n: u16) -> io::Result<()> {
        if n > 0 {
            queue!(self.out, MoveLeft(n))?;
        }
        Ok(())
    }

    pub fn next_line(&mut self, n: u16) -> io::Result<()> {
        if n > 0 {
            queue!(self.out, MoveToNextLine(n))?;
        }
        Ok(())
    }

    pub fn previous_line(&mut self, n: u16) -> io::Result<()> {
        if n > 0 {
            queue!(self.out, MoveToPreviousLine(n))?;
        }
        Ok(())
    }

    /// Move to a 0-based column on the current row.
    pub fn horizontal_absolute(&mut self, column: u16) -> io::Result<()> {
        queue!(self.out, MoveToColumn(column))
    }

    /// Move to a 0-based (column, row) cell.
    pub fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        queue!(self.out, MoveTo(column, row))
    }

    pub fn erase_line(&mut self, mode: EraseLine) -> io::Result<()> {
        queue!(self.out, mode)
    }

    pub fn hide(&mut self) -> io::Result<()> {
        queue!(self.out, Hide)
    }

    pub fn show(&mut self) -> io::Result<()> {
        queue!(self.out, Show)
    }

    pub fn save(&mut self) -> io::Result<()> {
        queue!(self.out, SavePosition)
    }

    pub fn restore(&mut self) -> io::Result<()> {
        queue!(self.out, RestorePosition)
    }
}

/// Ask the terminal where the cursor is.
///
/// Bytes that arrive ahead of the reply (keys typed in the meantime) are
/// pushed back into `reader` so they are decoded as normal input afterwards.
/// A pasted `12;34R` can still be taken for the reply.
///
/// The cursor is not moved back up afterwards: raw mode has echo off, so the
/// reply never reaches the screen.
pub fn query_position<R: Read, W: Write>(
    reader: &mut RuneReader<R>,
    out: &mut W,
) -> Result<Coordinate> {
    out.write_all(b"\x1b[6n")?;
    out.flush()?;

    let mut stray = Vec::new();
    loop {
        let chunk = match reader.read_until(b'R') {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                reader.unread(&stray);
                return Err(PromptError::CursorQueryFailed(
                    "input closed before the position report".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some((start, coord)) = parse_report(&chunk) {
            stray.extend_from_slice(&chunk[..start]);
            reader.unread(&stray);
            return Ok(coord);
        }

        stray.extend_from_slice(&chunk);
        if stray.len() > MAX_QUERY_BYTES {
            debug!("No position report in {} bytes", stray.len());
            reader.unread(&stray);
            return Err(PromptError::CursorQueryFailed(
                "no position report found".to_string(),
            ));
        }
    }
}

/// Find `[ESC [] row ; col R` at the end of `chunk`. Returns where the reply
/// starts and the decoded coordinate.
fn parse_report(chunk: &[u8]) -> Option<(usize, Coordinate)> {
    let body = chunk.strip_suffix(b"R")?;

    let col_start = body
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    if col_start == body.len() || col_start == 0 || body[col_start - 1] != b';' {
        return None;
    }

    let sep = col_start - 1;
    let row_start = body[..sep]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    if row_start == sep {
        return None;
    }

    let row = parse_u16(&body[row_start..sep])?;
    let column = parse_u16(&body[col_start..])?;

    let start = if body[..row_start].ends_with(b"\x1b[") {
        row_start - 2
    } else {
        row_start
    };
    Some((start, Coordinate { column, row }))
}

fn parse_u16(digits: &[u8]) -> Option<u16> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Measure the terminal by parking the cursor in the far bottom-right corner
/// and asking where it ended up. The cursor is put back afterwards.
pub fn probe_size<R: Read, W: Write>(reader: &mut RuneReader<R>, out: &mut W) -> Result<Coordinate> {
    {
        let mut cursor = Cursor::new(&mut *out);
        cursor.hide()?;
        cursor.save()?;
        cursor.move_to(998, 998)?;
    }
    let result = query_position(reader, out);
    {
        let mut cursor = Cursor::new(&mut *out);
        cursor.restore()?;
        cursor.show()?;
    }
    out.flush()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_sequences() {
        let mut out = Vec::new();
        {
            let mut cursor = Cursor::new(&mut out);
            cursor.up(2).unwrap();
            cursor.down(0).unwrap();
            cursor.back(3).unwrap();
            cursor.horizontal_absolute(0).unwrap();
            cursor.erase_line(EraseLine::All).unwrap();
            cursor.erase_line(EraseLine::ToStart).unwrap();
            cursor.hide().unwrap();
            cursor.show().unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b[2A\x1b[3D\x1b[1G\x1b[2K\x1b[1K\x1b[?25l\x1b[?25h"
        );
    }

    #[test]
    fn test_query_position() {
        let mut reader = RuneReader::new(&b"\x1b[12;40R"[..]);
        let mut out = Vec::new();
        let pos = query_position(&mut reader, &mut out).unwrap();
        assert_eq!(pos, Coordinate { column: 40, row: 12 });
        assert_eq!(out, b"\x1b[6n");
    }

    #[test]
    fn test_query_keeps_interleaved_input() {
        // "R" typed by the user arrives first, then "ab", then the reply
        let mut reader = RuneReader::new(&b"Rab\x1b[3;7Rz"[..]);
        let mut out = Vec::new();
        let pos = query_position(&mut reader, &mut out).unwrap();
        assert_eq!(pos, Coordinate { column: 7, row: 3 });

        let mut replay = Vec::new();
        while let Ok(byte) = reader.read_byte() {
            replay.push(byte);
        }
        assert_eq!(replay, b"Rabz");
    }

    #[test]
    fn test_query_without_terminator_fails() {
        let mut reader = RuneReader::new(&b"\x1b[3;7"[..]);
        let mut out = Vec::new();
        match query_position(&mut reader, &mut out) {
            Err(PromptError::CursorQueryFailed(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_shapes() {
        assert_eq!(
            parse_report(b"5;9R"),
            Some((0, Coordinate { column: 9, row: 5 }))
        );
        assert_eq!(parse_report(b"xx\x1b[5;9R").map(|(s, _)| s), Some(2));
        assert_eq!(parse_report(b"5;R"), None);
        assert_eq!(parse_report(b";9R"), None);
        assert_eq!(parse_report(b"R"), None);
    }

    #[test]
    fn test_probe_size_restores_cursor() {
        let mut reader = RuneReader::new(&b"\x1b[40;120R"[..]);
        let mut out = Vec::new();
        let size = probe_size(&mut reader, &mut out).unwrap();
        assert_eq!(size.column, 120);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[?25l\x1b7\x1b[999;999H\x1b[6n"));
        assert!(text.ends_with("\x1b8\x1b[?25h"));
    }
}
