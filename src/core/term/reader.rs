//! Rune-level input decoder
//!
//! Turns the raw byte stream of the controlling terminal into [`KeyEvent`]s.
//! Escape sequences are recognised with a three stage lookahead:
//!
//! ```text
//! ESC ──> introducer ('[' or 'O') ──> final byte (A/B/C/D, H/F, "3~")
//! ```
//!
//! A lone ESC with nothing buffered behind it is the Escape key; the decoder
//! never blocks waiting for the rest of a sequence that may not exist.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::error::{PromptError, Result};

/// Size of one read from the device. Matches `Stdin`'s internal buffer so
/// reads bypass it and nothing is hidden from [`RuneReader::buffered`].
const READ_CHUNK: usize = 8 * 1024;

const ESC: u8 = 0x1b;

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Printable input
    Rune(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Enter,
    Escape,
    Tab,
    Backspace,
    /// Forward delete (ESC [ 3 ~)
    Delete,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    EndOfTransmission,
    /// Ctrl+W
    DeleteWord,
    /// Ctrl+X
    DeleteLine,
    /// Recognised but meaningless input (unknown sequences, stray controls)
    Ignore,
}

impl KeyEvent {
    /// Classify a rune that did not start an escape sequence.
    ///
    /// Ctrl+B/F/P/N are the legacy emacs arrows.
    pub fn from_rune(r: char) -> Self {
        match r {
            '\x02' => KeyEvent::ArrowLeft,
            '\x06' => KeyEvent::ArrowRight,
            '\x10' => KeyEvent::ArrowUp,
            '\x0e' => KeyEvent::ArrowDown,
            '\x01' => KeyEvent::Home,
            '\x05' => KeyEvent::End,
            '\x03' => KeyEvent::Interrupt,
            '\x04' => KeyEvent::EndOfTransmission,
            '\x7f' | '\x08' => KeyEvent::Backspace,
            '\x17' => KeyEvent::DeleteWord,
            '\x18' => KeyEvent::DeleteLine,
            '\r' | '\n' => KeyEvent::Enter,
            '\t' => KeyEvent::Tab,
            '\x1b' => KeyEvent::Escape,
            c if c.is_control() => KeyEvent::Ignore,
            c => KeyEvent::Rune(c),
        }
    }

    /// The printable character carried by this event, if any.
    pub fn rune(&self) -> Option<char> {
        match self {
            KeyEvent::Rune(c) => Some(*c),
            _ => None,
        }
    }
}

/// Buffered reader over the terminal input device.
pub struct RuneReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: Read> RuneReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(READ_CHUNK),
            pos: 0,
        }
    }

    /// Number of bytes already read from the device but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// One read from the device. Blocks until at least one byte arrives.
    fn fill(&mut self) -> io::Result<()> {
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input closed",
                    ))
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read a single byte, blocking if the buffer is empty.
    pub fn read_byte(&mut self) -> io::Result<u8> {
        if self.buffered() == 0 {
            self.fill()?;
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Read one UTF-8 encoded rune. Invalid encodings yield U+FFFD.
    pub fn read_rune(&mut self) -> io::Result<char> {
        let first = self.read_byte()?;
        let len = match first {
            0x00..=0x7f => return Ok(first as char),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };

        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(len).skip(1) {
            let next = self.read_byte()?;
            if next & 0xc0 != 0x80 {
                // Not a continuation byte: leave it for the next rune.
                self.unread(&[next]);
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            *slot = next;
        }

        Ok(std::str::from_utf8(&bytes[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Push bytes back so they are decoded before anything else.
    pub fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.pos >= bytes.len() && self.buf[self.pos - bytes.len()..self.pos] == *bytes {
            self.pos -= bytes.len();
            return;
        }
        let mut rest = bytes.to_vec();
        rest.extend_from_slice(&self.buf[self.pos..]);
        self.buf = rest;
        self.pos = 0;
    }

    /// Drop everything currently buffered.
    fn discard_buffered(&mut self) -> usize {
        let dropped = self.buffered();
        self.buf.clear();
        self.pos = 0;
        dropped
    }

    /// Read bytes up to and including `delim`.
    pub fn read_until(&mut self, delim: u8) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let byte = self.read_byte()?;
            out.push(byte);
            if byte == delim {
                return Ok(out);
            }
        }
    }

    /// Decode the next key press.
    pub fn next_key(&mut self) -> Result<KeyEvent> {
        let r = self.read_rune()?;
        let key = if r as u32 == ESC as u32 {
            self.escape_sequence()?
        } else {
            KeyEvent::from_rune(r)
        };
        trace!(?key, "decoded key");
        Ok(key)
    }

    fn escape_sequence(&mut self) -> Result<KeyEvent> {
        if self.buffered() == 0 {
            return Ok(KeyEvent::Escape);
        }

        let introducer = self.read_byte()?;
        if introducer != b'[' && introducer != b'O' {
            return Err(PromptError::MalformedEscapeSequence {
                bytes: vec![ESC, introducer],
            });
        }

        let key = match self.read_byte()? {
            b'A' => KeyEvent::ArrowUp,
            b'B' => KeyEvent::ArrowDown,
            b'C' => KeyEvent::ArrowRight,
            b'D' => KeyEvent::ArrowLeft,
            b'H' => KeyEvent::Home,
            b'F' => KeyEvent::End,
            b'3' => {
                if self.read_byte()? == b'~' {
                    KeyEvent::Delete
                } else {
                    self.ignore(introducer, b'3')
                }
            }
            other => self.ignore(introducer, other),
        };
        Ok(key)
    }

    fn ignore(&mut self, introducer: u8, last: u8) -> KeyEvent {
        let dropped = self.discard_buffered();
        debug!(
            "Ignoring escape sequence ESC {} {:?} (+{} trailing bytes)",
            introducer as char, last as char, dropped
        );
        KeyEvent::Ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out one pre-arranged chunk per `read` call.
    struct Chunked {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    fn chunked(chunks: &[&[u8]]) -> RuneReader<Chunked> {
        RuneReader::new(Chunked {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        })
    }

    fn keys(input: &[u8]) -> Vec<KeyEvent> {
        let mut reader = RuneReader::new(input);
        let mut out = Vec::new();
        while let Ok(key) = reader.next_key() {
            out.push(key);
        }
        out
    }

    #[test]
    fn test_arrow_sequences() {
        for (seq, key) in [
            (b"\x1b[A", KeyEvent::ArrowUp),
            (b"\x1b[B", KeyEvent::ArrowDown),
            (b"\x1b[C", KeyEvent::ArrowRight),
            (b"\x1b[D", KeyEvent::ArrowLeft),
            (b"\x1bOA", KeyEvent::ArrowUp),
            (b"\x1bOD", KeyEvent::ArrowLeft),
        ] {
            let mut input = seq.to_vec();
            input.push(b'x');
            let mut reader = RuneReader::new(&input[..]);
            assert_eq!(reader.next_key().unwrap(), key);
            // exactly the sequence was consumed
            assert_eq!(reader.next_key().unwrap(), KeyEvent::Rune('x'));
        }
    }

    #[test]
    fn test_home_end_delete() {
        assert_eq!(
            keys(b"\x1b[H\x1b[F\x1b[3~"),
            vec![KeyEvent::Home, KeyEvent::End, KeyEvent::Delete]
        );
    }

    #[test]
    fn test_bare_escape_does_not_block() {
        // The second chunk would only be reached by a blocking read.
        let mut reader = chunked(&[b"\x1b", b"[A"]);
        assert_eq!(reader.next_key().unwrap(), KeyEvent::Escape);
        assert_eq!(reader.next_key().unwrap(), KeyEvent::Rune('['));
    }

    #[test]
    fn test_short_read_after_introducer_surfaces_error() {
        let mut reader = chunked(&[b"\x1b["]);
        match reader.next_key() {
            Err(PromptError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_final_byte_in_later_read() {
        let mut reader = chunked(&[b"\x1b[", b"B"]);
        assert_eq!(reader.next_key().unwrap(), KeyEvent::ArrowDown);
    }

    #[test]
    fn test_malformed_introducer() {
        let mut reader = RuneReader::new(&b"\x1bx"[..]);
        match reader.next_key() {
            Err(PromptError::MalformedEscapeSequence { bytes }) => {
                assert_eq!(bytes, vec![0x1b, b'x'])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_final_discards_trailing() {
        // ESC [ 1 ; 5 A (ctrl+up) is not understood; its tail is dropped
        let mut reader = chunked(&[b"\x1b[1;5A", b"z"]);
        assert_eq!(reader.next_key().unwrap(), KeyEvent::Ignore);
        assert_eq!(reader.next_key().unwrap(), KeyEvent::Rune('z'));
    }

    #[test]
    fn test_control_codes() {
        assert_eq!(
            keys(b"\x02\x06\x10\x0e\x03\x04\x7f\x08\x17\x18\r\t"),
            vec![
                KeyEvent::ArrowLeft,
                KeyEvent::ArrowRight,
                KeyEvent::ArrowUp,
                KeyEvent::ArrowDown,
                KeyEvent::Interrupt,
                KeyEvent::EndOfTransmission,
                KeyEvent::Backspace,
                KeyEvent::Backspace,
                KeyEvent::DeleteWord,
                KeyEvent::DeleteLine,
                KeyEvent::Enter,
                KeyEvent::Tab,
            ]
        );
    }

    #[test]
    fn test_multibyte_runes_across_reads() {
        let bytes = "é日".as_bytes();
        let mut reader = chunked(&[&bytes[..1], &bytes[1..3], &bytes[3..]]);
        assert_eq!(reader.next_key().unwrap(), KeyEvent::Rune('é'));
        assert_eq!(reader.next_key().unwrap(), KeyEvent::Rune('日'));
    }

    #[test]
    fn test_invalid_utf8_is_replacement() {
        assert_eq!(
            keys(b"\xffa"),
            vec![KeyEvent::Rune(char::REPLACEMENT_CHARACTER), KeyEvent::Rune('a')]
        );
    }

    #[test]
    fn test_unread_replays_bytes() {
        let mut reader = RuneReader::new(&b"cd"[..]);
        assert_eq!(reader.read_byte().unwrap(), b'c');
        reader.unread(b"ab");
        assert_eq!(keys_from(&mut reader), vec!['a', 'b', 'd']);
    }

    fn keys_from<R: Read>(reader: &mut RuneReader<R>) -> Vec<char> {
        let mut out = Vec::new();
        while let Ok(KeyEvent::Rune(c)) = reader.next_key() {
            out.push(c);
        }
        out
    }
}
