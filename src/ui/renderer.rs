//! In-place renderer
//!
//! A widget's output is redrawn by erasing exactly the rows the previous
//! draw occupied and printing the new text in their place, so the prompt
//! updates without scrolling the terminal history.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::core::term::{Cursor, EraseLine};

/// Display columns of `s`. Escape sequences take no space, wide characters
/// take two columns.
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\x1b' {
            width += ch.width().unwrap_or(0);
            continue;
        }
        match chars.next() {
            // CSI: parameters then one final byte in @..~
            Some('[') => {
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: terminated by BEL or ESC \
            Some(']') => {
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    width
}

/// Rows `text` occupies on a terminal `width` columns wide, counting soft
/// wraps. Every `\n`-separated line takes at least one row, so text ending in
/// a newline also counts the empty row the cursor is left on.
pub fn physical_rows(text: &str, width: u16) -> usize {
    let width = usize::from(width.max(1));
    text.split('\n')
        .map(|line| {
            let w = visible_width(line);
            ((w + width - 1) / width).max(1)
        })
        .sum()
}

/// Tracks how much of the screen the last draw used.
#[derive(Debug, Default)]
pub struct LineRenderer {
    /// Rows used by the last prompt draw
    lines_previously_printed: usize,
    /// Rows used by an error message printed above the prompt
    error_lines: usize,
}

impl LineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_previously_printed(&self) -> usize {
        self.lines_previously_printed
    }

    /// Rows covered by the error block and the prompt together. The prompt
    /// starts on the row the error left the cursor on.
    fn occupied(&self) -> usize {
        if self.error_lines == 0 {
            self.lines_previously_printed
        } else {
            self.error_lines + self.lines_previously_printed.max(1) - 1
        }
    }

    /// Erase `rows` rows ending with the cursor row, leaving the cursor at
    /// column 0 of the topmost one.
    fn erase<W: Write>(out: &mut W, rows: usize) -> io::Result<()> {
        let mut cursor = Cursor::new(out);
        cursor.horizontal_absolute(0)?;
        cursor.erase_line(EraseLine::All)?;
        for _ in 1..rows {
            cursor.previous_line(1)?;
            cursor.erase_line(EraseLine::All)?;
        }
        Ok(())
    }

    /// Replace the previous draw with `text`. An error above the prompt
    /// stays where it is.
    pub fn render<W: Write>(&mut self, out: &mut W, text: &str, width: u16) -> io::Result<()> {
        Self::erase(out, self.lines_previously_printed)?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        self.lines_previously_printed = physical_rows(text, width);
        Ok(())
    }

    /// Clear the prompt and any previous error, then print `text` as the new
    /// error. The caller draws the prompt again below it.
    pub fn render_error<W: Write>(&mut self, out: &mut W, text: &str, width: u16) -> io::Result<()> {
        Self::erase(out, self.occupied())?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        self.error_lines = physical_rows(text, width);
        self.lines_previously_printed = 0;
        Ok(())
    }

    /// Clear everything, errors included, and print the final form.
    pub fn finish<W: Write>(&mut self, out: &mut W, text: &str, width: u16) -> io::Result<()> {
        Self::erase(out, self.occupied())?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        self.error_lines = 0;
        self.lines_previously_printed = physical_rows(text, width);
        Ok(())
    }

    /// Erase everything and forget it.
    pub fn clear<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        Self::erase(out, self.occupied())?;
        out.flush()?;
        self.error_lines = 0;
        self.lines_previously_printed = 0;
        Ok(())
    }

    /// Account for rows printed by someone else directly below our output
    /// (sub-prompts), so a later erase covers them too.
    pub fn absorb(&mut self, rows: usize) {
        if rows > 0 {
            self.lines_previously_printed = self.lines_previously_printed.max(1) + rows - 1;
        }
    }
}
