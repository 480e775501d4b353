//! Single-line edit buffer used by the text widgets.

use crate::core::term::KeyEvent;
use crate::ui::renderer::visible_width;

/// What a key did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Text changed
    Changed,
    /// Only the cursor moved
    Moved,
    /// Not an editing key
    Unhandled,
}

/// Characters plus an insertion point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    chars: Vec<char>,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Display width of the text right of the cursor.
    pub fn tail_width(&self) -> usize {
        let tail: String = self.chars[self.cursor..].iter().collect();
        visible_width(&tail)
    }

    pub fn apply(&mut self, key: KeyEvent) -> Edit {
        match key {
            KeyEvent::Rune(c) if !c.is_control() => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
                Edit::Changed
            }
            KeyEvent::Backspace => {
                if self.cursor == 0 {
                    return Edit::Unhandled;
                }
                self.cursor -= 1;
                self.chars.remove(self.cursor);
                Edit::Changed
            }
            KeyEvent::Delete => {
                if self.cursor == self.chars.len() {
                    return Edit::Unhandled;
                }
                self.chars.remove(self.cursor);
                Edit::Changed
            }
            KeyEvent::DeleteWord => {
                let end = self.cursor;
                let mut start = end;
                while start > 0 && self.chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                while start > 0 && !self.chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                if start == end {
                    return Edit::Unhandled;
                }
                self.chars.drain(start..end);
                self.cursor = start;
                Edit::Changed
            }
            KeyEvent::DeleteLine => {
                if self.chars.is_empty() {
                    return Edit::Unhandled;
                }
                self.clear();
                Edit::Changed
            }
            KeyEvent::ArrowLeft if self.cursor > 0 => {
                self.cursor -= 1;
                Edit::Moved
            }
            KeyEvent::ArrowRight if self.cursor < self.chars.len() => {
                self.cursor += 1;
                Edit::Moved
            }
            KeyEvent::Home => {
                self.cursor = 0;
                Edit::Moved
            }
            KeyEvent::End => {
                self.cursor = self.chars.len();
                Edit::Moved
            }
            _ => Edit::Unhandled,
        }
    }
}
