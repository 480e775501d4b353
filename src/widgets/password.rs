//! Masked text input.

use crate::core::term::{KeyEvent, Terminal};
use crate::error::Result;
use crate::ui::{LineEditor, LineRenderer};
use crate::widgets::{finish, run, Flow, Interactive, PromptContext, Render};

const MASK: char = '*';

/// Text input that echoes a mask instead of the characters typed.
pub struct Password {
    pub message: String,
    pub help: String,
    editor: LineEditor,
    show_help: bool,
    renderer: LineRenderer,
}

impl Password {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            help: String::new(),
            editor: LineEditor::new(),
            show_help: false,
            renderer: LineRenderer::new(),
        }
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<String> {
        self.editor.clear();
        self.show_help = false;
        self.renderer = LineRenderer::new();
        run(self, term, cx, false)?;
        Ok(self.editor.text())
    }

    /// The final form never shows the answer.
    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<()> {
        finish(self, term, cx, "")
    }
}

impl Interactive for Password {
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow {
        match key {
            KeyEvent::Enter | KeyEvent::EndOfTransmission => Flow::Commit,
            KeyEvent::Rune(c)
                if c == cx.config.help_input
                    && self.editor.is_empty()
                    && !self.help.is_empty()
                    && !self.show_help =>
            {
                self.show_help = true;
                Flow::Continue
            }
            _ => {
                self.editor.apply(key);
                Flow::Continue
            }
        }
    }
}

impl Render for Password {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, &self.help, self.show_help && answer.is_none());
        out.push(' ');
        if answer.is_some() {
            out.push('\n');
            return out;
        }
        if !self.help.is_empty() && !self.show_help {
            out.push_str(&cx.paint("cyan", &format!("[{} for help]", cx.config.help_input)));
            out.push(' ');
        }
        out.extend(std::iter::repeat(MASK).take(self.editor.len()));
        out
    }

    fn renderer(&mut self) -> &mut LineRenderer {
        &mut self.renderer
    }

    fn cursor_offset(&self) -> usize {
        self.editor.len() - self.editor.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted;
    use crate::widgets::tests::plain;

    #[test]
    fn test_masked_echo() {
        let (mut term, out) = scripted("s3cr€t\r".as_bytes());
        let mut password = Password::new("Password:");
        assert_eq!(password.prompt(&mut term, &plain()).unwrap(), "s3cr€t");

        let shown = out.contents();
        assert!(shown.ends_with("? Password: ******"));
        assert!(!shown.contains("s3cr"));
    }

    #[test]
    fn test_final_form_hides_answer() {
        let (mut term, out) = scripted(b"hunter2\r");
        let cx = plain();
        let mut password = Password::new("Password:");
        password.prompt(&mut term, &cx).unwrap();
        out.clear();
        password.cleanup(&mut term, &cx).unwrap();
        assert_eq!(out.contents(), "\x1b[1G\x1b[2K? Password: \n");
    }

    #[test]
    fn test_cursor_follows_mask() {
        let (mut term, out) = scripted(b"abc\x1b[D\r");
        Password::new("Pin").prompt(&mut term, &plain()).unwrap();
        assert!(out.contents().ends_with("? Pin ***\x1b[1D"));
    }

    #[test]
    fn test_help_only_on_empty_buffer() {
        let (mut term, _) = scripted(b"??\r");
        let mut password = Password::new("Pin").with_help("four digits");
        assert_eq!(password.prompt(&mut term, &plain()).unwrap(), "?");
    }
}
