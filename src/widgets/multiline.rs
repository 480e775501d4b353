//! Free text over several lines.

use crate::core::term::{KeyEvent, Terminal};
use crate::error::Result;
use crate::ui::{LineEditor, LineRenderer};
use crate::widgets::{finish, run, Flow, Interactive, PromptContext, Render};

/// Text spanning several lines. Two empty lines in a row end the input.
pub struct Multiline {
    pub message: String,
    /// Answer when nothing is entered
    pub default: String,
    pub help: String,
    /// Finished lines
    lines: Vec<String>,
    /// Line being typed
    editor: LineEditor,
    /// Last finished line was empty
    empty_once: bool,
    show_help: bool,
    renderer: LineRenderer,
}

impl Multiline {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            default: String::new(),
            help: String::new(),
            lines: Vec::new(),
            editor: LineEditor::new(),
            empty_once: false,
            show_help: false,
            renderer: LineRenderer::new(),
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = default.to_string();
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Lines joined with trailing empty lines dropped, or the default.
    fn value(&self) -> String {
        let end = self
            .lines
            .iter()
            .rposition(|l| !l.is_empty())
            .map_or(0, |i| i + 1);
        let text = self.lines[..end].join("\n");
        if text.is_empty() {
            self.default.clone()
        } else {
            text
        }
    }

    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<String> {
        self.lines.clear();
        self.editor.clear();
        self.empty_once = false;
        self.show_help = false;
        self.renderer = LineRenderer::new();
        run(self, term, cx, false)?;
        Ok(self.value())
    }

    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: &str) -> Result<()> {
        finish(self, term, cx, answer)
    }
}

impl Interactive for Multiline {
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow {
        match key {
            KeyEvent::Enter => {
                let line = self.editor.text();
                self.editor.clear();
                if self.lines.is_empty()
                    && !self.help.is_empty()
                    && !self.show_help
                    && line.chars().eq(std::iter::once(cx.config.help_input))
                {
                    self.show_help = true;
                    return Flow::Continue;
                }
                if line.is_empty() {
                    if self.empty_once {
                        return Flow::Commit;
                    }
                    self.empty_once = true;
                } else {
                    self.empty_once = false;
                }
                self.lines.push(line);
                Flow::Continue
            }
            KeyEvent::EndOfTransmission => {
                if !self.editor.is_empty() {
                    self.lines.push(self.editor.text());
                }
                Flow::Commit
            }
            _ => {
                self.editor.apply(key);
                Flow::Continue
            }
        }
    }
}

impl Render for Multiline {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, &self.help, self.show_help && answer.is_none());
        out.push(' ');
        if let Some(answer) = answer {
            out.push('\n');
            if !answer.is_empty() {
                out.push_str(&cx.paint("cyan", answer));
                out.push('\n');
            }
            return out;
        }

        if !self.default.is_empty() {
            out.push_str(&cx.paint("white", &format!("({})", self.default)));
            out.push(' ');
        }
        let mut hint = String::from("[Enter 2 empty lines to finish");
        if !self.help.is_empty() && !self.show_help {
            hint.push_str(&format!(", {} for help", cx.config.help_input));
        }
        hint.push(']');
        out.push_str(&cx.paint("cyan", &hint));
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&self.editor.text());
        out
    }

    fn renderer(&mut self) -> &mut LineRenderer {
        &mut self.renderer
    }

    fn cursor_offset(&self) -> usize {
        self.editor.tail_width()
    }
}
