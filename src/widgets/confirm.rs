//! Yes / no question.

use crate::core::term::{KeyEvent, Terminal};
use crate::error::Result;
use crate::ui::{LineEditor, LineRenderer};
use crate::widgets::{finish, run, Flow, Interactive, PromptContext, Render};

/// Ask for a yes or no answer.
pub struct Confirm {
    pub message: String,
    /// Answer for an empty reply
    pub default: bool,
    pub help: String,
    editor: LineEditor,
    show_help: bool,
    answer: Option<bool>,
    renderer: LineRenderer,
}

/// `y`, `yes`, `n`, `no` in any case.
fn parse_answer(reply: &str) -> Option<bool> {
    match reply.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

impl Confirm {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            default: true,
            help: String::new(),
            editor: LineEditor::new(),
            show_help: false,
            answer: None,
            renderer: LineRenderer::new(),
        }
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Read replies until one is valid.
    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<bool> {
        self.editor.clear();
        self.show_help = false;
        self.answer = None;
        self.renderer = LineRenderer::new();
        run(self, term, cx, false)?;
        Ok(self.answer.unwrap_or(self.default))
    }

    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: bool) -> Result<()> {
        finish(self, term, cx, if answer { "Yes" } else { "No" })
    }
}

impl Interactive for Confirm {
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow {
        match key {
            KeyEvent::Enter | KeyEvent::EndOfTransmission => {
                let reply = self.editor.text();
                let reply = reply.trim();
                if reply.is_empty() {
                    self.answer = Some(self.default);
                    return Flow::Commit;
                }
                if !self.help.is_empty() && reply.chars().eq(std::iter::once(cx.config.help_input)) {
                    self.show_help = true;
                    self.editor.clear();
                    return Flow::Continue;
                }
                match parse_answer(reply) {
                    Some(answer) => {
                        self.answer = Some(answer);
                        Flow::Commit
                    }
                    None => {
                        let message = format!("{:?} is not a valid answer, please try again.", reply);
                        self.editor.clear();
                        Flow::Invalid(message)
                    }
                }
            }
            _ => {
                self.editor.apply(key);
                Flow::Continue
            }
        }
    }
}

impl Render for Confirm {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, &self.help, self.show_help && answer.is_none());
        out.push(' ');
        if let Some(answer) = answer {
            out.push_str(&cx.paint("cyan", answer));
            out.push('\n');
            return out;
        }
        if !self.help.is_empty() && !self.show_help {
            out.push_str(&cx.paint("cyan", &format!("[{} for help]", cx.config.help_input)));
            out.push(' ');
        }
        out.push_str(&cx.paint("white", if self.default { "(Y/n)" } else { "(y/N)" }));
        out.push(' ');
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
