//! Single-line text input with optional completion.

use std::sync::Arc;

use crate::core::term::{KeyEvent, TermIo, Terminal};
use crate::error::Result;
use crate::ui::{paginate, Edit, LineEditor, LineRenderer};
use crate::widgets::{
    finish, finish_on, interact, run, Flow, Interactive, PromptContext, Render,
};

/// Completion source: current text in, candidates out.
pub type SuggestFn = dyn Fn(&str) -> Vec<String> + Send + Sync;

/// Free text answer.
pub struct Input {
    pub message: String,
    /// Answer when the user enters nothing
    pub default: String,
    pub help: String,
    suggest: Option<Arc<SuggestFn>>,
    editor: LineEditor,
    show_help: bool,
    /// Candidates listed after Tab
    suggestions: Vec<String>,
    suggestion: usize,
    renderer: LineRenderer,
}

impl Input {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            default: String::new(),
            help: String::new(),
            suggest: None,
            editor: LineEditor::new(),
            show_help: false,
            suggestions: Vec::new(),
            suggestion: 0,
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

    pub fn with_suggest<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggest = Some(Arc::new(f));
        self
    }

    /// Rows the last draw occupies.
    pub(crate) fn rows(&self) -> usize {
        self.renderer.lines_previously_printed()
    }

    fn value(&self) -> String {
        let text = self.editor.text();
        if text.is_empty() {
            self.default.clone()
        } else {
            text
        }
    }

    fn reset(&mut self) {
        self.editor.clear();
        self.show_help = false;
        self.suggestions.clear();
        self.renderer = LineRenderer::new();
    }

    /// Read a line and return it, or the default when it is empty.
    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<String> {
        self.reset();
        run(self, term, cx, false)?;
        Ok(self.value())
    }

    /// [`Input::prompt`] on a terminal the caller already holds in raw mode.
    pub(crate) fn prompt_raw(&mut self, io: &mut TermIo, cx: &PromptContext) -> Result<String> {
        self.reset();
        interact(self, io, cx)?;
        Ok(self.value())
    }

    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: &str) -> Result<()> {
        finish(self, term, cx, answer)
    }

    pub(crate) fn cleanup_raw(
        &mut self,
        io: &mut TermIo,
        cx: &PromptContext,
        answer: &str,
    ) -> Result<()> {
        finish_on(self, io, cx, answer)
    }

    /// Erase the prompt without leaving a final form behind.
    pub(crate) fn dismiss(&mut self, io: &mut TermIo) -> Result<()> {
        self.renderer.clear(&mut io.out)?;
        Ok(())
    }

    fn complete(&mut self) {
        let Some(suggest) = &self.suggest else {
            return;
        };
        if !self.suggestions.is_empty() {
            self.suggestion = (self.suggestion + 1) % self.suggestions.len();
            return;
        }
        let mut candidates = suggest(&self.editor.text());
        match candidates.len() {
            0 => {}
            1 => {
                let only = candidates.remove(0);
                self.editor.set_text(&only);
            }
            _ => {
                self.suggestions = candidates;
                self.suggestion = 0;
            }
        }
    }
}

impl Interactive for Input {
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow {
        if !self.suggestions.is_empty() {
            let len = self.suggestions.len();
            match key {
                KeyEvent::Enter => {
                    let chosen = self.suggestions[self.suggestion].clone();
                    self.editor.set_text(&chosen);
                    self.suggestions.clear();
                    return Flow::Continue;
                }
                KeyEvent::ArrowDown => {
                    self.suggestion = (self.suggestion + 1) % len;
                    return Flow::Continue;
                }
                KeyEvent::ArrowUp => {
                    self.suggestion = (self.suggestion + len - 1) % len;
                    return Flow::Continue;
                }
                KeyEvent::Escape => {
                    self.suggestions.clear();
                    return Flow::Continue;
                }
                _ => {}
            }
        }

        match key {
            KeyEvent::Enter | KeyEvent::EndOfTransmission => Flow::Commit,
            KeyEvent::Tab => {
                self.complete();
                Flow::Continue
            }
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
                if self.editor.apply(key) == Edit::Changed {
                    self.suggestions.clear();
                }
                Flow::Continue
            }
        }
    }
}

impl Render for Input {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, &self.help, self.show_help && answer.is_none());
        out.push(' ');
        if let Some(answer) = answer {
            out.push_str(&cx.paint("cyan", answer));
            out.push('\n');
            return out;
        }

        if !self.suggestions.is_empty() {
            out.push_str(&self.editor.text());
            out.push_str("  ");
            out.push_str(&cx.paint("cyan", "[Use arrows to move, enter to select, type to continue]"));
            out.push('\n');
            let page_size = cx.config.effective_page_size(None);
            let (page, focus) = paginate(&self.suggestions, self.suggestion, page_size);
            for (row, candidate) in page.iter().enumerate() {
                if row == focus {
                    out.push_str(&cx.icon(&cx.config.icons.select_focus));
                    out.push(' ');
                    out.push_str(&cx.paint(&cx.config.icons.select_focus.format, candidate));
                } else {
                    out.push_str("  ");
                    out.push_str(candidate);
                }
                out.push('\n');
            }
            return out;
        }

        if !self.help.is_empty() && !self.show_help {
            out.push_str(&cx.paint("cyan", &format!("[{} for help]", cx.config.help_input)));
            out.push(' ');
        }
        if !self.default.is_empty() {
            out.push_str(&cx.paint("white", &format!("({})", self.default)));
            out.push(' ');
        }
        out.push_str(&self.editor.text());
        out
    }

    fn renderer(&mut self) -> &mut LineRenderer {
        &mut self.renderer
    }

    fn cursor_offset(&self) -> usize {
        if self.suggestions.is_empty() {
            self.editor.tail_width()
        } else {
            0
        }
    }
}
