//! A list of single-line entries, one prompt each.

use crate::core::term::Terminal;
use crate::error::Result;
use crate::ui::LineRenderer;
use crate::widgets::{draw, finish, Input, PromptContext, Render};

/// Collects entries with repeated [`Input`] prompts until one is left empty.
pub struct MultiInput {
    pub message: String,
    pub help: String,
    /// Message of each entry prompt
    pub item_message: String,
    entries: Vec<String>,
    renderer: LineRenderer,
}

impl MultiInput {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            help: String::new(),
            item_message: ">".to_string(),
            entries: Vec::new(),
            renderer: LineRenderer::new(),
        }
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Prompt for entries and return them newline-joined. One raw mode scope
    /// covers every entry.
    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<String> {
        self.entries.clear();
        self.renderer = LineRenderer::new();

        term.with_raw_mode(|io| {
            draw(self, io, cx)?;
            loop {
                let mut input = Input::new(&self.item_message).with_help(&self.help);
                let entry = input.prompt_raw(io, cx)?;
                if entry.is_empty() {
                    input.dismiss(io)?;
                    return Ok(());
                }
                input.cleanup_raw(io, cx, &entry)?;
                self.renderer.absorb(input.rows());
                self.entries.push(entry);
            }
        })?;
        Ok(self.entries.join("\n"))
    }

    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: &str) -> Result<()> {
        let shown = answer.replace('\n', ", ");
        finish(self, term, cx, &shown)
    }
}

/// Only drawn; keys go to the entry prompts.
impl Render for MultiInput {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, "", false);
        out.push(' ');
        match answer {
            Some(answer) => out.push_str(&cx.paint("cyan", answer)),
            None => out.push_str(&cx.paint("cyan", "[Enter an empty line to finish]")),
        }
        out.push('\n');
        out
    }

    fn renderer(&mut self) -> &mut LineRenderer {
        &mut self.renderer
    }
}
