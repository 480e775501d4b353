//! Single choice from a list.

use std::sync::Arc;

use crate::core::term::{KeyEvent, Terminal};
use crate::error::{PromptError, Result};
use crate::ui::filter::visible_indices;
use crate::ui::{paginate, Filter, LineEditor, LineRenderer};
use crate::widgets::{finish, run, Flow, Interactive, PromptContext, Render};

/// Extra text shown next to an option: `(value, index) -> description`.
pub type DescriptionFn = dyn Fn(&str, usize) -> String + Send + Sync;

/// Cursor, filter and mode shared by the list widgets.
#[derive(Debug, Default)]
pub(crate) struct ListState {
    /// Highlighted row among the visible options
    pub selected: usize,
    /// Typed filter text
    pub filter: LineEditor,
    /// Help line revealed
    pub show_help: bool,
    /// `j`/`k` move instead of filtering
    pub vim: bool,
}

impl ListState {
    pub fn new(selected: usize, vim: bool) -> Self {
        Self {
            selected,
            vim,
            ..Self::default()
        }
    }

    /// Keep the highlight inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn up(&mut self, len: usize, wrap: bool) {
        if self.selected > 0 {
            self.selected -= 1;
        } else if wrap && len > 0 {
            self.selected = len - 1;
        }
    }

    fn down(&mut self, len: usize, wrap: bool) {
        if self.selected + 1 < len {
            self.selected += 1;
        } else if wrap {
            self.selected = 0;
        }
    }

    /// Movement, help, vim toggle and filter editing. Returns false for keys
    /// left to the widget.
    pub fn navigate(&mut self, key: KeyEvent, len: usize, help: &str, cx: &PromptContext) -> bool {
        let wrap = cx.config.wrap_around;
        match key {
            KeyEvent::ArrowUp => self.up(len, wrap),
            KeyEvent::Rune('k') if self.vim => self.up(len, wrap),
            KeyEvent::ArrowDown => self.down(len, wrap),
            KeyEvent::Rune('j') if self.vim => self.down(len, wrap),
            KeyEvent::Rune(c) if c == cx.config.help_input && !help.is_empty() && !self.show_help => {
                self.show_help = true;
            }
            KeyEvent::Escape => self.vim = !self.vim,
            KeyEvent::Backspace
            | KeyEvent::DeleteWord
            | KeyEvent::DeleteLine
            | KeyEvent::Rune(_) => {
                // the caller clamps the highlight to the rows still visible
                self.filter.apply(key);
            }
            _ => return false,
        }
        true
    }

    /// Filter text as shown after the message.
    pub fn filter_suffix(&self) -> String {
        if self.filter.is_empty() {
            String::new()
        } else {
            format!(" {}", self.filter.text())
        }
    }
}

/// Pick one option.
pub struct Select {
    pub message: String,
    pub options: Vec<String>,
    /// Option highlighted first
    pub default: Option<String>,
    pub help: String,
    /// Overrides the configured page size
    pub page_size: Option<usize>,
    pub vim_mode: bool,
    /// Overrides the configured filter
    pub filter: Option<Filter>,
    description: Option<Arc<DescriptionFn>>,
    state: ListState,
    renderer: LineRenderer,
}

impl Select {
    pub fn new(message: &str, options: Vec<String>) -> Self {
        Self {
            message: message.to_string(),
            options,
            default: None,
            help: String::new(),
            page_size: None,
            vim_mode: false,
            filter: None,
            description: None,
            state: ListState::default(),
            renderer: LineRenderer::new(),
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_description<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) -> String + Send + Sync + 'static,
    {
        self.description = Some(Arc::new(f));
        self
    }

    /// Indices of the options passing the current filter.
    fn visible(&self, cx: &PromptContext) -> Vec<usize> {
        visible_indices(
            &self.state.filter.text(),
            &self.options,
            &[self.filter.as_ref(), cx.config.filter.as_ref()],
        )
    }

    fn reset(&mut self, cx: &PromptContext) {
        let selected = self
            .default
            .as_ref()
            .and_then(|d| self.options.iter().position(|o| o == d))
            .unwrap_or(0);
        self.state = ListState::new(selected, self.vim_mode || cx.config.vim_mode);
        self.renderer = LineRenderer::new();
    }

    /// Let the user pick an option and return it.
    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<String> {
        if self.options.is_empty() {
            return Err(PromptError::NoOptionsProvided);
        }
        self.reset(cx);
        run(self, term, cx, !cx.config.show_cursor)?;
        self.chosen(cx).ok_or(PromptError::NoOptionsProvided)
    }

    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: &str) -> Result<()> {
        finish(self, term, cx, answer)
    }

    fn chosen(&self, cx: &PromptContext) -> Option<String> {
        let visible = self.visible(cx);
        visible
            .get(self.state.selected)
            .map(|&i| self.options[i].clone())
    }
}

impl Interactive for Select {
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow {
        let visible = self.visible(cx);
        match key {
            KeyEvent::Enter | KeyEvent::EndOfTransmission => {
                if visible.is_empty() {
                    Flow::Continue
                } else {
                    Flow::Commit
                }
            }
            _ => {
                self.state.navigate(key, visible.len(), &self.help, cx);
                let len = self.visible(cx).len();
                self.state.clamp(len);
                Flow::Continue
            }
        }
    }
}

impl Render for Select {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, &self.help, self.state.show_help && answer.is_none());
        if let Some(answer) = answer {
            out.push(' ');
            out.push_str(&cx.paint("cyan", answer));
            out.push('\n');
            return out;
        }

        out.push_str(&self.state.filter_suffix());
        let mut hint = String::from("[Use arrows to move, type to filter");
        if !self.help.is_empty() && !self.state.show_help {
            hint.push_str(&format!(", {} for more help", cx.config.help_input));
        }
        hint.push(']');
        out.push_str("  ");
        out.push_str(&cx.paint("cyan", &hint));
        out.push('\n');

        let visible = self.visible(cx);
        let page_size = cx.config.effective_page_size(self.page_size);
        let (page, focus) = paginate(&visible, self.state.selected, page_size);
        for (row, &index) in page.iter().enumerate() {
            let option = &self.options[index];
            if row == focus {
                out.push_str(&cx.icon(&cx.config.icons.select_focus));
                out.push(' ');
                out.push_str(&cx.paint(&cx.config.icons.select_focus.format, option));
            } else {
                out.push_str("  ");
                out.push_str(option);
            }
            if let Some(describe) = &self.description {
                let text = describe(option, index);
                if !text.is_empty() {
                    out.push_str(" - ");
                    out.push_str(&cx.paint("cyan", &text));
                }
            }
            out.push('\n');
        }
        out
    }

    fn renderer(&mut self) -> &mut LineRenderer {
        &mut self.renderer
    }
}
