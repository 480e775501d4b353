//! Any number of choices from a list.

use std::collections::HashSet;

use crate::core::term::{KeyEvent, Terminal};
use crate::error::{PromptError, Result};
use crate::ui::filter::visible_indices;
use crate::ui::{paginate, Filter, LineRenderer};
use crate::widgets::select::ListState;
use crate::widgets::{finish, run, Flow, Interactive, PromptContext, Render};

/// Check any number of options.
pub struct MultiSelect {
    pub message: String,
    pub options: Vec<String>,
    /// Options checked at the start
    pub default: Vec<String>,
    pub help: String,
    pub page_size: Option<usize>,
    pub vim_mode: bool,
    pub filter: Option<Filter>,
    state: ListState,
    /// Checked option values
    checked: HashSet<String>,
    renderer: LineRenderer,
}

impl MultiSelect {
    pub fn new(message: &str, options: Vec<String>) -> Self {
        Self {
            message: message.to_string(),
            options,
            default: Vec::new(),
            help: String::new(),
            page_size: None,
            vim_mode: false,
            filter: None,
            state: ListState::default(),
            checked: HashSet::new(),
            renderer: LineRenderer::new(),
        }
    }

    pub fn with_default(mut self, default: Vec<String>) -> Self {
        self.default = default;
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

    pub fn is_checked(&self, value: &str) -> bool {
        self.checked.contains(value)
    }

    fn visible(&self, cx: &PromptContext) -> Vec<usize> {
        visible_indices(
            &self.state.filter.text(),
            &self.options,
            &[self.filter.as_ref(), cx.config.filter.as_ref()],
        )
    }

    fn reset(&mut self, cx: &PromptContext) {
        self.state = ListState::new(0, self.vim_mode || cx.config.vim_mode);
        self.checked = self
            .default
            .iter()
            .filter(|d| self.options.contains(d))
            .cloned()
            .collect();
        self.renderer = LineRenderer::new();
    }

    /// Checked options in their original order.
    fn answer(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| self.checked.contains(*o))
            .cloned()
            .collect()
    }

    /// Let the user check options and return them in list order.
    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<Vec<String>> {
        if self.options.is_empty() {
            return Err(PromptError::NoOptionsProvided);
        }
        self.reset(cx);
        run(self, term, cx, !cx.config.show_cursor)?;
        Ok(self.answer())
    }

    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: &[String]) -> Result<()> {
        finish(self, term, cx, &answer.join(", "))
    }

    fn toggle(&mut self, index: usize) {
        let value = &self.options[index];
        if !self.checked.remove(value) {
            self.checked.insert(value.clone());
        }
    }

    /// Drop the filter after a change unless configured to keep it. The
    /// highlight stays on `index`.
    fn settle_filter(&mut self, index: Option<usize>, cx: &PromptContext) {
        if cx.config.keep_filter || self.state.filter.is_empty() {
            return;
        }
        self.state.filter.clear();
        let visible = self.visible(cx);
        self.state.selected = index
            .and_then(|i| visible.iter().position(|&v| v == i))
            .unwrap_or(0);
    }
}

impl Interactive for MultiSelect {
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow {
        let visible = self.visible(cx);
        let current = visible.get(self.state.selected).copied();
        match key {
            KeyEvent::Enter | KeyEvent::EndOfTransmission => return Flow::Commit,
            KeyEvent::Rune(' ') => {
                if let Some(index) = current {
                    self.toggle(index);
                }
                self.settle_filter(current, cx);
            }
            KeyEvent::ArrowRight => {
                for &index in &visible {
                    self.checked.insert(self.options[index].clone());
                }
                self.settle_filter(current, cx);
            }
            KeyEvent::ArrowLeft => {
                for &index in &visible {
                    self.checked.remove(&self.options[index]);
                }
                self.settle_filter(current, cx);
            }
            _ => {
                self.state.navigate(key, visible.len(), &self.help, cx);
            }
        }
        let len = self.visible(cx).len();
        self.state.clamp(len);
        Flow::Continue
    }
}

impl Render for MultiSelect {
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String {
        let mut out = cx.header(&self.message, &self.help, self.state.show_help && answer.is_none());
        if let Some(answer) = answer {
            out.push(' ');
            out.push_str(&cx.paint("cyan", answer));
            out.push('\n');
            return out;
        }

        out.push_str(&self.state.filter_suffix());
        let mut hint = String::from(
            "[Use arrows to move, space to select, <right> to all, <left> to none, type to filter",
        );
        if !self.help.is_empty() && !self.state.show_help {
            hint.push_str(&format!(", {} for more help", cx.config.help_input));
        }
        hint.push(']');
        out.push_str("  ");
        out.push_str(&cx.paint("cyan", &hint));
        out.push('\n');

        let icons = &cx.config.icons;
        let visible = self.visible(cx);
        let page_size = cx.config.effective_page_size(self.page_size);
        let (page, focus) = paginate(&visible, self.state.selected, page_size);
        for (row, &index) in page.iter().enumerate() {
            let option = &self.options[index];
            if row == focus {
                out.push_str(&cx.icon(&icons.select_focus));
            } else {
                out.push(' ');
            }
            out.push(' ');
            if self.checked.contains(option) {
                out.push_str(&cx.icon(&icons.marked_option));
            } else {
                out.push_str(&cx.icon(&icons.unmarked_option));
            }
            out.push(' ');
            out.push_str(option);
            out.push('\n');
        }
        out
    }

    fn renderer(&mut self) -> &mut LineRenderer {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted;
    use crate::widgets::tests::plain;

    fn days() -> Vec<String> {
        ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn keys(widget: &mut MultiSelect, cx: &PromptContext, keys: &[KeyEvent]) {
        for &key in keys {
            widget.on_key(key, cx);
        }
    }

    #[test]
    fn test_answer_keeps_list_order() {
        let (mut term, out) = scripted(b"\x1b[B\x1b[B \x1b[A\x1b[A \r");
        let mut select = MultiSelect::new("Days", days());
        let answer = select.prompt(&mut term, &plain()).unwrap();
        assert_eq!(answer, vec!["Monday".to_string(), "Wednesday".to_string()]);
        assert!(out.contents().contains("> [x] Wednesday"));
    }

    #[test]
    fn test_defaults_are_checked() {
        let (mut term, out) = scripted(b"\r");
        let mut select = MultiSelect::new("Days", days())
            .with_default(vec!["Friday".into(), "Sunday".into()]);
        assert_eq!(select.prompt(&mut term, &plain()).unwrap(), vec!["Friday".to_string()]);
        let shown = out.contents();
        assert!(shown.contains("> [ ] Monday\n"));
        assert!(shown.contains("  [x] Friday\n"));
    }

    #[test]
    fn test_checked_survive_filtering() {
        let cx = plain();
        let mut select = MultiSelect::new("Days", days());
        select.reset(&cx);

        keys(&mut select, &cx, &[KeyEvent::ArrowDown, KeyEvent::Rune(' ')]);
        assert!(select.is_checked("Tuesday"));

        // filter hides Tuesday
        keys(&mut select, &cx, &[KeyEvent::Rune('f'), KeyEvent::Rune('r')]);
        assert_eq!(select.visible(&cx), vec![4]);
        assert!(select.is_checked("Tuesday"));

        keys(&mut select, &cx, &[KeyEvent::DeleteLine]);
        assert_eq!(select.visible(&cx).len(), 5);
        assert!(select.is_checked("Tuesday"));
        assert_eq!(select.answer(), vec!["Tuesday".to_string()]);
    }

    #[test]
    fn test_toggle_clears_filter_and_follows_option() {
        let cx = plain();
        let mut select = MultiSelect::new("Days", days());
        select.reset(&cx);

        keys(&mut select, &cx, &[KeyEvent::Rune('t'), KeyEvent::Rune('h'), KeyEvent::Rune(' ')]);
        assert!(select.is_checked("Thursday"));
        assert!(select.state.filter.is_empty());
        assert_eq!(select.state.selected, 3);
    }

    #[test]
    fn test_filter_moves_highlight_only_when_hidden() {
        let cx = plain();
        let mut select = MultiSelect::new("Days", days());
        select.reset(&cx);
        let highlighted = |select: &MultiSelect| {
            let visible = select.visible(&cx);
            select.options[visible[select.state.selected]].clone()
        };

        keys(&mut select, &cx, &[KeyEvent::ArrowDown, KeyEvent::ArrowDown, KeyEvent::ArrowDown]);
        assert_eq!(highlighted(&select), "Thursday");

        // "a" matches every day, the row is unchanged
        keys(&mut select, &cx, &[KeyEvent::Rune('a')]);
        assert_eq!(select.state.selected, 3);
        assert_eq!(highlighted(&select), "Thursday");

        // "r" hides Monday to Wednesday, the row falls back to the last one
        keys(&mut select, &cx, &[KeyEvent::DeleteLine, KeyEvent::Rune('r')]);
        assert_eq!(select.visible(&cx), vec![3, 4]);
        assert_eq!(select.state.selected, 1);
        assert_eq!(highlighted(&select), "Friday");
    }

    #[test]
    fn test_keep_filter() {
        let mut cx = plain();
        cx.config.keep_filter = true;
        let mut select = MultiSelect::new("Days", days());
        select.reset(&cx);

        keys(&mut select, &cx, &[KeyEvent::Rune('t'), KeyEvent::Rune(' ')]);
        assert_eq!(select.state.filter.text(), "t");
        assert!(select.is_checked("Tuesday"));
    }

    #[test]
    fn test_all_and_none_apply_to_visible() {
        let mut cx = plain();
        cx.config.keep_filter = true;
        let mut select = MultiSelect::new("Days", days());
        select.reset(&cx);

        keys(&mut select, &cx, &[KeyEvent::Rune('d'), KeyEvent::Rune('n'), KeyEvent::ArrowRight]);
        assert_eq!(select.answer(), vec!["Wednesday".to_string()]);

        keys(&mut select, &cx, &[KeyEvent::DeleteLine, KeyEvent::ArrowRight]);
        assert_eq!(select.answer().len(), 5);
        keys(&mut select, &cx, &[KeyEvent::Rune('u'), KeyEvent::ArrowLeft]);
        assert_eq!(
            select.answer(),
            vec!["Monday".to_string(), "Wednesday".to_string(), "Friday".to_string()]
        );
    }

    #[test]
    fn test_no_options() {
        let (mut term, out) = scripted(b"\r");
        let result = MultiSelect::new("Days", Vec::new()).prompt(&mut term, &plain());
        assert!(matches!(result, Err(PromptError::NoOptionsProvided)));
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_final_form() {
        let (mut term, out) = scripted(b" \r");
        let cx = plain();
        let mut select = MultiSelect::new("Days", days());
        let answer = select.prompt(&mut term, &cx).unwrap();
        out.clear();
        select.cleanup(&mut term, &cx, &answer).unwrap();
        assert!(out.contents().ends_with("? Days Monday\n"));
    }
}
