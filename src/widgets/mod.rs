//! Prompt widgets.
//!
//! Every widget owns a small state struct and follows the same cycle:
//!
//! ```text
//! prompt():  acquire raw mode ─> render ─┬─> read key ─> update state ─┐
//!                                        └──────── re-render <─────────┘
//!            until Enter / Ctrl+D commits (Ctrl+C aborts), release raw mode
//! cleanup(): redraw the widget in its final, answered form
//! ```
//!
//! - **input**: Single-line text with optional suggestions
//! - **password**: Masked single-line text
//! - **select**: One option from a list
//! - **multiselect**: Any number of options from a list
//! - **confirm**: Yes / no
//! - **multiline**: Free text ended by two empty lines
//! - **multi_input**: Repeated single-line entries ended by an empty one

pub mod confirm;
pub mod input;
pub mod multi_input;
pub mod multiline;
pub mod multiselect;
pub mod password;
pub mod select;

use std::fmt;

use serde::Serialize;

pub use confirm::Confirm;
pub use input::Input;
pub use multi_input::MultiInput;
pub use multiline::Multiline;
pub use multiselect::MultiSelect;
pub use password::Password;
pub use select::Select;

use crate::config::{Icon, PromptConfig};
use crate::core::term::{KeyEvent, TermIo, Terminal};
use crate::error::{PromptError, Result};
use crate::ui::{LineRenderer, StyleCache};

/// Everything the widgets read but never own: configuration and the colour
/// cache. Built once and shared by all prompts.
#[derive(Debug, Default)]
pub struct PromptContext {
    pub config: PromptConfig,
    pub styles: StyleCache,
}

impl PromptContext {
    pub fn new(config: PromptConfig, color: bool) -> Self {
        Self {
            config,
            styles: StyleCache::new(color),
        }
    }

    pub fn paint(&self, spec: &str, text: &str) -> String {
        self.styles.paint(spec, text)
    }

    pub fn icon(&self, icon: &Icon) -> String {
        self.styles.paint(&icon.format, &icon.text)
    }

    /// Help line (when shown), question icon and message.
    pub(crate) fn header(&self, message: &str, help: &str, show_help: bool) -> String {
        let mut out = String::new();
        if show_help && !help.is_empty() {
            out.push_str(&self.paint(
                &self.config.icons.help.format,
                &format!("{} {}", self.config.icons.help.text, help),
            ));
            out.push('\n');
        }
        out.push_str(&self.icon(&self.config.icons.question));
        out.push(' ');
        out.push_str(&self.paint("default+hb", message));
        out
    }

    /// Error line printed above a prompt that rejected its input.
    pub(crate) fn error_line(&self, message: &str) -> String {
        let icon = &self.config.icons.error;
        let mut line = self.paint(
            &icon.format,
            &format!("{} Sorry, your reply was invalid: {}", icon.text, message),
        );
        line.push('\n');
        line
    }
}

/// A committed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
    Bool(bool),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Answer::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Answer::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(s) => f.write_str(s),
            Answer::List(v) => f.write_str(&v.join(", ")),
            Answer::Bool(true) => f.write_str("Yes"),
            Answer::Bool(false) => f.write_str("No"),
        }
    }
}

impl TryFrom<Answer> for String {
    type Error = Answer;

    fn try_from(answer: Answer) -> std::result::Result<Self, Answer> {
        match answer {
            Answer::Text(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl TryFrom<Answer> for Vec<String> {
    type Error = Answer;

    fn try_from(answer: Answer) -> std::result::Result<Self, Answer> {
        match answer {
            Answer::List(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl TryFrom<Answer> for bool {
    type Error = Answer;

    fn try_from(answer: Answer) -> std::result::Result<Self, Answer> {
        match answer {
            Answer::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

/// One question of any kind.
pub enum Question {
    Input(Input),
    Password(Password),
    Select(Select),
    MultiSelect(MultiSelect),
    Confirm(Confirm),
    Multiline(Multiline),
    MultiInput(MultiInput),
}

impl Question {
    /// Run the interactive phase and return the committed answer.
    pub fn prompt(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<Answer> {
        match self {
            Question::Input(w) => w.prompt(term, cx).map(Answer::Text),
            Question::Password(w) => w.prompt(term, cx).map(Answer::Text),
            Question::Select(w) => w.prompt(term, cx).map(Answer::Text),
            Question::MultiSelect(w) => w.prompt(term, cx).map(Answer::List),
            Question::Confirm(w) => w.prompt(term, cx).map(Answer::Bool),
            Question::Multiline(w) => w.prompt(term, cx).map(Answer::Text),
            Question::MultiInput(w) => w.prompt(term, cx).map(Answer::Text),
        }
    }

    /// Redraw the question in its final form showing `answer`.
    pub fn cleanup(&mut self, term: &mut Terminal, cx: &PromptContext, answer: &Answer) -> Result<()> {
        match self {
            Question::Confirm(w) => {
                let value = answer.as_bool().unwrap_or(w.default);
                w.cleanup(term, cx, value)
            }
            Question::MultiSelect(w) => w.cleanup(term, cx, answer.as_list().unwrap_or(&[])),
            Question::Input(w) => w.cleanup(term, cx, &answer.to_string()),
            Question::Password(w) => w.cleanup(term, cx),
            Question::Select(w) => w.cleanup(term, cx, &answer.to_string()),
            Question::Multiline(w) => w.cleanup(term, cx, &answer.to_string()),
            Question::MultiInput(w) => w.cleanup(term, cx, &answer.to_string()),
        }
    }

    /// `prompt` followed by `cleanup`.
    pub fn ask(&mut self, term: &mut Terminal, cx: &PromptContext) -> Result<Answer> {
        let answer = self.prompt(term, cx)?;
        self.cleanup(term, cx, &answer)?;
        Ok(answer)
    }
}

macro_rules! question_from {
    ($($variant:ident),*) => {
        $(impl From<$variant> for Question {
            fn from(w: $variant) -> Self {
                Question::$variant(w)
            }
        })*
    };
}

question_from!(Input, Password, Select, MultiSelect, Confirm, Multiline, MultiInput);

/// Outcome of one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Commit,
    /// Input rejected; show the message and keep reading
    Invalid(String),
}

/// Drawing side of a widget.
pub(crate) trait Render {
    /// Template: the interactive form, or the final form with `answer`.
    fn render(&self, cx: &PromptContext, answer: Option<&str>) -> String;

    fn renderer(&mut self) -> &mut LineRenderer;

    /// Columns between the end of the drawn text and the edit point.
    fn cursor_offset(&self) -> usize {
        0
    }
}

/// State machine side of a widget that reads its own keys.
pub(crate) trait Interactive: Render {
    /// Apply one key. Ctrl+C is handled before this is called.
    fn on_key(&mut self, key: KeyEvent, cx: &PromptContext) -> Flow;
}

pub(crate) fn draw<W: Render + ?Sized>(
    widget: &mut W,
    io: &mut TermIo,
    cx: &PromptContext,
) -> Result<()> {
    let text = widget.render(cx, None);
    let width = io.width(true);
    widget.renderer().render(&mut io.out, &text, width)?;

    let back = widget.cursor_offset();
    if back > 0 {
        io.cursor().back(u16::try_from(back).unwrap_or(u16::MAX))?;
        io.flush()?;
    }
    Ok(())
}

/// Render, then feed keys to the widget until it commits.
pub(crate) fn interact<W: Interactive + ?Sized>(
    widget: &mut W,
    io: &mut TermIo,
    cx: &PromptContext,
) -> Result<()> {
    draw(widget, io, cx)?;
    loop {
        let key = io.next_key()?;
        if key == KeyEvent::Interrupt {
            return Err(PromptError::Interrupted);
        }
        match widget.on_key(key, cx) {
            Flow::Commit => return Ok(()),
            Flow::Continue => draw(widget, io, cx)?,
            Flow::Invalid(message) => {
                let text = cx.error_line(&message);
                let width = io.width(true);
                widget.renderer().render_error(&mut io.out, &text, width)?;
                draw(widget, io, cx)?;
            }
        }
    }
}

/// Raw mode, optional hidden cursor, then [`interact`].
pub(crate) fn run<W: Interactive + ?Sized>(
    widget: &mut W,
    term: &mut Terminal,
    cx: &PromptContext,
    hide_cursor: bool,
) -> Result<()> {
    term.with_raw_mode(|io| {
        if hide_cursor {
            io.cursor().hide()?;
        }
        let result = interact(widget, io, cx);
        if hide_cursor {
            let shown = io.cursor().show();
            let flushed = io.flush();
            result?;
            shown?;
            flushed?;
            return Ok(());
        }
        result
    })
}

/// Draw the final form over the interactive one.
pub(crate) fn finish<W: Render + ?Sized>(
    widget: &mut W,
    term: &mut Terminal,
    cx: &PromptContext,
    answer: &str,
) -> Result<()> {
    finish_on(widget, term.io(), cx, answer)
}

/// [`finish`] on streams already borrowed, e.g. inside a raw mode scope.
pub(crate) fn finish_on<W: Render + ?Sized>(
    widget: &mut W,
    io: &mut TermIo,
    cx: &PromptContext,
    answer: &str,
) -> Result<()> {
    let text = widget.render(cx, Some(answer));
    let width = io.width(false);
    widget.renderer().finish(&mut io.out, &text, width)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Colourless context so output can be compared as plain text.
    pub(crate) fn plain() -> PromptContext {
        PromptContext::new(PromptConfig::default(), false)
    }

    #[test]
    fn test_answer_conversions() {
        assert_eq!(String::try_from(Answer::Text("a".into())), Ok("a".to_string()));
        assert_eq!(bool::try_from(Answer::Bool(true)), Ok(true));
        assert_eq!(
            Vec::<String>::try_from(Answer::Bool(true)),
            Err(Answer::Bool(true))
        );
        assert_eq!(Answer::List(vec!["a".into(), "b".into()]).to_string(), "a, b");
        assert_eq!(Answer::Bool(false).to_string(), "No");
    }

    #[test]
    fn test_header_and_error_line() {
        let cx = plain();
        assert_eq!(cx.header("Name?", "", false), "? Name?");
        assert_eq!(cx.header("Name?", "your name", true), "? your name\n? Name?");
        assert_eq!(
            cx.error_line("bad"),
            "X Sorry, your reply was invalid: bad\n"
        );
    }

    #[test]
    fn test_no_output_without_raw_mode() {
        use std::io;

        use crate::core::term::{ModeController, TermModeState};
        use crate::testing::SharedBuffer;

        struct NotATty;

        impl ModeController for NotATty {
            fn acquire(&mut self) -> io::Result<TermModeState> {
                Err(io::Error::new(io::ErrorKind::Other, "not a terminal"))
            }

            fn restore(&mut self, _state: TermModeState) -> io::Result<()> {
                Ok(())
            }
        }

        let out = SharedBuffer::default();
        let mut term = Terminal::new(
            Box::new(&b"\r"[..]),
            Box::new(out.clone()),
            Box::new(NotATty),
        );
        let mut question = Question::from(Select::new("Pick", vec!["a".into()]));
        let err = question.prompt(&mut term, &plain()).unwrap_err();
        assert!(matches!(err, PromptError::RawModeUnavailable(_)));
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_question_dispatch() {
        let (mut term, _) = crate::testing::scripted(b"y\r");
        let mut question = Question::from(Confirm::new("Sure?"));
        assert_eq!(question.ask(&mut term, &plain()).unwrap(), Answer::Bool(true));
    }
}
