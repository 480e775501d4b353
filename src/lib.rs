//! termprompt - interactive terminal prompts
//!
//! Text input, passwords, single and multiple choice lists, confirmations and
//! multi-line text, drawn in place on a raw-mode terminal.
//!
//! ```no_run
//! use termprompt::{PromptContext, Select, Terminal};
//!
//! let mut term = Terminal::stdio();
//! let cx = PromptContext::default();
//! let mut select = Select::new("Pick a color", vec!["red".into(), "blue".into()]);
//! let color = select.prompt(&mut term, &cx)?;
//! select.cleanup(&mut term, &cx, &color)?;
//! # Ok::<(), termprompt::PromptError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod ui;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use crate::config::{Icon, IconSet, PromptConfig};
pub use crate::core::term::{Terminal, WidthSource};
pub use crate::error::{PromptError, Result};
pub use crate::ui::Filter;
pub use crate::widgets::{
    Answer, Confirm, Input, MultiInput, MultiSelect, Multiline, Password, PromptContext, Question,
    Select,
};
