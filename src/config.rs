//! Prompt configuration.
//!
//! Plain values handed to every widget. The struct is `serde` friendly so an
//! application can embed it in its own settings, and can be read from a TOML
//! document the caller already has in memory:
//!
//! ```toml
//! page_size = 10
//! help_input = "?"
//! vim_mode = true
//!
//! [icons.select_focus]
//! text = "❯"
//! format = "cyan+b"
//! ```
//!
//! Filters are code, not data, and are never (de)serialised.

use serde::{Deserialize, Serialize};

use crate::ui::Filter;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 7;

/// Settings shared by all widgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Options shown at once in list widgets
    pub page_size: usize,
    /// Key that reveals the help text
    pub help_input: char,
    /// `j`/`k` navigation in list widgets
    pub vim_mode: bool,
    /// Moving past either end of a list jumps to the other end
    pub wrap_around: bool,
    /// MultiSelect keeps the filter after toggling an option
    pub keep_filter: bool,
    /// Leave the cursor visible while a list widget is active
    pub show_cursor: bool,
    pub icons: IconSet,
    /// Replaces the default case-insensitive substring filter
    #[serde(skip)]
    pub filter: Option<Filter>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            help_input: '?',
            vim_mode: false,
            wrap_around: false,
            keep_filter: false,
            show_cursor: false,
            icons: IconSet::default(),
            filter: None,
        }
    }
}

impl PromptConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Page size with the default applied for zero.
    pub fn effective_page_size(&self, widget: Option<usize>) -> usize {
        match widget.unwrap_or(self.page_size) {
            0 => DEFAULT_PAGE_SIZE,
            n => n,
        }
    }
}

/// A glyph and the colour spec it is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub text: String,
    pub format: String,
}

impl Icon {
    pub fn new(text: &str, format: &str) -> Self {
        Self {
            text: text.to_string(),
            format: format.to_string(),
        }
    }
}

/// Icons used by the templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconSet {
    pub help: Icon,
    pub question: Icon,
    pub error: Icon,
    pub select_focus: Icon,
    pub marked_option: Icon,
    pub unmarked_option: Icon,
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            help: Icon::new("?", "cyan"),
            question: Icon::new("?", "green+hb"),
            error: Icon::new("X", "red"),
            select_focus: Icon::new(">", "cyan+b"),
            marked_option: Icon::new("[x]", "green"),
            unmarked_option: Icon::new("[ ]", "default+hb"),
        }
    }
}
