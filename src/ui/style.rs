//! Colour specs for the prompt templates
//!
//! A spec reads `fg[+attrs][:bg[+h]]`, for example `cyan`, `green+hb` or
//! `black:white`. Colours: black, red, green, yellow, blue, magenta, cyan,
//! white, default, or a 0-255 palette index. Attributes: `b` bold, `B` blink,
//! `d` dim, `i` inverse, `u` underline, `s` strikethrough, `h` high
//! intensity.
//!
//! Resolved escape codes are cached for the life of the [`StyleCache`]. Many
//! renders may read the cache at once; filling it is serialised.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crossterm::style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};

const RESET: &str = "\x1b[0m";

/// Resolves colour specs to escape sequences.
#[derive(Debug)]
pub struct StyleCache {
    enabled: bool,
    codes: RwLock<HashMap<String, Arc<str>>>,
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StyleCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            codes: RwLock::new(HashMap::new()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Escape sequence for `spec`; empty when colour is off.
    pub fn code(&self, spec: &str) -> Arc<str> {
        if !self.enabled {
            return Arc::from("");
        }
        {
            let codes = self.codes.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(code) = codes.get(spec) {
                return code.clone();
            }
        }
        let mut codes = self.codes.write().unwrap_or_else(PoisonError::into_inner);
        codes
            .entry(spec.to_string())
            .or_insert_with(|| Arc::from(compile(spec)))
            .clone()
    }

    /// `text` wrapped in `spec` and a reset.
    pub fn paint(&self, spec: &str, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!("{}{}{}", self.code(spec), text, RESET)
    }

    /// Number of specs resolved so far.
    pub fn cached(&self) -> usize {
        self.codes.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn compile(spec: &str) -> String {
    if spec == "reset" {
        return RESET.to_string();
    }

    let (fg_part, bg_part) = match spec.split_once(':') {
        Some((fg, bg)) => (fg, Some(bg)),
        None => (spec, None),
    };
    let (fg_name, attrs) = fg_part.split_once('+').unwrap_or((fg_part, ""));
    let bright = attrs.contains('h');

    let mut out = String::new();
    if let Some(color) = color_by_name(fg_name, bright) {
        out.push_str(&SetForegroundColor(color).to_string());
    }
    for flag in attrs.chars() {
        let attribute = match flag {
            'b' => Attribute::Bold,
            'B' => Attribute::SlowBlink,
            'd' => Attribute::Dim,
            'i' => Attribute::Reverse,
            'u' => Attribute::Underlined,
            's' => Attribute::CrossedOut,
            _ => continue,
        };
        out.push_str(&SetAttribute(attribute).to_string());
    }
    if let Some(bg) = bg_part {
        let (bg_name, bg_attrs) = bg.split_once('+').unwrap_or((bg, ""));
        if let Some(color) = color_by_name(bg_name, bg_attrs.contains('h')) {
            out.push_str(&SetBackgroundColor(color).to_string());
        }
    }
    out
}

fn color_by_name(name: &str, bright: bool) -> Option<Color> {
    let color = match (name, bright) {
        ("black", false) => Color::Black,
        ("black", true) => Color::DarkGrey,
        ("red", false) => Color::DarkRed,
        ("red", true) => Color::Red,
        ("green", false) => Color::DarkGreen,
        ("green", true) => Color::Green,
        ("yellow", false) => Color::DarkYellow,
        ("yellow", true) => Color::Yellow,
        ("blue", false) => Color::DarkBlue,
        ("blue", true) => Color::Blue,
        ("magenta", false) => Color::DarkMagenta,
        ("magenta", true) => Color::Magenta,
        ("cyan", false) => Color::DarkCyan,
        ("cyan", true) => Color::Cyan,
        ("white", false) => Color::Grey,
        ("white", true) => Color::White,
        ("default", _) => Color::Reset,
        (other, _) => Color::AnsiValue(other.parse().ok()?),
    };
    Some(color)
}
