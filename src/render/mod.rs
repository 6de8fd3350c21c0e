//! Response body renderers.
//!
//! Renderers are pure functions from a parsed tree to a string. Styling is
//! injected through a [`Styler`], so the same renderer produces ANSI-coloured
//! output for the terminal or plain text for tests and pipes.

pub mod html;
pub mod json;
pub mod text;

use crossterm::style::{style, Color, Stylize};

/// Style category of a leaf token. Punctuation never gets a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Key,
    String,
    Number,
    Boolean,
    Null,
}

/// Applies a style to a leaf token.
pub trait Styler {
    fn paint(&self, category: Category, token: &str) -> String;
}

/// No-op styling: tokens pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Styler for Plain {
    fn paint(&self, _category: Category, token: &str) -> String {
        token.to_string()
    }
}

/// Foreground colour per category, emitted as ANSI escape sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub key: Color,
    pub string: Color,
    pub number: Color,
    pub boolean: Color,
    pub null: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            key: Color::Cyan,
            string: Color::Green,
            number: Color::Yellow,
            boolean: Color::Magenta,
            null: Color::DarkGrey,
        }
    }
}

impl Theme {
    pub fn color(&self, category: Category) -> Color {
        match category {
            Category::Key => self.key,
            Category::String => self.string,
            Category::Number => self.number,
            Category::Boolean => self.boolean,
            Category::Null => self.null,
        }
    }
}

impl Styler for Theme {
    fn paint(&self, category: Category, token: &str) -> String {
        style(token).with(self.color(category)).to_string()
    }
}

/// Parse a colour name (`cyan`, `dark_grey`, ...) or a 0-255 palette index.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Ok(index) = value.parse::<u8>() {
        return Some(Color::AnsiValue(index));
    }
    Color::try_from(value).ok()
}
