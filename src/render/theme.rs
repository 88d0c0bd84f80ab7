//! Terminal color theme.

use colored::{Color, ColoredString, Colorize};

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub banner: Color,
    pub category_header: Color,
    pub value_header: Color,
    pub highlight: Color,
    pub title: Color,
    pub farewell: Color,
    pub error: Color,
    pub cursor: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            banner: Color::TrueColor {
                r: 255,
                g: 165,
                b: 0,
            },
            category_header: Color::Cyan,
            value_header: Color::Green,
            highlight: Color::Green,
            title: Color::Yellow,
            farewell: Color::Yellow,
            error: Color::Red,
            cursor: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// How a table cell or line is painted once its layout is fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Plain,
    CategoryHeader,
    ValueHeader,
    Highlight,
    Title,
    Banner,
    Farewell,
    Error,
    Cursor,
    Muted,
}

impl Theme {
    pub fn paint(&self, tone: Tone, text: &str) -> ColoredString {
        match tone {
            Tone::Plain => text.normal(),
            Tone::CategoryHeader => text.color(self.category_header).bold(),
            Tone::ValueHeader => text.color(self.value_header).bold(),
            Tone::Highlight => text.color(self.highlight).bold(),
            Tone::Title => text.color(self.title).bold(),
            Tone::Banner => text.color(self.banner).bold(),
            Tone::Farewell => text.color(self.farewell),
            Tone::Error => text.color(self.error),
            Tone::Cursor => text.color(self.cursor).bold(),
            Tone::Muted => text.color(self.muted),
        }
    }
}
