//! Decoration style types
//!
//! This module provides the visual attributes a rule applies to its matches
//! and the range type handed to the host when decorating a buffer.

/// Terminal colors a rule may name (ANSI palette as exposed by editor themes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    BrightBlack,
    Magenta,
    Red,
    BrightRed,
    Blue,
    BrightGreen,
    Cyan,
    BrightMagenta,
    BrightBlue,
    BrightCyan,
    Green,
    Yellow,
    BrightYellow,
}

impl Color {
    /// Every color, in configuration order
    pub const ALL: [Color; 14] = [
        Color::Black,
        Color::BrightBlack,
        Color::Magenta,
        Color::Red,
        Color::BrightRed,
        Color::Blue,
        Color::BrightGreen,
        Color::Cyan,
        Color::BrightMagenta,
        Color::BrightBlue,
        Color::BrightCyan,
        Color::Green,
        Color::Yellow,
        Color::BrightYellow,
    ];

    /// Get the configuration name for this color
    pub fn name(&self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::BrightBlack => "BrightBlack",
            Color::Magenta => "Magenta",
            Color::Red => "Red",
            Color::BrightRed => "BrightRed",
            Color::Blue => "Blue",
            Color::BrightGreen => "BrightGreen",
            Color::Cyan => "Cyan",
            Color::BrightMagenta => "BrightMagenta",
            Color::BrightBlue => "BrightBlue",
            Color::BrightCyan => "BrightCyan",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
            Color::BrightYellow => "BrightYellow",
        }
    }

    /// Parse a color from its configuration name
    ///
    /// Names outside the palette yield `None`, which means "no color".
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Line decoration; `None` explicitly removes underline and strike-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextDecoration {
    None,
    Underline,
    LineThrough,
    UnderlineLineThrough,
}

impl TextDecoration {
    pub fn has_underline(&self) -> bool {
        matches!(self, TextDecoration::Underline | TextDecoration::UnderlineLineThrough)
    }

    pub fn has_line_through(&self) -> bool {
        matches!(self, TextDecoration::LineThrough | TextDecoration::UnderlineLineThrough)
    }
}

/// Visual style of one rule
///
/// Every attribute is optional: `None` leaves whatever the host or an
/// earlier decoration shows untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecorationStyle {
    /// Foreground color
    pub color: Option<Color>,
    /// Bold or explicitly normal weight
    pub font_weight: Option<FontWeight>,
    /// Italic or explicitly upright
    pub font_style: Option<FontStyle>,
    /// Underline / strike-through
    pub text_decoration: Option<TextDecoration>,
}

impl DecorationStyle {
    /// Create a style with just a foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    /// Layer `other` on top of this style; set attributes of `other` win
    pub fn merge(&self, other: &DecorationStyle) -> DecorationStyle {
        DecorationStyle {
            color: other.color.or(self.color),
            font_weight: other.font_weight.or(self.font_weight),
            font_style: other.font_style.or(self.font_style),
            text_decoration: other.text_decoration.or(self.text_decoration),
        }
    }

    /// Check if this style changes nothing
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A decorated column range on one line
///
/// Columns count `char`s from the start of the line. `end_col` is
/// inclusive: a match of length `n` at column `c` covers `c..=c + n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationRange {
    /// Zero-based line index
    pub line: usize,
    /// First decorated column
    pub start_col: usize,
    /// Last decorated column (inclusive)
    pub end_col: usize,
}

impl DecorationRange {
    /// Create a new range
    pub fn new(line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            line,
            start_col,
            end_col,
        }
    }

    /// Check if this range covers a column of its line
    pub fn contains(&self, col: usize) -> bool {
        col >= self.start_col && col <= self.end_col
    }

    /// Number of columns covered
    pub fn len(&self) -> usize {
        self.end_col + 1 - self.start_col
    }
}
