//! Terminal rendering of decorated buffers
//!
//! Each visible buffer is printed under a `==> path <==` header. Character
//! styles are built by layering every decoration in creation order, so a
//! later rule paints over an earlier one where both set an attribute.

use std::io::Write;

use crossterm::{
    cursor, queue,
    style::{self, Attribute, Print, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType},
};
use unicode_width::UnicodeWidthChar;

use crate::error::Result;
use crate::highlight::{Color, DecorationStyle, FontStyle, FontWeight};
use crate::host::{BufferId, Host};
use crate::workspace::Workspace;

/// A run of characters sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub style: DecorationStyle,
    pub text: String,
}

/// Split one line into styled spans
pub fn styled_spans(workspace: &Workspace, id: BufferId, line: usize) -> Vec<Span> {
    let Some(text) = workspace.line_text(id, line) else {
        return Vec::new();
    };
    let chars: Vec<char> = text.chars().collect();
    let mut styles = vec![DecorationStyle::default(); chars.len()];

    for (style, ranges) in workspace.decorations_on(id) {
        for range in ranges.iter().filter(|r| r.line == line) {
            let end = range.end_col.min(chars.len().saturating_sub(1));
            for col in range.start_col..=end {
                if let Some(slot) = styles.get_mut(col) {
                    *slot = slot.merge(&style);
                }
            }
        }
    }

    let mut spans: Vec<Span> = Vec::new();
    for (ch, style) in chars.into_iter().zip(styles) {
        match spans.last_mut() {
            Some(span) if span.style == style => span.text.push(ch),
            _ => spans.push(Span {
                style,
                text: ch.to_string(),
            }),
        }
    }
    spans
}

/// Terminal color for a decoration color
pub fn terminal_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::BrightBlack => style::Color::DarkGrey,
        Color::Red => style::Color::DarkRed,
        Color::BrightRed => style::Color::Red,
        Color::Green => style::Color::DarkGreen,
        Color::BrightGreen => style::Color::Green,
        Color::Yellow => style::Color::DarkYellow,
        Color::BrightYellow => style::Color::Yellow,
        Color::Blue => style::Color::DarkBlue,
        Color::BrightBlue => style::Color::Blue,
        Color::Magenta => style::Color::DarkMagenta,
        Color::BrightMagenta => style::Color::Magenta,
        Color::Cyan => style::Color::DarkCyan,
        Color::BrightCyan => style::Color::Cyan,
    }
}

fn set_style<W: Write>(out: &mut W, style: &DecorationStyle) -> Result<()> {
    if let Some(color) = style.color {
        queue!(out, SetForegroundColor(terminal_color(color)))?;
    }
    if style.font_weight == Some(FontWeight::Bold) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.font_style == Some(FontStyle::Italic) {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if let Some(decoration) = style.text_decoration {
        if decoration.has_underline() {
            queue!(out, SetAttribute(Attribute::Underlined))?;
        }
        if decoration.has_line_through() {
            queue!(out, SetAttribute(Attribute::CrossedOut))?;
        }
    }
    Ok(())
}

/// Write one buffer, truncating lines to `width` display columns
pub fn render_buffer<W: Write>(
    out: &mut W,
    workspace: &Workspace,
    id: BufferId,
    width: Option<usize>,
) -> Result<()> {
    let path = workspace.buffer_path(id).unwrap_or("[no name]");
    queue!(out, SetAttribute(Attribute::Reverse), Print(format!("==> {} <==", path)))?;
    queue!(out, SetAttribute(Attribute::Reset), Print("\n"))?;

    for line in 0..workspace.line_count(id) {
        let mut used = 0;
        'spans: for span in styled_spans(workspace, id, line) {
            let mut text = String::new();
            let mut truncated = false;
            for ch in span.text.chars() {
                let ch_width = ch.width().unwrap_or(1);
                if width.is_some_and(|w| used + ch_width > w) {
                    truncated = true;
                    break;
                }
                used += ch_width;
                text.push(ch);
            }

            if span.style.is_default() {
                queue!(out, Print(text))?;
            } else {
                set_style(out, &span.style)?;
                queue!(out, Print(text), SetAttribute(Attribute::Reset))?;
            }
            if truncated {
                break 'spans;
            }
        }
        queue!(out, Print("\n"))?;
    }
    Ok(())
}

/// Write every visible buffer
///
/// `clear` wipes the screen first, for redrawing in follow mode.
pub fn render_workspace<W: Write>(
    out: &mut W,
    workspace: &Workspace,
    width: Option<usize>,
    clear: bool,
) -> Result<()> {
    if clear {
        queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    }

    for (i, id) in workspace.visible_buffers().into_iter().enumerate() {
        if i > 0 {
            queue!(out, Print("\n"))?;
        }
        render_buffer(out, workspace, id, width)?;
    }
    out.flush()?;
    Ok(())
}

/// Current terminal width, if stdout is a terminal
pub fn terminal_width() -> Option<usize> {
    terminal::size().ok().map(|(cols, _)| cols as usize)
}
