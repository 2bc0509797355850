//! Layout grammar.
//!
//! A layout is a character grid: `0`-`3` mark a spot and the direction it
//! faces, any other character is a blank filler cell, and line breaks end a
//! row. `/* ... */` blocks may appear anywhere and are removed first.
//!
//! ```text
//! /* front row */
//! 0 1
//! 2 3
//! ```

use std::fmt;

use crate::constants::{COMMENT_END, COMMENT_START};
use crate::error::LayoutError;

/// Direction a spot faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Up,
    Right,
    Down,
    Left,
}

impl Orientation {
    /// Map a layout digit to its orientation: `0=up, 1=right, 2=down, 3=left`.
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Orientation::Up),
            1 => Some(Orientation::Right),
            2 => Some(Orientation::Down),
            3 => Some(Orientation::Left),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Up => "up",
            Orientation::Right => "right",
            Orientation::Down => "down",
            Orientation::Left => "left",
        }
    }

    /// Single-glyph marker drawn next to the label.
    pub fn arrow(&self) -> char {
        match self {
            Orientation::Up => '▲',
            Orientation::Right => '▶',
            Orientation::Down => '▼',
            Orientation::Left => '◀',
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of the parsed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDescriptor {
    /// Addressable cell carrying a name label.
    Spot(Orientation),
    /// Filler that keeps the grid aligned.
    Blank,
}

impl CellDescriptor {
    fn from_char(c: char) -> Self {
        c.to_digit(10)
            .and_then(Orientation::from_digit)
            .map(CellDescriptor::Spot)
            .unwrap_or(CellDescriptor::Blank)
    }

    pub fn is_spot(&self) -> bool {
        matches!(self, CellDescriptor::Spot(_))
    }
}

/// A parsed layout: the visual column count plus every cell in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    columns: usize,
    cells: Vec<CellDescriptor>,
}

impl Layout {
    /// Tracks per visual row. Taken from the first line only; later rows
    /// may be shorter or longer.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cells(&self) -> &[CellDescriptor] {
        &self.cells
    }

    pub fn spot_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_spot()).count()
    }

    pub fn blank_count(&self) -> usize {
        self.cells.len() - self.spot_count()
    }

    /// Orientations of every spot, in addressing order.
    pub fn orientations(&self) -> Vec<Orientation> {
        self.cells
            .iter()
            .filter_map(|c| match c {
                CellDescriptor::Spot(o) => Some(*o),
                CellDescriptor::Blank => None,
            })
            .collect()
    }
}

/// Remove every `/* ... */` block, matching each start marker with the
/// nearest end marker. An unterminated start marker is left in place.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(COMMENT_START) {
        let body = &rest[start + COMMENT_START.len()..];
        let Some(end) = body.find(COMMENT_END) else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &body[end + COMMENT_END.len()..];
    }
    out.push_str(rest);
    out
}

/// Parse a layout source into its column count and cell sequence.
///
/// Only trailing line breaks are trimmed: trailing spaces are blank cells.
/// A `\r` directly before `\n` belongs to the line break.
pub fn parse_layout(text: &str) -> Result<Layout, LayoutError> {
    if text.trim().is_empty() {
        return Err(LayoutError::Unavailable("layout source is empty".into()));
    }
    let trimmed = text.trim_end_matches(['\n', '\r']);

    let stripped = strip_comments(trimmed);
    let first_line = stripped.split('\n').next().unwrap_or_default();
    let columns = first_line.trim_end_matches('\r').chars().count();

    let mut cells = Vec::with_capacity(stripped.len());
    let mut chars = stripped.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {}
            '\r' if chars.peek() == Some(&'\n') => {}
            other => cells.push(CellDescriptor::from_char(other)),
        }
    }

    if cells.is_empty() {
        return Err(LayoutError::Unavailable(
            "layout has no cells once comments are removed".into(),
        ));
    }

    Ok(Layout { columns, cells })
}
