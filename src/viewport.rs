//! Viewport geometry and the soft line-wrap model.
//!
//! Wrapping a logical line into display rows is deterministic given the
//! viewport width and the wrap flag, and is recomputed on demand whenever
//! either changes. The same algorithm backs rendering and search scanning, so
//! a hit's (line, sub-row, column) identity always agrees with what is on
//! screen.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::store::LineIndex;

/// Where a jump target lands inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Target occupies the first visible row.
    Top,
    /// Target occupies the last visible row; used to bias the viewport after
    /// a backward search wraps past the top of the document.
    End,
}

/// The scroll anchor: which logical line (and which of its wrapped rows)
/// pins the viewport, and toward which edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    pub anchor: LineIndex,
    /// Sub-row within the anchor line's wrapped rows. Clamped to the line's
    /// actual row count at resolution time, so `usize::MAX` means "last row".
    pub sub_row: usize,
    pub bias: Placement,
}

impl ScrollPosition {
    /// Anchored at the very first row of the document.
    pub fn top() -> Self {
        Self {
            anchor: LineIndex::new(0),
            sub_row: 0,
            bias: Placement::Top,
        }
    }

    pub fn from_index(anchor: LineIndex, bias: Placement) -> Self {
        let sub_row = match bias {
            Placement::Top => 0,
            Placement::End => usize::MAX,
        };
        Self {
            anchor,
            sub_row,
            bias,
        }
    }
}

/// A concrete display row: a logical line plus one of its wrapped sub-rows.
/// Ordering is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowPos {
    pub line: usize,
    pub sub_row: usize,
}

impl RowPos {
    pub fn new(line: usize, sub_row: usize) -> Self {
        Self { line, sub_row }
    }
}

/// Visible window geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Content width in display columns.
    pub width: usize,
    /// Content height in display rows (status line excluded).
    pub height: usize,
    /// Soft-wrap long lines instead of truncating them.
    pub wrap: bool,
}

impl Viewport {
    pub fn new(width: usize, height: usize, wrap: bool) -> Self {
        Self {
            width,
            height,
            wrap,
        }
    }

    /// Wrap one logical line into its display rows. With wrapping disabled
    /// every line is a single row (the renderer truncates).
    pub fn wrap_line(&self, text: &str) -> Vec<String> {
        if !self.wrap {
            return vec![text.to_string()];
        }
        wrap_text(text, self.width)
    }

    /// Number of display rows `text` occupies.
    pub fn row_count(&self, text: &str) -> usize {
        self.wrap_line(text).len()
    }
}

/// Word-aware greedy wrap at `width` display columns.
///
/// Breaks at the last space that fits, consuming the break space; a word
/// wider than the viewport is hard-split at the column limit. Zero-width
/// input yields a single empty row, so every line occupies at least one row.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut rest = text;

    loop {
        if rest.width() <= width {
            rows.push(rest.to_string());
            return rows;
        }

        // Find where the row overflows and the last breakable space before it.
        let mut columns = 0;
        let mut overflow_at = rest.len();
        let mut last_space = None;
        for (byte_idx, ch) in rest.char_indices() {
            let ch_width = ch.width().unwrap_or(0);
            if columns + ch_width > width {
                overflow_at = byte_idx;
                break;
            }
            if ch == ' ' {
                last_space = Some(byte_idx);
            }
            columns += ch_width;
        }

        match last_space {
            // The row would consist of the break space alone: drop it and
            // retry, so continuation rows do not start with stray spaces.
            Some(0) => {
                rest = &rest[1..];
            }
            Some(space) => {
                rows.push(rest[..space].to_string());
                rest = &rest[space + 1..];
            }
            None => {
                // No usable break point: hard-split, always making progress.
                let cut = if overflow_at == 0 {
                    rest.chars().next().map(char::len_utf8).unwrap_or(1)
                } else {
                    overflow_at
                };
                rows.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
        }
    }
}
