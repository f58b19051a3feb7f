//! Pager interaction modes.

use crate::search::SearchDirection;

/// The interaction mode the pager is in. Mode decides how keys are
/// interpreted and what the status line shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerMode {
    /// Normal navigation.
    Viewing,
    /// A search prompt is open and the pattern is being edited.
    Searching { direction: SearchDirection },
    /// The last search exhausted the document without a hit; the next repeat
    /// wraps around.
    NotFound,
    /// A line-number prompt is open.
    GotoLine { buffer: String },
}

impl PagerMode {
    pub fn name(&self) -> &'static str {
        match self {
            PagerMode::Viewing => "viewing",
            PagerMode::Searching { .. } => "searching",
            PagerMode::NotFound => "not-found",
            PagerMode::GotoLine { .. } => "goto-line",
        }
    }

    pub fn is_searching(&self) -> bool {
        matches!(self, PagerMode::Searching { .. })
    }
}
