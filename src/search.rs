//! Pattern compilation and directional hit scanning.

pub mod pattern;
pub mod scan;

pub use pattern::{SearchOptions, SearchPattern};
pub use scan::{find_next, find_prev, HitPosition, ScanJob};

/// Which way a search walks the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    /// The prompt character, matching the keys that start each search.
    pub fn to_char(self) -> char {
        match self {
            SearchDirection::Forward => '/',
            SearchDirection::Backward => '?',
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}
