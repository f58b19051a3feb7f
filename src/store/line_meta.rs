//! Line identity newtypes.
//!
//! `LineIndex` is the zero-based ordinal the store assigns at append time:
//! gapless, strictly increasing, never reused. `LineNumber` is the 1-based
//! value shown to the user, derived deterministically from the index. Keeping
//! them as distinct types prevents the classic off-by-one between storage and
//! presentation.

use std::fmt;

/// Zero-based position of a line in the store, assigned in arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineIndex(usize);

impl LineIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The 1-based presentation value for this index.
    pub fn number(self) -> LineNumber {
        LineNumber(self.0 + 1)
    }
}

impl fmt::Display for LineIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based line number as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineNumber(usize);

impl LineNumber {
    pub fn get(self) -> usize {
        self.0
    }

    /// The zero-based index this number was derived from.
    pub fn index(self) -> LineIndex {
        LineIndex(self.0 - 1)
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
