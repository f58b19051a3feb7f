//! Append-only concurrent line store.
//!
//! One ingestion context appends; arbitrarily many reader contexts (rendering,
//! search scans, length queries) read concurrently. All index-space contention
//! is mediated by the striped [`RangeLock`]: an append holds an exclusive lock
//! on the single new index, reads hold shared locks on their ranges.
//!
//! Storage is a list of fixed-size sections that never move once allocated,
//! so an append can never invalidate a concurrent read of a committed index.
//! The published length is an atomic written with Release ordering *after* the
//! line cell is populated; readers validate ranges against an Acquire load, so
//! once `append(i)` returns, every subsequent `get` observes line `i`.

use crate::error::{PagerError, Result};
use crate::store::line_meta::{LineIndex, LineNumber};
use crate::store::range_lock::{RangeLock, SECTION_SIZE};
use parking_lot::RwLock;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use unicode_width::UnicodeWidthStr;

/// One immutable line of input. Cheap to clone; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: Arc<str>,
}

impl Line {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// The raw text as it arrived, without any trailing newline.
    pub fn raw(&self) -> &str {
        &self.text
    }

    /// Display width in terminal columns.
    pub fn display_width(&self) -> usize {
        self.text.width()
    }
}

/// A line paired with its position, as handed to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub index: LineIndex,
    pub line: Line,
}

impl NumberedLine {
    /// 1-based presentation number.
    pub fn number(&self) -> LineNumber {
        self.index.number()
    }
}

/// Fixed-size block of line cells. Sections are allocated once and never
/// moved or shrunk, which is what makes lock striping sound: a growing store
/// never relocates lines a concurrent reader is looking at.
struct Section {
    cells: Box<[OnceLock<Line>]>,
}

impl Section {
    fn new() -> Self {
        let cells = (0..SECTION_SIZE).map(|_| OnceLock::new()).collect();
        Self { cells }
    }
}

/// Append-only, growing, concurrently readable sequence of lines.
pub struct LineStore {
    lock: RangeLock,
    sections: RwLock<Vec<Arc<Section>>>,
    len: AtomicUsize,
    complete: AtomicBool,
    growth: watch::Sender<usize>,
}

impl LineStore {
    pub fn new() -> Self {
        Self::with_lock(RangeLock::new())
    }

    /// Build a store over an explicit lock configuration (small stripe counts
    /// make wraparound reachable in tests).
    pub fn with_lock(lock: RangeLock) -> Self {
        let (growth, _) = watch::channel(0);
        Self {
            lock,
            sections: RwLock::new(Vec::new()),
            len: AtomicUsize::new(0),
            complete: AtomicBool::new(false),
            growth,
        }
    }

    /// Build a complete store from text, one line per `\n`. For tests and
    /// in-memory input.
    pub fn from_text(text: &str) -> Self {
        let store = Self::new();
        for line in text.lines() {
            store.append(line);
        }
        store.mark_complete();
        store
    }

    /// Append one line, assigning it the next index.
    ///
    /// Intended for a single ingestion context; holds an exclusive lock on the
    /// new index only, so readers of other stripes proceed untouched.
    pub fn append(&self, text: impl Into<Arc<str>>) -> LineIndex {
        let index = self.len.load(Ordering::Relaxed);
        let _guard = self.lock.acquire_exclusive(index..=index);

        let section = self.section_for(index);
        let cell = &section.cells[index % SECTION_SIZE];
        if cell.set(Line::new(text)).is_err() {
            panic!("line index {index} appended twice");
        }

        // Publish only after the cell holds the line.
        self.len.store(index + 1, Ordering::Release);
        self.growth.send_replace(index + 1);
        LineIndex::new(index)
    }

    fn section_for(&self, index: usize) -> Arc<Section> {
        let section_no = index / SECTION_SIZE;
        if let Some(section) = self.sections.read().get(section_no) {
            return Arc::clone(section);
        }
        let mut sections = self.sections.write();
        while sections.len() <= section_no {
            sections.push(Arc::new(Section::new()));
        }
        Arc::clone(&sections[section_no])
    }

    /// Read-only view of `range`.
    ///
    /// Fails with [`PagerError::OutOfRange`] if any requested index is at or
    /// beyond the current length; under a growing stream that means "not yet
    /// available". There is no transactional guarantee between a previous
    /// [`LineStore::len`] call and this one, so callers re-validate.
    pub fn get(&self, range: Range<usize>) -> Result<Vec<NumberedLine>> {
        if range.start >= range.end {
            return Ok(Vec::new());
        }
        let length = self.len.load(Ordering::Acquire);
        if range.end > length {
            return Err(PagerError::OutOfRange {
                requested: range.end - 1,
                length,
            });
        }

        let _guard = self.lock.acquire_shared(range.start..=range.end - 1);

        let first_section = range.start / SECTION_SIZE;
        let last_section = (range.end - 1) / SECTION_SIZE;
        let sections: Vec<Arc<Section>> = {
            let all = self.sections.read();
            all[first_section..=last_section].to_vec()
        };

        let mut lines = Vec::with_capacity(range.len());
        for index in range {
            let section = &sections[index / SECTION_SIZE - first_section];
            let line = section.cells[index % SECTION_SIZE]
                .get()
                .expect("committed line missing from its section")
                .clone();
            lines.push(NumberedLine {
                index: LineIndex::new(index),
                line,
            });
        }
        Ok(lines)
    }

    /// Read a single line.
    pub fn get_line(&self, index: LineIndex) -> Result<NumberedLine> {
        let mut lines = self.get(index.get()..index.get() + 1)?;
        Ok(lines.pop().expect("non-empty range returned no lines"))
    }

    /// Point-in-time line count. Monotonically non-decreasing.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the last committed line, if any.
    pub fn last_index(&self) -> Option<LineIndex> {
        let length = self.len();
        (length > 0).then(|| LineIndex::new(length - 1))
    }

    /// Growth-notification hook: receivers observe the latest published
    /// length whenever it changes, and once more when the stream completes.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.growth.subscribe()
    }

    /// Signal end-of-stream from the ingestion context.
    pub fn mark_complete(&self) {
        self.complete.store(true, Ordering::Release);
        // Wake watchers so status displays stop showing a streaming state.
        self.growth.send_replace(self.len());
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::range_lock::RangeLock;

    #[test]
    fn append_then_get_round_trips() {
        let store = LineStore::new();
        let first = store.append("alpha");
        let second = store.append("beta");

        assert_eq!(first, LineIndex::new(0));
        assert_eq!(second, LineIndex::new(1));

        let lines = store.get(0..2).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line.raw(), "alpha");
        assert_eq!(lines[0].index, LineIndex::new(0));
        assert_eq!(lines[0].number().get(), 1);
        assert_eq!(lines[1].line.raw(), "beta");
    }

    #[test]
    fn get_beyond_length_is_out_of_range() {
        let store = LineStore::new();
        store.append("only");

        match store.get(0..2) {
            Err(PagerError::OutOfRange { requested, length }) => {
                assert_eq!(requested, 1);
                assert_eq!(length, 1);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }

        // The same range succeeds once the line has arrived.
        store.append("later");
        assert_eq!(store.get(0..2).unwrap().len(), 2);
    }

    #[test]
    fn empty_range_is_empty_view() {
        let store = LineStore::new();
        assert!(store.get(0..0).unwrap().is_empty());
        assert!(store.get(5..5).unwrap().is_empty());
    }

    #[test]
    fn indexes_are_gapless_across_sections() {
        let store = LineStore::with_lock(RangeLock::with_stripes(2));
        let total = SECTION_SIZE * 2 + 10;
        for i in 0..total {
            let assigned = store.append(format!("line {i}"));
            assert_eq!(assigned.get(), i);
        }
        assert_eq!(store.len(), total);

        // Read across the section boundary.
        let lines = store.get(SECTION_SIZE - 2..SECTION_SIZE + 2).unwrap();
        let expected: Vec<String> = (SECTION_SIZE - 2..SECTION_SIZE + 2)
            .map(|i| format!("line {i}"))
            .collect();
        let got: Vec<&str> = lines.iter().map(|l| l.line.raw()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn from_text_splits_lines() {
        let store = LineStore::from_text("a\nb\nc\n");
        assert_eq!(store.len(), 3);
        assert!(store.is_complete());
        assert_eq!(store.get_line(LineIndex::new(2)).unwrap().line.raw(), "c");
    }

    #[test]
    fn last_index_tracks_growth() {
        let store = LineStore::new();
        assert_eq!(store.last_index(), None);
        store.append("x");
        assert_eq!(store.last_index(), Some(LineIndex::new(0)));
    }

    #[tokio::test]
    async fn growth_watchers_see_new_lengths() {
        let store = LineStore::new();
        let mut watcher = store.subscribe();
        assert_eq!(*watcher.borrow(), 0);

        store.append("one");
        watcher.changed().await.unwrap();
        assert_eq!(*watcher.borrow_and_update(), 1);

        store.mark_complete();
        watcher.changed().await.unwrap();
        assert!(store.is_complete());
    }

    #[test]
    fn line_display_width_uses_columns() {
        assert_eq!(Line::new("träff").display_width(), 5);
        assert_eq!(Line::new("").display_width(), 0);
    }
}
