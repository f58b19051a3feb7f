//! The pager core: scroll position, interaction modes, and the search state
//! machine.
//!
//! All state transitions live here as synchronous methods over the shared
//! [`LineStore`]. Scans that may walk the whole document are split off as
//! [`ScanJob`] values: the runtime ships them to a worker and feeds the
//! answer back through [`Pager::apply_scan_result`], while tests and simple
//! callers run the same jobs inline through the `scroll_to_*` wrappers.

pub mod mode;

use std::sync::Arc;

use crate::error::Result;
use crate::search::{HitPosition, ScanJob, SearchDirection, SearchOptions, SearchPattern};
use crate::store::{LineIndex, LineStore};
use crate::viewport::{Placement, RowPos, ScrollPosition, Viewport};

pub use mode::PagerMode;

/// Why a scan was issued. Decides how its result lands: which mode follows,
/// and whether the viewport is biased toward the top or the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Live rescan while the pattern is being typed, anchored at the search
    /// origin.
    EntryRescan,
    /// Repeat forward from below the visible window.
    Next,
    /// Repeat backward from above the visible window.
    Previous,
    /// Forward repeat after the document was exhausted: restart at the top.
    WrapForward,
    /// Backward repeat after the document was exhausted: restart at the end.
    WrapBackward,
}

/// Search-related state, kept across mode changes so repeats and highlights
/// survive leaving the prompt.
#[derive(Debug, Clone)]
struct SearchState {
    pattern_text: String,
    pattern: Option<SearchPattern>,
    direction: SearchDirection,
    /// Scroll position when the prompt was opened; typing rescans anchor
    /// here, and cancel restores it.
    origin: ScrollPosition,
    current_hit: Option<HitPosition>,
    options: SearchOptions,
}

impl SearchState {
    fn new(options: SearchOptions) -> Self {
        Self {
            pattern_text: String::new(),
            pattern: None,
            direction: SearchDirection::Forward,
            origin: ScrollPosition::top(),
            current_hit: None,
            options,
        }
    }
}

pub struct Pager {
    store: Arc<LineStore>,
    viewport: Viewport,
    scroll: ScrollPosition,
    mode: PagerMode,
    search: SearchState,
    /// Transient status-line message, e.g. a pattern compile error.
    message: Option<String>,
}

impl Pager {
    pub fn new(store: Arc<LineStore>, viewport: Viewport) -> Self {
        Self::with_options(store, viewport, SearchOptions::default())
    }

    pub fn with_options(store: Arc<LineStore>, viewport: Viewport, options: SearchOptions) -> Self {
        Self {
            store,
            viewport,
            scroll: ScrollPosition::top(),
            mode: PagerMode::Viewing,
            search: SearchState::new(options),
            message: None,
        }
    }

    pub fn store(&self) -> &Arc<LineStore> {
        &self.store
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mode(&self) -> &PagerMode {
        &self.mode
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn search_pattern(&self) -> Option<&SearchPattern> {
        self.search.pattern.as_ref()
    }

    pub fn pattern_text(&self) -> &str {
        &self.search.pattern_text
    }

    pub fn search_direction(&self) -> SearchDirection {
        self.search.direction
    }

    pub fn current_hit(&self) -> Option<HitPosition> {
        self.search.current_hit
    }

    /// Adopt a new terminal size. Wrap geometry changes with the width, so
    /// sub-row identities are recomputed on the next read.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    // ---- row geometry ------------------------------------------------------

    fn row_count_of(&self, line: usize) -> Result<usize> {
        let numbered = self.store.get_line(LineIndex::new(line))?;
        Ok(self.viewport.row_count(numbered.line.raw()))
    }

    fn next_row(&self, row: RowPos) -> Result<Option<RowPos>> {
        if row.sub_row + 1 < self.row_count_of(row.line)? {
            return Ok(Some(RowPos::new(row.line, row.sub_row + 1)));
        }
        if row.line + 1 < self.store.len() {
            return Ok(Some(RowPos::new(row.line + 1, 0)));
        }
        Ok(None)
    }

    fn prev_row(&self, row: RowPos) -> Result<Option<RowPos>> {
        if row.sub_row > 0 {
            return Ok(Some(RowPos::new(row.line, row.sub_row - 1)));
        }
        if row.line == 0 {
            return Ok(None);
        }
        let prev = row.line - 1;
        let last_sub = self.row_count_of(prev)?.saturating_sub(1);
        Ok(Some(RowPos::new(prev, last_sub)))
    }

    fn advance(&self, mut row: RowPos, rows: usize) -> Result<RowPos> {
        for _ in 0..rows {
            match self.next_row(row)? {
                Some(next) => row = next,
                None => break,
            }
        }
        Ok(row)
    }

    fn retreat(&self, mut row: RowPos, rows: usize) -> Result<RowPos> {
        for _ in 0..rows {
            match self.prev_row(row)? {
                Some(prev) => row = prev,
                None => break,
            }
        }
        Ok(row)
    }

    fn last_row(&self) -> Result<Option<RowPos>> {
        let Some(last) = self.store.last_index() else {
            return Ok(None);
        };
        let last_sub = self.row_count_of(last.get())?.saturating_sub(1);
        Ok(Some(RowPos::new(last.get(), last_sub)))
    }

    /// The furthest top row that still fills the window, so scrolling never
    /// leaves blank rows below the last line.
    fn max_top(&self) -> Result<RowPos> {
        match self.last_row()? {
            Some(last) => self.retreat(last, self.viewport.height.saturating_sub(1)),
            None => Ok(RowPos::new(0, 0)),
        }
    }

    fn resolve_top_at(&self, pos: ScrollPosition) -> Result<RowPos> {
        let Some(last) = self.store.last_index() else {
            return Ok(RowPos::new(0, 0));
        };
        let line = pos.anchor.get().min(last.get());
        let last_sub = self.row_count_of(line)?.saturating_sub(1);
        let anchored = RowPos::new(line, pos.sub_row.min(last_sub));
        match pos.bias {
            Placement::Top => Ok(anchored.min(self.max_top()?)),
            Placement::End => self.retreat(anchored, self.viewport.height.saturating_sub(1)),
        }
    }

    /// First visible row under the current scroll position.
    pub fn top_row(&self) -> Result<RowPos> {
        self.resolve_top_at(self.scroll)
    }

    /// The visible window: up to `height` display rows with their positions.
    pub fn visible_rows(&self) -> Result<Vec<(RowPos, String)>> {
        let mut rows = Vec::with_capacity(self.viewport.height);
        if self.store.is_empty() || self.viewport.height == 0 {
            return Ok(rows);
        }
        let top = self.top_row()?;
        let mut line = top.line;
        let mut skip = top.sub_row;
        while rows.len() < self.viewport.height && line < self.store.len() {
            let numbered = self.store.get_line(LineIndex::new(line))?;
            for (sub, text) in self
                .viewport
                .wrap_line(numbered.line.raw())
                .into_iter()
                .enumerate()
                .skip(skip)
            {
                if rows.len() == self.viewport.height {
                    break;
                }
                rows.push((RowPos::new(line, sub), text));
            }
            skip = 0;
            line += 1;
        }
        Ok(rows)
    }

    fn bottom_row(&self) -> Result<RowPos> {
        let rows = self.visible_rows()?;
        Ok(rows.last().map(|(pos, _)| *pos).unwrap_or(RowPos::new(0, 0)))
    }

    fn is_row_visible(&self, row: RowPos) -> Result<bool> {
        if self.store.is_empty() {
            return Ok(false);
        }
        Ok(row >= self.top_row()? && row <= self.bottom_row()?)
    }

    /// Percentage of the document above the bottom of the window.
    pub fn progress_percent(&self) -> Result<Option<u8>> {
        let length = self.store.len();
        if length == 0 {
            return Ok(None);
        }
        let bottom = self.bottom_row()?;
        Ok(Some((((bottom.line + 1) * 100) / length) as u8))
    }

    // ---- navigation --------------------------------------------------------

    fn scroll_at(row: RowPos) -> ScrollPosition {
        ScrollPosition {
            anchor: LineIndex::new(row.line),
            sub_row: row.sub_row,
            bias: Placement::Top,
        }
    }

    fn leave_not_found(&mut self) {
        if self.mode == PagerMode::NotFound {
            self.mode = PagerMode::Viewing;
        }
    }

    pub fn scroll_down(&mut self, rows: usize) -> Result<()> {
        self.leave_not_found();
        let advanced = self.advance(self.top_row()?, rows)?;
        self.scroll = Self::scroll_at(advanced.min(self.max_top()?));
        Ok(())
    }

    pub fn scroll_up(&mut self, rows: usize) -> Result<()> {
        self.leave_not_found();
        let retreated = self.retreat(self.top_row()?, rows)?;
        self.scroll = Self::scroll_at(retreated);
        Ok(())
    }

    fn page_rows(&self) -> usize {
        self.viewport.height.saturating_sub(1).max(1)
    }

    pub fn page_down(&mut self) -> Result<()> {
        self.scroll_down(self.page_rows())
    }

    pub fn page_up(&mut self) -> Result<()> {
        self.scroll_up(self.page_rows())
    }

    pub fn half_page_down(&mut self) -> Result<()> {
        self.scroll_down((self.viewport.height / 2).max(1))
    }

    pub fn half_page_up(&mut self) -> Result<()> {
        self.scroll_up((self.viewport.height / 2).max(1))
    }

    pub fn move_to_start(&mut self) {
        self.leave_not_found();
        self.scroll = ScrollPosition::top();
    }

    /// Pin the viewport to the end of the document. Re-applied on growth when
    /// the runtime is following a stream.
    pub fn move_to_end(&mut self) {
        self.leave_not_found();
        if let Some(last) = self.store.last_index() {
            self.scroll = ScrollPosition::from_index(last, Placement::End);
        }
    }

    /// Scroll `index` into view, clamped into the document: `Top` places it
    /// on the first visible row, `End` on the last.
    pub fn move_to_index(&mut self, index: LineIndex, placement: Placement) -> Result<()> {
        self.leave_not_found();
        let Some(last) = self.store.last_index() else {
            return Ok(());
        };
        let line = LineIndex::new(index.get().min(last.get()));
        match placement {
            Placement::Top => {
                let row = RowPos::new(line.get(), 0);
                self.scroll = Self::scroll_at(row.min(self.max_top()?));
            }
            Placement::End => {
                self.scroll = ScrollPosition::from_index(line, Placement::End);
            }
        }
        Ok(())
    }

    // ---- goto-line prompt --------------------------------------------------

    pub fn start_goto_line(&mut self) {
        self.mode = PagerMode::GotoLine {
            buffer: String::new(),
        };
        self.message = None;
    }

    pub fn update_goto_buffer(&mut self, buffer: String) {
        if matches!(self.mode, PagerMode::GotoLine { .. }) {
            self.mode = PagerMode::GotoLine { buffer };
        }
    }

    /// Jump to the 1-based line number in the prompt buffer. An empty or
    /// unparsable buffer just closes the prompt.
    pub fn execute_goto_line(&mut self) -> Result<()> {
        let target = match &self.mode {
            PagerMode::GotoLine { buffer } => buffer.trim().parse::<usize>().ok(),
            _ => None,
        };
        self.mode = PagerMode::Viewing;
        match target {
            Some(number) if number >= 1 => {
                self.move_to_index(LineIndex::new(number - 1), Placement::Top)
            }
            _ => Ok(()),
        }
    }

    pub fn cancel_goto_line(&mut self) {
        self.mode = PagerMode::Viewing;
    }

    // ---- search ------------------------------------------------------------

    /// Open the search prompt. The current position becomes the search
    /// origin: typing rescans from it, cancel restores it.
    pub fn start_search(&mut self, direction: SearchDirection) {
        self.search.direction = direction;
        self.search.origin = self.scroll;
        self.search.pattern_text.clear();
        self.search.pattern = None;
        self.search.current_hit = None;
        self.message = None;
        self.mode = PagerMode::Searching { direction };
    }

    /// Replace the prompt contents. A valid non-empty pattern yields a live
    /// rescan request anchored at the origin; a malformed one keeps the
    /// previous highlight state and surfaces the compile error.
    pub fn update_search_pattern(&mut self, text: &str) -> Result<Option<(ScanKind, ScanJob)>> {
        self.search.pattern_text = text.to_string();
        if text.is_empty() {
            self.search.pattern = None;
            self.search.current_hit = None;
            self.scroll = self.search.origin;
            self.message = None;
            return Ok(None);
        }
        match SearchPattern::compile(text, &self.search.options) {
            Ok(pattern) => {
                self.search.pattern = Some(pattern);
                self.message = None;
                self.rescan_request()
            }
            Err(err) => {
                self.message = Some(err.to_string());
                Ok(None)
            }
        }
    }

    /// Install a pattern without going through the prompt, anchoring the
    /// origin at the current position.
    pub fn set_search_pattern(&mut self, text: &str, direction: SearchDirection) -> Result<()> {
        self.search.direction = direction;
        self.search.origin = self.scroll;
        self.search.pattern_text = text.to_string();
        self.search.pattern = Some(SearchPattern::compile(text, &self.search.options)?);
        self.search.current_hit = None;
        Ok(())
    }

    /// Close the prompt, keeping the pattern for repeats. A committed pattern
    /// with no hit leaves the pager in not-found state so the next repeat
    /// wraps.
    pub fn commit_search(&mut self) {
        self.mode = if self.search.pattern.is_some() && self.search.current_hit.is_none() {
            PagerMode::NotFound
        } else {
            PagerMode::Viewing
        };
    }

    /// Abort the prompt and restore the origin position.
    pub fn cancel_search(&mut self) {
        self.scroll = self.search.origin;
        self.search.pattern_text.clear();
        self.search.pattern = None;
        self.search.current_hit = None;
        self.message = None;
        self.mode = PagerMode::Viewing;
    }

    // ---- scan requests and results -----------------------------------------

    fn job(&self, boundary: HitPosition, inclusive: bool, direction: SearchDirection) -> ScanJob {
        ScanJob {
            pattern: self.search.pattern_text.clone(),
            options: self.search.options.clone(),
            direction,
            boundary,
            inclusive,
            viewport: self.viewport,
        }
    }

    fn origin_top(&self) -> Result<RowPos> {
        self.resolve_top_at(self.search.origin)
    }

    /// Live rescan anchored at the search origin: forward searches accept the
    /// first hit at or after the origin's top row, backward searches the last
    /// hit at or before its bottom row.
    pub fn rescan_request(&self) -> Result<Option<(ScanKind, ScanJob)>> {
        if self.search.pattern.is_none() {
            return Ok(None);
        }
        let top = self.origin_top()?;
        let job = match self.search.direction {
            SearchDirection::Forward => {
                let boundary = HitPosition::new(LineIndex::new(top.line), top.sub_row, 0);
                self.job(boundary, true, SearchDirection::Forward)
            }
            SearchDirection::Backward => {
                let bottom = self.advance(top, self.viewport.height.saturating_sub(1))?;
                let boundary =
                    HitPosition::new(LineIndex::new(bottom.line), bottom.sub_row, usize::MAX);
                self.job(boundary, true, SearchDirection::Backward)
            }
        };
        Ok(Some((ScanKind::EntryRescan, job)))
    }

    /// Forward repeat: the first hit strictly below the visible window. In
    /// not-found state the repeat wraps to the top of the document instead.
    pub fn next_hit_request(&self) -> Result<Option<(ScanKind, ScanJob)>> {
        if self.search.pattern.is_none() {
            return Ok(None);
        }
        if self.mode == PagerMode::NotFound {
            let boundary = HitPosition::new(LineIndex::new(0), 0, 0);
            return Ok(Some((
                ScanKind::WrapForward,
                self.job(boundary, true, SearchDirection::Forward),
            )));
        }
        let boundary = match self.next_row(self.bottom_row()?)? {
            Some(row) => HitPosition::new(LineIndex::new(row.line), row.sub_row, 0),
            // The window already shows the end of the document.
            None => HitPosition::new(LineIndex::new(self.store.len()), 0, 0),
        };
        Ok(Some((
            ScanKind::Next,
            self.job(boundary, true, SearchDirection::Forward),
        )))
    }

    /// Backward repeat: the last hit strictly above the visible window. In
    /// not-found state the repeat wraps to the end of the document instead.
    pub fn prev_hit_request(&self) -> Result<Option<(ScanKind, ScanJob)>> {
        if self.search.pattern.is_none() {
            return Ok(None);
        }
        if self.mode == PagerMode::NotFound {
            let boundary = match self.last_row()? {
                Some(last) => HitPosition::new(LineIndex::new(last.line), last.sub_row, usize::MAX),
                None => HitPosition::new(LineIndex::new(0), 0, usize::MAX),
            };
            return Ok(Some((
                ScanKind::WrapBackward,
                self.job(boundary, true, SearchDirection::Backward),
            )));
        }
        let (boundary, inclusive) = match self.prev_row(self.top_row()?)? {
            Some(row) => (
                HitPosition::new(LineIndex::new(row.line), row.sub_row, usize::MAX),
                true,
            ),
            // The window already shows the top of the document.
            None => (HitPosition::new(LineIndex::new(0), 0, 0), false),
        };
        Ok(Some((
            ScanKind::Previous,
            self.job(boundary, inclusive, SearchDirection::Backward),
        )))
    }

    /// Land a scan result: update the current hit, scroll only when the hit
    /// is off-screen, and settle the mode according to the scan's kind.
    pub fn apply_scan_result(&mut self, kind: ScanKind, hit: Option<HitPosition>) -> Result<()> {
        match hit {
            Some(hit) => {
                self.search.current_hit = Some(hit);
                // An origin-anchored rescan judges visibility against the
                // origin window, so backspacing to an earlier hit snaps back
                // instead of anchoring at the previous keystroke's position.
                if kind == ScanKind::EntryRescan {
                    self.scroll = self.search.origin;
                }
                let row = RowPos::new(hit.line.get(), hit.sub_row);
                if !self.is_row_visible(row)? {
                    self.scroll = match kind {
                        // A backward wrap lands at the end of the document,
                        // with the hit on the last window row.
                        ScanKind::WrapBackward => ScrollPosition {
                            anchor: hit.line,
                            sub_row: hit.sub_row,
                            bias: Placement::End,
                        },
                        _ => Self::scroll_at(row.min(self.max_top()?)),
                    };
                }
                if kind != ScanKind::EntryRescan {
                    self.mode = PagerMode::Viewing;
                }
                self.message = None;
            }
            None => match kind {
                // Typing a pattern with no hit keeps the prompt open at the
                // origin position.
                ScanKind::EntryRescan => {
                    self.search.current_hit = None;
                    self.scroll = self.search.origin;
                }
                ScanKind::Next | ScanKind::Previous => self.mode = PagerMode::NotFound,
                // A fruitless wrap means the document has no hits at all.
                ScanKind::WrapForward | ScanKind::WrapBackward => self.mode = PagerMode::NotFound,
            },
        }
        Ok(())
    }

    // ---- inline scan wrappers ----------------------------------------------

    fn run_request(&mut self, request: Option<(ScanKind, ScanJob)>) -> Result<()> {
        if let Some((kind, job)) = request {
            let hit = job.execute(&self.store)?;
            self.apply_scan_result(kind, hit)?;
        }
        Ok(())
    }

    /// Forward repeat, scanned inline.
    pub fn scroll_to_next_search_hit(&mut self) -> Result<()> {
        let request = self.next_hit_request()?;
        self.run_request(request)
    }

    /// Backward repeat, scanned inline.
    pub fn scroll_to_previous_search_hit(&mut self) -> Result<()> {
        let request = self.prev_hit_request()?;
        self.run_request(request)
    }

    /// Prompt edit plus inline rescan.
    pub fn type_search_pattern(&mut self, text: &str) -> Result<()> {
        let request = self.update_search_pattern(text)?;
        self.run_request(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LineStore;

    fn pager(text: &str, width: usize, height: usize) -> Pager {
        let store = Arc::new(LineStore::from_text(text));
        Pager::new(store, Viewport::new(width, height, true))
    }

    fn six_lines() -> Pager {
        pager("a\nb\nc\nd\ne\nf\n", 80, 3)
    }

    #[test]
    fn scrolling_clamps_to_document() {
        let mut p = six_lines();
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));

        p.scroll_down(2).unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(2, 0));

        // max_top for 6 lines in a 3-row window is line 3.
        p.scroll_down(100).unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));

        p.scroll_up(100).unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
    }

    #[test]
    fn paging_moves_by_height_minus_one() {
        let mut p = six_lines();
        p.page_down().unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(2, 0));
        p.page_up().unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
    }

    #[test]
    fn move_to_end_pins_last_window() {
        let mut p = six_lines();
        p.move_to_end();
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));
        let rows = p.visible_rows().unwrap();
        let texts: Vec<&str> = rows.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["d", "e", "f"]);
    }

    #[test]
    fn goto_line_is_one_based_and_clamped() {
        let mut p = six_lines();
        p.start_goto_line();
        p.update_goto_buffer("3".to_string());
        p.execute_goto_line().unwrap();
        assert_eq!(p.mode(), &PagerMode::Viewing);
        assert_eq!(p.top_row().unwrap(), RowPos::new(2, 0));

        p.start_goto_line();
        p.update_goto_buffer("999".to_string());
        p.execute_goto_line().unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));
    }

    #[test]
    fn visible_hit_does_not_scroll() {
        let mut p = six_lines();
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("b").unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(1), 0, 0))
        );
        p.commit_search();
        assert_eq!(p.mode(), &PagerMode::Viewing);
    }

    #[test]
    fn offscreen_hit_scrolls_to_top_clamped() {
        let mut p = six_lines();
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("e").unwrap();
        // The hit on line 4 is off-screen; scrolling it to the top clamps to
        // max_top, line 3.
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(4), 0, 0))
        );
    }

    #[test]
    fn repeat_skips_everything_visible() {
        let mut p = pager("hit\nhit\nhit\nhit\nhit\nhit\n", 80, 3);
        p.set_search_pattern("hit", SearchDirection::Forward).unwrap();

        // Window shows lines 0..=2; the repeat must land on line 3.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(3), 0, 0))
        );
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));
    }

    #[test]
    fn repeat_past_end_goes_not_found_then_wraps() {
        let mut p = six_lines();
        p.set_search_pattern("a", SearchDirection::Forward).unwrap();
        p.move_to_end();

        // "a" is above the window and there is nothing below it.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::NotFound);
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));

        // Repeating in not-found state wraps to the top of the document.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::Viewing);
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(0), 0, 0))
        );
    }

    #[test]
    fn wrap_when_last_hit_is_visible() {
        let mut p = six_lines();
        p.set_search_pattern("f", SearchDirection::Forward).unwrap();

        // First repeat lands on line 5, clamped top line 3.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));

        // The only hit is visible on the last window row: the next repeat
        // finds nothing below and reports not-found without moving.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::NotFound);
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));

        // Wrapping lands back on the same hit and returns to viewing.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::Viewing);
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(5), 0, 0))
        );
    }

    #[test]
    fn backward_repeat_and_wrap_to_end() {
        let mut p = six_lines();
        p.set_search_pattern("f", SearchDirection::Backward).unwrap();

        // Window shows lines 0..=2; "f" is below, so backward finds nothing.
        p.scroll_to_previous_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::NotFound);

        // The wrap restarts at the end and lands with the hit on the last
        // window row.
        p.scroll_to_previous_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::Viewing);
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(5), 0, 0))
        );
    }

    #[test]
    fn pattern_with_no_hits_stays_not_found() {
        let mut p = six_lines();
        p.set_search_pattern("xxx", SearchDirection::Forward).unwrap();

        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::NotFound);
        // The wrap scan also finds nothing; the state must not oscillate.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(p.mode(), &PagerMode::NotFound);
    }

    #[test]
    fn cancel_restores_origin() {
        let mut p = six_lines();
        p.scroll_down(1).unwrap();
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("f").unwrap();
        assert_ne!(p.top_row().unwrap(), RowPos::new(1, 0));

        p.cancel_search();
        assert_eq!(p.top_row().unwrap(), RowPos::new(1, 0));
        assert_eq!(p.mode(), &PagerMode::Viewing);
        assert!(p.search_pattern().is_none());
    }

    #[test]
    fn shrinking_pattern_rescans_from_origin() {
        let mut p = six_lines();
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("f").unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(3, 0));

        // Backspacing to a pattern that matches earlier must rescan from the
        // origin, not from wherever the previous keystroke scrolled to.
        p.type_search_pattern("b").unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(1), 0, 0))
        );
    }

    #[test]
    fn invalid_pattern_keeps_previous_highlight() {
        let mut p = six_lines();
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("b").unwrap();
        let hit = p.current_hit();

        p.type_search_pattern("b(").unwrap();
        assert!(p.message().is_some());
        assert_eq!(p.current_hit(), hit);
        assert_eq!(p.search_pattern().map(|s| s.as_str()), Some("b"));
    }

    #[test]
    fn empty_pattern_clears_search_state() {
        let mut p = six_lines();
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("f").unwrap();
        p.type_search_pattern("").unwrap();
        assert!(p.search_pattern().is_none());
        assert_eq!(p.current_hit(), None);
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
    }

    #[test]
    fn sub_row_hits_walk_one_word_per_repeat() {
        let mut p = pager(
            "1miss 2träff 3miss 4miss 5träff 6miss 7miss 8träff 9miss\n",
            10,
            3,
        );
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("träff").unwrap();
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(0), 1, 1))
        );
        p.commit_search();

        // Sub-rows 0..=2 are visible, so the first hit was already on screen
        // and the repeat must skip past the window to sub-row 4.
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(0), 4, 1))
        );
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 4));

        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(
            p.current_hit(),
            Some(HitPosition::new(LineIndex::new(0), 7, 1))
        );
    }

    #[test]
    fn resize_reflows_visible_rows() {
        let mut p = pager("alpha beta gamma\n", 80, 3);
        assert_eq!(p.visible_rows().unwrap().len(), 1);
        p.resize(6, 3);
        assert_eq!(p.visible_rows().unwrap().len(), 3);
    }

    #[test]
    fn empty_store_is_inert() {
        let mut p = pager("", 80, 3);
        p.scroll_down(5).unwrap();
        assert_eq!(p.top_row().unwrap(), RowPos::new(0, 0));
        assert!(p.visible_rows().unwrap().is_empty());
        assert_eq!(p.progress_percent().unwrap(), None);
    }
}
