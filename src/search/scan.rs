//! Directional hit scanning over the wrapped document.
//!
//! A scan walks the store in document order (or reverse), wraps each line
//! with the same geometry the renderer uses, and reports the first hit past a
//! boundary position. Scans only ever see committed lines, so they are safe
//! to run while ingestion is still appending.

use crate::error::Result;
use crate::search::pattern::{SearchOptions, SearchPattern};
use crate::search::SearchDirection;
use crate::store::{LineIndex, LineStore};
use crate::viewport::Viewport;

/// Lines fetched per store read during a scan. Keeps shared range locks
/// short-lived so appends interleave with long scans.
const SCAN_CHUNK: usize = 256;

/// The identity of one search hit: the logical line, the wrapped sub-row it
/// falls on under the current geometry, and the byte column within that row.
/// Derived ordering is document order, which the scanners rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HitPosition {
    pub line: LineIndex,
    pub sub_row: usize,
    pub column: usize,
}

impl HitPosition {
    pub fn new(line: LineIndex, sub_row: usize, column: usize) -> Self {
        Self {
            line,
            sub_row,
            column,
        }
    }
}

/// A self-contained scan request: everything a worker needs to find the next
/// hit without touching pager state. Geometry travels with the job so a
/// resize during a scan cannot skew the result's sub-row identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanJob {
    pub pattern: String,
    pub options: SearchOptions,
    pub direction: SearchDirection,
    pub boundary: HitPosition,
    pub inclusive: bool,
    pub viewport: Viewport,
}

impl ScanJob {
    /// Run the scan against the store's committed lines.
    pub fn execute(&self, store: &LineStore) -> Result<Option<HitPosition>> {
        let pattern = SearchPattern::compile(&self.pattern, &self.options)?;
        match self.direction {
            SearchDirection::Forward => {
                find_next(store, &pattern, &self.viewport, self.boundary, self.inclusive)
            }
            SearchDirection::Backward => {
                find_prev(store, &pattern, &self.viewport, self.boundary, self.inclusive)
            }
        }
    }
}

/// All hits on one line under `viewport` geometry, in document order.
fn line_hits(
    pattern: &SearchPattern,
    viewport: &Viewport,
    line: LineIndex,
    text: &str,
) -> Vec<HitPosition> {
    let mut hits = Vec::new();
    for (sub_row, row) in viewport.wrap_line(text).iter().enumerate() {
        for (start, _end) in pattern.row_matches(row) {
            hits.push(HitPosition::new(line, sub_row, start));
        }
    }
    hits
}

/// First hit at or after `boundary` (after, when `inclusive` is false), or
/// `None` when the committed document holds no such hit.
pub fn find_next(
    store: &LineStore,
    pattern: &SearchPattern,
    viewport: &Viewport,
    boundary: HitPosition,
    inclusive: bool,
) -> Result<Option<HitPosition>> {
    let length = store.len();
    let mut start = boundary.line.get();
    while start < length {
        let end = (start + SCAN_CHUNK).min(length);
        for numbered in store.get(start..end)? {
            for hit in line_hits(pattern, viewport, numbered.index, numbered.line.raw()) {
                let accepted = if inclusive {
                    hit >= boundary
                } else {
                    hit > boundary
                };
                if accepted {
                    return Ok(Some(hit));
                }
            }
        }
        start = end;
    }
    Ok(None)
}

/// Last hit at or before `boundary` (before, when `inclusive` is false), or
/// `None` when the committed document holds no such hit.
pub fn find_prev(
    store: &LineStore,
    pattern: &SearchPattern,
    viewport: &Viewport,
    boundary: HitPosition,
    inclusive: bool,
) -> Result<Option<HitPosition>> {
    let length = store.len();
    if length == 0 {
        return Ok(None);
    }
    let mut end = boundary.line.get().min(length - 1) + 1;
    loop {
        let start = end.saturating_sub(SCAN_CHUNK);
        let chunk = store.get(start..end)?;
        for numbered in chunk.iter().rev() {
            let best = line_hits(pattern, viewport, numbered.index, numbered.line.raw())
                .into_iter()
                .filter(|hit| if inclusive { *hit <= boundary } else { *hit < boundary })
                .next_back();
            if let Some(hit) = best {
                return Ok(Some(hit));
            }
        }
        if start == 0 {
            return Ok(None);
        }
        end = start;
    }
}
