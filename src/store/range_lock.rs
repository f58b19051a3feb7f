//! Striped range lock over line-index space.
//!
//! Instead of one coarse lock over the whole growing store, index space is cut
//! into fixed 1024-index sections and each section maps to one of K stripes:
//! `stripe(index) = (index / SECTION_SIZE) mod K`. K defaults to four times the
//! available hardware parallelism. The writer exclusively locks only the stripe
//! of the index it appends, so readers of other stripes are never blocked.
//!
//! Locking a range covers the circularly contiguous run of distinct stripes
//! visited walking from `stripe(start)` to `stripe(end)`; a range touching at
//! least K distinct sections degenerates to a full-store lock, the only way to
//! guarantee coverage once the walk laps every stripe.
//!
//! Deadlock freedom: the covered stripe SET comes from the walk, but stripes
//! are always acquired in ascending raw stripe index, a single total order
//! shared by every caller relative to the fixed origin stripe 0. Two callers
//! therefore produce prefix-compatible acquisition sequences and can never
//! hold-and-wait in opposite directions. Release happens in reverse
//! acquisition order when the guard drops.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

/// Number of consecutive indexes mapped to a single stripe.
pub const SECTION_SIZE: usize = 1024;

fn default_stripe_count() -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4);
    parallelism * 4
}

/// A fixed set of lock stripes over index space.
pub struct RangeLock {
    stripes: Box<[RwLock<()>]>,
}

impl RangeLock {
    /// Create a range lock sized for the available hardware parallelism.
    pub fn new() -> Self {
        Self::with_stripes(default_stripe_count())
    }

    /// Create a range lock with an explicit stripe count. Mostly for tests,
    /// where a small K makes wraparound cases easy to construct.
    pub fn with_stripes(count: usize) -> Self {
        assert!(count > 0, "a range lock needs at least one stripe");
        let stripes = (0..count).map(|_| RwLock::new(())).collect();
        Self { stripes }
    }

    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Deterministic index-to-stripe mapping.
    pub fn stripe_of(&self, index: usize) -> usize {
        (index / SECTION_SIZE) % self.stripes.len()
    }

    /// The stripes covering `start..=end`, in acquisition order.
    ///
    /// The covered set is the circular walk from `stripe(start)` to
    /// `stripe(end)`: the wrapped tail is logically *after* the unwrapped head
    /// in visitation order, so every stripe in between is included even when
    /// the raw stripe index wraps past K-1 back to 0. Ranges spanning K or
    /// more sections cover all stripes. The returned order is ascending raw
    /// stripe index, the crate-wide total acquisition order.
    ///
    /// A range with `end < start` is a programming fault and panics.
    pub fn stripes_for_range(&self, range: &RangeInclusive<usize>) -> Vec<usize> {
        let (start, end) = (*range.start(), *range.end());
        assert!(
            start <= end,
            "malformed lock range: end {end} precedes start {start}"
        );

        let k = self.stripes.len();
        let sections = end / SECTION_SIZE - start / SECTION_SIZE + 1;
        if sections >= k {
            return (0..k).collect();
        }

        let first = self.stripe_of(start);
        let mut covered: Vec<usize> = (0..sections).map(|step| (first + step) % k).collect();
        covered.sort_unstable();
        covered
    }

    /// Acquire the range for shared (read) access.
    pub fn acquire_shared(&self, range: RangeInclusive<usize>) -> SharedRangeGuard<'_> {
        let guards = self
            .stripes_for_range(&range)
            .into_iter()
            .map(|stripe| self.stripes[stripe].read())
            .collect();
        SharedRangeGuard { guards }
    }

    /// Acquire the range for exclusive (write) access.
    pub fn acquire_exclusive(&self, range: RangeInclusive<usize>) -> ExclusiveRangeGuard<'_> {
        let guards = self
            .stripes_for_range(&range)
            .into_iter()
            .map(|stripe| self.stripes[stripe].write())
            .collect();
        ExclusiveRangeGuard { guards }
    }
}

impl Default for RangeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RangeLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeLock")
            .field("stripes", &self.stripes.len())
            .finish()
    }
}

/// Scoped shared hold over a range's stripes; released on every exit path.
#[must_use = "dropping the guard releases the range"]
pub struct SharedRangeGuard<'a> {
    guards: Vec<RwLockReadGuard<'a, ()>>,
}

impl Drop for SharedRangeGuard<'_> {
    fn drop(&mut self) {
        // Release in reverse acquisition order.
        while self.guards.pop().is_some() {}
    }
}

/// Scoped exclusive hold over a range's stripes; released on every exit path.
#[must_use = "dropping the guard releases the range"]
pub struct ExclusiveRangeGuard<'a> {
    guards: Vec<RwLockWriteGuard<'a, ()>>,
}

impl Drop for ExclusiveRangeGuard<'_> {
    fn drop(&mut self) {
        while self.guards.pop().is_some() {}
    }
}
