//! Coordinator/worker scan protocol.
//!
//! The runtime ships [`ScanJob`]s to the scan worker tagged with a
//! monotonically increasing [`RequestId`]. Answers come back tagged with the
//! same id; the [`ResponseGate`] drops anything that was superseded by a
//! newer request, so a stale keystroke's scan can never clobber the state a
//! later one produced.

use crate::pager::ScanKind;
use crate::search::{HitPosition, ScanJob};

pub type RequestId = u64;

/// Commands accepted by the scan worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanCommand {
    ExecuteScan {
        request_id: RequestId,
        job: ScanJob,
    },
    Shutdown,
}

/// Responses produced by the scan worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResponse {
    ScanCompleted {
        request_id: RequestId,
        hit: Option<HitPosition>,
    },
    /// The scan failed (an unreadable range, a pattern that no longer
    /// compiles). Correlated like a completion so the gate still advances.
    Error {
        request_id: RequestId,
        message: String,
    },
}

impl ScanResponse {
    pub fn request_id(&self) -> RequestId {
        match self {
            ScanResponse::ScanCompleted { request_id, .. } => *request_id,
            ScanResponse::Error { request_id, .. } => *request_id,
        }
    }
}

/// Tracks the newest in-flight scan. Only its answer is allowed through;
/// everything older is discarded on arrival.
#[derive(Debug, Default)]
pub struct ResponseGate {
    latest: Option<(RequestId, ScanKind)>,
    next_id: RequestId,
}

impl ResponseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh scan, superseding any in-flight one. Returns the id
    /// to tag the command with.
    pub fn register(&mut self, kind: ScanKind) -> RequestId {
        self.next_id += 1;
        self.latest = Some((self.next_id, kind));
        self.next_id
    }

    /// Admit a response: yields the scan's kind if it is the latest one,
    /// `None` if it was superseded.
    pub fn accept(&mut self, request_id: RequestId) -> Option<ScanKind> {
        match self.latest {
            Some((latest_id, kind)) if latest_id == request_id => {
                self.latest = None;
                Some(kind)
            }
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.latest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_response_is_admitted_once() {
        let mut gate = ResponseGate::new();
        let id = gate.register(ScanKind::Next);
        assert!(gate.has_pending());
        assert_eq!(gate.accept(id), Some(ScanKind::Next));
        assert!(!gate.has_pending());
        assert_eq!(gate.accept(id), None);
    }

    #[test]
    fn superseded_responses_are_dropped() {
        let mut gate = ResponseGate::new();
        let stale = gate.register(ScanKind::EntryRescan);
        let fresh = gate.register(ScanKind::EntryRescan);

        // The stale scan's answer arrives first and must be ignored.
        assert_eq!(gate.accept(stale), None);
        assert_eq!(gate.accept(fresh), Some(ScanKind::EntryRescan));
    }

    #[test]
    fn ids_are_monotonic() {
        let mut gate = ResponseGate::new();
        let a = gate.register(ScanKind::Next);
        let b = gate.register(ScanKind::Previous);
        assert!(b > a);
    }
}
