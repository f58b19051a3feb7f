//! Worker protocol round trips: request correlation, supersession through
//! the response gate, and error reporting.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use rlpager::app::scan_worker_loop;
use rlpager::ingest::{self, TextSource};
use rlpager::render::{ResponseGate, ScanCommand, ScanResponse};
use rlpager::search::{HitPosition, ScanJob, SearchOptions};
use rlpager::store::{LineIndex, LineStore};
use rlpager::viewport::Viewport;
use rlpager::{ScanKind, SearchDirection};

const TIMEOUT_MS: u64 = 500;

async fn next_response(rx: &mut mpsc::UnboundedReceiver<ScanResponse>) -> ScanResponse {
    timeout(Duration::from_millis(TIMEOUT_MS), rx.recv())
        .await
        .expect("worker response timed out")
        .expect("worker channel closed unexpectedly")
}

async fn spawn_worker(
    contents: &str,
) -> (
    Arc<LineStore>,
    mpsc::UnboundedSender<ScanCommand>,
    mpsc::UnboundedReceiver<ScanResponse>,
    tokio::task::JoinHandle<()>,
) {
    let store = Arc::new(LineStore::new());
    ingest::ingest(Box::new(TextSource::new(contents)), Arc::clone(&store))
        .await
        .expect("ingest fixture");

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (resp_tx, resp_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(scan_worker_loop(cmd_rx, resp_tx, Arc::clone(&store)));

    (store, cmd_tx, resp_rx, worker)
}

fn forward_job(pattern: &str) -> ScanJob {
    ScanJob {
        pattern: pattern.to_string(),
        options: SearchOptions::default(),
        direction: SearchDirection::Forward,
        boundary: HitPosition::new(LineIndex::new(0), 0, 0),
        inclusive: true,
        viewport: Viewport::new(80, 3, true),
    }
}

#[tokio::test]
async fn scan_round_trip_reports_the_first_hit() {
    let (_store, cmd_tx, mut resp_rx, worker) =
        spawn_worker("miss\nmiss\nneedle here\nmiss\n").await;

    cmd_tx
        .send(ScanCommand::ExecuteScan {
            request_id: 42,
            job: forward_job("needle"),
        })
        .unwrap();

    assert_eq!(
        next_response(&mut resp_rx).await,
        ScanResponse::ScanCompleted {
            request_id: 42,
            hit: Some(HitPosition::new(LineIndex::new(2), 0, 0)),
        }
    );

    cmd_tx.send(ScanCommand::Shutdown).unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn gate_drops_superseded_responses() {
    let (_store, cmd_tx, mut resp_rx, worker) = spawn_worker("alpha\nbeta\n").await;
    let mut gate = ResponseGate::new();

    // Two keystrokes in quick succession: only the second scan may land.
    let stale = gate.register(ScanKind::EntryRescan);
    cmd_tx
        .send(ScanCommand::ExecuteScan {
            request_id: stale,
            job: forward_job("alpha"),
        })
        .unwrap();
    let fresh = gate.register(ScanKind::EntryRescan);
    cmd_tx
        .send(ScanCommand::ExecuteScan {
            request_id: fresh,
            job: forward_job("beta"),
        })
        .unwrap();

    let mut landed = Vec::new();
    for _ in 0..2 {
        let response = next_response(&mut resp_rx).await;
        if let Some(kind) = gate.accept(response.request_id()) {
            landed.push((kind, response));
        }
    }

    assert_eq!(landed.len(), 1);
    let (kind, response) = &landed[0];
    assert_eq!(*kind, ScanKind::EntryRescan);
    assert_eq!(
        *response,
        ScanResponse::ScanCompleted {
            request_id: fresh,
            hit: Some(HitPosition::new(LineIndex::new(1), 0, 0)),
        }
    );

    cmd_tx.send(ScanCommand::Shutdown).unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn malformed_pattern_comes_back_as_an_error() {
    let (_store, cmd_tx, mut resp_rx, worker) = spawn_worker("anything\n").await;

    cmd_tx
        .send(ScanCommand::ExecuteScan {
            request_id: 9,
            job: forward_job("unclosed("),
        })
        .unwrap();

    match next_response(&mut resp_rx).await {
        ScanResponse::Error { request_id, message } => {
            assert_eq!(request_id, 9);
            assert!(!message.is_empty());
        }
        other => panic!("expected Error, got {other:?}"),
    }

    cmd_tx.send(ScanCommand::Shutdown).unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn scans_observe_lines_appended_after_spawn() {
    let (store, cmd_tx, mut resp_rx, worker) = spawn_worker("early\n").await;

    store.append("late needle");
    cmd_tx
        .send(ScanCommand::ExecuteScan {
            request_id: 1,
            job: forward_job("needle"),
        })
        .unwrap();

    assert_eq!(
        next_response(&mut resp_rx).await,
        ScanResponse::ScanCompleted {
            request_id: 1,
            hit: Some(HitPosition::new(LineIndex::new(1), 0, 5)),
        }
    );

    cmd_tx.send(ScanCommand::Shutdown).unwrap();
    worker.await.unwrap();
}
