//! Scan worker.
//!
//! Runs scan jobs off the UI loop so a long search over a large document
//! never blocks keystroke handling. Every response carries the request id it
//! answers; the runtime's gate decides whether it is still current.

use crate::render::{ScanCommand, ScanResponse};
use crate::store::LineStore;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn scan_worker_loop(
    mut commands: UnboundedReceiver<ScanCommand>,
    responses: UnboundedSender<ScanResponse>,
    store: Arc<LineStore>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            ScanCommand::ExecuteScan { request_id, job } => {
                let response = match job.execute(&store) {
                    Ok(hit) => ScanResponse::ScanCompleted { request_id, hit },
                    Err(err) => ScanResponse::Error {
                        request_id,
                        message: err.to_string(),
                    },
                };
                if responses.send(response).is_err() {
                    break;
                }
            }
            ScanCommand::Shutdown => break,
        }
    }
    log::debug!("scan worker stopped");
}
