//! # rlpager - Streaming Terminal Pager
//!
//! A `less`-style pager for files and piped command output. Input is ingested
//! into an append-only concurrent line store, so paging and searching work
//! while the stream is still arriving.
//!
//! ## Features
//!
//! - **Streaming Input**: View files or stdin pipes while they grow
//! - **Concurrent Store**: Striped range locking lets readers and the writer
//!   overlap without a global lock
//! - **Regex Search**: Incremental search powered by the ripgrep core
//!   libraries, with soft-wrap-aware hit positions
//! - **Terminal UI**: Familiar less-like navigation with live highlights
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`store`] - Striped range lock and the append-only line store
//! - [`ingest`] - Line sources and the ingestion task
//! - [`viewport`] - Scroll positions and the soft-wrap model
//! - [`search`] - Pattern compilation and directional hit scanning
//! - [`pager`] - The interaction state machine
//! - [`input`] - `less`-style key handling
//! - [`render`] - Scan protocol and the ratatui front end
//! - [`app`] - Runtime assembly and the scan worker

pub mod error;
pub mod ingest;
pub mod store;
pub mod viewport;

pub mod pager;
pub mod search;

pub mod input;
pub mod render;

pub mod app;

pub use error::{PagerError, Result};

pub use app::Application;
pub use pager::{Pager, PagerMode, ScanKind};
pub use search::{HitPosition, SearchDirection, SearchOptions, SearchPattern};
pub use store::{LineIndex, LineStore};
pub use viewport::{Placement, ScrollPosition, Viewport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
