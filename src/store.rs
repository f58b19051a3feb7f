//! Concurrent line storage: the striped range lock and the append-only store.

pub mod line_meta;
pub mod line_store;
pub mod range_lock;

pub use line_meta::{LineIndex, LineNumber};
pub use line_store::{Line, LineStore, NumberedLine};
pub use range_lock::{RangeLock, SECTION_SIZE};
