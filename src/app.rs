//! Application assembly: runtime loop and scan worker.

pub mod runtime;
pub mod worker;

pub use runtime::Application;
pub use worker::scan_worker_loop;
