//! Rendering: the scan protocol and the terminal front end.

pub mod protocol;
pub mod ui;

pub use protocol::{RequestId, ResponseGate, ScanCommand, ScanResponse};
pub use ui::{ColorTheme, TerminalUi};
