//! Structured logging for the service.
//!
//! # Telemetry invariants
//!
//! - Request and response bodies only reach the log after their tagged fields
//!   have been encrypted; without a log key they are left out.
//! - Key material never appears in any log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`) and can be
//!   overridden with `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;
