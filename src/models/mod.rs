//! Data models for the diagnostics facility.
//!
//! - [`DiagnosticsData`]: The per-thread sink owning one log file in the run folder
//! - [`DiagnosticsSummary`]: Snapshot row returned by [`Diagnostics::data`](crate::Diagnostics::data)
//! - [`DiagnosticsConfig`]: Settings loaded from `Diagnostics.yaml`
//! - [`LogColor`]: Console tint for main-thread output

pub mod color;
pub mod config;
pub mod diagnostics_data;

pub use color::LogColor;
pub use config::{DEFAULT_FOLDER_PREFIX, DiagnosticsConfig};
pub use diagnostics_data::{DiagnosticsData, DiagnosticsSummary};
