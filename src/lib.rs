// Thread Diagnostics - per-thread diagnostics log files
//
// This is the library crate containing the diagnostics engine.
// The binary crate (main.rs) is a small demonstration driver.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{DiagnosticsConfig, DiagnosticsSummary, LogColor};
pub use services::{Diagnostics, DiagnosticsBuilder, DiagnosticsError, ErrorPresenter, LifecycleState};
pub use state::{DiagnosticsChange, ListenerId};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
