//! Services module - the diagnostics engine.
//!
//! # Components
//!
//! - [`Diagnostics`]: The service every thread logs through. It routes each line to
//!   the console (main thread only) and to the calling thread's sink, reports errors
//!   through an [`ErrorPresenter`], and owns the lifecycle (`init` → `release`).
//!
//! - [`folder`]: Run-folder lifecycle. Deletes expired `Diagnostics-*` folders and
//!   creates a uniquely named folder for the current run.
//!
//! - [`format_positional`]: Runtime `{0}`-style templates used by the `*_args` methods.
//!
//! - [`ErrorPresenter`] / [`ConsoleWriter`]: Injected capabilities, so the engine can be
//!   exercised without a display or a terminal.
//!
//! # Usage Example
//!
//! ```ignore
//! use thread_diagnostics::{Diagnostics, DiagnosticsConfig};
//!
//! let diagnostics = Diagnostics::init(DiagnosticsConfig::default())?;
//!
//! std::thread::scope(|scope| {
//!     scope.spawn(|| diagnostics.log("from a worker"));
//! });
//!
//! diagnostics.log_error_code(0x80004005u32 as i32, "Conversion failed")?;
//! diagnostics.release()?;
//! ```

pub mod console;
pub mod dispatcher;
pub mod error;
pub mod folder;
pub mod format;
pub mod presenter;

pub use console::{ConsoleWriter, NullConsole, StdoutConsole};
pub use dispatcher::{Diagnostics, DiagnosticsBuilder, LifecycleState, RELEASE_MESSAGE};
pub use error::DiagnosticsError;
pub use folder::{PreparedFolder, SweepReport};
pub use format::{FormatError, format_positional};
pub use presenter::{DialogErrorPresenter, ERROR_CAPTION, ErrorPresenter, LogOnlyErrorPresenter};
