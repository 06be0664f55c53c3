use crate::metrics::DiagnosticsMetrics;
use crate::models::{DiagnosticsConfig, DiagnosticsData, DiagnosticsSummary, LogColor};
use crate::services::console::{ConsoleWriter, NullConsole, StdoutConsole};
use crate::services::error::DiagnosticsError;
use crate::services::folder::{self, SweepReport};
use crate::services::format::format_positional;
use crate::services::presenter::{ERROR_CAPTION, ErrorPresenter, presenter_for};
use crate::state::{ChangeNotifier, DiagnosticsChange, ListenerId, ThreadRegistry, current_thread_id};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::broadcast;

/// Line written by the releasing thread before sinks are closed
pub const RELEASE_MESSAGE: &str = "Diagnostics manager released correctly.";

/// Lifecycle of a [`Diagnostics`] instance.
///
/// An instance only exists once its run folder is ready, so there is no
/// uninitialized state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Run folder created, nothing logged yet
    FolderReady,

    /// At least one thread sink registered
    Logging,

    /// `release()` was called; every operation now fails with [`DiagnosticsError::Released`]
    Released,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::FolderReady,
            1 => LifecycleState::Logging,
            _ => LifecycleState::Released,
        }
    }
}

/// Process diagnostics: per-thread log files, a console mirror for the main
/// thread, and user-visible error reporting.
///
/// The thread that builds the instance becomes the main thread; only its lines
/// reach the console. Every thread, main included, gets its own sink file in the
/// run folder the first time it logs, and observers are told about each new sink.
///
/// `Diagnostics` is `Send + Sync`; share it with `Arc` or by reference.
///
/// # Example
/// ```ignore
/// let diagnostics = Diagnostics::init(DiagnosticsConfig::default())?;
/// diagnostics.log("Starting conversion")?;
/// diagnostics.log_args("Converted {0} files", &[&3])?;
/// diagnostics.release()?;
/// ```
pub struct Diagnostics {
    config: DiagnosticsConfig,
    folder: Utf8PathBuf,
    sweep: SweepReport,
    registry: ThreadRegistry,
    notifier: ChangeNotifier,
    presenter: Box<dyn ErrorPresenter>,
    console: Box<dyn ConsoleWriter>,
    metrics: DiagnosticsMetrics,
    state: AtomicU8,
}

/// Builder for [`Diagnostics`], allowing the presenter, console and clock to be injected.
pub struct DiagnosticsBuilder {
    config: DiagnosticsConfig,
    presenter: Option<Box<dyn ErrorPresenter>>,
    console: Option<Box<dyn ConsoleWriter>>,
    started_at: Option<DateTime<Local>>,
}

impl DiagnosticsBuilder {
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self {
            config,
            presenter: None,
            console: None,
            started_at: None,
        }
    }

    pub fn presenter(mut self, presenter: impl ErrorPresenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn console(mut self, console: impl ConsoleWriter + 'static) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Startup time used to name the run folder and judge folder expiration
    pub fn started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Sweep expired runs, create this run's folder and capture the calling
    /// thread as the main thread.
    pub fn build(self) -> Result<Diagnostics, DiagnosticsError> {
        let now = self.started_at.unwrap_or_else(Local::now);
        let prepared = folder::prepare_diagnostics_folder(&self.config, now)?;

        let presenter = self
            .presenter
            .unwrap_or_else(|| presenter_for(self.config.show_error_dialogs));
        let console: Box<dyn ConsoleWriter> = match self.console {
            Some(console) => console,
            None if self.config.console_output => Box::new(StdoutConsole::detect()),
            None => Box::new(NullConsole),
        };

        let registry = ThreadRegistry::new(prepared.path.clone(), self.config.recent_lines);
        tracing::info!(
            "Diagnostics initialized in {} (main thread {})",
            prepared.path,
            registry.main_thread_id()
        );

        Ok(Diagnostics {
            notifier: ChangeNotifier::new(self.config.change_channel_capacity),
            folder: prepared.path,
            sweep: prepared.sweep,
            registry,
            presenter,
            console,
            metrics: DiagnosticsMetrics::new(),
            state: AtomicU8::new(LifecycleState::FolderReady as u8),
            config: self.config,
        })
    }
}

impl Diagnostics {
    /// Initialize with the default presenter and console for `config`
    pub fn init(config: DiagnosticsConfig) -> Result<Self, DiagnosticsError> {
        DiagnosticsBuilder::new(config).build()
    }

    pub fn builder(config: DiagnosticsConfig) -> DiagnosticsBuilder {
        DiagnosticsBuilder::new(config)
    }

    /// Log `message` in the default color
    pub fn log(&self, message: &str) -> Result<(), DiagnosticsError> {
        self.log_with_color(message, LogColor::White)
    }

    /// Log a positional template (`{0}`, `{1}`, ...).
    ///
    /// Without arguments the template is logged verbatim.
    pub fn log_args(&self, template: &str, args: &[&dyn Display]) -> Result<(), DiagnosticsError> {
        if args.is_empty() {
            return self.log(template);
        }
        let message = Self::format(template, args)?;
        self.log(&message)
    }

    /// Dispatch a line: console first when on the main thread, then the thread's sink.
    pub fn log_with_color(&self, message: &str, color: LogColor) -> Result<(), DiagnosticsError> {
        self.ensure_active()?;

        let thread_id = current_thread_id();
        if self.registry.is_main_thread(thread_id) {
            self.console.write_line(message, color);
            self.metrics.record_console_line();
        }

        let resolution = {
            let thread = std::thread::current();
            self.registry.resolve(thread_id, thread.name())
        };
        let data = resolution.data();

        let init_result = if resolution.is_registered() {
            self.register(data)
        } else {
            Ok(())
        };

        let write_result = data.log(message).map_err(|source| {
            self.metrics.record_sink_failure();
            tracing::error!("Diagnostics sink for {} failed: {}", data.name(), source);
            DiagnosticsError::SinkWrite { thread_id, source }
        });
        self.metrics.record_line();

        init_result.and(write_result)
    }

    /// Report `message` as an error when `condition` is false
    pub fn assert(&self, condition: bool, message: &str) -> Result<(), DiagnosticsError> {
        if condition {
            return Ok(());
        }
        self.log_error(message)
    }

    /// Show `message` in a blocking error presenter, then log it as `Error: <message>` in red.
    pub fn log_error(&self, message: &str) -> Result<(), DiagnosticsError> {
        self.ensure_active()?;

        self.metrics.record_error_reported();
        self.presenter.present(ERROR_CAPTION, message);

        self.log_with_color(&format!("Error: {message}"), LogColor::Red)
    }

    /// Format a positional template and report it as an error.
    ///
    /// The template is always formatted, so literal braces must be escaped.
    pub fn log_error_args(
        &self,
        template: &str,
        args: &[&dyn Display],
    ) -> Result<(), DiagnosticsError> {
        let message = Self::format(template, args)?;
        self.log_error(&message)
    }

    /// Report `"<message> (code 0x<code>)"` as an error
    pub fn log_error_code(&self, error_code: i32, message: &str) -> Result<(), DiagnosticsError> {
        self.log_error(&format!("{message} (code 0x{error_code:X})"))
    }

    /// Snapshot of every registered sink, in registration order.
    ///
    /// This is not a live view: listen for [`DiagnosticsChange`] and fetch again.
    pub fn data(&self) -> Vec<DiagnosticsSummary> {
        self.registry
            .snapshot()
            .iter()
            .map(|data| data.summary())
            .collect()
    }

    /// In-memory tail of a thread's sink
    pub fn recent_lines(&self, thread_id: u64) -> Option<Vec<String>> {
        self.registry.get(thread_id).map(|data| data.recent_lines())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticsChange> {
        self.notifier.subscribe()
    }

    /// Register a callback run synchronously for every change.
    ///
    /// Callbacks run on the thread that triggered the change with no lock held.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&DiagnosticsChange) + Send + Sync + 'static,
    {
        self.notifier.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    /// Log the release message, close every sink and clear the registry.
    ///
    /// Must not race with in-flight log calls; afterwards every operation fails
    /// with [`DiagnosticsError::Released`].
    pub fn release(&self) -> Result<(), DiagnosticsError> {
        match self.log(RELEASE_MESSAGE) {
            Err(DiagnosticsError::Released) => return Err(DiagnosticsError::Released),
            Err(e) => tracing::warn!("Failed to log release message: {}", e),
            Ok(()) => {}
        }

        if self.state.swap(LifecycleState::Released as u8, Ordering::SeqCst)
            == LifecycleState::Released as u8
        {
            return Err(DiagnosticsError::Released);
        }

        let sinks = self.registry.drain();
        for data in &sinks {
            data.release();
        }

        tracing::info!("Released {} diagnostics sinks", sinks.len());
        self.metrics.log_summary();
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// This run's diagnostics folder
    pub fn folder_path(&self) -> &Utf8Path {
        &self.folder
    }

    pub fn main_thread_id(&self) -> u64 {
        self.registry.main_thread_id()
    }

    /// Outcome of the startup expiration sweep
    pub fn sweep_report(&self) -> &SweepReport {
        &self.sweep
    }

    pub fn metrics(&self) -> &DiagnosticsMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    fn ensure_active(&self) -> Result<(), DiagnosticsError> {
        if self.state() == LifecycleState::Released {
            Err(DiagnosticsError::Released)
        } else {
            Ok(())
        }
    }

    fn format(template: &str, args: &[&dyn Display]) -> Result<String, DiagnosticsError> {
        format_positional(template, args).map_err(|source| DiagnosticsError::Format {
            template: template.to_string(),
            source,
        })
    }

    /// Open a new sink's file and announce it. Runs outside the registry lock.
    fn register(&self, data: &DiagnosticsData) -> Result<(), DiagnosticsError> {
        let result = data.initialize().map_err(|source| {
            self.metrics.record_sink_failure();
            tracing::error!(
                "Failed to open diagnostics file for {} in {}: {}",
                data.name(),
                self.folder,
                source
            );
            DiagnosticsError::SinkInit {
                thread_id: data.thread_id(),
                source,
            }
        });

        // Only the first registration moves the lifecycle forward
        let _ = self.state.compare_exchange(
            LifecycleState::FolderReady as u8,
            LifecycleState::Logging as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.metrics.record_sink_registered();

        tracing::debug!(
            "Registered diagnostics sink {} for thread {}",
            data.name(),
            data.thread_id()
        );
        self.notifier.notify(DiagnosticsChange::DataChanged {
            thread_id: data.thread_id(),
            name: data.name().to_string(),
        });
        self.metrics.record_notification();

        result
    }
}
