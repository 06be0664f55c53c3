use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, LineWriter, Write};

/// Per-thread log sink backed by one file inside the run folder.
///
/// A sink is created by the [`ThreadRegistry`](crate::state::ThreadRegistry) on a
/// thread's first log call and released only when the whole facility is released.
///
/// Besides the file, the sink keeps a bounded tail of recent lines so a live view
/// can show the latest activity without reading the file back.
///
/// # Failure policy
///
/// The first I/O failure (opening or writing) is returned to the caller and marks
/// the sink as faulted. Later writes skip the file and succeed, so one broken file
/// never turns every subsequent log call into an error.
pub struct DiagnosticsData {
    name: String,
    thread_id: u64,
    file_path: Utf8PathBuf,
    inner: Mutex<SinkInner>,
}

struct SinkInner {
    writer: Option<Box<dyn Write + Send>>,
    recent: VecDeque<String>,
    recent_capacity: usize,
    line_count: u64,
    faulted: bool,
    released: bool,
}

/// Read-only row describing one sink at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSummary {
    pub name: String,
    pub thread_id: u64,
    pub file_path: Utf8PathBuf,
    pub line_count: u64,
    pub faulted: bool,
}

impl DiagnosticsData {
    /// Create an unopened sink whose file will live in `folder`
    pub fn new(
        name: impl Into<String>,
        thread_id: u64,
        folder: &Utf8Path,
        recent_capacity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            thread_id,
            file_path: folder.join(Self::file_name_for(thread_id)),
            inner: Mutex::new(SinkInner {
                writer: None,
                recent: VecDeque::with_capacity(recent_capacity.min(1024)),
                recent_capacity,
                line_count: 0,
                faulted: false,
                released: false,
            }),
        }
    }

    /// File name used for a thread's sink inside the run folder
    pub fn file_name_for(thread_id: u64) -> String {
        format!("Thread-{thread_id}.log")
    }

    /// Open the backing file and write the header line.
    ///
    /// On failure the sink is faulted and keeps only its in-memory tail.
    pub fn initialize(&self) -> io::Result<()> {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
        {
            Ok(file) => self.initialize_with(LineWriter::new(file)),
            Err(e) => {
                self.inner.lock().faulted = true;
                Err(e)
            }
        }
    }

    /// Attach `writer` as the sink's output and write the header line to it.
    pub fn initialize_with(&self, writer: impl Write + Send + 'static) -> io::Result<()> {
        let mut writer: Box<dyn Write + Send> = Box::new(writer);
        let mut inner = self.inner.lock();

        let header = writeln!(
            writer,
            "Diagnostics for {} (thread {}) started {}",
            self.name,
            self.thread_id,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        match header {
            Ok(()) => {
                inner.writer = Some(writer);
                Ok(())
            }
            Err(e) => {
                inner.faulted = true;
                Err(e)
            }
        }
    }

    /// Append one line to the sink.
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.released {
            return Ok(());
        }

        let line = format!("{} {}", chrono::Local::now().format("%H:%M:%S%.3f"), message);
        inner.line_count += 1;

        if inner.recent_capacity > 0 {
            if inner.recent.len() == inner.recent_capacity {
                inner.recent.pop_front();
            }
            inner.recent.push_back(line.clone());
        }

        if inner.faulted {
            return Ok(());
        }

        let Some(writer) = inner.writer.as_mut() else {
            return Ok(());
        };

        if let Err(e) = writeln!(writer, "{line}") {
            inner.faulted = true;
            inner.writer = None;
            return Err(e);
        }

        Ok(())
    }

    /// Flush and close the backing file. Further logging is ignored.
    pub fn release(&self) {
        let mut inner = self.inner.lock();
        if let Some(mut writer) = inner.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush diagnostics for {}: {}", self.name, e);
            }
        }
        inner.released = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    pub fn file_path(&self) -> &Utf8Path {
        &self.file_path
    }

    pub fn is_faulted(&self) -> bool {
        self.inner.lock().faulted
    }

    /// Most recent lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.inner.lock().recent.iter().cloned().collect()
    }

    pub fn summary(&self) -> DiagnosticsSummary {
        let inner = self.inner.lock();
        DiagnosticsSummary {
            name: self.name.clone(),
            thread_id: self.thread_id,
            file_path: self.file_path.clone(),
            line_count: inner.line_count,
            faulted: inner.faulted,
        }
    }
}

impl fmt::Debug for DiagnosticsData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsData")
            .field("name", &self.name)
            .field("thread_id", &self.thread_id)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}
