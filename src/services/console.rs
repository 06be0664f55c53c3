use crate::models::LogColor;
use std::io::{self, IsTerminal, Write};

/// Destination of the main thread's console mirror.
pub trait ConsoleWriter: Send + Sync {
    fn write_line(&self, line: &str, color: LogColor);
}

/// Writes tinted lines to standard output, restoring the default color afterwards.
///
/// Without ANSI support lines are written plain, so redirected output stays free
/// of escape sequences.
#[derive(Debug, Clone, Copy)]
pub struct StdoutConsole {
    ansi: bool,
}

impl StdoutConsole {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    /// Use ANSI colors only when stdout is a terminal
    pub fn detect() -> Self {
        Self::new(io::stdout().is_terminal())
    }

    /// The line as written, without the trailing newline
    pub fn render(&self, line: &str, color: LogColor) -> String {
        if self.ansi {
            format!("{}{}{}", color.ansi_code(), line, LogColor::RESET)
        } else {
            line.to_string()
        }
    }
}

impl ConsoleWriter for StdoutConsole {
    fn write_line(&self, line: &str, color: LogColor) {
        let rendered = self.render(line, color);

        // A closed stdout must not take logging down with it
        if let Err(e) = writeln!(io::stdout().lock(), "{rendered}") {
            tracing::debug!("Console write failed: {}", e);
        }
    }
}

/// Discards everything; used when `console_output` is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NullConsole;

impl ConsoleWriter for NullConsole {
    fn write_line(&self, _line: &str, _color: LogColor) {}
}
