/// Console tint for a log line.
///
/// Only the console mirror uses the color; sink files are always plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogColor {
    #[default]
    White,
    Red,
    Yellow,
    Green,
    Cyan,
    Gray,
}

impl LogColor {
    /// ANSI SGR foreground sequence for this color
    pub fn ansi_code(self) -> &'static str {
        match self {
            LogColor::White => "\x1b[97m",
            LogColor::Red => "\x1b[91m",
            LogColor::Yellow => "\x1b[93m",
            LogColor::Green => "\x1b[92m",
            LogColor::Cyan => "\x1b[96m",
            LogColor::Gray => "\x1b[90m",
        }
    }

    /// Sequence restoring the terminal's default color
    pub const RESET: &'static str = "\x1b[0m";
}
