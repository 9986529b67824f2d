//! Capabilities of the stream help is written to.

use std::ffi::OsStr;
use std::io::IsTerminal;

/// Color support and width of standard output.
///
/// `columns == None` means the width is unknown, which layout treats as
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Terminal {
    pub columns: Option<usize>,
    pub color: bool,
}

impl Terminal {
    pub fn new(columns: Option<usize>, color: bool) -> Self {
        Self { columns, color }
    }

    /// No color, unbounded width. Output is the same on every machine.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Probe stdout and the environment.
    ///
    /// `NO_COLOR` disables color, `FORCE_COLOR` enables it, otherwise color
    /// follows whether stdout is a terminal. The width is only read from a
    /// terminal.
    pub fn detect() -> Self {
        let is_terminal = std::io::stdout().is_terminal();
        let color = color_choice(
            std::env::var_os("NO_COLOR").as_deref(),
            std::env::var_os("FORCE_COLOR").as_deref(),
            is_terminal,
        );
        let columns = if is_terminal {
            crossterm::terminal::size()
                .ok()
                .map(|(cols, _rows)| usize::from(cols))
                .filter(|cols| *cols > 0)
        } else {
            None
        };
        tracing::trace!(?columns, color, is_terminal, "detected terminal");
        Self { columns, color }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

fn color_choice(no_color: Option<&OsStr>, force_color: Option<&OsStr>, is_terminal: bool) -> bool {
    if no_color.is_some_and(|v| !v.is_empty()) {
        return false;
    }
    match force_color {
        Some(v) if v == "0" || v == "false" => false,
        Some(_) => true,
        None => is_terminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_wins() {
        let set = Some(OsStr::new("1"));
        assert!(!color_choice(set, set, true));
        assert!(color_choice(Some(OsStr::new("")), None, true));
    }

    #[test]
    fn force_color_without_terminal() {
        assert!(color_choice(None, Some(OsStr::new("1")), false));
        assert!(color_choice(None, Some(OsStr::new("")), false));
        assert!(!color_choice(None, Some(OsStr::new("0")), true));
        assert!(!color_choice(None, None, false));
        assert!(color_choice(None, None, true));
    }

    #[test]
    fn builders() {
        let terminal = Terminal::plain().with_columns(60).with_color(true);
        assert_eq!(terminal, Terminal::new(Some(60), true));
    }
}
