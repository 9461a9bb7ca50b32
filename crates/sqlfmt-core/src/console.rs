//! ANSI styling for diagnostics written to stderr

use std::env;
use std::io::{self, IsTerminal};

/// Whether styled output is wanted, decided once per renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Console {
    color_enabled: bool,
}

impl Console {
    /// Colors when stderr is a terminal, unless `NO_COLOR` is set;
    /// `CLICOLOR_FORCE` turns them on regardless
    pub fn new() -> Self {
        let forced = env::var_os("CLICOLOR_FORCE").is_some_and(|value| value != "0");
        let disabled = env::var_os("NO_COLOR").is_some();
        Self {
            color_enabled: forced || (!disabled && io::stderr().is_terminal()),
        }
    }

    pub fn no_colors() -> Self {
        Self {
            color_enabled: false,
        }
    }

    pub fn is_color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Wrap `text` in the SGR sequence for `color`
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if self.color_enabled && !text.is_empty() {
            format!("\x1b[{}m{text}\x1b[0m", color.sgr())
        } else {
            text.to_string()
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Styles used by the diagnostic renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Blue,
    Green,
    Dim,
    Bold,
}

impl Color {
    const fn sgr(self) -> u8 {
        match self {
            Color::Bold => 1,
            Color::Dim => 2,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_console_leaves_text_alone() {
        let console = Console::no_colors();
        assert!(!console.is_color_enabled());
        assert_eq!(console.colorize("SELEC", Color::Red), "SELEC");
    }

    #[test]
    fn test_sgr_sequences() {
        let console = Console {
            color_enabled: true,
        };
        assert_eq!(console.colorize("x", Color::Green), "\x1b[32mx\x1b[0m");
        assert_eq!(console.colorize("x", Color::Dim), "\x1b[2mx\x1b[0m");
        assert_eq!(console.colorize("", Color::Bold), "");
    }
}
