use crate::canvas::Rgb;
use anyhow::Context;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, ClearType},
};
use std::io::{Stdout, Write, stdout};

/// Raw mode plus alternate screen for as long as the guard lives.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Drop must run even if a later setup step fails.
        let guard = Self { _private: () };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;
        tracing::debug!("terminal acquired");

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        // Sync output, autowrap, colours and the default background.
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m\x1b]111\x07");
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        tracing::debug!("terminal released");
    }
}

/// OSC 11 / OSC 111: set or reset the terminal's default background colour.
pub fn write_default_background(out: &mut dyn Write, color: Option<Rgb>) -> std::io::Result<()> {
    match color {
        Some([r, g, b]) => write!(out, "\x1b]11;rgb:{r:02x}/{g:02x}/{b:02x}\x07")?,
        None => out.write_all(b"\x1b]111\x07")?,
    }
    out.flush()
}
