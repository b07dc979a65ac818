use std::io::Write;
use crate::error::Result;
use crate::scheduler::display::DisplayTable;

pub trait DisplaySink: Send {
    fn render(&mut self, table: &DisplayTable) -> Result<()>;
}

/// Redraws the table on the terminal.
pub struct StdoutSink {
    clear_screen: bool,
}

impl StdoutSink {
    pub fn new(clear_screen: bool) -> Self {
        StdoutSink { clear_screen }
    }
}

impl DisplaySink for StdoutSink {
    fn render(&mut self, table: &DisplayTable) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if self.clear_screen {
            write!(out, "\x1b[2J\x1b[H")?;
        }
        writeln!(out, "{}", table.to_text())?;
        out.flush()?;
        Ok(())
    }
}
