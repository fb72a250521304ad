// Terminal input
//
// `Console` is the seam between the session and the keyboard: whole lines for
// query entry, single keys for the "more?" question. `TerminalConsole` is the
// real implementation; tests use `testing::ScriptedConsole`.

use std::io::{self, BufRead, IsTerminal};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use tracing::debug;

use super::signals::InterruptFlag;
use crate::error::Result;

/// Outcome of reading one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// A line without its terminator
    Line(String),
    /// Ctrl-C while the line was being edited
    Interrupted,
    /// No more input
    Eof,
}

pub trait Console {
    /// Show `prompt` and read one line
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Read a single keypress; `None` when input is exhausted or interrupted
    fn read_key(&mut self) -> Result<Option<char>>;

    /// Make `entry` available for recall with the arrow keys
    fn add_history(&mut self, entry: &str);
}

/// Restores cooked mode however the keypress read ends
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub struct TerminalConsole {
    editor: DefaultEditor,
    interrupts: InterruptFlag,
    interactive: bool,
}

impl TerminalConsole {
    pub fn new(interrupts: InterruptFlag) -> Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let editor = DefaultEditor::with_config(config)?;

        Ok(Self {
            editor,
            interrupts,
            interactive: io::stdin().is_terminal(),
        })
    }

    /// Seed the recall buffer with entries from earlier sessions
    pub fn preload_history(&mut self, entries: &[String]) {
        for entry in entries {
            let _ = self.editor.add_history_entry(entry.as_str());
        }
        debug!(entries = entries.len(), "Recall buffer preloaded");
    }

    fn read_key_raw(&mut self) -> Result<Option<char>> {
        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    self.interrupts.raise();
                    return Ok(None);
                }
                KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(None);
                }
                KeyCode::Char(c) => return Ok(Some(c)),
                KeyCode::Enter => return Ok(Some('\n')),
                KeyCode::Esc => return Ok(Some('\u{1b}')),
                _ => continue,
            }
        }
    }

    fn read_key_piped(&mut self) -> Result<Option<char>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.chars().next().unwrap_or('\n')))
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => {
                self.interrupts.raise();
                Ok(ReadResult::Interrupted)
            }
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn read_key(&mut self) -> Result<Option<char>> {
        if self.interactive {
            self.read_key_raw()
        } else {
            self.read_key_piped()
        }
    }

    fn add_history(&mut self, entry: &str) {
        let _ = self.editor.add_history_entry(entry);
    }
}
