// CLI module
// Public interface for the interactive console

mod commands;
mod console;
mod input;
mod options;
mod pager;
mod repl;
mod signals;

pub use commands::{format_help, format_history, MetaCommand};
pub use console::{Console, ReadResult, TerminalConsole};
pub use input::{completes_query, read_query, QueryInput};
pub use options::{help_text, Startup, StartupOptions};
pub use pager::{page, wants_more, PageEnd, PageSummary};
pub use repl::{Session, SessionEnd, SessionPhase};
pub use signals::InterruptFlag;
