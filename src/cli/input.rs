// Query accumulation
//
// Reads lines until one of them completes a query. Syntax is the engine's
// business; the only thing inspected here is whether the line just typed
// ends the query.

use tracing::debug;

use super::console::{Console, ReadResult};
use crate::config::CONTINUATION_PROMPT;
use crate::error::Result;
use crate::history::HistoryRecorder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    /// A complete query, every line keeping its terminator
    Query(String),
    /// Input ran out; the session should stop
    EndOfInput,
}

/// Does `line` (without its terminator) complete a query?
///
/// True for lines ending in `.` or `/`, and for `!` command lines.
pub fn completes_query(line: &str) -> bool {
    let line = line.trim_end_matches('\r');
    line.ends_with('/') || line.starts_with('!') || line.ends_with('.')
}

/// Accumulate one query from `console`.
///
/// The first line is read with `prompt`, later ones with the continuation
/// marker. A completed query is recorded in `history` (terminators stripped)
/// and offered to the console's recall buffer. End of input discards any
/// partial query.
pub fn read_query(
    console: &mut dyn Console,
    prompt: &str,
    history: &mut HistoryRecorder,
) -> Result<QueryInput> {
    let mut buffer = String::new();

    loop {
        let marker = if buffer.is_empty() {
            prompt
        } else {
            CONTINUATION_PROMPT
        };

        let line = match console.read_line(marker)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                // Advisory only: keep what has been typed and ask again
                debug!(buffered = buffer.len(), "Interrupted at prompt");
                continue;
            }
            ReadResult::Eof => {
                debug!(discarded = buffer.len(), "End of input");
                return Ok(QueryInput::EndOfInput);
            }
        };

        buffer.push_str(&line);
        buffer.push('\n');

        if completes_query(&line) {
            break;
        }
    }

    if let Some(entry) = history.record(&buffer) {
        console.add_history(entry);
    }
    debug!(query = %buffer.trim_end(), "Query complete");
    Ok(QueryInput::Query(buffer))
}
