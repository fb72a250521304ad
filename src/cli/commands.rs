// Console meta-commands (`!` lines)
//
// Recognised forms are handled by the console itself; any other `!` line is
// passed to the engine untouched.

use crate::history::HistoryRecorder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    /// `!!` - list the session history
    History,
    /// `!N` - run history entry N again
    Recall(usize),
    /// `!help`
    Help,
}

impl MetaCommand {
    pub fn parse(query: &str) -> Option<Self> {
        match query.trim() {
            "!!" => Some(MetaCommand::History),
            "!help" => Some(MetaCommand::Help),
            other => other
                .strip_prefix('!')
                .and_then(|n| n.parse::<usize>().ok())
                .map(MetaCommand::Recall),
        }
    }
}

pub fn format_help() -> String {
    r#"Console commands:
  !!        - List the queries entered so far
  !N        - Run query number N again
  !help     - Show this help message

Queries end with '.' or '/'; a line starting with '!' is a command.
Answer 'y' or ';' at "more?" to see the next solution."#
        .to_string()
}

/// Numbered listing; continuation lines of multi-line entries are indented
pub fn format_history(history: &HistoryRecorder) -> String {
    if history.is_empty() {
        return "No queries yet.".to_string();
    }

    let width = history.len().to_string().len();
    let mut output = String::new();
    for (i, entry) in history.entries().iter().enumerate() {
        let mut lines = entry.lines();
        if let Some(first) = lines.next() {
            output.push_str(&format!("{:>width$}  {}\n", i + 1, first, width = width));
        }
        for line in lines {
            output.push_str(&format!("{:width$}  {}\n", "", line, width = width));
        }
    }
    output.pop();
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(MetaCommand::parse("!!\n"), Some(MetaCommand::History));
        assert_eq!(MetaCommand::parse("!help\n"), Some(MetaCommand::Help));
        assert_eq!(MetaCommand::parse("!12\n"), Some(MetaCommand::Recall(12)));
        assert_eq!(MetaCommand::parse("!ls\n"), None);
        assert_eq!(MetaCommand::parse("!-1\n"), None);
        assert_eq!(MetaCommand::parse("foo.\n"), None);
    }

    #[test]
    fn test_format_history_numbers_entries() {
        let mut history = HistoryRecorder::new();
        history.record("a.\n");
        history.record("edge(x,\ny).\n");
        history.record("!!\n");

        assert_eq!(format_history(&history), "1  a.\n2  edge(x,\n   y).\n3  !!");
    }

    #[test]
    fn test_format_empty_history() {
        assert_eq!(format_history(&HistoryRecorder::new()), "No queries yet.");
    }

    #[test]
    fn test_help_mentions_commands() {
        let help = format_help();
        assert!(help.contains("!!"));
        assert!(help.contains("!N"));
    }
}
