// Solution paging
//
// Pulls solutions one at a time and asks the operator before advancing, so the
// engine only searches for an alternative somebody wants to see.

use std::io::Write;

use tracing::debug;

use super::console::Console;
use super::signals::InterruptFlag;
use crate::config::MORE_PROMPT;
use crate::engine::SolutionStream;
use crate::error::Result;

/// Why paging stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnd {
    /// The engine ran out of alternatives (or reported the last one)
    Exhausted,
    /// The operator declined to see more
    Declined,
    /// An interrupt was pending before the next advancement
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    /// Solutions rendered
    pub shown: usize,
    /// "more?" questions asked
    pub prompts: usize,
    pub end: PageEnd,
}

/// `y` and `;` ask for the next alternative; anything else stops
pub fn wants_more(response: Option<char>) -> bool {
    matches!(response, Some('y') | Some(';'))
}

/// Render the solutions of `stream` until it is exhausted or abandoned.
///
/// Engine faults while advancing propagate unchanged.
pub fn page(
    stream: &mut dyn SolutionStream,
    console: &mut dyn Console,
    out: &mut dyn Write,
    interrupts: &InterruptFlag,
) -> Result<PageSummary> {
    let mut shown = 0;
    let mut prompts = 0;

    let end = loop {
        if interrupts.is_raised() {
            stream.abandon();
            writeln!(out, "interrupted")?;
            break PageEnd::Interrupted;
        }

        let Some(solution) = stream.next_solution()? else {
            break PageEnd::Exhausted;
        };

        write!(out, "{}", solution)?;
        shown += 1;

        if solution.is_last {
            writeln!(out)?;
            break PageEnd::Exhausted;
        }

        write!(out, "{}", MORE_PROMPT)?;
        out.flush()?;
        prompts += 1;

        let response = console.read_key()?;
        // Echo the answer the way a cooked terminal would
        if let Some(c) = response.filter(|c| !c.is_control()) {
            write!(out, "{}", c)?;
        }
        writeln!(out)?;

        if !wants_more(response) {
            stream.abandon();
            break PageEnd::Declined;
        }
    };

    // Separate this query's output from the next prompt
    writeln!(out)?;
    out.flush()?;

    debug!(shown, prompts, ?end, "Paging finished");
    Ok(PageSummary { shown, prompts, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ReadyStream, Solution};
    use crate::error::{EngineError, SessionError};
    use crate::testing::ScriptedConsole;

    fn answers(n: usize) -> ReadyStream {
        ReadyStream::new((1..=n).map(|i| format!("X = {}", i)))
    }

    fn run(stream: &mut dyn SolutionStream, keys: &[char]) -> (PageSummary, String) {
        let mut console = ScriptedConsole::new(Vec::<String>::new()).with_keys(keys.iter().copied());
        let mut out = Vec::new();
        let summary = page(stream, &mut console, &mut out, &InterruptFlag::new()).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_single_last_solution() {
        let (summary, out) = run(&mut answers(1), &[]);
        assert_eq!(
            summary,
            PageSummary {
                shown: 1,
                prompts: 0,
                end: PageEnd::Exhausted
            }
        );
        assert_eq!(out, "X = 1\n\n");
    }

    #[test]
    fn test_all_solutions_with_yes() {
        let (summary, out) = run(&mut answers(3), &['y', ';']);
        assert_eq!(summary.shown, 3);
        assert_eq!(summary.prompts, 2);
        assert_eq!(summary.end, PageEnd::Exhausted);
        assert_eq!(
            out,
            "X = 1  more? (y/n) y\nX = 2  more? (y/n) ;\nX = 3\n\n"
        );
    }

    #[test]
    fn test_decline_at_each_prompt() {
        for k in 1..5 {
            let mut stream = answers(5);
            let mut keys = vec!['y'; k - 1];
            keys.push('n');

            let (summary, out) = run(&mut stream, &keys);
            assert_eq!(summary.shown, k, "declining at prompt {}", k);
            assert_eq!(summary.prompts, k);
            assert_eq!(summary.end, PageEnd::Declined);
            assert_eq!(out.matches("more?").count(), k);
            assert!(out.ends_with("\n\n"));
            // Abandoned: nothing further can be pulled
            assert_eq!(stream.next_solution().unwrap(), None);
        }
    }

    #[test]
    fn test_end_of_input_stops() {
        let (summary, out) = run(&mut answers(2), &[]);
        assert_eq!(summary.shown, 1);
        assert_eq!(summary.end, PageEnd::Declined);
        assert_eq!(out, "X = 1  more? (y/n) \n\n");
    }

    #[test]
    fn test_stream_without_last_marker() {
        let mut stream = crate::testing::UnmarkedStream::new(["a", "b"]);
        let (summary, out) = run(&mut stream, &['y', 'y']);
        assert_eq!(summary.shown, 2);
        assert_eq!(summary.prompts, 2);
        assert_eq!(summary.end, PageEnd::Exhausted);
        assert!(out.ends_with("y\n\n"));
    }

    #[test]
    fn test_empty_stream_prints_separator_only() {
        let (summary, out) = run(&mut ReadyStream::default(), &[]);
        assert_eq!(summary.shown, 0);
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_pending_interrupt_abandons() {
        let interrupts = InterruptFlag::new();
        interrupts.raise();
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let mut out = Vec::new();
        let mut stream = answers(3);

        let summary = page(&mut stream, &mut console, &mut out, &interrupts).unwrap();

        assert_eq!(summary.end, PageEnd::Interrupted);
        assert_eq!(summary.shown, 0);
        assert_eq!(stream.next_solution().unwrap(), None);
        // Servicing the flag is the session's job
        assert!(interrupts.is_raised());
    }

    #[test]
    fn test_engine_fault_propagates() {
        struct Failing(bool);
        impl SolutionStream for Failing {
            fn next_solution(&mut self) -> std::result::Result<Option<Solution>, EngineError> {
                if self.0 {
                    Err(EngineError::Fault("out of memory".into()))
                } else {
                    self.0 = true;
                    Ok(Some(Solution::new("X = 1", false)))
                }
            }
            fn abandon(&mut self) {}
        }

        let mut console = ScriptedConsole::new(Vec::<String>::new()).with_keys(['y']);
        let mut out = Vec::new();
        let err = page(&mut Failing(false), &mut console, &mut out, &InterruptFlag::new())
            .unwrap_err();
        assert!(matches!(err, SessionError::Engine(EngineError::Fault(_))));
    }

    #[test]
    fn test_wants_more() {
        assert!(wants_more(Some('y')));
        assert!(wants_more(Some(';')));
        assert!(!wants_more(Some('Y')));
        assert!(!wants_more(Some('n')));
        assert!(!wants_more(Some('\n')));
        assert!(!wants_more(None));
    }
}
