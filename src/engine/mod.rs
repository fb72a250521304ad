// Engine collaborator interface
//
// The console never evaluates queries itself. It hands the accumulated text to
// an `Engine` through an explicit `SessionState` and pulls solutions one at a
// time from the `SolutionStream` the engine returns.

mod facts;
mod stream;
mod term;

use std::collections::VecDeque;
use std::fmt;

use crate::error::EngineError;

pub use facts::FactEngine;
pub use stream::ChannelStream;
pub use term::{Arg, SyntaxError, Term};

/// Session state shared between the console and the engine.
///
/// The console writes `query` before each dispatch; the engine sets `halted`
/// when the session should end. Passed by `&mut` into every engine call.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Query text most recently dispatched (line terminators preserved)
    pub query: String,

    /// Set by the engine once no further queries should be issued
    pub halted: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One answer produced by the engine for the current query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub text: String,
    pub is_last: bool,
}

impl Solution {
    pub fn new(text: impl Into<String>, is_last: bool) -> Self {
        Self {
            text: text.into(),
            is_last,
        }
    }

    /// A solution that is also the final alternative
    pub fn last(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lazy, forward-only sequence of solutions for one dispatched query.
///
/// Advancing may trigger further engine computation. Once abandoned the
/// stream yields nothing more and any producer resources are released.
pub trait SolutionStream {
    fn next_solution(&mut self) -> Result<Option<Solution>, EngineError>;

    /// Stop producing alternatives and release the producer
    fn abandon(&mut self);
}

/// Stream over answers that are already known, e.g. command acknowledgements
#[derive(Debug, Default)]
pub struct ReadyStream {
    pending: VecDeque<Solution>,
}

impl ReadyStream {
    /// Wrap the given answers, marking the final one as last
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pending: VecDeque<Solution> = answers
            .into_iter()
            .map(|text| Solution::new(text, false))
            .collect();
        if let Some(last) = pending.back_mut() {
            last.is_last = true;
        }
        Self { pending }
    }

    pub fn single(answer: impl Into<String>) -> Self {
        Self::new([answer.into()])
    }
}

impl SolutionStream for ReadyStream {
    fn next_solution(&mut self) -> Result<Option<Solution>, EngineError> {
        Ok(self.pending.pop_front())
    }

    fn abandon(&mut self) {
        self.pending.clear();
    }
}

/// The evaluation engine behind the console
pub trait Engine {
    /// Banner text shown once at startup
    fn intro_text(&self) -> String;

    /// Prompt printed before each query is read
    fn prompt(&self) -> String;

    /// Start evaluating `state.query`, returning its solution sequence
    fn solve(&mut self, state: &mut SessionState) -> Result<Box<dyn SolutionStream>, EngineError>;

    /// Called when the operator interrupts; may request a halt via `state`
    fn on_interrupt(&mut self, state: &mut SessionState);

    /// Persist the queries entered during this session
    fn persist_history(&mut self, entries: &[String]) -> Result<(), EngineError>;
}
