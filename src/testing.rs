// Scripted stand-ins for the terminal and the engine
//
// Used by the unit tests and by the integration tests under tests/, so the
// session can be driven end to end without a tty or a real engine.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::cli::{Console, InterruptFlag, ReadResult};
use crate::engine::{Engine, ReadyStream, SessionState, Solution, SolutionStream};
use crate::error::{EngineError, Result};

/// Scripted key standing for Ctrl-C at the "more?" question
pub const CTRL_C: char = '\u{3}';

/// Console fed from a fixed list of lines and keypresses.
///
/// Running out of lines reads as end of input; running out of keys reads
/// as `None` from `read_key`. A `CTRL_C` key reads as `None` and raises the
/// interrupt flag, like the terminal console in raw mode.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    events: VecDeque<ReadResult>,
    keys: VecDeque<char>,
    prompts: Vec<String>,
    recalled: Vec<String>,
    interrupts: Option<InterruptFlag>,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_events(lines.into_iter().map(|l| ReadResult::Line(l.into())).collect())
    }

    pub fn from_events(events: Vec<ReadResult>) -> Self {
        Self {
            events: events.into(),
            ..Self::default()
        }
    }

    pub fn with_keys<I: IntoIterator<Item = char>>(mut self, keys: I) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Raise `flag` whenever a scripted `Interrupted` is read, as the
    /// terminal console does
    pub fn with_interrupts(mut self, flag: InterruptFlag) -> Self {
        self.interrupts = Some(flag);
        self
    }

    /// Every prompt passed to `read_line`, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Entries offered to the recall buffer
    pub fn recalled(&self) -> &[String] {
        &self.recalled
    }

    pub fn remaining_lines(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReadResult::Line(_)))
            .count()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        self.prompts.push(prompt.to_string());
        let event = self.events.pop_front().unwrap_or(ReadResult::Eof);
        if event == ReadResult::Interrupted {
            if let Some(flag) = &self.interrupts {
                flag.raise();
            }
        }
        Ok(event)
    }

    fn read_key(&mut self) -> Result<Option<char>> {
        match self.keys.pop_front() {
            Some(CTRL_C) => {
                if let Some(flag) = &self.interrupts {
                    flag.raise();
                }
                Ok(None)
            }
            key => Ok(key),
        }
    }

    fn add_history(&mut self, entry: &str) {
        self.recalled.push(entry.to_string());
    }
}

/// What `ScriptedEngine` does with the next dispatched query
#[derive(Debug, Clone)]
pub enum Reply {
    /// Produce these solutions, the final one marked last
    Answers(Vec<String>),
    /// Fail from `solve` before any solution exists
    Fault(String),
    /// Produce these solutions (none marked last), then fail on the next pull
    FailAfter(Vec<String>, String),
    /// Panic inside `solve`
    Panic(String),
    /// Set the halt flag and produce nothing
    Halt,
}

impl Reply {
    pub fn answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::Answers(answers.into_iter().map(Into::into).collect())
    }
}

/// Counters shared between a `ScriptedEngine` and the streams it hands out
#[derive(Debug, Default, Clone)]
pub struct StreamStats {
    pulled: Rc<Cell<usize>>,
    abandoned: Rc<Cell<usize>>,
}

impl StreamStats {
    /// Solutions handed to the console across all queries
    pub fn pulled(&self) -> usize {
        self.pulled.get()
    }

    /// Streams abandoned before running dry
    pub fn abandoned(&self) -> usize {
        self.abandoned.get()
    }
}

struct ScriptedStream {
    pending: VecDeque<Solution>,
    failure: Option<String>,
    stats: StreamStats,
    done: bool,
}

impl SolutionStream for ScriptedStream {
    fn next_solution(&mut self) -> std::result::Result<Option<Solution>, EngineError> {
        if self.done {
            return Ok(None);
        }
        if let Some(solution) = self.pending.pop_front() {
            self.stats.pulled.set(self.stats.pulled.get() + 1);
            return Ok(Some(solution));
        }
        self.done = true;
        match self.failure.take() {
            Some(message) => Err(EngineError::Fault(message)),
            None => Ok(None),
        }
    }

    fn abandon(&mut self) {
        if !self.done {
            self.done = true;
            self.pending.clear();
            self.stats.abandoned.set(self.stats.abandoned.get() + 1);
        }
    }
}

/// Engine that answers from a queue of canned replies.
///
/// With the queue empty every query is answered with a single `yes`.
#[derive(Debug)]
pub struct ScriptedEngine {
    prompt: String,
    replies: VecDeque<Reply>,
    halt_on_interrupt: bool,
    queries: Vec<String>,
    interrupts: usize,
    persisted: Vec<Vec<String>>,
    stats: StreamStats,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self {
            prompt: crate::config::DEFAULT_PROMPT.to_string(),
            replies: VecDeque::new(),
            halt_on_interrupt: false,
            queries: Vec::new(),
            interrupts: 0,
            persisted: Vec::new(),
            stats: StreamStats::default(),
        }
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    /// Queue the reply for the next unanswered query
    pub fn reply(mut self, reply: Reply) -> Self {
        self.replies.push_back(reply);
        self
    }

    /// Treat an interrupt as a request to end the session
    pub fn halt_on_interrupt(mut self) -> Self {
        self.halt_on_interrupt = true;
        self
    }

    /// Query texts received, terminators included
    pub fn queries(&self) -> Vec<String> {
        self.queries.clone()
    }

    pub fn interrupts(&self) -> usize {
        self.interrupts
    }

    pub fn persist_calls(&self) -> usize {
        self.persisted.len()
    }

    /// Entries passed to the most recent `persist_history` call
    pub fn persisted(&self) -> Vec<String> {
        self.persisted.last().cloned().unwrap_or_default()
    }

    pub fn stats(&self) -> StreamStats {
        self.stats.clone()
    }

    fn stream(&self, answers: Vec<String>, mark_last: bool, failure: Option<String>) -> ScriptedStream {
        let count = answers.len();
        let pending = answers
            .into_iter()
            .enumerate()
            .map(|(i, text)| Solution::new(text, mark_last && i + 1 == count))
            .collect();
        ScriptedStream {
            pending,
            failure,
            stats: self.stats.clone(),
            done: false,
        }
    }
}

impl Engine for ScriptedEngine {
    fn intro_text(&self) -> String {
        "Scripted engine for console tests".to_string()
    }

    fn prompt(&self) -> String {
        self.prompt.clone()
    }

    fn solve(
        &mut self,
        state: &mut SessionState,
    ) -> std::result::Result<Box<dyn SolutionStream>, EngineError> {
        self.queries.push(state.query.clone());

        let reply = self
            .replies
            .pop_front()
            .unwrap_or_else(|| Reply::answers(["yes"]));
        match reply {
            Reply::Answers(answers) => Ok(Box::new(self.stream(answers, true, None))),
            Reply::Fault(message) => Err(EngineError::Fault(message)),
            Reply::FailAfter(answers, message) => {
                Ok(Box::new(self.stream(answers, false, Some(message))))
            }
            Reply::Panic(message) => panic!("{}", message),
            Reply::Halt => {
                state.halted = true;
                Ok(Box::new(ReadyStream::default()))
            }
        }
    }

    fn on_interrupt(&mut self, state: &mut SessionState) {
        self.interrupts += 1;
        if self.halt_on_interrupt {
            state.halted = true;
        }
    }

    fn persist_history(&mut self, entries: &[String]) -> std::result::Result<(), EngineError> {
        self.persisted.push(entries.to_vec());
        Ok(())
    }
}

/// Stream whose solutions are never marked last; only running dry ends it
pub struct UnmarkedStream {
    pending: VecDeque<String>,
}

impl UnmarkedStream {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl SolutionStream for UnmarkedStream {
    fn next_solution(&mut self) -> std::result::Result<Option<Solution>, EngineError> {
        Ok(self.pending.pop_front().map(|text| Solution::new(text, false)))
    }

    fn abandon(&mut self) {
        self.pending.clear();
    }
}
