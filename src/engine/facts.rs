// Built-in fact engine
//
// A small engine that makes the console usable on its own: a store of
// ground facts, goals answered by matching against it, and a handful of
// directives. Goals are answered lazily through a `ChannelStream`.

use std::sync::Arc;

use tracing::{debug, info};

use super::stream::ChannelStream;
use super::term::{strip_terminator, unwrap_call, SyntaxError, Term};
use super::{Engine, ReadyStream, SessionState, SolutionStream};
use crate::config::DEFAULT_PROMPT;
use crate::error::EngineError;
use crate::history::HistoryFile;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, PartialEq, Eq)]
enum Directive {
    Halt,
    Listing,
    Help,
    Assert(Term),
    Retract(Term),
    Goal(Term),
}

impl Directive {
    fn parse(query: &str) -> Result<Self, SyntaxError> {
        let body = strip_terminator(query);
        let body = body.strip_prefix("?-").unwrap_or(body).trim();

        match body {
            "halt" => return Ok(Directive::Halt),
            "listing" => return Ok(Directive::Listing),
            "help" => return Ok(Directive::Help),
            _ => {}
        }

        if let Some(inner) = unwrap_call(body, "assert") {
            let fact = Term::parse(inner)?;
            if !fact.is_ground() {
                return Err(SyntaxError::Expected("a fact without variables"));
            }
            return Ok(Directive::Assert(fact));
        }
        if let Some(inner) = unwrap_call(body, "retract") {
            return Ok(Directive::Retract(Term::parse(inner)?));
        }

        Ok(Directive::Goal(Term::parse(body)?))
    }
}

pub struct FactEngine {
    facts: Arc<Vec<Term>>,
    prompt: String,
    history: Option<HistoryFile>,
    interrupts: usize,
}

impl Default for FactEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FactEngine {
    pub fn new() -> Self {
        Self {
            facts: Arc::new(Vec::new()),
            prompt: DEFAULT_PROMPT.to_string(),
            history: None,
            interrupts: 0,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Persist session history to `file` at shutdown
    pub fn with_history_file(mut self, file: HistoryFile) -> Self {
        self.history = Some(file);
        self
    }

    pub fn facts(&self) -> &[Term] {
        &self.facts
    }

    pub fn interrupt_count(&self) -> usize {
        self.interrupts
    }

    fn listing(&self) -> String {
        if self.facts.is_empty() {
            return "% no facts".to_string();
        }
        self.facts
            .iter()
            .map(|fact| format!("{}.", fact))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn answer_goal(&self, goal: Term) -> Result<Box<dyn SolutionStream>, EngineError> {
        // The producer works on a snapshot; later asserts do not disturb it
        let facts = Arc::clone(&self.facts);
        let answers = (0..facts.len()).filter_map(move |i| {
            goal.match_fact(&facts[i]).map(|bindings| {
                if bindings.is_empty() {
                    "yes".to_string()
                } else {
                    bindings
                        .iter()
                        .map(|(name, value)| format!("{} = {}", name, value))
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            })
        });
        Ok(Box::new(ChannelStream::spawn(answers, Some("no".to_string()))?))
    }
}

impl Engine for FactEngine {
    fn intro_text(&self) -> String {
        format!(
            "plconsole v{} - interactive logic console\n\
             Add facts with assert(parent(tom, bob)). and ask parent(tom, X).\n\
             Type help. for engine directives, halt. to leave.",
            VERSION
        )
    }

    fn prompt(&self) -> String {
        self.prompt.clone()
    }

    fn solve(&mut self, state: &mut SessionState) -> Result<Box<dyn SolutionStream>, EngineError> {
        let directive = match Directive::parse(&state.query) {
            Ok(directive) => directive,
            Err(e) => {
                debug!(error = %e, "Query rejected");
                return Ok(Box::new(ReadyStream::single(format!("syntax error: {}", e))));
            }
        };

        match directive {
            Directive::Halt => {
                info!("Halt requested");
                state.halted = true;
                Ok(Box::new(ReadyStream::default()))
            }
            Directive::Listing => Ok(Box::new(ReadyStream::single(self.listing()))),
            Directive::Help => Ok(Box::new(ReadyStream::single(HELP_TEXT))),
            Directive::Assert(fact) => {
                Arc::make_mut(&mut self.facts).push(fact);
                Ok(Box::new(ReadyStream::single("yes")))
            }
            Directive::Retract(pattern) => {
                let position = self
                    .facts
                    .iter()
                    .position(|fact| pattern.match_fact(fact).is_some());
                let answer = match position {
                    Some(i) => {
                        Arc::make_mut(&mut self.facts).remove(i);
                        "yes"
                    }
                    None => "no",
                };
                Ok(Box::new(ReadyStream::single(answer)))
            }
            Directive::Goal(goal) => self.answer_goal(goal),
        }
    }

    fn on_interrupt(&mut self, _state: &mut SessionState) {
        self.interrupts += 1;
        info!(count = self.interrupts, "Interrupt received");
    }

    fn persist_history(&mut self, entries: &[String]) -> Result<(), EngineError> {
        match &self.history {
            Some(file) => Ok(file.append(entries)?),
            None => Ok(()),
        }
    }
}

const HELP_TEXT: &str = r#"Directives:
  assert(f(a, b)).   add a fact
  retract(f(a, _)).  remove the first matching fact
  f(X, b).           ask a question; variables start with A-Z or _
  listing.           show all facts
  halt.              end the session"#;
