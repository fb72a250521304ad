// Interactive session loop
//
// Starting -> Ready -> AwaitingQuery <-> Executing -> Halted
//
// Everything between Starting and Halted runs inside one failure boundary.
// Whatever way the loop ends, history is flushed exactly once afterwards.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use super::commands::{format_help, format_history, MetaCommand};
use super::console::Console;
use super::input::{read_query, QueryInput};
use super::pager::{page, PageEnd};
use super::signals::InterruptFlag;
use crate::config::Theme;
use crate::engine::{Engine, SessionState};
use crate::error::{Result, SessionError};
use crate::history::HistoryRecorder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Starting,
    Ready,
    AwaitingQuery,
    Executing,
    Halted,
}

/// How a session that did not fault came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The engine set its halt flag
    Halted,
    /// Standard input was exhausted
    EndOfInput,
}

pub struct Session<'a> {
    engine: &'a mut dyn Engine,
    console: &'a mut dyn Console,
    out: &'a mut dyn Write,
    theme: Theme,
    interrupts: InterruptFlag,
    install_handler: bool,
    history: HistoryRecorder,
    state: SessionState,
    phase: SessionPhase,
}

impl<'a> Session<'a> {
    pub fn new(
        engine: &'a mut dyn Engine,
        console: &'a mut dyn Console,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            engine,
            console,
            out,
            theme: Theme::Default,
            interrupts: InterruptFlag::new(),
            install_handler: false,
            history: HistoryRecorder::new(),
            state: SessionState::new(),
            phase: SessionPhase::Starting,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Share the flag the console raises on Ctrl-C
    pub fn with_interrupts(mut self, interrupts: InterruptFlag) -> Self {
        self.interrupts = interrupts;
        self
    }

    /// Install a process-wide SIGINT handler during startup
    pub fn with_signal_handler(mut self, install: bool) -> Self {
        self.install_handler = install;
        self
    }

    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Run the session to completion.
    ///
    /// Faults (including panics) from startup or the loop are returned after
    /// history has been flushed; a failure to persist history is only logged.
    pub fn run(&mut self) -> Result<SessionEnd> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_phases()))
            .unwrap_or_else(|payload| Err(SessionError::from_panic(payload)));

        if let Err(e) = self.history.flush(&mut *self.engine) {
            warn!("Failed to persist command history: {}", e);
        }
        if let Err(e) = self.theme.reset(&mut self.out) {
            debug!("Failed to reset terminal colors: {}", e);
        }

        match &outcome {
            Ok(end) => info!(?end, queries = self.history.len(), "Session ended"),
            Err(e) => warn!("Session ended by fault: {}", e),
        }
        outcome
    }

    fn run_phases(&mut self) -> Result<SessionEnd> {
        self.phase = SessionPhase::Starting;
        self.start()?;
        self.set_phase(SessionPhase::Ready);

        loop {
            self.set_phase(SessionPhase::AwaitingQuery);
            self.service_interrupts();
            if self.state.halted {
                return Ok(self.halt());
            }

            let prompt = self.engine.prompt();
            self.out.flush()?;
            let query = match read_query(&mut *self.console, &prompt, &mut self.history)? {
                QueryInput::Query(query) => query,
                QueryInput::EndOfInput => {
                    writeln!(self.out)?;
                    self.set_phase(SessionPhase::Halted);
                    return Ok(SessionEnd::EndOfInput);
                }
            };
            self.service_interrupts();
            if self.state.halted {
                debug!("Halt requested while reading, query not dispatched");
                return Ok(self.halt());
            }

            self.set_phase(SessionPhase::Executing);
            self.execute(query)?;
        }
    }

    fn halt(&mut self) -> SessionEnd {
        self.set_phase(SessionPhase::Halted);
        SessionEnd::Halted
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        debug!(from = ?self.phase, to = ?phase, "Session phase");
        self.phase = phase;
    }

    fn start(&mut self) -> Result<()> {
        self.theme.apply(&mut self.out)?;

        writeln!(self.out, "{}", self.engine.intro_text())?;
        writeln!(
            self.out,
            "\n--- Enter !! for command history, !help for console commands\n"
        )?;

        if self.install_handler {
            self.interrupts.install()?;
        }

        info!(theme = self.theme.name(), "Session started");
        Ok(())
    }

    /// Hand a pending interrupt to the engine
    fn service_interrupts(&mut self) {
        if self.interrupts.take() {
            info!("Forwarding interrupt to engine");
            self.engine.on_interrupt(&mut self.state);
        }
    }

    fn execute(&mut self, query: String) -> Result<()> {
        match MetaCommand::parse(&query) {
            Some(command) => self.run_meta(command),
            None => self.dispatch(query),
        }
    }

    fn dispatch(&mut self, query: String) -> Result<()> {
        self.state.query = query;
        let mut solutions = self.engine.solve(&mut self.state)?;

        let summary = page(
            solutions.as_mut(),
            &mut *self.console,
            &mut *self.out,
            &self.interrupts,
        )?;

        if summary.end == PageEnd::Interrupted {
            self.service_interrupts();
        }
        Ok(())
    }

    fn run_meta(&mut self, command: MetaCommand) -> Result<()> {
        debug!(?command, "Meta-command");
        match command {
            MetaCommand::History => {
                writeln!(self.out, "{}\n", format_history(&self.history))?;
            }
            MetaCommand::Help => {
                writeln!(self.out, "{}\n", format_help())?;
            }
            MetaCommand::Recall(n) => {
                let Some(entry) = self.history.get(n).map(str::to_string) else {
                    writeln!(self.out, "No history entry {}.\n", n)?;
                    return Ok(());
                };
                if MetaCommand::parse(&entry).is_some() {
                    writeln!(self.out, "History entry {} is itself a command.\n", n)?;
                    return Ok(());
                }

                writeln!(self.out, "{}", entry)?;
                if let Some(recorded) = self.history.record(&entry) {
                    self.console.add_history(recorded);
                }
                let mut query = entry;
                query.push('\n');
                self.dispatch(query)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedConsole, ScriptedEngine, CTRL_C};

    fn run_session(
        engine: &mut ScriptedEngine,
        console: &mut ScriptedConsole,
    ) -> (Result<SessionEnd>, Vec<String>, String) {
        let mut out = Vec::new();
        let (outcome, history) = {
            let mut session = Session::new(engine, console, &mut out);
            let outcome = session.run();
            assert_eq!(session.phase() == SessionPhase::Halted, outcome.is_ok());
            (outcome, session.history().entries().to_vec())
        };
        (outcome, history, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_banner_printed_first() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let (outcome, _, out) = run_session(&mut engine, &mut console);

        assert_eq!(outcome.unwrap(), SessionEnd::EndOfInput);
        assert!(out.starts_with(&engine.intro_text()));
        assert!(out.contains("Enter !! for command history"));
    }

    #[test]
    fn test_prompt_comes_from_engine() {
        let mut engine = ScriptedEngine::new().with_prompt("| ?- ");
        let mut console = ScriptedConsole::new(["a.", "b(", "c)."]);
        run_session(&mut engine, &mut console);
        assert_eq!(console.prompts(), &["| ?- ", "| ?- ", "|  ", "| ?- "]);
    }

    #[test]
    fn test_queries_reach_engine_with_terminators() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(["foo(X,", "Y)."]);
        run_session(&mut engine, &mut console);
        assert_eq!(engine.queries(), vec!["foo(X,\nY).\n".to_string()]);
    }

    #[test]
    fn test_halt_stops_before_more_input() {
        let mut engine = ScriptedEngine::new()
            .reply(Reply::answers(["yes"]))
            .reply(Reply::Halt);
        let mut console = ScriptedConsole::new(["a.", "halt.", "never."]);

        let (outcome, history, _) = run_session(&mut engine, &mut console);

        assert_eq!(outcome.unwrap(), SessionEnd::Halted);
        assert_eq!(history, vec!["a.", "halt."]);
        assert_eq!(console.remaining_lines(), 1);
        assert_eq!(engine.persist_calls(), 1);
    }

    #[test]
    fn test_end_of_input_never_dispatches() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(["partial(X,"]);
        let (outcome, history, _) = run_session(&mut engine, &mut console);

        assert_eq!(outcome.unwrap(), SessionEnd::EndOfInput);
        assert!(engine.queries().is_empty());
        assert!(history.is_empty());
        assert_eq!(engine.persist_calls(), 1);
        assert!(engine.persisted().is_empty());
    }

    #[test]
    fn test_history_command_is_local() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(["a.", "!!"]);
        let (_, history, out) = run_session(&mut engine, &mut console);

        assert_eq!(engine.queries(), vec!["a.\n".to_string()]);
        assert_eq!(history, vec!["a.", "!!"]);
        assert!(out.contains("1  a.\n2  !!\n"));
    }

    #[test]
    fn test_recall_redispatches() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(["p(X).", "!1", "!7", "!2"]);
        let (_, history, out) = run_session(&mut engine, &mut console);

        assert_eq!(engine.queries(), vec!["p(X).\n".to_string(), "p(X).\n".to_string()]);
        assert_eq!(history, vec!["p(X).", "!1", "p(X).", "!7", "!2"]);
        assert!(out.contains("No history entry 7."));
        assert!(out.contains("History entry 2 is itself a command."));
    }

    #[test]
    fn test_unknown_bang_line_goes_to_engine() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(["!consult foo"]);
        run_session(&mut engine, &mut console);
        assert_eq!(engine.queries(), vec!["!consult foo\n".to_string()]);
    }

    #[test]
    fn test_fault_is_returned_after_flush() {
        let mut engine = ScriptedEngine::new()
            .reply(Reply::answers(["yes"]))
            .reply(Reply::Fault("resource error".to_string()));
        let mut console = ScriptedConsole::new(["a.", "b.", "c."]);

        let (outcome, _, _) = run_session(&mut engine, &mut console);

        assert!(matches!(outcome, Err(SessionError::Engine(_))));
        assert_eq!(engine.persist_calls(), 1);
        assert_eq!(engine.persisted(), vec!["a.".to_string(), "b.".to_string()]);
        assert_eq!(console.remaining_lines(), 1);
    }

    #[test]
    fn test_panic_is_contained() {
        let mut engine = ScriptedEngine::new().reply(Reply::Panic("engine bug".to_string()));
        let mut console = ScriptedConsole::new(["a."]);

        let (outcome, _, _) = run_session(&mut engine, &mut console);

        assert!(matches!(outcome, Err(SessionError::Panic(ref m)) if m == "engine bug"));
        assert_eq!(engine.persist_calls(), 1);
    }

    #[test]
    fn test_interrupt_at_prompt_reaches_engine() {
        let interrupts = InterruptFlag::new();
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::from_events(vec![
            crate::cli::ReadResult::Line("a(".to_string()),
            crate::cli::ReadResult::Interrupted,
            crate::cli::ReadResult::Line(").".to_string()),
        ])
        .with_interrupts(interrupts.clone());
        let mut out = Vec::new();

        let mut session = Session::new(&mut engine, &mut console, &mut out)
            .with_interrupts(interrupts.clone());
        session.run().unwrap();
        drop(session);

        assert_eq!(engine.interrupts(), 1);
        // Serviced before dispatch, so the query was paged normally
        assert_eq!(engine.queries(), vec!["a(\n).\n".to_string()]);
        assert!(!interrupts.is_raised());
    }

    #[test]
    fn test_interrupt_can_request_halt() {
        let interrupts = InterruptFlag::new();
        let mut engine = ScriptedEngine::new().halt_on_interrupt();
        let mut console = ScriptedConsole::from_events(vec![
            crate::cli::ReadResult::Interrupted,
            crate::cli::ReadResult::Line("a.".to_string()),
            crate::cli::ReadResult::Line("b.".to_string()),
        ])
        .with_interrupts(interrupts.clone());
        let mut out = Vec::new();

        let outcome = Session::new(&mut engine, &mut console, &mut out)
            .with_interrupts(interrupts)
            .run();

        assert_eq!(outcome.unwrap(), SessionEnd::Halted);
        assert_eq!(engine.interrupts(), 1);
        // "a." was read but the engine halted before it could be dispatched
        assert!(engine.queries().is_empty());
        assert_eq!(console.remaining_lines(), 1);
    }

    #[test]
    fn test_pending_interrupt_halts_before_first_prompt() {
        let interrupts = InterruptFlag::new();
        interrupts.raise();
        let mut engine = ScriptedEngine::new().halt_on_interrupt();
        let mut console = ScriptedConsole::new(["a.", "b."]);
        let mut out = Vec::new();

        let outcome = Session::new(&mut engine, &mut console, &mut out)
            .with_interrupts(interrupts)
            .run();

        assert_eq!(outcome.unwrap(), SessionEnd::Halted);
        assert!(engine.queries().is_empty());
        assert!(console.prompts().is_empty());
        assert_eq!(console.remaining_lines(), 2);
    }

    #[test]
    fn test_halt_requested_at_more_prompt() {
        let interrupts = InterruptFlag::new();
        let mut engine = ScriptedEngine::new()
            .halt_on_interrupt()
            .reply(Reply::answers(["X = 1", "X = 2"]));
        let mut console = ScriptedConsole::new(["p(X).", "q."])
            .with_keys([CTRL_C])
            .with_interrupts(interrupts.clone());
        let mut out = Vec::new();

        let outcome = Session::new(&mut engine, &mut console, &mut out)
            .with_interrupts(interrupts)
            .run();

        assert_eq!(outcome.unwrap(), SessionEnd::Halted);
        assert_eq!(engine.queries(), vec!["p(X).\n".to_string()]);
        assert_eq!(engine.interrupts(), 1);
        assert_eq!(console.remaining_lines(), 1);
    }

    #[test]
    fn test_theme_applied_and_reset() {
        let mut engine = ScriptedEngine::new();
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let mut out = Vec::new();

        Session::new(&mut engine, &mut console, &mut out)
            .with_theme(Theme::Dark)
            .run()
            .unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("\x1b["));
        assert!(written.ends_with("\x1b[0m"));
    }
}
