// Error types for the console session and its engine collaborator

use thiserror::Error;

/// Faults raised by an engine while producing solutions or persisting history
#[derive(Debug, Error)]
pub enum EngineError {
    /// The background producer of a solution sequence went away mid-stream
    #[error("solution producer stopped unexpectedly")]
    ProducerLost,

    /// Engine-internal failure with a human-readable message
    #[error("{0}")]
    Fault(String),

    /// Reading or writing the command history failed
    #[error("command history: {0}")]
    History(#[from] std::io::Error),
}

/// Faults that end a session at the outermost boundary
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("line editor failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("engine fault: {0}")]
    Engine(#[from] EngineError),

    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// A panic unwound out of the session loop
    #[error("session panicked: {0}")]
    Panic(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl SessionError {
    /// Build a `Panic` error from a payload returned by `catch_unwind`
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        SessionError::Panic(msg)
    }
}
