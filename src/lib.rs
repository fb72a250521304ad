// plconsole - interactive console for a logic-programming engine
// Library exports

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod logging;

// Scripted console and engine for this crate's tests; not part of the API
#[doc(hidden)]
pub mod testing;

pub use error::{EngineError, Result, SessionError};
