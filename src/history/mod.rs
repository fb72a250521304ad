// Command history
//
// `HistoryRecorder` keeps the queries of the current session in memory and
// hands them to the engine exactly once at shutdown. `HistoryFile` is the
// on-disk store the built-in engine persists them to.

mod recorder;
mod store;

pub use recorder::HistoryRecorder;
pub use store::HistoryFile;
