// Interrupt handling
//
// Ctrl-C never unwinds the console. The signal handler (and the line editor,
// which sees Ctrl-C as a key while it owns the terminal) only raise a flag;
// the session services it at its next suspension point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT to this flag instead of terminating the process.
    ///
    /// Can only succeed once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.raise())?;
        debug!("Interrupt handler installed");
        Ok(())
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }
}
