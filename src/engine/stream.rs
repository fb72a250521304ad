// Channel-fed solution producer
//
// Runs the engine's search on a worker thread that hands answers over a
// rendezvous channel, so the search only advances when the console asks for
// the next solution. The worker looks one answer ahead to know whether the
// answer it is handing over is the last one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use super::{Solution, SolutionStream};
use crate::error::EngineError;

pub struct ChannelStream {
    rx: Option<Receiver<Solution>>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl ChannelStream {
    /// Spawn a producer over `answers`.
    ///
    /// When `answers` yields nothing, `empty_answer` (if any) is sent as the
    /// single, last solution.
    pub fn spawn<I>(answers: I, empty_answer: Option<String>) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<Solution>(0);
        let cancelled = Arc::new(AtomicBool::new(false));
        let stop = cancelled.clone();
        let mut answers = answers.into_iter();

        let worker = thread::Builder::new()
            .name("solution-producer".to_string())
            .spawn(move || {
                let mut pending = match answers.next() {
                    Some(answer) => answer,
                    None => {
                        if let Some(answer) = empty_answer {
                            let _ = tx.send(Solution::last(answer));
                        }
                        return;
                    }
                };

                loop {
                    if stop.load(Ordering::SeqCst) {
                        debug!("Solution producer cancelled");
                        return;
                    }
                    let next = answers.next();
                    let is_last = next.is_none();
                    if tx.send(Solution::new(pending, is_last)).is_err() {
                        // Receiver dropped: the console abandoned the query
                        return;
                    }
                    match next {
                        Some(answer) => pending = answer,
                        None => return,
                    }
                }
            })
            .map_err(|e| EngineError::Fault(format!("failed to start solution producer: {}", e)))?;

        Ok(Self {
            rx: Some(rx),
            cancelled,
            worker: Some(worker),
            finished: false,
        })
    }

    /// Join the worker, reporting a panic inside it as a lost producer
    fn join_worker(&mut self) -> Result<(), EngineError> {
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| EngineError::ProducerLost),
            None => Ok(()),
        }
    }
}

impl SolutionStream for ChannelStream {
    fn next_solution(&mut self) -> Result<Option<Solution>, EngineError> {
        if self.finished {
            return Ok(None);
        }
        let received = match &self.rx {
            Some(rx) => rx.recv().ok(),
            None => None,
        };

        match received {
            Some(solution) => {
                if solution.is_last {
                    self.finished = true;
                    self.rx = None;
                    self.join_worker()?;
                }
                Ok(Some(solution))
            }
            None => {
                self.finished = true;
                self.rx = None;
                self.join_worker()?;
                Ok(None)
            }
        }
    }

    fn abandon(&mut self) {
        if self.worker.is_none() && self.rx.is_none() {
            return;
        }
        self.cancelled.store(true, Ordering::SeqCst);
        self.finished = true;
        // Dropping the receiver unblocks a producer waiting in `send`
        self.rx = None;
        if self.join_worker().is_err() {
            debug!("Solution producer panicked before it was abandoned");
        }
    }
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        self.abandon();
    }
}
