use std::thread::{self, JoinHandle};
use std::time::Instant;

use ocf::clock::ticks_to_duration;

use tracing::{debug, error, info};

use crate::error::{Error, ErrorKind, Result};
use crate::stack::Stack;
use crate::wake::{Wake, WakeSignal};

/// Name of the event loop thread.
pub const EVENT_THREAD_NAME: &str = "OCF event thread";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    // Polling the stack and waiting for its next event.
    Running,
    // A stop has been observed, the stack is being shut down.
    Stopping,
}

/// Counters collected while the event loop runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    /// Number of stack polls.
    pub polls: u64,
    /// Number of waits ended by an elapsed deadline.
    pub timeouts: u64,
    /// Number of waits ended by a signal.
    pub signals: u64,
}

/// An event loop driving a [`Stack`].
///
/// The loop polls the stack for the delay until its next scheduled event,
/// then sleeps until that deadline elapses or the [`WakeSignal`] is raised.
/// When the stack reports no scheduled event, the loop sleeps until it is
/// signaled.
///
/// Anything which may move the next deadline earlier must raise the
/// [`WakeSignal`], otherwise the loop oversleeps.
pub struct EventLoop<S> {
    stack: S,
    wake: WakeSignal,
    state: LoopState,
}

impl<S: Stack> EventLoop<S> {
    /// Creates an [`EventLoop`].
    #[must_use]
    pub const fn new(stack: S, wake: WakeSignal) -> Self {
        Self {
            stack,
            wake,
            state: LoopState::Running,
        }
    }

    /// Runs the loop on the current thread until a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack fails to initialize. In that case the
    /// loop never runs.
    pub fn run(mut self) -> Result<LoopReport> {
        if let Err(e) = self.stack.init() {
            error!("Failed to initialize the device stack");
            return Err(e);
        }

        info!("Event loop running");

        let mut report = LoopReport::default();
        while self.state == LoopState::Running {
            let next_event = self.stack.poll();
            report.polls += 1;

            let deadline = if next_event == 0 {
                None
            } else {
                // A deadline beyond the clock range is the same as none.
                Instant::now().checked_add(ticks_to_duration(next_event))
            };

            match self.wake.wait(deadline) {
                Wake::Signaled => report.signals += 1,
                Wake::TimedOut => report.timeouts += 1,
                Wake::Stop => self.state = LoopState::Stopping,
            }
        }

        debug!(
            "Event loop stopping after {} polls ({} timeouts, {} signals)",
            report.polls, report.timeouts, report.signals
        );

        self.stack.shutdown();

        info!("Event loop stopped");

        Ok(report)
    }
}

impl<S: Stack + Send + 'static> EventLoop<S> {
    /// Runs the loop on a new thread named [`EVENT_THREAD_NAME`].
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(self) -> Result<EventLoopHandle> {
        let wake = self.wake.clone();

        let thread = thread::Builder::new()
            .name(EVENT_THREAD_NAME.into())
            .spawn(move || self.run())
            .map_err(|e| Error::new(ErrorKind::Thread, e.to_string()))?;

        Ok(EventLoopHandle { wake, thread })
    }
}

/// A handle to an [`EventLoop`] running on its own thread.
#[derive(Debug)]
pub struct EventLoopHandle {
    wake: WakeSignal,
    thread: JoinHandle<Result<LoopReport>>,
}

impl EventLoopHandle {
    /// Requests the event loop to stop.
    ///
    /// The loop observes the request at its next wake, which happens
    /// immediately.
    pub fn stop(&self) {
        self.wake.request_stop();
    }

    /// Checks whether the event loop thread has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the event loop thread to finish.
    ///
    /// # Errors
    ///
    /// Returns the loop error, or an error if the thread panicked.
    pub fn join(self) -> Result<LoopReport> {
        self.thread
            .join()
            .map_err(|_| Error::new(ErrorKind::Thread, "Event loop thread panicked"))?
    }
}
