use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// The reason a [`WakeSignal::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Another thread signaled a state change.
    Signaled,
    /// The deadline elapsed.
    TimedOut,
    /// A stop has been requested.
    Stop,
}

#[derive(Debug, Default)]
struct WakeState {
    // A signal not yet consumed by a waiter.
    pending: bool,
    // Set once, never reset.
    stop: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<WakeState>,
    condvar: Condvar,
}

/// A deadline-or-signal wake primitive.
///
/// One thread waits until either a deadline elapses or another thread
/// signals it. Signals are latched: a signal raised while nobody is waiting
/// makes the next wait return immediately, so a state change that moves the
/// next deadline earlier can never be missed.
///
/// Cloning a [`WakeSignal`] returns a handle to the same primitive.
#[derive(Debug, Clone, Default)]
pub struct WakeSignal(Arc<Inner>);

impl WakeSignal {
    /// Creates a [`WakeSignal`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes the waiting thread.
    pub fn signal(&self) {
        let mut state = self.lock();
        state.pending = true;
        self.0.condvar.notify_one();
    }

    /// Requests a stop and wakes the waiting thread.
    ///
    /// Every following wait returns [`Wake::Stop`].
    pub fn request_stop(&self) {
        let mut state = self.lock();
        state.stop = true;
        self.0.condvar.notify_all();
    }

    /// Blocks until the `deadline` elapses, a signal arrives or a stop is
    /// requested.
    ///
    /// Without a deadline, the wait only ends on a signal or a stop.
    /// A stop request takes precedence over a pending signal.
    pub fn wait(&self, deadline: Option<Instant>) -> Wake {
        let state = self.lock();

        let mut state = match deadline {
            None => self
                .0
                .condvar
                .wait_while(state, |state| !state.pending && !state.stop)
                .unwrap_or_else(PoisonError::into_inner),
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                self.0
                    .condvar
                    .wait_timeout_while(state, timeout, |state| !state.pending && !state.stop)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };

        if state.stop {
            Wake::Stop
        } else if state.pending {
            state.pending = false;
            Wake::Signaled
        } else {
            Wake::TimedOut
        }
    }

    fn lock(&self) -> MutexGuard<'_, WakeState> {
        self.0.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
