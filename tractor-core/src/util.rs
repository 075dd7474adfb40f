//! Utilities shared by the controller and the transports.
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

/// Granularity at which interruptible waits poll the stop flag.
const POLL_SLICE: Duration = Duration::from_millis(50);

/// An external stop request, shared between the run loop, the transport and
/// the signal handler.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Creates a signal that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the signal was raised.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless the signal is raised first.
    ///
    /// Returns `false` if the wait was interrupted.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(POLL_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sleep_is_cut_short_by_a_raised_signal() {
        let signal = StopSignal::new();
        assert!(signal.sleep(Duration::from_millis(1)));

        let other = signal.clone();
        other.stop();
        let start = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
