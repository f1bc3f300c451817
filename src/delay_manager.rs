use std::thread;
use std::time::Duration;

/// Fixed pause after every offer page request, whatever the outcome.
#[derive(Debug, Clone, Copy)]
pub struct DelayManager {
    interval: Duration,
}

impl DelayManager {
    pub fn new(interval: Duration) -> Self {
        DelayManager { interval }
    }

    pub fn throttle(&self) {
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
    }
}
