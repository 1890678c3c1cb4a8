//! Framer deadline on the embassy time driver
//!
//! Replaces the hardware one-shot timer: arming records an instant, and
//! the receive task races the next byte against it.

use embassy_time::{Duration, Instant};

use busmon_hal::DeadlineTimer;

/// One-shot deadline with a fixed period
#[derive(Debug, Clone, Copy)]
pub struct EmbassyDeadline {
    period: Duration,
    deadline: Option<Instant>,
}

impl EmbassyDeadline {
    /// Create a disarmed deadline with the given period
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Create a disarmed deadline from a period in microseconds
    pub const fn from_micros(period_us: u64) -> Self {
        Self::new(Duration::from_micros(period_us))
    }

    /// Instant the deadline fires at, if armed
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl DeadlineTimer for EmbassyDeadline {
    fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.period);
    }

    fn reload(&mut self) {
        self.start();
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}
