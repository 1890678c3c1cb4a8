//! Watchdog abstraction

/// Independent watchdog that resets the system unless refreshed in time
pub trait Watchdog {
    /// Reload the watchdog counter
    fn refresh(&mut self);
}
