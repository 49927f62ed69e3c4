//! Busy-wait timing on top of a free-running counter.
//!
//! Nothing here yields: every wait spins the calling context. The tick
//! interrupt keeps preempting the spin, so servo PWM carries on during long
//! holds.

/// A free-running counter that can be restarted from zero.
pub trait CycleCounter {
    /// Restarts counting from zero.
    fn restart(&mut self);

    /// Counts since the last restart.
    fn elapsed(&mut self) -> u32;

    /// Counting rate in Hz.
    fn rate_hz(&self) -> u32;
}

/// A bounded wait ran out before its condition cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub struct Timeout;

/// Blocking delays and bounded polling.
pub struct BusyClock<C> {
    counter: C,
    counts_per_ms: u32,
}

impl<C: CycleCounter> BusyClock<C> {
    pub fn new(counter: C) -> Self {
        let counts_per_ms = (counter.rate_hz() / 1000).max(1);
        Self {
            counter,
            counts_per_ms,
        }
    }

    pub fn rate_hz(&self) -> u32 {
        self.counter.rate_hz()
    }

    pub fn restart(&mut self) {
        self.counter.restart();
    }

    pub fn elapsed(&mut self) -> u32 {
        self.counter.elapsed()
    }

    /// Spins for `ms` milliseconds, one restarted millisecond at a time.
    pub fn wait_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.counter.restart();
            while self.counter.elapsed() < self.counts_per_ms {}
        }
    }

    /// Spins while `busy` holds.
    ///
    /// The limit is compared against the counter as left by the last
    /// [`restart`](Self::restart), so several waits in a row can share one
    /// budget.
    pub fn spin_while(&mut self, limit: u32, mut busy: impl FnMut() -> bool) -> Result<(), Timeout> {
        while busy() {
            if self.counter.elapsed() > limit {
                return Err(Timeout);
            }
        }
        Ok(())
    }
}
