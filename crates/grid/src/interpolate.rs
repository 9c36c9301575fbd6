//! Client-side smoothing of counters between authoritative refreshes.
//!
//! The contract only tells us the cumulative mined amount as of the last
//! poll. Between polls the UI advances the counter locally at the last known
//! rate, once per second, and snaps back to the server value whenever a new
//! snapshot arrives. The local guess is never sent anywhere.

use alloy::primitives::U256;

/// Smoothly advancing view of a cumulative amount with a known per-second
/// rate.
///
/// `source` identifies the snapshot the base value came from (the poller's
/// version). Observing a new source resets the running value to the server's
/// base, even when it is numerically identical, discarding all local accrual.
/// The value is monotone between resets and may only jump backward on a
/// reset, because the authoritative value supersedes the local guess.
#[derive(Clone, Debug)]
pub struct Interpolator {
    value: U256,
    rate: U256,
    source: u64,
}

impl Interpolator {
    pub fn new(base: U256, rate: U256, source: u64) -> Self {
        Self {
            value: base,
            rate,
            source,
        }
    }

    /// Feeds a fresh snapshot. A no-op unless `source` changed.
    pub fn observe(&mut self, base: U256, rate: U256, source: u64) {
        if source != self.source {
            self.value = base;
            self.rate = rate;
            self.source = source;
        }
    }

    /// Advances the running value by one second worth of accrual.
    pub fn tick(&mut self) {
        if !self.rate.is_zero() {
            self.value = self.value.saturating_add(self.rate);
        }
    }

    pub fn value(&self) -> U256 {
        self.value
    }
}

/// Countdown for a slot's multiplier boost, initialized from the contract's
/// remaining seconds and decremented locally once per second.
#[derive(Clone, Copy, Debug)]
pub struct MultiplierCountdown {
    remaining: u64,
}

impl MultiplierCountdown {
    pub fn new(remaining_secs: u64) -> Self {
        Self {
            remaining: remaining_secs,
        }
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

/// Seconds since a slot was claimed. Zero for unclaimed slots
/// (`start_time == 0`) and for clocks that lag the chain.
pub fn elapsed_since(start_time: u64, now: u64) -> u64 {
    if start_time == 0 {
        return 0;
    }
    now.saturating_sub(start_time)
}
