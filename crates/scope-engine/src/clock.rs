//! Fixed-rate tick clock.
//!
//! Reconciles wall-clock time with the 64 Hz logical tick rate that
//! drives channel positions. Leftover time below one tick carries over
//! to the next call, so how often the UI redraws only changes batching.

/// Logical ticks per second.
pub const SCOPE_HZ: u32 = 64;

/// Nanoseconds per logical tick.
pub const NS_PER_TICK: u64 = 1_000_000_000 / SCOPE_HZ as u64;

/// Most ticks run by a single update after a stall.
pub const MAX_CATCHUP_TICKS: u32 = 8;

/// Tracks the wall-clock time of the last tick boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickClock {
    last_update_ns: u64,
    ns_per_tick: u64,
    max_ticks: u32,
}

impl TickClock {
    /// Start a 64 Hz clock at `now_ns`.
    pub fn new(now_ns: u64) -> Self {
        Self::with_rate(now_ns, NS_PER_TICK, MAX_CATCHUP_TICKS)
    }

    /// Start a clock with an arbitrary tick length and catch-up cap.
    pub fn with_rate(now_ns: u64, ns_per_tick: u64, max_ticks: u32) -> Self {
        Self {
            last_update_ns: now_ns,
            ns_per_tick: ns_per_tick.max(1),
            max_ticks,
        }
    }

    /// Number of ticks to run at `now_ns`, consuming that much time.
    ///
    /// A stall longer than the catch-up cap runs only `max_ticks`; the
    /// rest stays pending and is worked off by later calls. A clock that
    /// goes backwards runs nothing.
    pub fn advance(&mut self, now_ns: u64) -> u32 {
        let elapsed = now_ns.saturating_sub(self.last_update_ns);
        let ticks = (elapsed / self.ns_per_tick).min(self.max_ticks as u64);
        self.last_update_ns += ticks * self.ns_per_tick;
        ticks as u32
    }

    /// Drop any pending time and restart at `now_ns`.
    pub fn reset(&mut self, now_ns: u64) {
        self.last_update_ns = now_ns;
    }

    /// Wall-clock time of the last consumed tick boundary.
    pub fn last_update_ns(&self) -> u64 {
        self.last_update_ns
    }

    /// Length of one tick in nanoseconds.
    pub fn ns_per_tick(&self) -> u64 {
        self.ns_per_tick
    }
}
