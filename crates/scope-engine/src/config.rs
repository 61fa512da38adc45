//! Scope engine configuration.

use scope_ir::{Interpolation, PeriodSystem, ScopeStyle, MAX_CHANNELS};

use crate::interpolation::INTERP_PHASES;
use crate::sync::DEFAULT_QUEUE_CAPACITY;

/// Fewest channels a scope view shows.
pub const MIN_CHANNELS: usize = 2;

/// Default draw step rate: how many sample steps one scope column spans
/// per second of playback.
pub const DEFAULT_DRAW_RATE_HZ: u32 = 16384;

/// Engine settings fixed at construction or changed through the engine's setters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeConfig {
    /// Interpolation between sample points
    pub interpolation: Interpolation,
    /// Join columns with line segments instead of single dots
    pub lined: bool,
    /// Channels shown (2-32, even)
    pub channel_count: usize,
    /// Period interpretation for incoming entries
    pub period_system: PeriodSystem,
    /// Sync queue capacity in entries
    pub queue_capacity: usize,
    /// Step rate used for the draw accumulator
    pub draw_rate_hz: u32,
    /// Cubic table phases (power of two)
    pub interp_phases: usize,
    /// Trace colours
    pub style: ScopeStyle,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            lined: true,
            channel_count: 8,
            period_system: PeriodSystem::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            draw_rate_hz: DEFAULT_DRAW_RATE_HZ,
            interp_phases: INTERP_PHASES,
            style: ScopeStyle::default(),
        }
    }
}

impl ScopeConfig {
    /// Copy with `channel_count` clamped to 2-32 and rounded down to even.
    ///
    /// Queue capacity, draw rate and phase count are left alone; the
    /// engine rejects unusable values with an error instead.
    pub fn normalized(mut self) -> Self {
        self.channel_count = normalize_channel_count(self.channel_count);
        self
    }
}

/// Clamp a channel count to the displayable range.
pub fn normalize_channel_count(count: usize) -> usize {
    count.clamp(MIN_CHANNELS, MAX_CHANNELS) & !1
}
