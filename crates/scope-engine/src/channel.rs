//! Per-channel scope state.

use alloc::sync::Arc;

use scope_ir::{LoopMode, SampleData, SampleFormat, SyncTrigger};

use crate::frequency::{FRAC_BITS, FRAC_MASK};

/// Playable region of a triggered sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopGeometry {
    /// First position that is out of range (loop end when looping)
    pub sample_end: u32,
    pub loop_start: u32,
    pub loop_length: u32,
}

impl LoopGeometry {
    /// End of the loop region.
    pub fn loop_end(&self) -> u32 {
        self.loop_start + self.loop_length
    }
}

/// Resolve a position that ran to or past `sample_end`.
///
/// Returns the wrapped position, or `None` when the voice has ended.
/// Bidirectional loops reflect once at the end plus once per extra
/// completed loop length, toggling `backwards` accordingly.
#[inline]
pub fn wrap_overrun(mode: LoopMode, pos: u64, geom: &LoopGeometry, backwards: &mut bool) -> Option<u32> {
    match mode {
        LoopMode::Off => None,
        _ if geom.loop_length < 2 => Some(geom.loop_start),
        LoopMode::Forward => {
            let overflow = pos - geom.sample_end as u64;
            Some(geom.loop_start + (overflow % geom.loop_length as u64) as u32)
        }
        LoopMode::Bidirectional => {
            let overflow = pos - geom.sample_end as u64;
            let len = geom.loop_length as u64;
            let cycles = overflow / len;
            let phase = overflow % len;
            if cycles & 1 == 0 {
                *backwards = !*backwards;
            }
            Some(geom.loop_start + phase as u32)
        }
    }
}

/// Scope state for a single channel.
#[derive(Clone, Debug, Default)]
pub struct ChannelState {
    /// Is the channel producing a trace?
    pub active: bool,
    /// Sample being shown (owned by the audio engine, read-only here)
    pub sample: Option<Arc<SampleData>>,
    pub loop_mode: LoopMode,
    /// Current read position (whole samples)
    pub position: u32,
    /// Sub-sample part of the position (32 fraction bits)
    pub position_frac: u64,
    /// Per-tick position increment (32.32)
    pub delta: u64,
    /// Per-column draw increment (32.32)
    pub draw_delta: u64,
    pub sample_end: u32,
    pub loop_start: u32,
    pub loop_length: u32,
    /// Ping-pong direction, only meaningful for bidirectional loops
    pub sampling_backwards: bool,
    /// Has the position wrapped at least once since the trigger?
    pub has_looped: bool,
    /// Has the idle scope area been blanked already?
    pub was_cleared: bool,
    /// Trace amplitude (0-255)
    pub volume: u8,
    /// Last period received, kept to recompute deltas
    pub period: u32,
}

impl ChannelState {
    /// Create an idle channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start showing a voice. Returns false (and leaves the channel idle)
    /// if the sample is empty or the start position is past the end.
    pub fn trigger(&mut self, trigger: &SyncTrigger) -> bool {
        let len = u32::try_from(trigger.sample.len()).unwrap_or(u32::MAX);
        if len == 0 {
            self.stop();
            return false;
        }

        let loop_start = trigger.loop_start.min(len);
        let loop_length = trigger.loop_length.min(len - loop_start);
        let loop_mode = if loop_length == 0 { LoopMode::Off } else { trigger.loop_mode };
        let sample_end = match loop_mode {
            LoopMode::Off => len,
            _ => loop_start + loop_length,
        };

        if trigger.start_position >= sample_end {
            self.stop();
            return false;
        }

        self.sample = Some(trigger.sample.clone());
        self.loop_mode = loop_mode;
        self.loop_start = loop_start;
        self.loop_length = loop_length;
        self.sample_end = sample_end;
        self.position = trigger.start_position;
        self.position_frac = 0;
        self.sampling_backwards = false;
        self.has_looped = false;
        self.active = true;
        true
    }

    /// Go idle and release the sample reference.
    pub fn stop(&mut self) {
        self.active = false;
        self.sample = None;
        self.position = 0;
        self.position_frac = 0;
        self.sampling_backwards = false;
        self.has_looped = false;
    }

    /// Set the scope volume.
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }

    /// Store a new period with its tick and draw deltas.
    pub fn set_period(&mut self, period: u32, delta: u64, draw_delta: u64) {
        self.period = period;
        self.delta = delta;
        self.draw_delta = draw_delta;
    }

    /// Storage format of the current sample.
    pub fn format(&self) -> Option<SampleFormat> {
        self.sample.as_ref().map(|s| s.format())
    }

    /// Current loop region.
    pub fn geometry(&self) -> LoopGeometry {
        LoopGeometry {
            sample_end: self.sample_end,
            loop_start: self.loop_start,
            loop_length: self.loop_length,
        }
    }

    /// Advance by one logical tick.
    pub fn tick(&mut self) {
        if !self.active {
            return;
        }

        self.position_frac += self.delta;
        let whole = self.position_frac >> FRAC_BITS;
        self.position_frac &= FRAC_MASK;

        let pos = self.position as u64 + whole;
        if pos < self.sample_end as u64 {
            self.position = pos as u32;
            return;
        }

        let geom = self.geometry();
        match wrap_overrun(self.loop_mode, pos, &geom, &mut self.sampling_backwards) {
            Some(wrapped) => {
                self.position = wrapped;
                self.has_looped = true;
            }
            None => self.stop(),
        }
    }
}
