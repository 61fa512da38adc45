//! The scope engine: UI-side owner of all scope state.

use scope_ir::{Interpolation, PeriodSystem, ScopeStyle, SyncEntry, SyncStatus, MAX_CHANNELS};
use tracing::{debug, trace, warn};

use crate::channel::ChannelState;
use crate::clock::{TickClock, SCOPE_HZ};
use crate::config::{normalize_channel_count, ScopeConfig};
use crate::error::ScopeError;
use crate::frequency::{period_to_delta, DeltaTables};
use crate::interpolation::CubicTable;
use crate::raster::{RasterSurface, ScopePainter, ScopeRegion};
use crate::sync::{sync_channel, SyncReceiver, SyncSender};

/// Oscilloscope state for up to [`MAX_CHANNELS`] channels.
///
/// Lives on the UI thread. The audio thread only ever sees the
/// [`SyncSender`] returned by [`ScopeEngine::new`].
pub struct ScopeEngine {
    /// Active settings (channel count already normalized)
    config: ScopeConfig,
    /// Per-channel display state
    channels: [ChannelState; MAX_CHANNELS],
    /// Consumer half of the sync queue
    receiver: SyncReceiver,
    /// Wall clock → 64 Hz ticks
    clock: TickClock,
    /// Period conversion at the tick rate
    tick_tables: DeltaTables,
    /// Period conversion at the draw rate
    draw_tables: DeltaTables,
    /// Cubic B-spline coefficients
    cubic: CubicTable,
    /// Set by `stop_all`, applied by the next `update`
    stop_pending: bool,
}

impl ScopeEngine {
    /// Build an engine and the sender for the audio thread.
    ///
    /// `now_ns` is the current reading of the monotonic clock later
    /// passed to [`update`](Self::update).
    pub fn new(config: ScopeConfig, now_ns: u64) -> Result<(Self, SyncSender), ScopeError> {
        let config = config.normalized();
        let (sender, receiver) = sync_channel(config.queue_capacity)?;
        let cubic = CubicTable::build(config.interp_phases)?;
        let tick_tables = DeltaTables::build(SCOPE_HZ)?;
        let draw_tables = DeltaTables::build(config.draw_rate_hz)?;

        debug!(
            channels = config.channel_count,
            queue_capacity = config.queue_capacity,
            draw_rate_hz = config.draw_rate_hz,
            interpolation = ?config.interpolation,
            period_system = ?config.period_system,
            "scope engine created"
        );

        let engine = Self {
            config,
            channels: core::array::from_fn(|_| ChannelState::new()),
            receiver,
            clock: TickClock::new(now_ns),
            tick_tables,
            draw_tables,
            cubic,
            stop_pending: false,
        };
        Ok((engine, sender))
    }

    /// Apply queued entries and advance channel positions to `now_ns`.
    pub fn update(&mut self, now_ns: u64) {
        if self.stop_pending {
            self.stop_pending = false;
            for ch in &mut self.channels {
                ch.stop();
            }
            debug!("all scope channels stopped");
        }

        while let Some(entry) = self.receiver.pop() {
            self.apply(entry);
        }

        let dropped = self.receiver.take_dropped();
        if dropped > 0 {
            warn!(dropped, "scope sync queue overflowed");
        }

        let ticks = self.clock.advance(now_ns);
        for _ in 0..ticks {
            for ch in &mut self.channels {
                ch.tick();
            }
        }
    }

    fn apply(&mut self, entry: SyncEntry) {
        let Some(ch) = self.channels.get_mut(entry.channel as usize) else {
            trace!(channel = entry.channel, "discarding entry for out-of-range channel");
            return;
        };

        if entry.status.contains(SyncStatus::UPDATE_VOLUME) {
            ch.set_volume(entry.volume);
        }
        if entry.status.contains(SyncStatus::UPDATE_PERIOD) {
            let system = self.config.period_system;
            ch.set_period(
                entry.period,
                period_to_delta(&self.tick_tables, system, entry.period),
                period_to_delta(&self.draw_tables, system, entry.period),
            );
        }
        if entry.status.contains(SyncStatus::TRIGGER_VOICE) {
            if let Some(trigger) = &entry.trigger {
                if ch.trigger(trigger) {
                    trace!(channel = entry.channel, len = trigger.sample.len(), "voice triggered");
                } else {
                    trace!(channel = entry.channel, "trigger rejected, channel idle");
                }
            }
        }
    }

    /// Stop every channel at the start of the next [`update`](Self::update).
    ///
    /// Entries already queued are still applied after the stop.
    pub fn stop_all(&mut self) {
        self.stop_pending = true;
    }

    /// Draw the visible channels into `regions`, one region per channel.
    ///
    /// `mutes[i]` hides channel `i`; missing entries count as unmuted.
    pub fn draw(&mut self, surface: &mut RasterSurface, regions: &[ScopeRegion], mutes: &[bool]) {
        let painter = ScopePainter {
            table: &self.cubic,
            interpolation: self.config.interpolation,
            lined: self.config.lined,
            style: self.config.style,
        };

        let visible = self.channels.iter_mut().zip(regions).take(self.config.channel_count);
        for (i, (ch, region)) in visible.enumerate() {
            let muted = mutes.get(i).copied().unwrap_or(false);
            painter.paint(surface, region, ch, muted);
        }
    }

    /// Make every region repaint on the next draw, idle ones included.
    pub fn invalidate(&mut self) {
        for ch in &mut self.channels {
            ch.was_cleared = false;
        }
    }

    /// Restart the tick clock at `now_ns`, discarding owed ticks.
    pub fn reset_clock(&mut self, now_ns: u64) {
        self.clock.reset(now_ns);
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Channel `index`, if below [`MAX_CHANNELS`].
    pub fn channel(&self, index: usize) -> Option<&ChannelState> {
        self.channels.get(index)
    }

    /// Visible channels.
    pub fn channels(&self) -> &[ChannelState] {
        &self.channels[..self.config.channel_count]
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        debug!(?interpolation, "scope interpolation changed");
        self.config.interpolation = interpolation;
    }

    pub fn set_lined(&mut self, lined: bool) {
        debug!(lined, "scope line style changed");
        self.config.lined = lined;
    }

    pub fn set_style(&mut self, style: ScopeStyle) {
        self.config.style = style;
        self.invalidate();
    }

    /// Change the number of visible channels (clamped to 2-32, even).
    pub fn set_channel_count(&mut self, count: usize) {
        let count = normalize_channel_count(count);
        debug!(from = self.config.channel_count, to = count, "scope channel count changed");
        self.config.channel_count = count;
        self.invalidate();
    }

    /// Switch period interpretation, recomputing every channel's deltas.
    pub fn set_period_system(&mut self, system: PeriodSystem) {
        debug!(?system, "scope period system changed");
        self.config.period_system = system;
        self.recompute_deltas();
    }

    /// Change the draw step rate, recomputing every channel's draw delta.
    pub fn set_draw_rate(&mut self, rate_hz: u32) -> Result<(), ScopeError> {
        self.draw_tables = DeltaTables::build(rate_hz)?;
        self.config.draw_rate_hz = rate_hz;
        debug!(rate_hz, "scope draw rate changed");
        self.recompute_deltas();
        Ok(())
    }

    fn recompute_deltas(&mut self) {
        let system = self.config.period_system;
        for ch in &mut self.channels {
            let period = ch.period;
            ch.set_period(
                period,
                period_to_delta(&self.tick_tables, system, period),
                period_to_delta(&self.draw_tables, system, period),
            );
        }
    }
}
