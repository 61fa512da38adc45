//! Events sent from the audio thread to the scopes.

use alloc::sync::Arc;
use bitflags::bitflags;

use crate::sample::{LoopMode, SampleData};

bitflags! {
    /// What a [`SyncEntry`] updates.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SyncStatus: u8 {
        const UPDATE_VOLUME = 1 << 0;
        const UPDATE_PERIOD = 1 << 1;
        const TRIGGER_VOICE = 1 << 2;
    }
}

/// Voice start parameters carried by a trigger entry.
#[derive(Clone, Debug)]
pub struct SyncTrigger {
    /// Sample being played. The audio engine keeps its own reference alive.
    pub sample: Arc<SampleData>,
    pub loop_mode: LoopMode,
    /// Loop start (in samples)
    pub loop_start: u32,
    /// Loop length (in samples)
    pub loop_length: u32,
    /// Playback start offset (in samples)
    pub start_position: u32,
}

impl SyncTrigger {
    /// One-shot trigger from the start of `sample`.
    pub fn one_shot(sample: Arc<SampleData>) -> Self {
        Self {
            sample,
            loop_mode: LoopMode::Off,
            loop_start: 0,
            loop_length: 0,
            start_position: 0,
        }
    }

    /// Trigger with a loop region, starting at sample 0.
    pub fn looped(sample: Arc<SampleData>, loop_mode: LoopMode, loop_start: u32, loop_length: u32) -> Self {
        Self {
            sample,
            loop_mode,
            loop_start,
            loop_length,
            start_position: 0,
        }
    }
}

/// One audio → scope event for a channel.
#[derive(Clone, Debug, Default)]
pub struct SyncEntry {
    /// Target channel (0-31)
    pub channel: u8,
    pub status: SyncStatus,
    /// New scope volume (0-255), valid with `UPDATE_VOLUME`
    pub volume: u8,
    /// New period, valid with `UPDATE_PERIOD`
    pub period: u32,
    /// Voice parameters, present with `TRIGGER_VOICE`
    pub trigger: Option<SyncTrigger>,
}

impl SyncEntry {
    /// Volume change.
    pub fn volume(channel: u8, volume: u8) -> Self {
        Self {
            channel,
            status: SyncStatus::UPDATE_VOLUME,
            volume,
            ..Default::default()
        }
    }

    /// Period change.
    pub fn period(channel: u8, period: u32) -> Self {
        Self {
            channel,
            status: SyncStatus::UPDATE_PERIOD,
            period,
            ..Default::default()
        }
    }

    /// Voice trigger, carrying the volume and period it starts with.
    pub fn trigger(channel: u8, trigger: SyncTrigger, volume: u8, period: u32) -> Self {
        Self {
            channel,
            status: SyncStatus::TRIGGER_VOICE | SyncStatus::UPDATE_VOLUME | SyncStatus::UPDATE_PERIOD,
            volume,
            period,
            trigger: Some(trigger),
        }
    }

    /// Returns true if this entry starts a voice.
    pub fn is_trigger(&self) -> bool {
        self.status.contains(SyncStatus::TRIGGER_VOICE) && self.trigger.is_some()
    }
}
