//! Timed sync entries standing in for an audio engine.

use std::f64::consts::TAU;
use std::sync::Arc;

use scope_engine::clock::NS_PER_TICK;
use scope_engine::note_to_period;
use scope_ir::{LoopMode, PeriodSystem, SampleData, SyncEntry, SyncTrigger};

/// One entry and the time (relative to the script start) it is sent.
#[derive(Clone, Debug)]
pub struct ScriptEvent {
    pub at_ns: u64,
    pub entry: SyncEntry,
}

/// A time-ordered list of sync entries.
#[derive(Clone, Debug, Default)]
pub struct VoiceScript {
    events: Vec<ScriptEvent>,
}

impl VoiceScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry at `at_ns`. Entries with equal times keep insertion order.
    pub fn push(&mut self, at_ns: u64, entry: SyncEntry) {
        let idx = self.events.partition_point(|e| e.at_ns <= at_ns);
        self.events.insert(idx, ScriptEvent { at_ns, entry });
    }

    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event.
    pub fn duration_ns(&self) -> u64 {
        self.events.last().map_or(0, |e| e.at_ns)
    }

    /// A few seconds of synthetic voices on `channel_count` channels.
    ///
    /// Channels cycle through a looped 16-bit sine, a looped 8-bit saw,
    /// a ping-pong 8-bit square and a one-shot 8-bit decaying noise
    /// burst. Each voice retriggers every two seconds with a new note,
    /// and gets a vibrato and a volume swell applied per tick.
    pub fn demo(channel_count: usize, system: PeriodSystem) -> Self {
        let sine = Arc::new(sine_wave(256));
        let saw = Arc::new(saw_wave(512));
        let square = Arc::new(square_wave(128));
        let noise = Arc::new(noise_burst(16000));

        let mut script = Self::new();
        let channels = channel_count.min(scope_ir::MAX_CHANNELS);
        const SECOND: u64 = 1_000_000_000;
        const NOTES: [u8; 8] = [36, 43, 48, 51, 55, 60, 41, 46];

        for ch in 0..channels {
            let start = ch as u64 * SECOND / 8;
            for round in 0..3u64 {
                let at = start + round * 2 * SECOND;
                let note = NOTES[(ch + round as usize * 3) % NOTES.len()];
                let period = note_to_period(system, note, 0);
                let trigger = match ch % 4 {
                    0 => SyncTrigger::looped(sine.clone(), LoopMode::Forward, 0, 256),
                    1 => SyncTrigger::looped(saw.clone(), LoopMode::Forward, 0, 512),
                    2 => SyncTrigger::looped(square.clone(), LoopMode::Bidirectional, 16, 112),
                    _ => SyncTrigger::one_shot(noise.clone()),
                };
                script.push(at, SyncEntry::trigger(ch as u8, trigger, 96, period));

                // One second of per-tick updates after each trigger.
                for tick in 1..64u64 {
                    let t = at + tick * NS_PER_TICK;
                    let swell = (96 + tick * 159 / 63) as u8;
                    script.push(t, SyncEntry::volume(ch as u8, swell));
                    let wobble = ((tick as f64 / 8.0 * TAU).sin() * 24.0) as i32;
                    let bent = (period as i32 + wobble).max(1) as u32;
                    script.push(t, SyncEntry::period(ch as u8, bent));
                }
            }
        }
        script
    }
}

fn sine_wave(len: usize) -> SampleData {
    SampleData::Pcm16(
        (0..len)
            .map(|i| ((i as f64 / len as f64 * TAU).sin() * 30000.0) as i16)
            .collect(),
    )
}

fn saw_wave(len: usize) -> SampleData {
    SampleData::Pcm8((0..len).map(|i| ((i * 256 / len) as i32 - 128) as i8).collect())
}

fn square_wave(len: usize) -> SampleData {
    SampleData::Pcm8((0..len).map(|i| if i < len / 2 { 100 } else { -100 }).collect())
}

fn noise_burst(len: usize) -> SampleData {
    let mut state: u32 = 0x1234_5678;
    SampleData::Pcm8(
        (0..len)
            .map(|i| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let decay = (len - i) as i32 * 256 / len as i32;
                ((state >> 24) as i8 as i32 * decay / 256) as i8
            })
            .collect(),
    )
}
