//! Integration tests: sync queue → engine → rasterized frames.

use std::sync::Arc;

use scope_engine::clock::{MAX_CATCHUP_TICKS, NS_PER_TICK};
use scope_engine::frequency::FRAC_ONE;
use scope_engine::{
    note_to_period, period_to_delta, scope_regions, ChannelState, DeltaTables, RasterSurface, ScopeConfig,
    ScopeEngine, ScopeRegion,
};
use scope_ir::{Interpolation, LoopMode, PeriodSystem, SampleData, SyncEntry, SyncTrigger};
use scope_master::{frame_to_png, Controller, VoiceScript};

const T0: u64 = 1_000_000_000;

fn engine_with(config: ScopeConfig) -> (ScopeEngine, scope_engine::SyncSender) {
    ScopeEngine::new(config, T0).unwrap()
}

fn saw8(len: usize) -> Arc<SampleData> {
    Arc::new(SampleData::Pcm8((0..len).map(|i| (i * 255 / len) as i32 as i8).collect()))
}

// --- Channel stepping ---

#[test]
fn forward_loop_scenario() {
    // 100-sample 8-bit buffer, loop 50..100, 10 samples per tick.
    let mut ch = ChannelState::new();
    assert!(ch.trigger(&SyncTrigger::looped(saw8(100), LoopMode::Forward, 50, 50)));
    ch.delta = 10 * FRAC_ONE;

    for _ in 0..6 {
        ch.tick();
    }
    assert_eq!(ch.position, 60);

    for _ in 6..10 {
        ch.tick();
    }
    assert_eq!(ch.position, 50);
    assert!(ch.has_looped);

    ch.tick();
    assert_eq!(ch.position, 60);
}

#[test]
fn forward_loop_never_leaves_region() {
    let tables = DeltaTables::build(64).unwrap();
    let mut ch = ChannelState::new();
    assert!(ch.trigger(&SyncTrigger::looped(saw8(4000), LoopMode::Forward, 1000, 3000)));
    let delta = period_to_delta(&tables, PeriodSystem::Linear, note_to_period(PeriodSystem::Linear, 84, 0));
    ch.delta = delta;

    for _ in 0..10_000 {
        ch.tick();
        if ch.has_looped {
            assert!((1000..4000).contains(&ch.position));
        }
    }
    assert!(ch.has_looped);
}

// --- Queue → engine ---

#[test]
fn triggers_beyond_capacity_are_dropped() {
    let config = ScopeConfig {
        queue_capacity: 4,
        ..Default::default()
    };
    let (mut engine, mut tx) = engine_with(config);
    let sample = saw8(256);

    let accepted: Vec<bool> = (0..5u8)
        .map(|ch| tx.push(SyncEntry::trigger(ch, SyncTrigger::one_shot(sample.clone()), 255, 4608)))
        .collect();
    assert_eq!(accepted, vec![true, true, true, true, false]);

    engine.update(T0);
    for ch in 0..4 {
        assert!(engine.channel(ch).unwrap().active, "channel {}", ch);
    }
    assert!(!engine.channel(4).unwrap().active);
}

#[test]
fn later_entries_override_earlier_ones() {
    let (mut engine, mut tx) = engine_with(ScopeConfig::default());
    tx.push(SyncEntry::volume(0, 10));
    tx.push(SyncEntry::volume(0, 20));
    tx.push(SyncEntry::period(0, 5000));
    tx.push(SyncEntry::period(0, 4000));
    engine.update(T0);

    let ch = engine.channel(0).unwrap();
    assert_eq!(ch.volume, 20);
    assert_eq!(ch.period, 4000);
}

#[test]
fn stalled_ui_catches_up_gradually() {
    let (mut engine, mut tx) = engine_with(ScopeConfig::default());
    let sample = Arc::new(SampleData::Pcm16(vec![0; 1 << 22]));
    tx.push(SyncEntry::trigger(0, SyncTrigger::one_shot(sample), 255, 4608));
    engine.update(T0);
    let delta = engine.channel(0).unwrap().delta;

    let late = T0 + 10_000_000_000;
    engine.update(late);
    let capped = (MAX_CATCHUP_TICKS as u64 * delta) >> 32;
    assert_eq!(engine.channel(0).unwrap().position as u64, capped);

    engine.update(late);
    let twice = (2 * MAX_CATCHUP_TICKS as u64 * delta) >> 32;
    assert_eq!(engine.channel(0).unwrap().position as u64, twice);
}

#[test]
fn update_frequency_does_not_change_position() {
    let sample = Arc::new(SampleData::Pcm8(vec![0; 1 << 20]));
    let trigger = SyncEntry::trigger(0, SyncTrigger::one_shot(sample), 255, 3000);

    let (mut sparse, mut tx_a) = engine_with(ScopeConfig::default());
    let (mut dense, mut tx_b) = engine_with(ScopeConfig::default());
    tx_a.push(trigger.clone());
    tx_b.push(trigger);
    sparse.update(T0);
    dense.update(T0);

    let end = T0 + 5 * NS_PER_TICK + 7;
    sparse.update(end);
    let mut t = T0;
    while t < end {
        t = (t + 3_000_001).min(end);
        dense.update(t);
    }

    assert_eq!(sparse.channel(0).unwrap().position, dense.channel(0).unwrap().position);
    assert_eq!(sparse.channel(0).unwrap().position_frac, dense.channel(0).unwrap().position_frac);
}

#[test]
fn stop_all_clears_display_on_next_frame() {
    let (mut engine, mut tx) = engine_with(ScopeConfig {
        channel_count: 2,
        ..Default::default()
    });
    let trigger = SyncTrigger::looped(saw8(64), LoopMode::Forward, 0, 64);
    tx.push(SyncEntry::trigger(0, trigger, 255, 4608));
    engine.update(T0);

    let (w, h) = (64usize, 32usize);
    let regions = scope_regions(2, ScopeRegion::new(0, 0, w as u32, h as u32));
    let mut pixels = vec![0u32; w * h];
    engine.draw(&mut RasterSurface::new(&mut pixels, w, h, w), &regions, &[]);
    let fg = engine.config().style.foreground;
    assert!(pixels.iter().any(|&p| p == fg));

    engine.stop_all();
    engine.update(T0);
    engine.draw(&mut RasterSurface::new(&mut pixels, w, h, w), &regions, &[]);
    assert!(pixels.iter().all(|&p| p != fg));
}

#[test]
fn muted_channels_draw_nothing() {
    let (mut engine, mut tx) = engine_with(ScopeConfig {
        channel_count: 2,
        interpolation: Interpolation::Linear,
        ..Default::default()
    });
    for ch in 0..2u8 {
        let trigger = SyncTrigger::looped(saw8(64), LoopMode::Bidirectional, 8, 56);
        tx.push(SyncEntry::trigger(ch, trigger, 255, 4608));
    }
    engine.update(T0);

    let (w, h) = (65usize, 20usize);
    let regions = scope_regions(2, ScopeRegion::new(0, 0, w as u32, h as u32));
    let mut pixels = vec![0u32; w * h];
    engine.draw(&mut RasterSurface::new(&mut pixels, w, h, w), &regions, &[true, false]);

    let fg = engine.config().style.foreground;
    let left = &regions[0];
    let right = &regions[1];
    let lit_in = |r: &ScopeRegion| {
        (r.y as usize..(r.y as u32 + r.h) as usize)
            .flat_map(|y| (r.x as usize..(r.x as u32 + r.w) as usize).map(move |x| (x, y)))
            .filter(|&(x, y)| pixels[y * w + x] == fg)
            .count()
    };
    assert_eq!(lit_in(left), 0);
    assert!(lit_in(right) > 0);
}

// --- Controller ---

#[test]
fn offline_demo_renders_png_frames() {
    let config = ScopeConfig {
        channel_count: 4,
        ..Default::default()
    };
    let mut ctrl = Controller::new(config, 160, 48).unwrap();
    let script = VoiceScript::demo(4, PeriodSystem::Amiga);
    let fg = ctrl.engine().config().style.foreground;

    let mut lit_frames = 0;
    let mut pngs = Vec::new();
    ctrl.render_offline(&script, 30, 30, |i, frame| {
        if frame.pixels().iter().any(|&p| p == fg) {
            lit_frames += 1;
        }
        if i % 10 == 0 {
            pngs.push(frame_to_png(frame)?);
        }
        Ok(())
    })
    .unwrap();

    assert!(lit_frames > 20);
    assert_eq!(pngs.len(), 3);
    assert!(pngs.iter().all(|p| p.starts_with(b"\x89PNG")));
}
