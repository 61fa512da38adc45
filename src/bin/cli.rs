//! scope-cli: render tracker channel scopes to PNG frames.
//!
//! Usage:
//!   scope-cli --frames 120 --fps 60 --out frames/
//!   scope-cli --channels 4 --interp linear --dotted --realtime

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use scope_ir::{Interpolation, PeriodSystem};
use scope_master::{save_png, Controller, ScopeConfig, VoiceScript};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InterpArg {
    Nearest,
    Linear,
    Cubic,
}

impl From<InterpArg> for Interpolation {
    fn from(arg: InterpArg) -> Self {
        match arg {
            InterpArg::Nearest => Interpolation::Nearest,
            InterpArg::Linear => Interpolation::Linear,
            InterpArg::Cubic => Interpolation::Cubic,
        }
    }
}

#[derive(Parser)]
#[command(name = "scope-cli")]
#[command(about = "Render tracker channel oscilloscopes from a demo voice script")]
struct Args {
    /// Number of frames to render
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Channels shown (2-32, rounded down to even)
    #[arg(long, default_value_t = 8)]
    channels: usize,

    /// Interpolation between sample points
    #[arg(long, value_enum, default_value_t = InterpArg::Cubic)]
    interp: InterpArg,

    /// Draw dots instead of connected lines
    #[arg(long)]
    dotted: bool,

    /// Use Amiga periods instead of linear periods
    #[arg(long)]
    amiga: bool,

    /// Output directory for PNG frames
    #[arg(long, default_value = "scope-frames")]
    out: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Feed voices from a background thread against the wall clock
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.fps > 0, "--fps must be at least 1");

    let period_system = if args.amiga { PeriodSystem::Amiga } else { PeriodSystem::Linear };
    let config = ScopeConfig {
        interpolation: args.interp.into(),
        lined: !args.dotted,
        channel_count: args.channels,
        period_system,
        ..Default::default()
    }
    .normalized();

    let mut ctrl = Controller::new(config, args.width, args.height).context("failed to set up scopes")?;
    let script = VoiceScript::demo(config.channel_count, period_system);

    info!(
        frames = args.frames,
        fps = args.fps,
        channels = config.channel_count,
        out = %args.out.display(),
        "rendering"
    );

    if args.realtime {
        render_realtime(&mut ctrl, script, &args)?;
    } else {
        ctrl.render_offline(&script, args.frames, args.fps, |i, frame| save_png(&frame_path(&args.out, i), frame))
            .context("offline render failed")?;
    }

    info!("done");
    Ok(())
}

fn render_realtime(ctrl: &mut Controller, script: VoiceScript, args: &Args) -> Result<()> {
    ctrl.start_feeder(script)?;

    let start = Instant::now();
    for i in 0..args.frames {
        let due = start + Duration::from_nanos((i as u64).saturating_mul(1_000_000_000) / args.fps as u64);
        if let Some(wait) = due.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
        let frame = ctrl.render_now();
        save_png(&frame_path(&args.out, i), frame).with_context(|| format!("failed to write frame {}", i))?;
    }

    ctrl.stop_feeder();
    Ok(())
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{:05}.png", index))
}
