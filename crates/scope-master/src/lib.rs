//! Headless controller for tracker channel scopes.
//!
//! Owns a scope engine and a framebuffer, and drives them either in real
//! time (with a feeder thread standing in for the audio callback) or
//! offline with a simulated clock. Shared by the CLI and the tests.

mod framebuffer;
mod script;
mod snapshot;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use scope_engine::{scope_regions, ScopeEngine, ScopeRegion, SyncSender};
use scope_ir::MAX_CHANNELS;
use thiserror::Error;
use tracing::{debug, info, warn};

// Re-export common types so callers don't need scope-engine directly.
pub use scope_engine::{ScopeConfig, ScopeError};

pub use framebuffer::Framebuffer;
pub use script::{ScriptEvent, VoiceScript};
pub use snapshot::{frame_to_png, save_png, write_png};

/// Longest single sleep of the feeder thread, so stop requests are seen promptly.
const FEEDER_POLL: Duration = Duration::from_millis(5);

#[derive(Debug, Error)]
pub enum MasterError {
    #[error(transparent)]
    Engine(#[from] ScopeError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("a feeder thread is already running")]
    FeederBusy,
    #[error("sync sender was lost when the feeder thread panicked")]
    SenderLost,
    #[error("frame rate must be non-zero")]
    InvalidFps,
}

/// Headless scope controller: owns the engine and manages the feeder.
pub struct Controller {
    engine: ScopeEngine,
    /// Held here while no feeder thread owns it
    sender: Option<SyncSender>,
    framebuffer: Framebuffer,
    regions: Vec<ScopeRegion>,
    mutes: [bool; MAX_CHANNELS],
    epoch: Instant,
    feeder: Option<FeederHandle>,
}

struct FeederHandle {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<SyncSender>>,
}

impl Controller {
    pub fn new(config: ScopeConfig, width: u32, height: u32) -> Result<Self, MasterError> {
        let (engine, sender) = ScopeEngine::new(config, 0)?;
        let framebuffer = Framebuffer::new(width, height, engine.config().style.background);
        let regions = scope_regions(engine.config().channel_count, Self::full_area(width, height));
        debug!(width, height, channels = regions.len(), "controller created");

        Ok(Self {
            engine,
            sender: Some(sender),
            framebuffer,
            regions,
            mutes: [false; MAX_CHANNELS],
            epoch: Instant::now(),
            feeder: None,
        })
    }

    fn full_area(width: u32, height: u32) -> ScopeRegion {
        ScopeRegion::new(0, 0, width, height)
    }

    // --- Accessors ---

    pub fn engine(&self) -> &ScopeEngine {
        &self.engine
    }

    /// Mutable engine access for live setting changes.
    pub fn engine_mut(&mut self) -> &mut ScopeEngine {
        &mut self.engine
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn regions(&self) -> &[ScopeRegion] {
        &self.regions
    }

    pub fn set_muted(&mut self, channel: usize, muted: bool) {
        if let Some(m) = self.mutes.get_mut(channel) {
            *m = muted;
        }
    }

    /// Sender for pushing entries by hand. `None` while a feeder runs.
    pub fn sender(&mut self) -> Option<&mut SyncSender> {
        self.sender.as_mut()
    }

    /// Nanoseconds since the controller was created.
    pub fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    // --- Real-time feeding ---

    /// Replay `script` from a background thread, starting now.
    pub fn start_feeder(&mut self, script: VoiceScript) -> Result<(), MasterError> {
        if self.is_feeding() {
            return Err(MasterError::FeederBusy);
        }
        self.stop_feeder();
        let sender = self.sender.take().ok_or(MasterError::SenderLost)?;

        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let stop = stop_signal.clone();
        let done = finished.clone();
        let epoch = self.epoch;
        let start_ns = self.now_ns();

        info!(events = script.len(), "starting voice feeder");
        let thread = std::thread::spawn(move || feeder_thread(sender, script, epoch, start_ns, stop, done));

        self.feeder = Some(FeederHandle {
            stop_signal,
            finished,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Stop the feeder thread (if any) and take the sender back.
    pub fn stop_feeder(&mut self) {
        if let Some(mut feeder) = self.feeder.take() {
            feeder.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = feeder.thread.take() {
                match handle.join() {
                    Ok(sender) => self.sender = Some(sender),
                    Err(_) => warn!("voice feeder thread panicked"),
                }
            }
        }
    }

    pub fn is_feeding(&self) -> bool {
        self.feeder
            .as_ref()
            .is_some_and(|f| !f.finished.load(Ordering::Relaxed))
    }

    // --- Rendering ---

    /// Update the engine to `now_ns` and redraw the framebuffer.
    pub fn render_frame(&mut self, now_ns: u64) -> &Framebuffer {
        self.engine.update(now_ns);

        let count = self.engine.config().channel_count;
        if self.regions.len() != count {
            self.regions = scope_regions(count, Self::full_area(self.framebuffer.width(), self.framebuffer.height()));
            self.framebuffer.fill(self.engine.config().style.background);
            self.engine.invalidate();
        }

        let mut surface = self.framebuffer.surface();
        self.engine.draw(&mut surface, &self.regions, &self.mutes);
        &self.framebuffer
    }

    /// Render at the current wall-clock time.
    pub fn render_now(&mut self) -> &Framebuffer {
        let now = self.now_ns();
        self.render_frame(now)
    }

    /// Render `frames` frames of `script` at `fps` with a simulated clock.
    ///
    /// Entries are pushed once their time has come, then the frame is
    /// rendered and handed to `on_frame`. No threads are involved, so the
    /// output is deterministic.
    pub fn render_offline<F>(&mut self, script: &VoiceScript, frames: usize, fps: u32, mut on_frame: F) -> Result<(), MasterError>
    where
        F: FnMut(usize, &Framebuffer) -> Result<(), MasterError>,
    {
        if fps == 0 {
            return Err(MasterError::InvalidFps);
        }
        if self.is_feeding() {
            return Err(MasterError::FeederBusy);
        }
        self.stop_feeder();
        let mut sender = self.sender.take().ok_or(MasterError::SenderLost)?;

        self.engine.reset_clock(0);
        let mut events = script.events().iter().peekable();
        let mut result = Ok(());

        for frame in 0..frames {
            let now = frame as u64 * 1_000_000_000 / fps as u64;
            while let Some(event) = events.next_if(|e| e.at_ns <= now) {
                sender.push(event.entry.clone());
            }
            self.render_frame(now);
            if let Err(e) = on_frame(frame, &self.framebuffer) {
                result = Err(e);
                break;
            }
        }

        self.sender = Some(sender);
        let now = self.now_ns();
        self.engine.reset_clock(now);
        result
    }

    /// Save the current framebuffer as a PNG file.
    pub fn write_png(&self, path: &Path) -> Result<(), MasterError> {
        save_png(path, &self.framebuffer)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_feeder();
    }
}

fn feeder_thread(
    mut sender: SyncSender,
    script: VoiceScript,
    epoch: Instant,
    start_ns: u64,
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
) -> SyncSender {
    'events: for event in script.events() {
        let due = start_ns + event.at_ns;
        loop {
            if stop_signal.load(Ordering::Relaxed) {
                break 'events;
            }
            let now = epoch.elapsed().as_nanos() as u64;
            if now >= due {
                break;
            }
            std::thread::sleep(Duration::from_nanos(due - now).min(FEEDER_POLL));
        }
        sender.push(event.entry.clone());
    }

    finished.store(true, Ordering::Relaxed);
    sender
}
