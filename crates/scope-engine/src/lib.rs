//! Oscilloscope engine for tracker channel displays.
//!
//! The audio thread reports voice triggers, volume and period changes
//! through a lock-free queue. The UI thread reconstructs each channel's
//! playback position at a fixed 64 Hz tick rate and rasterizes a short
//! stretch of the waveform per channel into a pixel buffer.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
pub mod clock;
mod config;
mod engine;
mod error;
pub mod frequency;
pub mod interpolation;
pub mod raster;
mod sync;

pub use channel::{wrap_overrun, ChannelState, LoopGeometry};
pub use clock::TickClock;
pub use config::{normalize_channel_count, ScopeConfig, DEFAULT_DRAW_RATE_HZ, MIN_CHANNELS};
pub use engine::ScopeEngine;
pub use error::ScopeError;
pub use frequency::{note_to_period, period_to_delta, DeltaTables};
pub use interpolation::CubicTable;
pub use raster::{scope_regions, RasterSurface, ScopeRegion};
pub use sync::{sync_channel, SyncReceiver, SyncSender, DEFAULT_QUEUE_CAPACITY};
