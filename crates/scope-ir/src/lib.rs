//! Shared data types for the tracker scope engine.
//!
//! Everything here crosses the audio/UI thread boundary or configures
//! the engine, so the types stay plain data with no behaviour beyond
//! accessors. Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod sample;
mod settings;
mod sync;

pub use sample::{LoopMode, SampleData, SampleFormat};
pub use settings::{Interpolation, PeriodSystem, ScopeStyle};
pub use sync::{SyncEntry, SyncStatus, SyncTrigger};

/// Maximum number of scope channels.
pub const MAX_CHANNELS: usize = 32;
