//! Sample data as seen by the scopes.

use alloc::vec::Vec;

/// Sample audio data, shared read-only between the audio engine and the scopes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleData {
    /// 8-bit signed mono samples
    Pcm8(Vec<i8>),
    /// 16-bit signed mono samples
    Pcm16(Vec<i16>),
}

impl SampleData {
    /// Number of sample frames.
    pub fn len(&self) -> usize {
        match self {
            SampleData::Pcm8(v) => v.len(),
            SampleData::Pcm16(v) => v.len(),
        }
    }

    /// Returns true if there is no data.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage format of the data.
    pub fn format(&self) -> SampleFormat {
        match self {
            SampleData::Pcm8(_) => SampleFormat::Bits8,
            SampleData::Pcm16(_) => SampleFormat::Bits16,
        }
    }

    /// Sample at `pos` widened to 16-bit range. Out-of-range reads are silence.
    pub fn get(&self, pos: usize) -> i16 {
        match self {
            SampleData::Pcm8(v) => v.get(pos).copied().unwrap_or(0) as i16 * 256,
            SampleData::Pcm16(v) => v.get(pos).copied().unwrap_or(0),
        }
    }
}

/// Storage width of a sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    #[default]
    Bits8,
    Bits16,
}

/// Sample loop mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopMode {
    /// Play once
    #[default]
    Off,
    /// Repeat the loop region
    Forward,
    /// Ping-pong inside the loop region
    Bidirectional,
}
