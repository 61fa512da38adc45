//! User-facing scope settings.

/// Interpolation used when reading between sample points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Direct lookup
    Nearest,
    /// Two-tap blend
    Linear,
    /// Four-tap cubic B-spline
    #[default]
    Cubic,
}

/// How note periods map to playback rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PeriodSystem {
    /// Periods linear in pitch (64 units per semitone, 768 per octave).
    #[default]
    Linear,
    /// Amiga periods, inversely proportional to frequency.
    Amiga,
}

/// Colours used by the rasterizer, in the surface's pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeStyle {
    pub foreground: u32,
    pub background: u32,
}

impl Default for ScopeStyle {
    fn default() -> Self {
        Self {
            foreground: 0xFFFF_FFFF,
            background: 0xFF00_0000,
        }
    }
}
