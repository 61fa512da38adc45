//! Fractional-position sample interpolation.
//!
//! Kernels read taps around a 32.32 fixed-point position through a
//! [`TapSource`], so the same kernel works for every sample format and
//! loop mode. The cubic kernel uses a precomputed B-spline table: unlike
//! Catmull-Rom it never overshoots, which keeps traces inside their
//! scope area.

use alloc::vec::Vec;

use crate::error::ScopeError;
use crate::frequency::FRAC_BITS;

/// Default number of cubic table phases between two sample points.
pub const INTERP_PHASES: usize = 512;

/// Fixed-point scale of the interpolation coefficients (Q15).
pub const INTERP_SCALE_BITS: u32 = 15;
pub const INTERP_SCALE: i32 = 1 << INTERP_SCALE_BITS;

/// Fraction bits kept by the linear kernel.
const LINEAR_FRAC_BITS: u32 = 15;

/// Something that can produce the sample value at an integer index,
/// including indices just outside the playing region.
pub trait TapSource {
    fn tap(&self, index: i64) -> i32;
}

/// An interpolation kernel.
pub trait Kernel {
    /// Value at `base + frac / 2^32`.
    fn interpolate<T: TapSource>(&self, src: &T, base: i64, frac: u64) -> i32;
}

/// Direct lookup, fraction ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestKernel;

impl Kernel for NearestKernel {
    #[inline]
    fn interpolate<T: TapSource>(&self, src: &T, base: i64, _frac: u64) -> i32 {
        src.tap(base)
    }
}

/// Two-tap blend on the top 15 fraction bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearKernel;

impl Kernel for LinearKernel {
    #[inline]
    fn interpolate<T: TapSource>(&self, src: &T, base: i64, frac: u64) -> i32 {
        let a = src.tap(base);
        let b = src.tap(base + 1);
        let f = (frac >> (FRAC_BITS - LINEAR_FRAC_BITS)) as i32;
        a + (((b - a) * f) >> LINEAR_FRAC_BITS)
    }
}

/// Four-tap cubic B-spline blend.
#[derive(Clone, Copy, Debug)]
pub struct CubicKernel<'a> {
    table: &'a CubicTable,
}

impl<'a> CubicKernel<'a> {
    pub fn new(table: &'a CubicTable) -> Self {
        Self { table }
    }
}

impl Kernel for CubicKernel<'_> {
    #[inline]
    fn interpolate<T: TapSource>(&self, src: &T, base: i64, frac: u64) -> i32 {
        let c = self.table.coefficients(frac);
        let sum = src.tap(base - 1) * c[0] as i32
            + src.tap(base) * c[1] as i32
            + src.tap(base + 1) * c[2] as i32
            + src.tap(base + 2) * c[3] as i32;
        sum >> INTERP_SCALE_BITS
    }
}

/// Precomputed cubic B-spline coefficients, `phases × 4` in Q15.
#[derive(Clone, Debug)]
pub struct CubicTable {
    coeffs: Vec<[i16; 4]>,
    /// Right shift turning a 32-bit fraction into a phase index.
    phase_shift: u32,
}

impl CubicTable {
    /// Build a table with `phases` subdivisions of the unit interval.
    ///
    /// The centre tap absorbs rounding so every row sums to exactly
    /// [`INTERP_SCALE`]; a constant signal therefore passes unchanged.
    pub fn build(phases: usize) -> Result<Self, ScopeError> {
        if phases == 0 || !phases.is_power_of_two() || phases.trailing_zeros() > FRAC_BITS {
            return Err(ScopeError::InvalidPhases(phases));
        }

        let mut coeffs = Vec::new();
        coeffs
            .try_reserve_exact(phases)
            .map_err(|_| ScopeError::OutOfMemory("cubic interpolation table"))?;

        let scale = INTERP_SCALE as f64;
        for i in 0..phases {
            let t = i as f64 / phases as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let u = 1.0 - t;

            let w0 = u * u * u / 6.0;
            let w2 = (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0;
            let w3 = t3 / 6.0;

            let c0 = libm::round(w0 * scale) as i32;
            let c2 = libm::round(w2 * scale) as i32;
            let c3 = libm::round(w3 * scale) as i32;
            let c1 = INTERP_SCALE - c0 - c2 - c3;

            coeffs.push([c0 as i16, c1 as i16, c2 as i16, c3 as i16]);
        }

        Ok(Self {
            coeffs,
            phase_shift: FRAC_BITS - phases.trailing_zeros(),
        })
    }

    /// Number of phases.
    pub fn phases(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient row for a phase index.
    pub fn row(&self, phase: usize) -> [i16; 4] {
        self.coeffs[phase]
    }

    /// Coefficient row for a 32-bit fraction.
    #[inline]
    pub fn coefficients(&self, frac: u64) -> [i16; 4] {
        let phase = ((frac >> self.phase_shift) as usize) & (self.coeffs.len() - 1);
        self.coeffs[phase]
    }
}
