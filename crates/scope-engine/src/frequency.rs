//! Period-to-delta conversion for scope position stepping.
//!
//! Converts a tracker period into a 32.32 fixed-point per-step increment
//! for a given step rate. The engine keeps two sets of tables: one at
//! the 64 Hz tick rate (authoritative channel position) and one at the
//! draw rate (how far each scope column advances).

use alloc::vec::Vec;

use scope_ir::PeriodSystem;

use crate::error::ScopeError;

/// Fraction bits of channel positions and deltas.
pub const FRAC_BITS: u32 = 32;
pub const FRAC_ONE: u64 = 1 << FRAC_BITS;
pub const FRAC_MASK: u64 = FRAC_ONE - 1;

/// Playback rate of a sample at the reference period.
pub const C4_FREQ: u32 = 8363;

/// Linear period units per octave (64 per semitone).
pub const LINEAR_OCTAVE: u32 = 12 * 64;

/// Number of octaves covered by linear periods.
const LINEAR_OCTAVES: u32 = 10;

/// Highest linear period (lowest pitch).
pub const LINEAR_PERIOD_MAX: u32 = LINEAR_OCTAVES * LINEAR_OCTAVE;

/// Linear period that plays at exactly [`C4_FREQ`].
pub const LINEAR_C4_PERIOD: u32 = 6 * LINEAR_OCTAVE;

/// Amiga period (×4 resolution) that plays at exactly [`C4_FREQ`].
pub const AMIGA_C4_PERIOD: u32 = 1712;

/// Note number of C-4.
pub const C4_NOTE: u8 = 48;

/// Amiga periods for the octave starting at C-0, at ×4 resolution.
const AMIGA_OCTAVE_PERIODS: [u32; 12] = [
    27392, 25856, 24384, 23040, 21696, 20480, 19328, 18240, 17216, 16256, 15360, 14496,
];

/// Shift applied to the highest linear octave (quotient `LINEAR_OCTAVES - 1`).
const LINEAR_TOP_SHIFT: u32 = LINEAR_OCTAVES - 1;

/// Conversion tables for one step rate.
#[derive(Clone, Debug)]
pub struct DeltaTables {
    rate_hz: u32,
    /// Delta for each sub-octave remainder at the top linear octave.
    log_table: Vec<u64>,
    /// `C4_FREQ * AMIGA_C4_PERIOD` in 32.32 per step.
    amiga_dividend: u64,
}

impl DeltaTables {
    /// Build the tables for stepping `rate_hz` times per second.
    pub fn build(rate_hz: u32) -> Result<Self, ScopeError> {
        if rate_hz == 0 {
            return Err(ScopeError::InvalidRate(rate_hz));
        }

        let mut log_table = Vec::new();
        log_table
            .try_reserve_exact(LINEAR_OCTAVE as usize)
            .map_err(|_| ScopeError::OutOfMemory("period delta table"))?;

        // Remainder r at quotient q plays at C4_FREQ * 2^(r / 768 + q - 4);
        // the table stores the top octave (q = 9) so lower octaves are a shift.
        let c4_quotient = (LINEAR_PERIOD_MAX - LINEAR_C4_PERIOD) / LINEAR_OCTAVE;
        let top_octave = LINEAR_TOP_SHIFT as i32 - c4_quotient as i32;
        let step_scale = FRAC_ONE as f64 / rate_hz as f64;
        for r in 0..LINEAR_OCTAVE {
            let freq = C4_FREQ as f64 * libm::exp2(r as f64 / LINEAR_OCTAVE as f64 + top_octave as f64);
            log_table.push(libm::round(freq * step_scale) as u64);
        }

        let amiga_dividend =
            ((C4_FREQ as u128 * AMIGA_C4_PERIOD as u128 * FRAC_ONE as u128) / rate_hz as u128) as u64;

        Ok(Self {
            rate_hz,
            log_table,
            amiga_dividend,
        })
    }

    /// Step rate these tables were built for.
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }
}

/// Convert a period to a 32.32 per-step delta.
///
/// Period 0 yields 0: the channel holds its position.
pub fn period_to_delta(tables: &DeltaTables, system: PeriodSystem, period: u32) -> u64 {
    if period == 0 {
        return 0;
    }
    match system {
        PeriodSystem::Linear => {
            let inv = LINEAR_PERIOD_MAX.saturating_sub(period);
            let quotient = inv / LINEAR_OCTAVE;
            let remainder = inv % LINEAR_OCTAVE;
            let shift = LINEAR_TOP_SHIFT.wrapping_sub(quotient) & 31;
            tables.log_table[remainder as usize] >> shift
        }
        PeriodSystem::Amiga => tables.amiga_dividend / period as u64,
    }
}

/// Period for a note (C-4 = 48) with a finetune of -128..=127
/// (128 = one semitone). Returns 0 for notes that fall outside the
/// period range.
pub fn note_to_period(system: PeriodSystem, note: u8, finetune: i8) -> u32 {
    match system {
        PeriodSystem::Linear => {
            let offset = note as i32 * 64 + finetune as i32 / 2;
            let period = (LINEAR_C4_PERIOD + C4_NOTE as u32 * 64) as i32 - offset;
            if period <= 0 || period as u32 > LINEAR_PERIOD_MAX {
                0
            } else {
                period as u32
            }
        }
        PeriodSystem::Amiga => {
            let semitone = (note % 12) as usize;
            let octave = (note / 12) as u32;
            let base = AMIGA_OCTAVE_PERIODS[semitone] >> octave.min(31);
            if base == 0 {
                return 0;
            }
            // Finetune bends towards the neighbouring semitone.
            let neighbour = if finetune >= 0 {
                next_amiga_period(semitone, octave)
            } else {
                prev_amiga_period(semitone, octave)
            };
            let diff = neighbour as i64 - base as i64;
            let bent = base as i64 + diff * finetune.unsigned_abs() as i64 / 128;
            bent.max(1) as u32
        }
    }
}

fn next_amiga_period(semitone: usize, octave: u32) -> u32 {
    if semitone == 11 {
        AMIGA_OCTAVE_PERIODS[0] >> (octave + 1).min(31)
    } else {
        AMIGA_OCTAVE_PERIODS[semitone + 1] >> octave.min(31)
    }
}

fn prev_amiga_period(semitone: usize, octave: u32) -> u32 {
    if semitone == 0 {
        if octave == 0 {
            AMIGA_OCTAVE_PERIODS[0] * 2 - AMIGA_OCTAVE_PERIODS[1]
        } else {
            AMIGA_OCTAVE_PERIODS[11] >> (octave - 1)
        }
    } else {
        AMIGA_OCTAVE_PERIODS[semitone - 1] >> octave.min(31)
    }
}
