//! Master clock arithmetic
//!
//! All emulated timing is measured in master clock ticks. Clock ratios are
//! carried as signed 32.32 fixed point so that the per-frame arithmetic is
//! integer-only and bit-identical on every platform.
//!
//! Conversion from a floating multiplier rounds to nearest (ties away from
//! zero). Truncation would bias every derived ratio downwards and accumulate
//! into drift over long replays.

use crate::error::ClockError;
use crate::types::MasterCycles;

/// Number of fractional bits in a [`FixedClock`]
pub const FRACTION_BITS: u32 = 32;

const ONE_RAW: i64 = 1 << FRACTION_BITS;

/// Exclusive upper bound for a convertible multiplier (2^31)
pub const MAX_MULTIPLIER: f64 = (1u64 << 31) as f64;

/// Signed 32.32 fixed-point clock value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedClock(i64);

impl FixedClock {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(ONE_RAW);

    /// Wrap an already scaled raw value
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value, i.e. the true value times 2^32
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Exact rational `num / den`, rounded to nearest.
    ///
    /// Returns `None` when `den` is zero or the result does not fit.
    pub const fn from_ratio(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let scaled = (num as i128) << FRACTION_BITS;
        let raw = div_round(scaled, den as i128);
        if raw > i64::MAX as i128 || raw < i64::MIN as i128 {
            return None;
        }
        Some(Self(raw as i64))
    }

    /// Integer part plus fraction as a double
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / ONE_RAW as f64
    }

    /// Multiply by an integer tick count, rounding the product to nearest tick.
    pub fn mul_int(self, ticks: i64) -> i64 {
        let product = self.0 as i128 * ticks as i128;
        div_round(product, ONE_RAW as i128) as i64
    }
}

/// Round-to-nearest signed division, ties away from zero.
const fn div_round(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}

/// Convert a clock-rate multiplier to 32.32 fixed point.
///
/// `fixed(n) = round(n * 2^32)`. The product is exact in double precision for
/// every in-range input, so only the sub-2^-32 remainder is rounded.
pub fn master_clock_fixed(n: f64) -> Result<FixedClock, ClockError> {
    if !n.is_finite() {
        return Err(ClockError::NotFinite(n));
    }
    if n < 0.0 {
        return Err(ClockError::Negative(n));
    }
    if n >= MAX_MULTIPLIER {
        return Err(ClockError::OutOfRange(n));
    }
    let scaled = (n * ONE_RAW as f64).round();
    Ok(FixedClock(scaled as i64))
}

/// Master clock of an emulated system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz
    pub hz: FixedClock,
}

impl MasterClock {
    /// PC-FX master clock: 236.25 MHz / 11 (six times the NTSC colorburst)
    pub const PCFX: Self = match FixedClock::from_ratio(236_250_000, 11) {
        Some(hz) => Self { hz },
        None => panic!("PC-FX master clock out of range"),
    };

    pub const fn new(hz: FixedClock) -> Self {
        Self { hz }
    }

    /// Build from a frequency given in Hz
    pub fn from_hz(hz: f64) -> Result<Self, ClockError> {
        Ok(Self::new(master_clock_fixed(hz)?))
    }

    /// Cycles in one frame at `fps`, rounded to nearest.
    pub fn cycles_per_frame(&self, fps: FixedClock) -> Result<MasterCycles, ClockError> {
        if fps.raw() <= 0 {
            return Err(ClockError::ZeroDivisor);
        }
        Ok(div_round(self.hz.raw() as i128, fps.raw() as i128) as MasterCycles)
    }
}

/// Hands out per-frame cycle budgets whose running total never drifts.
///
/// After `n` frames the sum of everything returned by [`next_frame`] equals
/// `round(n * hz / fps)` exactly.
///
/// [`next_frame`]: FrameCycleAccumulator::next_frame
#[derive(Debug, Clone)]
pub struct FrameCycleAccumulator {
    hz: i128,
    fps: i128,
    frames: u64,
    emitted: i128,
}

impl FrameCycleAccumulator {
    pub fn new(clock: MasterClock, fps: FixedClock) -> Result<Self, ClockError> {
        if fps.raw() <= 0 {
            return Err(ClockError::ZeroDivisor);
        }
        Ok(Self {
            hz: clock.hz.raw() as i128,
            fps: fps.raw() as i128,
            frames: 0,
            emitted: 0,
        })
    }

    /// Cycle budget for the next frame
    pub fn next_frame(&mut self) -> MasterCycles {
        self.frames += 1;
        let total = div_round(self.frames as i128 * self.hz, self.fps);
        let cycles = total - self.emitted;
        self.emitted = total;
        cycles as MasterCycles
    }

    /// Frames handed out so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Total cycles handed out so far
    pub fn total_cycles(&self) -> MasterCycles {
        self.emitted as MasterCycles
    }

    pub fn reset(&mut self) {
        self.frames = 0;
        self.emitted = 0;
    }
}
