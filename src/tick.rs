//! Tick-time calibration.
//!
//! A timer tick lasts `prescaler / cpu_hz` seconds. The ratio is kept exact
//! and tick counts are derived from it in integer arithmetic, so no rounding
//! error accumulates however many ticks an interval spans.

use core::num::NonZeroU32;

use ufmt::{Formatter, uDisplay, uWrite};

use crate::{error::Error, fixed::Fixed3};

/// Clock divider between the CPU clock and a timer counter.
///
/// `Div32` and `Div128` only exist on timer 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Direct,
    Div8,
    Div32,
    Div64,
    Div128,
    Div256,
    Div1024,
}

impl Prescaler {
    /// Division factor.
    #[must_use]
    pub const fn divisor(self) -> u16 {
        match self {
            Self::Direct => 1,
            Self::Div8 => 8,
            Self::Div32 => 32,
            Self::Div64 => 64,
            Self::Div128 => 128,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }
}

impl TryFrom<u16> for Prescaler {
    type Error = Error;

    /// Look up a prescaler by its division factor.
    fn try_from(divisor: u16) -> Result<Self, Error> {
        match divisor {
            1 => Ok(Self::Direct),
            8 => Ok(Self::Div8),
            32 => Ok(Self::Div32),
            64 => Ok(Self::Div64),
            128 => Ok(Self::Div128),
            256 => Ok(Self::Div256),
            1024 => Ok(Self::Div1024),
            _ => Err(Error::InvalidPrescaler),
        }
    }
}

/// Duration of one counter increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickTime {
    divisor: u16,
    cpu_hz: NonZeroU32,
}

impl TickTime {
    /// Tick duration for a counter clocked through `prescaler` from `cpu_hz`.
    #[must_use]
    pub const fn calibrate(prescaler: Prescaler, cpu_hz: NonZeroU32) -> Self {
        Self {
            divisor: prescaler.divisor(),
            cpu_hz,
        }
    }

    /// Tick duration in milliseconds.
    #[must_use]
    pub fn millis(self) -> f32 {
        f32::from(self.divisor) / self.cpu_hz.get() as f32 * 1000.0
    }

    /// Tick duration in milliseconds, truncated to microsecond resolution.
    #[must_use]
    pub const fn as_fixed(self) -> Fixed3 {
        let micros = self.divisor as u64 * 1_000_000 / self.cpu_hz.get() as u64;
        Fixed3::from_bits(micros as u32)
    }

    /// Whole ticks that fit into `millis`, rounded down.
    #[must_use]
    pub const fn ticks_in(self, millis: u32) -> u64 {
        let (num, den) = self.ratio(millis);
        num / den
    }

    /// Ticks closest to `millis`, halves rounded up.
    #[must_use]
    pub const fn ticks_in_rounded(self, millis: u32) -> u64 {
        let (num, den) = self.ratio(millis);
        let ticks = num / den;
        if (num % den) * 2 >= den { ticks + 1 } else { ticks }
    }

    const fn ratio(self, millis: u32) -> (u64, u64) {
        (
            millis as u64 * self.cpu_hz.get() as u64,
            1000 * self.divisor as u64,
        )
    }
}

impl uDisplay for TickTime {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        self.as_fixed().fmt(f)?;
        f.write_str(" ms")
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;

    use super::{Prescaler, TickTime};
    use crate::error::Error;

    const MHZ1: NonZeroU32 = NonZeroU32::new(1_000_000).unwrap();
    const MHZ8: NonZeroU32 = NonZeroU32::new(8_000_000).unwrap();

    #[test]
    fn tick_duration() {
        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ1);
        assert!((tick.millis() - 1.024).abs() < 1e-6);
        assert_eq!(tick.as_fixed().to_bits(), 1024);

        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ8);
        assert!((tick.millis() - 0.128).abs() < 1e-6);
        assert_eq!(tick.as_fixed().to_bits(), 128);

        let tick = TickTime::calibrate(Prescaler::Direct, MHZ8);
        assert_eq!(tick.as_fixed().to_bits(), 0);
        assert!((tick.millis() - 0.000_125).abs() < 1e-9);
    }

    #[test]
    fn calibration_is_deterministic() {
        let first = TickTime::calibrate(Prescaler::Div64, MHZ8);
        for _ in 0..10 {
            let again = TickTime::calibrate(Prescaler::Div64, MHZ8);
            assert_eq!(again, first);
            assert_eq!(again.millis().to_bits(), first.millis().to_bits());
        }
    }

    #[test]
    fn tick_counts() {
        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ1);
        // 100 / 1.024 = 97.66
        assert_eq!(tick.ticks_in(100), 97);
        assert_eq!(tick.ticks_in_rounded(100), 98);
        assert_eq!(tick.ticks_in(1), 0);
        assert_eq!(tick.ticks_in_rounded(1), 1);
        assert_eq!(tick.ticks_in(0), 0);

        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ8);
        // 250 / 0.128 = 1953.125
        assert_eq!(tick.ticks_in(250), 1953);
        assert_eq!(tick.ticks_in_rounded(250), 1953);
        // 5000 / 0.128 = 39062.5
        assert_eq!(tick.ticks_in(5000), 39062);
        assert_eq!(tick.ticks_in_rounded(5000), 39063);
    }

    #[test]
    fn large_intervals_do_not_overflow() {
        let tick = TickTime::calibrate(Prescaler::Direct, MHZ8);
        assert_eq!(tick.ticks_in(u32::MAX), u64::from(u32::MAX) * 8000);
    }

    #[test]
    fn prescaler_from_divisor() {
        assert_eq!(Prescaler::try_from(256), Ok(Prescaler::Div256));
        assert_eq!(Prescaler::try_from(1), Ok(Prescaler::Direct));
        assert_eq!(Prescaler::try_from(512), Err(Error::InvalidPrescaler));
        assert_eq!(Prescaler::try_from(0), Err(Error::InvalidPrescaler));
        for p in [Prescaler::Div8, Prescaler::Div32, Prescaler::Div128] {
            assert_eq!(Prescaler::try_from(p.divisor()), Ok(p));
        }
    }
}
