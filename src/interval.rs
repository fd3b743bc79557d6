//! Splitting a wall-clock interval into hardware periods.
//!
//! A counter only spans 256 or 65536 ticks, so longer intervals are built
//! from several interrupts. [`decompose`] picks the value loaded into the
//! counter (Normal mode) or compare register (CTC mode) and the number of
//! interrupts that make up one interval.

use ufmt::{Formatter, uDisplay, uWrite, uwrite};

use crate::{error::Error, tick::TickTime};

/// Interrupt source a timer is driven by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Free running; interrupts on overflow.
    Normal,
    /// Clear timer on compare match; interrupts on match.
    Ctc,
}

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Ctc),
            _ => Err(Error::InvalidMode),
        }
    }
}

impl uDisplay for Mode {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Ctc => "CTC",
        })
    }
}

/// Counter register width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    Bits8,
    Bits16,
}

impl Width {
    /// Number of distinct counter values.
    #[must_use]
    pub const fn capacity(self) -> u32 {
        match self {
            Self::Bits8 => 1 << 8,
            Self::Bits16 => 1 << 16,
        }
    }
}

/// Result of decomposing an interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Interrupt source the values below were computed for.
    pub mode: Mode,
    /// Normal: counter reload value. CTC: ticks per compare-match period;
    /// the compare register receives `preload - 1` since the counter also
    /// spends a tick at zero.
    pub preload: u16,
    /// Interrupts per interval, at least 1.
    pub tick_count: u32,
}

impl Schedule {
    /// Counter ticks covered by one full interval.
    #[must_use]
    pub fn span(&self, width: Width) -> u64 {
        match self.mode {
            Mode::Normal => {
                u64::from(self.tick_count) * u64::from(width.capacity())
                    - u64::from(self.preload)
            }
            Mode::Ctc => u64::from(self.tick_count) * u64::from(self.preload),
        }
    }
}

impl uDisplay for Schedule {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(
            f,
            "{} preload={} ticks={}",
            self.mode,
            self.preload,
            self.tick_count
        )
    }
}

/// Decompose `millis` for a counter of `width` ticking every `tick`.
///
/// Normal mode truncates to whole ticks; CTC mode rounds to the nearest.
///
/// # Errors
///
/// [`Error::InvalidInterval`] if the interval is shorter than one tick or
/// needs more interrupts than fit in a `u32`.
pub fn decompose(millis: u32, tick: TickTime, width: Width, mode: Mode) -> Result<Schedule, Error> {
    let raw = match mode {
        Mode::Normal => tick.ticks_in(millis),
        Mode::Ctc => tick.ticks_in_rounded(millis),
    };
    let raw = u32::try_from(raw).map_err(|_| Error::InvalidInterval)?;
    split(raw, width, mode)
}

/// Decompose an interval already expressed in counter ticks.
///
/// # Errors
///
/// [`Error::InvalidInterval`] if `raw_ticks` is zero.
pub fn split(raw_ticks: u32, width: Width, mode: Mode) -> Result<Schedule, Error> {
    if raw_ticks == 0 {
        return Err(Error::InvalidInterval);
    }

    let capacity = width.capacity();
    let (preload, tick_count) = match mode {
        Mode::Normal => {
            let remainder = raw_ticks % capacity;
            let mut tick_count = raw_ticks / capacity;
            // The partial period comes first and still raises an interrupt.
            if remainder > 0 {
                tick_count += 1;
            }
            ((capacity - remainder) % capacity, tick_count)
        }
        Mode::Ctc => {
            let divisor = compare_divisor(raw_ticks, capacity - 1);
            let tick_count = if raw_ticks % divisor == 0 {
                raw_ticks / divisor
            } else {
                let rounded = u32::from(raw_ticks % divisor >= divisor.div_ceil(2));
                (raw_ticks / divisor + rounded).max(1)
            };
            (divisor, tick_count)
        }
    };

    Ok(Schedule {
        mode,
        preload: preload as u16,
        tick_count,
    })
}

/// Largest divisor of `raw_ticks` in `2..=max`.
///
/// One tick needs divisor 1. Without any divisor in range `max` is returned
/// and the interval is only approximated.
fn compare_divisor(raw_ticks: u32, max: u32) -> u32 {
    if raw_ticks == 1 {
        return 1;
    }
    (2..=max.min(raw_ticks))
        .rev()
        .find(|d| raw_ticks % d == 0)
        .unwrap_or(max)
}

/// Interval from the fixed ladder of the generic timer driver.
///
/// Steps of 25 ms up to one second, then whole seconds up to six.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval(u8);

impl Interval {
    const STEP_MS: u32 = 25;

    pub const MS_25: Self = Self(1);
    pub const MS_50: Self = Self(2);
    pub const MS_75: Self = Self(3);
    pub const MS_100: Self = Self(4);
    pub const MS_125: Self = Self(5);
    pub const MS_150: Self = Self(6);
    pub const MS_175: Self = Self(7);
    pub const MS_200: Self = Self(8);
    pub const MS_225: Self = Self(9);
    pub const MS_250: Self = Self(10);
    pub const MS_275: Self = Self(11);
    pub const MS_300: Self = Self(12);
    pub const MS_325: Self = Self(13);
    pub const MS_350: Self = Self(14);
    pub const MS_375: Self = Self(15);
    pub const MS_400: Self = Self(16);
    pub const MS_425: Self = Self(17);
    pub const MS_450: Self = Self(18);
    pub const MS_475: Self = Self(19);
    pub const MS_500: Self = Self(20);
    pub const MS_525: Self = Self(21);
    pub const MS_550: Self = Self(22);
    pub const MS_575: Self = Self(23);
    pub const MS_600: Self = Self(24);
    pub const MS_625: Self = Self(25);
    pub const MS_650: Self = Self(26);
    pub const MS_675: Self = Self(27);
    pub const MS_700: Self = Self(28);
    pub const MS_725: Self = Self(29);
    pub const MS_750: Self = Self(30);
    pub const MS_775: Self = Self(31);
    pub const MS_800: Self = Self(32);
    pub const MS_825: Self = Self(33);
    pub const MS_850: Self = Self(34);
    pub const MS_875: Self = Self(35);
    pub const MS_900: Self = Self(36);
    pub const MS_925: Self = Self(37);
    pub const MS_950: Self = Self(38);
    pub const MS_975: Self = Self(39);
    pub const S_1: Self = Self(40);
    pub const S_2: Self = Self(80);
    pub const S_3: Self = Self(120);
    pub const S_4: Self = Self(160);
    pub const S_5: Self = Self(200);
    pub const S_6: Self = Self(240);

    /// Look up the ladder entry for `millis`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInterval`] if `millis` is not on the ladder.
    pub fn from_millis(millis: u32) -> Result<Self, Error> {
        if millis % Self::STEP_MS != 0 {
            return Err(Error::InvalidInterval);
        }
        let code = u8::try_from(millis / Self::STEP_MS).map_err(|_| Error::InvalidInterval)?;
        Self::try_from(code)
    }

    /// Ladder code, in units of 25 ms.
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Interval length in milliseconds.
    #[must_use]
    pub const fn millis(self) -> u32 {
        self.0 as u32 * Self::STEP_MS
    }
}

impl TryFrom<u8> for Interval {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Error> {
        match code {
            1..=40 | 80 | 120 | 160 | 200 | 240 => Ok(Self(code)),
            _ => Err(Error::InvalidInterval),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;

    use super::{Interval, Mode, Schedule, Width, decompose, split};
    use crate::{
        error::Error,
        tick::{Prescaler, TickTime},
    };

    const MHZ1: NonZeroU32 = NonZeroU32::new(1_000_000).unwrap();
    const MHZ8: NonZeroU32 = NonZeroU32::new(8_000_000).unwrap();

    fn schedule(mode: Mode, preload: u16, tick_count: u32) -> Schedule {
        Schedule {
            mode,
            preload,
            tick_count,
        }
    }

    #[test]
    fn normal_partial_period_first() {
        // 100 ms at 1.024 ms per tick: 97 ticks, one short period.
        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ1);
        assert_eq!(
            decompose(100, tick, Width::Bits8, Mode::Normal),
            Ok(schedule(Mode::Normal, 159, 1))
        );
    }

    #[test]
    fn normal_several_periods() {
        // 1 s at 0.128 ms per tick: 7812 ticks = 30 * 256 + 132.
        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ8);
        assert_eq!(
            decompose(1000, tick, Width::Bits8, Mode::Normal),
            Ok(schedule(Mode::Normal, 124, 31))
        );
        // 5 s on the 16-bit counter: 39062 ticks, a single short period.
        assert_eq!(
            decompose(5000, tick, Width::Bits16, Mode::Normal),
            Ok(schedule(Mode::Normal, 26474, 1))
        );
    }

    #[test]
    fn normal_whole_periods_need_no_preload() {
        assert_eq!(
            split(512, Width::Bits8, Mode::Normal),
            Ok(schedule(Mode::Normal, 0, 2))
        );
        assert_eq!(
            split(65536, Width::Bits16, Mode::Normal),
            Ok(schedule(Mode::Normal, 0, 1))
        );
    }

    #[test]
    fn normal_span_matches_requested_ticks() {
        for width in [Width::Bits8, Width::Bits16] {
            let capacity = width.capacity();
            for raw in (1..5000).chain([capacity - 1, capacity, capacity + 1, 3 * capacity + 7]) {
                let s = split(raw, width, Mode::Normal).unwrap();
                assert!(s.tick_count >= 1);
                assert!(u32::from(s.preload) < capacity);
                assert_eq!(s.span(width), u64::from(raw), "raw ticks {raw}");
            }
        }
    }

    #[test]
    fn ctc_picks_largest_divisor() {
        assert_eq!(
            split(100, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 100, 1))
        );
        assert_eq!(
            split(240, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 240, 1))
        );
        // 781 = 11 * 71
        assert_eq!(
            split(781, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 71, 11))
        );
        // 1953 = 9 * 217
        assert_eq!(
            split(1953, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 217, 9))
        );
        // 255 fits, 256 does not.
        assert_eq!(
            split(256, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 128, 2))
        );
        assert_eq!(
            split(39063, Width::Bits16, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 39063, 1))
        );
    }

    #[test]
    fn ctc_exact_spans() {
        for raw in 2..3000 {
            let s = split(raw, Width::Bits8, Mode::Ctc).unwrap();
            assert!(s.preload >= 2 && s.preload <= 255, "raw ticks {raw}");
            if u64::from(raw) % u64::from(s.preload) == 0 {
                assert_eq!(s.span(Width::Bits8), u64::from(raw));
            }
        }
    }

    #[test]
    fn ctc_without_divisor_approximates() {
        // 257 is prime.
        assert_eq!(
            split(257, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 255, 1))
        );
        // 263 is prime; 263 / 255 rounds to 1.
        let s = split(263, Width::Bits8, Mode::Ctc).unwrap();
        assert_eq!((s.preload, s.tick_count), (255, 1));
        // 2 * 257: only 2 divides in range.
        assert_eq!(
            split(514, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 2, 257))
        );
    }

    #[test]
    fn ctc_approximation_near_u32_max() {
        // 2^32 - 5 is prime.
        assert_eq!(
            split(4_294_967_291, Width::Bits8, Mode::Ctc),
            Ok(Schedule {
                mode: Mode::Ctc,
                preload: 255,
                tick_count: 16_843_009
            })
        );
        assert_eq!(
            split(4_294_967_291, Width::Bits16, Mode::Ctc),
            Ok(Schedule {
                mode: Mode::Ctc,
                preload: 65535,
                tick_count: 65537
            })
        );
    }

    #[test]
    fn ctc_single_tick() {
        assert_eq!(
            split(1, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 1, 1))
        );
    }

    #[test]
    fn ctc_rounds_to_nearest_tick() {
        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ8);
        // 5000 / 0.128 = 39062.5 -> 39063 = 3 * 29 * 449
        assert_eq!(
            decompose(5000, tick, Width::Bits8, Mode::Ctc),
            Ok(schedule(Mode::Ctc, 87, 449))
        );
    }

    #[test]
    fn rejects_sub_tick_intervals() {
        let tick = TickTime::calibrate(Prescaler::Div1024, MHZ1);
        assert_eq!(
            decompose(0, tick, Width::Bits8, Mode::Normal),
            Err(Error::InvalidInterval)
        );
        assert_eq!(
            decompose(0, tick, Width::Bits8, Mode::Ctc),
            Err(Error::InvalidInterval)
        );
        // Less than one tick truncates to zero.
        assert_eq!(
            decompose(1, tick, Width::Bits8, Mode::Normal),
            Err(Error::InvalidInterval)
        );
        assert_eq!(split(0, Width::Bits16, Mode::Ctc), Err(Error::InvalidInterval));
    }

    #[test]
    fn rejects_intervals_beyond_u32_ticks() {
        let tick = TickTime::calibrate(Prescaler::Direct, MHZ8);
        assert_eq!(
            decompose(u32::MAX, tick, Width::Bits16, Mode::Normal),
            Err(Error::InvalidInterval)
        );
    }

    #[test]
    fn ladder() {
        assert_eq!(Interval::MS_25.millis(), 25);
        assert_eq!(Interval::S_1.millis(), 1000);
        assert_eq!(Interval::S_6.millis(), 6000);
        assert_eq!(Interval::try_from(40), Ok(Interval::S_1));
        assert_eq!(Interval::try_from(0), Err(Error::InvalidInterval));
        assert_eq!(Interval::try_from(41), Err(Error::InvalidInterval));
        assert_eq!(Interval::try_from(241), Err(Error::InvalidInterval));
        assert_eq!(Interval::from_millis(3000), Ok(Interval::S_3));
        assert_eq!(Interval::from_millis(150), Ok(Interval::MS_150));
        assert_eq!(Interval::from_millis(1500), Err(Error::InvalidInterval));
        assert_eq!(Interval::from_millis(110), Err(Error::InvalidInterval));
        assert_eq!(Interval::from_millis(100_000), Err(Error::InvalidInterval));
    }

    #[test]
    fn mode_from_raw() {
        assert_eq!(Mode::try_from(0), Ok(Mode::Normal));
        assert_eq!(Mode::try_from(1), Ok(Mode::Ctc));
        assert_eq!(Mode::try_from(2), Err(Error::InvalidMode));
    }
}
