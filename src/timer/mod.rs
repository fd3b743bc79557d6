//! Timer/counter drivers.
//!
//! [`Timers`] drives every enabled timer from a fixed ladder of intervals with
//! a ÷1024 prescaler. [`Driver`] gives one timer to the application with a
//! selectable prescaler, arbitrary millisecond intervals and PWM output.
//!
//! Neither owns the interrupt vectors: the application routes each timer's
//! overflow and compare vectors to `on_overflow` and `on_compare`.

use ufmt::{Formatter, uDisplay, uWrite};

use crate::{callback::Line, error::Error, interval::Mode, pwm::PwmKind};

mod driver;
mod generic;
mod layout;
mod slot;

pub use driver::{Config, Driver, Instance, Usage};
#[cfg(feature = "timer0")]
pub use driver::{T0, Timer0};
#[cfg(feature = "timer1")]
pub use driver::{T1, Timer1};
pub use generic::Timers;

/// Timer/counter peripheral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerId {
    /// 8-bit `TC0`.
    #[cfg(feature = "timer0")]
    Timer0,
    /// 16-bit `TC1`, channel A.
    #[cfg(feature = "timer1")]
    Timer1,
    /// 8-bit `TC2`.
    #[cfg(feature = "timer2")]
    Timer2,
}

impl TimerId {
    /// Number of enabled timers.
    pub const COUNT: usize = cfg!(feature = "timer0") as usize
        + cfg!(feature = "timer1") as usize
        + cfg!(feature = "timer2") as usize;

    /// Every enabled timer, in order.
    pub const ALL: [Self; Self::COUNT] = [
        #[cfg(feature = "timer0")]
        Self::Timer0,
        #[cfg(feature = "timer1")]
        Self::Timer1,
        #[cfg(feature = "timer2")]
        Self::Timer2,
    ];
}

impl Line for TimerId {
    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for TimerId {
    type Error = Error;

    /// Timers are numbered as in the data sheet.
    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            #[cfg(feature = "timer0")]
            0 => Ok(Self::Timer0),
            #[cfg(feature = "timer1")]
            1 => Ok(Self::Timer1),
            #[cfg(feature = "timer2")]
            2 => Ok(Self::Timer2),
            _ => Err(Error::InvalidTimer),
        }
    }
}

impl uDisplay for TimerId {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(match self {
            #[cfg(feature = "timer0")]
            Self::Timer0 => "TC0",
            #[cfg(feature = "timer1")]
            Self::Timer1 => "TC1",
            #[cfg(feature = "timer2")]
            Self::Timer2 => "TC2",
        })
    }
}

/// Life cycle of one timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    /// Nothing written yet.
    Unconfigured,
    /// Interval loaded, clock stopped.
    Configured(Mode),
    /// Clock running, interrupts counting towards the interval.
    Running(Mode),
    /// Producing a PWM waveform; no timing interrupts.
    Pwm(PwmKind),
}

#[cfg(all(test, feature = "timer0", feature = "timer1", feature = "timer2"))]
mod tests {
    use super::TimerId;
    use crate::error::Error;

    #[test]
    fn ids_from_raw() {
        assert_eq!(TimerId::try_from(0), Ok(TimerId::Timer0));
        assert_eq!(TimerId::try_from(1), Ok(TimerId::Timer1));
        assert_eq!(TimerId::try_from(2), Ok(TimerId::Timer2));
        assert_eq!(TimerId::try_from(3), Err(Error::InvalidTimer));
        assert_eq!(TimerId::COUNT, 3);
        assert_eq!(TimerId::ALL, [TimerId::Timer0, TimerId::Timer1, TimerId::Timer2]);
    }
}
