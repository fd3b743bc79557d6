use ufmt::{Formatter, uDisplay, uWrite};

/// Errors reported by the configuration entry points.
///
/// Validation always happens before any register is written, so an `Err`
/// means the hardware and the driver state are exactly as they were.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Timer identifier outside the enabled set.
    InvalidTimer,
    /// Mode value outside {Normal, CTC}, or an operation that does not match
    /// the usage the driver was initialized for.
    InvalidMode,
    /// Duration outside the ladder, or too short for the tick resolution.
    InvalidInterval,
    /// Callback registration without a callback.
    NullCallback,
    /// Unknown clock divider, one the timer does not support, or a start
    /// before a prescaler was selected.
    InvalidPrescaler,
    /// Unknown PWM output polarity.
    InvalidPwmPolarity,
    /// Duty cycle outside `1..=100` percent (or the raw compare range).
    InvalidDutyCycle,
    /// External interrupt line outside `INT0..=INT2`.
    InvalidLine,
    /// Sense control the interrupt line cannot do.
    InvalidSense,
    /// The operation needs an earlier configuration call.
    NotConfigured,
}

impl Error {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTimer => "invalid timer",
            Self::InvalidMode => "invalid mode",
            Self::InvalidInterval => "invalid interval",
            Self::NullCallback => "null callback",
            Self::InvalidPrescaler => "invalid prescaler",
            Self::InvalidPwmPolarity => "invalid PWM polarity",
            Self::InvalidDutyCycle => "invalid duty cycle",
            Self::InvalidLine => "invalid interrupt line",
            Self::InvalidSense => "invalid sense control",
            Self::NotConfigured => "not configured",
        }
    }
}

impl uDisplay for Error {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.as_str())
    }
}

impl embedded_hal::pwm::Error for Error {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}
