//! PWM configuration values.

use crate::error::Error;

/// Output compare pin behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Output set at compare match, cleared at the bottom.
    Inverted,
    /// Output cleared at compare match, set at the bottom.
    NonInverted,
}

impl Polarity {
    /// `COMx1:COMx0` field value.
    pub(crate) const fn com_bits(self) -> u8 {
        match self {
            Self::Inverted => 0b11,
            Self::NonInverted => 0b10,
        }
    }
}

impl TryFrom<u8> for Polarity {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::Inverted),
            1 => Ok(Self::NonInverted),
            _ => Err(Error::InvalidPwmPolarity),
        }
    }
}

/// Waveform shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwmKind {
    Fast,
    PhaseCorrect,
}

/// Duty cycle in whole percent, `1..=100`.
///
/// A 0 % duty cycle is not representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DutyCycle(u8);

impl DutyCycle {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(100);

    /// The percentage.
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Compare register value for a counter topping out at `top`, rounded
    /// to nearest.
    #[must_use]
    pub const fn compare_value(self, top: u16) -> u16 {
        ((self.0 as u32 * top as u32 + 50) / 100) as u16
    }
}

impl TryFrom<u8> for DutyCycle {
    type Error = Error;

    fn try_from(percent: u8) -> Result<Self, Error> {
        match percent {
            1..=100 => Ok(Self(percent)),
            _ => Err(Error::InvalidDutyCycle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DutyCycle, Polarity};
    use crate::error::Error;

    #[test]
    fn duty_cycle_range() {
        assert_eq!(DutyCycle::try_from(0), Err(Error::InvalidDutyCycle));
        assert_eq!(DutyCycle::try_from(101), Err(Error::InvalidDutyCycle));
        assert_eq!(DutyCycle::try_from(1), Ok(DutyCycle::MIN));
        assert_eq!(DutyCycle::try_from(100), Ok(DutyCycle::MAX));
    }

    #[test]
    fn compare_values() {
        let half = DutyCycle::try_from(50).unwrap();
        assert_eq!(half.compare_value(255), 128);
        assert_eq!(half.compare_value(1023), 512);
        assert_eq!(DutyCycle::MAX.compare_value(255), 255);
        assert_eq!(DutyCycle::MAX.compare_value(1023), 1023);
        assert_eq!(DutyCycle::MIN.compare_value(255), 3);
        assert_eq!(DutyCycle::try_from(25).unwrap().compare_value(255), 64);
    }

    #[test]
    fn polarity_from_raw() {
        assert_eq!(Polarity::try_from(0), Ok(Polarity::Inverted));
        assert_eq!(Polarity::try_from(1), Ok(Polarity::NonInverted));
        assert_eq!(Polarity::try_from(2), Err(Error::InvalidPwmPolarity));
    }
}
