//! Register layout of the ATmega32 timer/counters.

use super::TimerId;
use crate::{
    error::Error,
    interval::{Mode, Width},
    pwm::{Polarity, PwmKind},
    regs::{Reg, Reg16, Registers},
    tick::Prescaler,
};

/// Clock select bits `CSn2:0`.
pub(super) const CS_MASK: u8 = 0b0000_0111;

/// Counter or compare register of either width.
#[derive(Clone, Copy)]
pub(super) enum Port {
    Byte(Reg),
    Word(Reg16),
}

impl Port {
    pub(super) fn write<R: Registers>(self, regs: &R, value: u16) {
        match self {
            Self::Byte(reg) => regs.write(reg, value as u8),
            Self::Word(reg) => regs.write16(reg, value),
        }
    }
}

/// Waveform generation plus compare output mode.
#[derive(Clone, Copy)]
pub(super) enum Waveform {
    Normal,
    Ctc,
    Pwm(PwmKind, Polarity),
}

pub(super) struct Layout {
    pub width: Width,
    pub counter: Port,
    pub compare: Port,
    /// Register holding the clock select bits.
    pub clock: Reg,
    /// `TIMSK`/`TIFR` bit of the overflow interrupt.
    pub overflow_bit: u8,
    /// `TIMSK`/`TIFR` bit of the compare match interrupt.
    pub compare_bit: u8,
    /// Highest compare value in PWM modes.
    pub pwm_top: u16,
}

impl Layout {
    pub(super) const fn irq_bit(&self, mode: Mode) -> u8 {
        match mode {
            Mode::Normal => self.overflow_bit,
            Mode::Ctc => self.compare_bit,
        }
    }

    pub(super) const fn irq_mask(&self) -> u8 {
        (1 << self.overflow_bit) | (1 << self.compare_bit)
    }
}

impl TimerId {
    pub(super) const fn layout(self) -> Layout {
        match self {
            #[cfg(feature = "timer0")]
            Self::Timer0 => Layout {
                width: Width::Bits8,
                counter: Port::Byte(Reg::Tcnt0),
                compare: Port::Byte(Reg::Ocr0),
                clock: Reg::Tccr0,
                overflow_bit: 0,
                compare_bit: 1,
                pwm_top: 0xFF,
            },
            #[cfg(feature = "timer1")]
            Self::Timer1 => Layout {
                width: Width::Bits16,
                counter: Port::Word(Reg16::Tcnt1),
                compare: Port::Word(Reg16::Ocr1a),
                clock: Reg::Tccr1b,
                overflow_bit: 2,
                compare_bit: 4,
                // 10-bit PWM
                pwm_top: 0x3FF,
            },
            #[cfg(feature = "timer2")]
            Self::Timer2 => Layout {
                width: Width::Bits8,
                counter: Port::Byte(Reg::Tcnt2),
                compare: Port::Byte(Reg::Ocr2),
                clock: Reg::Tccr2,
                overflow_bit: 6,
                compare_bit: 7,
                pwm_top: 0xFF,
            },
        }
    }

    /// `CSn2:0` value selecting `prescaler` on this timer.
    pub(super) const fn clock_select(self, prescaler: Prescaler) -> Result<u8, Error> {
        match self {
            #[cfg(feature = "timer2")]
            Self::Timer2 => Ok(match prescaler {
                Prescaler::Direct => 1,
                Prescaler::Div8 => 2,
                Prescaler::Div32 => 3,
                Prescaler::Div64 => 4,
                Prescaler::Div128 => 5,
                Prescaler::Div256 => 6,
                Prescaler::Div1024 => 7,
            }),
            #[allow(unreachable_patterns)]
            _ => match prescaler {
                Prescaler::Direct => Ok(1),
                Prescaler::Div8 => Ok(2),
                Prescaler::Div64 => Ok(3),
                Prescaler::Div256 => Ok(4),
                Prescaler::Div1024 => Ok(5),
                Prescaler::Div32 | Prescaler::Div128 => Err(Error::InvalidPrescaler),
            },
        }
    }

    /// Program the waveform generation and compare output bits.
    ///
    /// Clock select bits are left alone.
    pub(super) fn select_waveform<R: Registers>(self, regs: &R, waveform: Waveform) {
        match self {
            #[cfg(feature = "timer1")]
            Self::Timer1 => {
                // COM1A1:0 in bits 7:6, WGM11:10 in bits 1:0 of TCCR1A;
                // WGM13:12 in bits 4:3 of TCCR1B.
                let (a, b) = match waveform {
                    Waveform::Normal => (0, 0),
                    Waveform::Ctc => (0, 0b0_1000),
                    Waveform::Pwm(PwmKind::Fast, polarity) => {
                        ((polarity.com_bits() << 6) | 0b11, 0b0_1000)
                    }
                    Waveform::Pwm(PwmKind::PhaseCorrect, polarity) => {
                        ((polarity.com_bits() << 6) | 0b11, 0)
                    }
                };
                regs.set_field(Reg::Tccr1a, 0b1100_0011, a);
                regs.set_field(Reg::Tccr1b, 0b0001_1000, b);
            }
            #[allow(unreachable_patterns)]
            _ => {
                // WGMn0 in bit 6, COMn1:0 in bits 5:4, WGMn1 in bit 3.
                let bits = match waveform {
                    Waveform::Normal => 0,
                    Waveform::Ctc => 1 << 3,
                    Waveform::Pwm(PwmKind::Fast, polarity) => {
                        (1 << 6) | (polarity.com_bits() << 4) | (1 << 3)
                    }
                    Waveform::Pwm(PwmKind::PhaseCorrect, polarity) => {
                        (1 << 6) | (polarity.com_bits() << 4)
                    }
                };
                regs.set_field(self.layout().clock, 0b0111_1000, bits);
            }
        }
    }
}

#[cfg(all(test, feature = "timer0", feature = "timer1", feature = "timer2"))]
mod tests {
    use super::{CS_MASK, Waveform};
    use crate::{
        error::Error,
        pwm::{Polarity, PwmKind},
        regs::{Reg, RegisterFile, Registers},
        tick::Prescaler,
        timer::TimerId,
    };

    #[test]
    fn clock_select_codes() {
        assert_eq!(TimerId::Timer0.clock_select(Prescaler::Div1024), Ok(5));
        assert_eq!(TimerId::Timer1.clock_select(Prescaler::Div8), Ok(2));
        assert_eq!(TimerId::Timer2.clock_select(Prescaler::Div1024), Ok(7));
        assert_eq!(TimerId::Timer2.clock_select(Prescaler::Div32), Ok(3));
        assert_eq!(
            TimerId::Timer0.clock_select(Prescaler::Div128),
            Err(Error::InvalidPrescaler)
        );
        assert_eq!(
            TimerId::Timer1.clock_select(Prescaler::Div32),
            Err(Error::InvalidPrescaler)
        );
    }

    #[test]
    fn eight_bit_waveforms() {
        let regs = RegisterFile::new();
        regs.write(Reg::Tccr0, 0b0000_0101);

        TimerId::Timer0.select_waveform(&regs, Waveform::Ctc);
        assert_eq!(regs.read(Reg::Tccr0), 0b0000_1101);

        TimerId::Timer0.select_waveform(
            &regs,
            Waveform::Pwm(PwmKind::Fast, Polarity::NonInverted),
        );
        assert_eq!(regs.read(Reg::Tccr0), 0b0110_1101);

        TimerId::Timer0.select_waveform(
            &regs,
            Waveform::Pwm(PwmKind::PhaseCorrect, Polarity::Inverted),
        );
        assert_eq!(regs.read(Reg::Tccr0), 0b0111_0101);

        TimerId::Timer0.select_waveform(&regs, Waveform::Normal);
        assert_eq!(regs.read(Reg::Tccr0) & !CS_MASK, 0);
        assert_eq!(regs.read(Reg::Tccr2), 0);
    }

    #[test]
    fn sixteen_bit_waveforms() {
        let regs = RegisterFile::new();

        TimerId::Timer1.select_waveform(&regs, Waveform::Ctc);
        assert_eq!(regs.read(Reg::Tccr1a), 0);
        assert_eq!(regs.read(Reg::Tccr1b), 0b0000_1000);

        TimerId::Timer1.select_waveform(
            &regs,
            Waveform::Pwm(PwmKind::Fast, Polarity::NonInverted),
        );
        assert_eq!(regs.read(Reg::Tccr1a), 0b1000_0011);
        assert_eq!(regs.read(Reg::Tccr1b), 0b0000_1000);

        TimerId::Timer1.select_waveform(
            &regs,
            Waveform::Pwm(PwmKind::PhaseCorrect, Polarity::Inverted),
        );
        assert_eq!(regs.read(Reg::Tccr1a), 0b1100_0011);
        assert_eq!(regs.read(Reg::Tccr1b), 0);
    }
}
