//! External interrupt lines `INT0`, `INT1` and `INT2`.

use crate::{
    callback::{Callback, CallbackTable, Line},
    error::Error,
    regs::{Reg, Registers},
};

/// External interrupt line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtInt {
    Int0,
    Int1,
    Int2,
}

impl ExtInt {
    pub const COUNT: usize = 3;

    /// Bit in `GICR` (enable) and `GIFR` (flag).
    const fn bit(self) -> u8 {
        match self {
            Self::Int0 => 6,
            Self::Int1 => 7,
            Self::Int2 => 5,
        }
    }
}

impl Line for ExtInt {
    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for ExtInt {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::Int0),
            1 => Ok(Self::Int1),
            2 => Ok(Self::Int2),
            _ => Err(Error::InvalidLine),
        }
    }
}

/// Condition that raises the interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    /// Pin held low. Fires repeatedly while it stays low.
    LowLevel,
    AnyChange,
    Falling,
    Rising,
}

impl Sense {
    /// `ISCn1:ISCn0` value.
    const fn isc_bits(self) -> u8 {
        match self {
            Self::LowLevel => 0b00,
            Self::AnyChange => 0b01,
            Self::Falling => 0b10,
            Self::Rising => 0b11,
        }
    }
}

impl TryFrom<u8> for Sense {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::LowLevel),
            1 => Ok(Self::AnyChange),
            2 => Ok(Self::Falling),
            3 => Ok(Self::Rising),
            _ => Err(Error::InvalidSense),
        }
    }
}

/// `ISC2` in `MCUCSR`.
const ISC2: u8 = 6;

/// External interrupt controller.
pub struct ExternalInterrupts<R> {
    regs: R,
    callbacks: CallbackTable<ExtInt, { ExtInt::COUNT }>,
}

impl<R: Registers> ExternalInterrupts<R> {
    #[must_use]
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            callbacks: CallbackTable::new(),
        }
    }

    /// Select what triggers `line` and enable it.
    ///
    /// Interrupts are also enabled globally, so this must not be called from
    /// inside a critical section.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSense`] for a level or any-change trigger on `INT2`,
    /// which only detects edges.
    pub fn init(&self, line: ExtInt, sense: Sense) -> Result<(), Error> {
        let (reg, mask, bits) = match (line, sense) {
            (ExtInt::Int0, _) => (Reg::Mcucr, 0b0011, sense.isc_bits()),
            (ExtInt::Int1, _) => (Reg::Mcucr, 0b1100, sense.isc_bits() << 2),
            (ExtInt::Int2, Sense::Falling) => (Reg::Mcucsr, 1 << ISC2, 0),
            (ExtInt::Int2, Sense::Rising) => (Reg::Mcucsr, 1 << ISC2, 1 << ISC2),
            (ExtInt::Int2, Sense::LowLevel | Sense::AnyChange) => return Err(Error::InvalidSense),
        };

        critical_section::with(|_| {
            // Changing the sense can raise a spurious flag.
            self.regs.clear_bit(Reg::Gicr, line.bit());
            self.regs.set_field(reg, mask, bits);
            self.regs.write(Reg::Gifr, 1 << line.bit());
            self.regs.set_bit(Reg::Gicr, line.bit());
        });
        self.regs.enable_interrupts();
        Ok(())
    }

    pub fn enable(&self, line: ExtInt) {
        critical_section::with(|_| self.regs.set_bit(Reg::Gicr, line.bit()));
    }

    pub fn disable(&self, line: ExtInt) {
        critical_section::with(|_| self.regs.clear_bit(Reg::Gicr, line.bit()));
    }

    pub fn is_enabled(&self, line: ExtInt) -> bool {
        self.regs.bit_is_set(Reg::Gicr, line.bit())
    }

    /// Register the function run when `line` fires.
    ///
    /// # Errors
    ///
    /// [`Error::NullCallback`] if `callback` is `None`.
    pub fn set_callback(&self, line: ExtInt, callback: Option<Callback>) -> Result<(), Error> {
        self.callbacks.register(line, callback)
    }

    /// Interrupt handler body for `line`.
    ///
    /// Runs the callback, then clears the line's flag so a bounce during the
    /// callback does not fire again.
    pub fn dispatch(&self, line: ExtInt) {
        self.callbacks.invoke(line);
        self.regs.write(Reg::Gifr, 1 << line.bit());
    }
}
