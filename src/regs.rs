//! Register access surface.
//!
//! Drivers never touch memory directly: they name a register with [`Reg`] or
//! [`Reg16`] and go through a [`Registers`] implementation. On the target that
//! is [`Mmio`](crate::avr::Mmio); on the host it is a [`RegisterFile`].

use core::cell::Cell;

/// 8-bit I/O registers used by the drivers, named after the ATmega32 data sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    Sreg,
    Mcucr,
    Mcucsr,
    Gicr,
    Gifr,
    Timsk,
    Tifr,
    Tccr0,
    Tcnt0,
    Ocr0,
    Tccr1a,
    Tccr1b,
    Tccr2,
    Tcnt2,
    Ocr2,
}

impl Reg {
    /// Number of registers in the set.
    pub const COUNT: usize = Self::Ocr2 as usize + 1;
}

/// 16-bit timer 1 registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    Tcnt1,
    Ocr1a,
    Icr1,
}

impl Reg16 {
    pub const COUNT: usize = Self::Icr1 as usize + 1;
}

/// Global interrupt enable flag in `SREG`.
pub const SREG_I: u8 = 7;

/// Access to the memory-mapped register file.
///
/// Implementations provide byte and word access. The bit helpers are
/// read-modify-write sequences; callers that share a register with an
/// interrupt handler must run them inside a critical section.
pub trait Registers {
    /// Read the current value of `reg`.
    fn read(&self, reg: Reg) -> u8;

    /// Store `value` into `reg`.
    fn write(&self, reg: Reg, value: u8);

    /// Set bit `bit` of `reg`.
    fn set_bit(&self, reg: Reg, bit: u8) {
        self.write(reg, self.read(reg) | (1 << bit));
    }

    /// Clear bit `bit` of `reg`.
    fn clear_bit(&self, reg: Reg, bit: u8) {
        self.write(reg, self.read(reg) & !(1 << bit));
    }

    /// Test bit `bit` of `reg`.
    fn bit_is_set(&self, reg: Reg, bit: u8) -> bool {
        self.read(reg) & (1 << bit) != 0
    }

    /// Replace the bits selected by `mask` with the matching bits of `value`.
    fn set_field(&self, reg: Reg, mask: u8, value: u8) {
        self.write(reg, (self.read(reg) & !mask) | (value & mask));
    }

    /// Read a 16-bit register.
    fn read16(&self, reg: Reg16) -> u16;

    /// Write a 16-bit register.
    fn write16(&self, reg: Reg16, value: u16);

    /// Set the global interrupt enable flag.
    fn enable_interrupts(&self) {
        self.set_bit(Reg::Sreg, SREG_I);
    }
}

impl<R: Registers + ?Sized> Registers for &R {
    fn read(&self, reg: Reg) -> u8 {
        (**self).read(reg)
    }

    fn write(&self, reg: Reg, value: u8) {
        (**self).write(reg, value);
    }

    fn read16(&self, reg: Reg16) -> u16 {
        (**self).read16(reg)
    }

    fn write16(&self, reg: Reg16, value: u16) {
        (**self).write16(reg, value);
    }

    fn enable_interrupts(&self) {
        (**self).enable_interrupts();
    }
}

/// In-memory register file for running the drivers off-target.
///
/// Every register starts at zero, the power-on value of all registers the
/// drivers use.
pub struct RegisterFile {
    bytes: [Cell<u8>; Reg::COUNT],
    words: [Cell<u16>; Reg16::COUNT],
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: [const { Cell::new(0) }; Reg::COUNT],
            words: [const { Cell::new(0) }; Reg16::COUNT],
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers for RegisterFile {
    fn read(&self, reg: Reg) -> u8 {
        self.bytes[reg as usize].get()
    }

    fn write(&self, reg: Reg, value: u8) {
        self.bytes[reg as usize].set(value);
    }

    fn read16(&self, reg: Reg16) -> u16 {
        self.words[reg as usize].get()
    }

    fn write16(&self, reg: Reg16, value: u16) {
        self.words[reg as usize].set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{Reg, Reg16, RegisterFile, Registers, SREG_I};

    #[test]
    fn bit_helpers() {
        let regs = RegisterFile::new();
        regs.write(Reg::Tccr0, 0b1000_0001);

        regs.set_bit(Reg::Tccr0, 3);
        assert_eq!(regs.read(Reg::Tccr0), 0b1000_1001);
        assert!(regs.bit_is_set(Reg::Tccr0, 3));

        regs.clear_bit(Reg::Tccr0, 7);
        assert_eq!(regs.read(Reg::Tccr0), 0b0000_1001);

        regs.set_field(Reg::Tccr0, 0b0000_0111, 0b0000_0101);
        assert_eq!(regs.read(Reg::Tccr0), 0b0000_1101);
    }

    #[test]
    fn wide_registers_are_separate() {
        let regs = RegisterFile::new();
        regs.write16(Reg16::Ocr1a, 0x9C40);
        regs.write(Reg::Ocr0, 0x12);

        assert_eq!(regs.read16(Reg16::Ocr1a), 0x9C40);
        assert_eq!(regs.read16(Reg16::Tcnt1), 0);
        assert_eq!(regs.read16(Reg16::Icr1), 0);
        assert_eq!(regs.read(Reg::Ocr0), 0x12);
    }

    #[test]
    fn reset_state() {
        let regs = RegisterFile::new();
        assert!(!regs.bit_is_set(Reg::Sreg, SREG_I));
        assert_eq!(regs.read(Reg::Timsk), 0);

        regs.enable_interrupts();
        assert!(regs.bit_is_set(Reg::Sreg, SREG_I));
    }
}
