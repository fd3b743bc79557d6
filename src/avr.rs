use crate::{
    hal::pac::{CPU, EXINT, TC0, TC1, TC2},
    regs::{Reg, Reg16, Registers},
};

/// Peripheral registers of the running chip.
///
/// Goes through the `avr-device` register blocks, so `TC1` word accesses use
/// the ordering the `TEMP` latch needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mmio;

impl Registers for Mmio {
    #[inline(always)]
    fn read(&self, reg: Reg) -> u8 {
        // SAFETY: Register blocks are static; reads have no side effects on the
        // registers listed in `Reg`.
        let (cpu, exint, tc0, tc1, tc2) =
            unsafe { (&*CPU::ptr(), &*EXINT::ptr(), &*TC0::ptr(), &*TC1::ptr(), &*TC2::ptr()) };

        match reg {
            Reg::Sreg => cpu.sreg.read().bits(),
            Reg::Mcucr => cpu.mcucr.read().bits(),
            Reg::Mcucsr => cpu.mcucsr.read().bits(),
            Reg::Gicr => exint.gicr.read().bits(),
            Reg::Gifr => exint.gifr.read().bits(),
            Reg::Timsk => tc0.timsk.read().bits(),
            Reg::Tifr => tc0.tifr.read().bits(),
            Reg::Tccr0 => tc0.tccr0.read().bits(),
            Reg::Tcnt0 => tc0.tcnt0.read().bits(),
            Reg::Ocr0 => tc0.ocr0.read().bits(),
            Reg::Tccr1a => tc1.tccr1a.read().bits(),
            Reg::Tccr1b => tc1.tccr1b.read().bits(),
            Reg::Tccr2 => tc2.tccr2.read().bits(),
            Reg::Tcnt2 => tc2.tcnt2.read().bits(),
            Reg::Ocr2 => tc2.ocr2.read().bits(),
        }
    }

    #[inline(always)]
    fn write(&self, reg: Reg, value: u8) {
        // SAFETY: Callers hold a critical section or own the register; every
        // bit pattern is accepted by these registers.
        unsafe {
            let (cpu, exint, tc0, tc1, tc2) =
                (&*CPU::ptr(), &*EXINT::ptr(), &*TC0::ptr(), &*TC1::ptr(), &*TC2::ptr());

            match reg {
                Reg::Sreg => cpu.sreg.write(|w| w.bits(value)),
                Reg::Mcucr => cpu.mcucr.write(|w| w.bits(value)),
                Reg::Mcucsr => cpu.mcucsr.write(|w| w.bits(value)),
                Reg::Gicr => exint.gicr.write(|w| w.bits(value)),
                Reg::Gifr => exint.gifr.write(|w| w.bits(value)),
                Reg::Timsk => tc0.timsk.write(|w| w.bits(value)),
                Reg::Tifr => tc0.tifr.write(|w| w.bits(value)),
                Reg::Tccr0 => tc0.tccr0.write(|w| w.bits(value)),
                Reg::Tcnt0 => tc0.tcnt0.write(|w| w.bits(value)),
                Reg::Ocr0 => tc0.ocr0.write(|w| w.bits(value)),
                Reg::Tccr1a => tc1.tccr1a.write(|w| w.bits(value)),
                Reg::Tccr1b => tc1.tccr1b.write(|w| w.bits(value)),
                Reg::Tccr2 => tc2.tccr2.write(|w| w.bits(value)),
                Reg::Tcnt2 => tc2.tcnt2.write(|w| w.bits(value)),
                Reg::Ocr2 => tc2.ocr2.write(|w| w.bits(value)),
            };
        }
    }

    #[inline(always)]
    fn read16(&self, reg: Reg16) -> u16 {
        // SAFETY: As for `read`.
        let tc1 = unsafe { &*TC1::ptr() };

        match reg {
            Reg16::Tcnt1 => tc1.tcnt1.read().bits(),
            Reg16::Ocr1a => tc1.ocr1a.read().bits(),
            Reg16::Icr1 => tc1.icr1.read().bits(),
        }
    }

    #[inline(always)]
    fn write16(&self, reg: Reg16, value: u16) {
        // SAFETY: As for `write`.
        unsafe {
            let tc1 = &*TC1::ptr();

            match reg {
                Reg16::Tcnt1 => tc1.tcnt1.write(|w| w.bits(value)),
                Reg16::Ocr1a => tc1.ocr1a.write(|w| w.bits(value)),
                Reg16::Icr1 => tc1.icr1.write(|w| w.bits(value)),
            };
        }
    }

    fn enable_interrupts(&self) {
        // SAFETY: Called from configuration code, never from inside a critical section.
        unsafe { avr_device::interrupt::enable() }
    }
}
