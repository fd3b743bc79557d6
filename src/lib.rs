//! Timer, PWM and external interrupt drivers for the ATmega32.
//!
//! Drivers talk to the chip through the [`Registers`](regs::Registers) trait:
//! `avr::Mmio` over the `avr-device` register blocks on the target,
//! [`RegisterFile`](regs::RegisterFile) anywhere else. Interrupt vectors
//! stay with the application, which forwards them to the drivers'
//! `on_*`/`dispatch` methods.
#![cfg_attr(not(test), no_std)]

#[cfg(target_arch = "avr")]
pub mod avr;
pub mod callback;
pub mod clock;
pub mod error;
pub mod exint;
pub mod fixed;
pub mod interval;
pub mod pwm;
pub mod regs;
#[cfg(target_arch = "avr")]
pub mod serial;
pub mod tick;
#[cfg(any(feature = "timer0", feature = "timer1", feature = "timer2"))]
pub mod timer;

#[cfg(target_arch = "avr")]
pub use atmega_hal as hal;

pub use callback::Callback;
pub use error::Error;
pub use interval::{Interval, Mode, Schedule};
pub use pwm::{DutyCycle, Polarity};
pub use tick::{Prescaler, TickTime};
