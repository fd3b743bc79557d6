use core::num::NonZeroU32;

#[cfg(target_arch = "avr")]
pub use crate::hal::clock::Clock;

/// Board clock rate.
#[cfg(target_arch = "avr")]
pub type BoardClock = crate::hal::clock::MHz8;

#[cfg(target_arch = "avr")]
const BOARD_FREQ: u32 = BoardClock::FREQ;

#[cfg(not(target_arch = "avr"))]
const BOARD_FREQ: u32 = 8_000_000;

/// CPU frequency in Hz that every timer calculation is based on.
pub const CPU_FREQ_HZ: NonZeroU32 = match NonZeroU32::new(BOARD_FREQ) {
    Some(freq) => freq,
    None => panic!("CPU frequency can't be zero"),
};
