use crate::{
    clock::BoardClock,
    hal::{
        self,
        port::{self, PD0, PD1},
    },
};

/// Baud rate settings for the board clock, `U2X` included.
pub type Baudrate = avr_hal_generic::usart::Baudrate<BoardClock>;

/// The USART, used for output formatting through [`ufmt::uWrite`].
pub type Serial = hal::Usart<hal::pac::USART, PD0, PD1, BoardClock>;

/// Set up the USART for 8N1 at `baudrate`.
#[must_use]
pub fn new<IMODE: port::mode::InputMode>(
    p: hal::pac::USART,
    rx: port::Pin<port::mode::Input<IMODE>, PD0>,
    tx: port::Pin<port::mode::Output, PD1>,
    baudrate: u32,
) -> Serial {
    Serial::new(p, rx, tx, Baudrate::new(baudrate))
}
