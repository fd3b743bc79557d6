//! Demo firmware: a blinking LED on timer 0, a heartbeat on timer 2, and an
//! LED dimmed by timer 1 PWM that steps up on every press of the `INT0`
//! button. Progress is reported over the USART.
#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use core::cell::{Cell, RefCell};

    use atmega_mcal::{
        DutyCycle, Error, Interval, Mode, Polarity, Prescaler,
        avr::Mmio,
        exint::{ExtInt, ExternalInterrupts, Sense},
        hal::{
            self,
            port::{PB0, Pin, mode::Output},
        },
        serial::{self, Serial},
        timer::{Config, Timer1, TimerId, Timers, Usage},
    };
    use critical_section::Mutex;
    use panic_halt as _;
    use ufmt::uwriteln;

    /// UART baud rate.
    const BAUDRATE: u32 = 9600;

    /// Brightness change per button press, in percent.
    const DIM_STEP: u8 = 10;

    static TIMERS: Timers<Mmio> = Timers::new(Mmio);
    static DIMMER: Timer1<Mmio> = Timer1::new(Mmio);
    static BUTTONS: ExternalInterrupts<Mmio> = ExternalInterrupts::new(Mmio);

    static LED: Mutex<RefCell<Option<Pin<Output, PB0>>>> = Mutex::new(RefCell::new(None));
    static BLINKS: Mutex<Cell<u16>> = Mutex::new(Cell::new(0));
    static UPTIME: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
    static LEVEL: Mutex<Cell<u8>> = Mutex::new(Cell::new(DIM_STEP));

    fn blink() {
        critical_section::with(|cs| {
            if let Some(led) = LED.borrow(cs).borrow_mut().as_mut() {
                led.toggle();
            }
            let blinks = BLINKS.borrow(cs);
            blinks.set(blinks.get().wrapping_add(1));
        });
    }

    fn heartbeat() {
        critical_section::with(|cs| {
            let uptime = UPTIME.borrow(cs);
            uptime.set(uptime.get() + Interval::S_2.millis() / 1000);
        });
    }

    fn brighter() {
        let level = critical_section::with(|cs| {
            let level = LEVEL.borrow(cs);
            let next = match level.get() {
                100 => DIM_STEP,
                current => current + DIM_STEP,
            };
            level.set(next);
            next
        });
        if let Ok(duty) = DutyCycle::try_from(level) {
            let result = DIMMER.set_duty_fast_pwm(duty, Polarity::NonInverted);
            debug_assert!(result.is_ok(), "dimmer is not set up for PWM");
        }
    }

    mod vectors {
        use atmega_mcal::{exint::ExtInt, timer::TimerId};

        use super::{BUTTONS, TIMERS};

        #[avr_device::interrupt(atmega32a)]
        fn TIMER0_OVF() {
            TIMERS.on_overflow(TimerId::Timer0);
        }

        #[avr_device::interrupt(atmega32a)]
        fn TIMER0_COMP() {
            TIMERS.on_compare(TimerId::Timer0);
        }

        #[avr_device::interrupt(atmega32a)]
        fn TIMER2_OVF() {
            TIMERS.on_overflow(TimerId::Timer2);
        }

        #[avr_device::interrupt(atmega32a)]
        fn TIMER2_COMP() {
            TIMERS.on_compare(TimerId::Timer2);
        }

        #[avr_device::interrupt(atmega32a)]
        fn INT0() {
            BUTTONS.dispatch(ExtInt::Int0);
        }
    }

    fn setup(serial: &mut Serial) -> Result<(), Error> {
        TIMERS.init();

        TIMERS.set_callback(TimerId::Timer0, Some(&blink))?;
        let schedule = TIMERS.set_time(TimerId::Timer0, Mode::Ctc, Interval::MS_500)?;
        let Ok(()) = uwriteln!(serial, "TC0: {}, tick {}\r", schedule, TIMERS.tick_time());
        TIMERS.start(TimerId::Timer0)?;

        TIMERS.set_callback(TimerId::Timer2, Some(&heartbeat))?;
        let schedule = TIMERS.set_time(TimerId::Timer2, Mode::Normal, Interval::S_2)?;
        let Ok(()) = uwriteln!(serial, "TC2: {}\r", schedule);
        TIMERS.start(TimerId::Timer2)?;

        DIMMER.init(Config {
            usage: Usage::Pwm,
            prescaler: Prescaler::Div8,
            callback: None,
        })?;
        DIMMER.set_duty_fast_pwm(DutyCycle::try_from(DIM_STEP)?, Polarity::NonInverted)?;
        DIMMER.start()?;

        BUTTONS.set_callback(ExtInt::Int0, Some(&brighter))?;
        BUTTONS.init(ExtInt::Int0, Sense::Falling)
    }

    #[hal::entry]
    fn main() -> ! {
        let dp = hal::Peripherals::take().unwrap();
        let pins = hal::pins!(dp);

        // OC1A
        let _dimmed = pins.pd5.into_output();
        // INT0, button to ground.
        let _button = pins.pd2.into_pull_up_input();
        let led = pins.pb0.into_output();
        critical_section::with(|cs| *LED.borrow(cs).borrow_mut() = Some(led));

        let mut serial = serial::new(dp.USART, pins.pd0, pins.pd1.into_output(), BAUDRATE);
        let Ok(()) = uwriteln!(&mut serial, "atmega-mcal demo\r");

        if let Err(err) = setup(&mut serial) {
            let Ok(()) = uwriteln!(&mut serial, "setup failed: {}\r", err);
        }

        let mut reported = 0;
        loop {
            // Idle sleep until the next interrupt.
            dp.CPU.mcucr.modify(|_, w| w.se().set_bit());
            avr_device::asm::sleep();
            dp.CPU.mcucr.modify(|_, w| w.se().clear_bit());

            let (blinks, uptime, level) = critical_section::with(|cs| {
                (
                    BLINKS.borrow(cs).get(),
                    UPTIME.borrow(cs).get(),
                    LEVEL.borrow(cs).get(),
                )
            });
            if blinks != reported {
                reported = blinks;
                let Ok(()) = uwriteln!(
                    &mut serial,
                    "blinks {}, uptime {} s, level {}%\r",
                    blinks,
                    uptime,
                    level
                );
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
