use core::{cell::Cell, marker::PhantomData, num::NonZeroU32};

use critical_section::Mutex;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use super::{TimerId, TimerState, slot::Slot};
use crate::{
    callback::{Callback, CallbackCell},
    clock::CPU_FREQ_HZ,
    error::Error,
    interval::{Mode, Schedule, decompose},
    pwm::{DutyCycle, Polarity, PwmKind},
    regs::Registers,
    tick::{Prescaler, TickTime},
};

/// What a [`Driver`] is set up for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Usage {
    /// Periodic callbacks.
    Timing,
    /// Waveform on the output compare pin.
    Pwm,
}

/// Settings applied by [`Driver::init`].
#[derive(Clone, Copy)]
pub struct Config {
    pub usage: Usage,
    pub prescaler: Prescaler,
    /// Optional here; can be set later with [`Driver::set_callback`].
    pub callback: Option<Callback>,
}

/// Timer a [`Driver`] controls.
pub trait Instance {
    const ID: TimerId;
}

/// `TC0`.
#[cfg(feature = "timer0")]
pub struct T0;

#[cfg(feature = "timer0")]
impl Instance for T0 {
    const ID: TimerId = TimerId::Timer0;
}

/// `TC1`, output compare channel A.
#[cfg(feature = "timer1")]
pub struct T1;

#[cfg(feature = "timer1")]
impl Instance for T1 {
    const ID: TimerId = TimerId::Timer1;
}

/// Driver for the 8-bit timer 0.
#[cfg(feature = "timer0")]
pub type Timer0<R> = Driver<T0, R>;

/// Driver for the 16-bit timer 1.
#[cfg(feature = "timer1")]
pub type Timer1<R> = Driver<T1, R>;

#[derive(Clone, Copy)]
struct Setup {
    usage: Usage,
    prescaler: Prescaler,
    tick: TickTime,
    /// Last PWM output polarity.
    polarity: Option<Polarity>,
}

/// Single timer driver with its own prescaler and callback.
pub struct Driver<T, R> {
    regs: R,
    cpu_hz: NonZeroU32,
    setup: Mutex<Cell<Option<Setup>>>,
    slot: Slot,
    callback: CallbackCell,
    _timer: PhantomData<fn(T)>,
}

impl<T: Instance, R: Registers> Driver<T, R> {
    /// Driver for a timer clocked from [`CPU_FREQ_HZ`].
    #[must_use]
    pub const fn new(regs: R) -> Self {
        Self::with_clock(regs, CPU_FREQ_HZ)
    }

    /// Driver for a timer clocked from `cpu_hz`.
    #[must_use]
    pub const fn with_clock(regs: R, cpu_hz: NonZeroU32) -> Self {
        Self {
            regs,
            cpu_hz,
            setup: Mutex::new(Cell::new(None)),
            slot: Slot::new(),
            callback: CallbackCell::new(),
            _timer: PhantomData,
        }
    }

    /// Apply `config` and enable interrupts globally.
    ///
    /// The timer is stopped and its interval or waveform is dropped, so it has
    /// to be configured again before [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPrescaler`] if the timer has no such prescaler.
    pub fn init(&self, config: Config) -> Result<(), Error> {
        T::ID.clock_select(config.prescaler)?;

        self.slot.reset(&self.regs, T::ID);
        if let Some(callback) = config.callback {
            self.callback.register(Some(callback))?;
        }
        let setup = Setup {
            usage: config.usage,
            prescaler: config.prescaler,
            tick: TickTime::calibrate(config.prescaler, self.cpu_hz),
            polarity: None,
        };
        critical_section::with(|cs| self.setup.borrow(cs).set(Some(setup)));

        self.regs.enable_interrupts();
        Ok(())
    }

    /// Configure an interrupt every `millis` milliseconds.
    ///
    /// The clock is stopped until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`Error::NotConfigured`] before [`init`](Self::init).
    /// - [`Error::InvalidMode`] if the driver was set up for PWM.
    /// - [`Error::InvalidInterval`] if `millis` is shorter than one tick or
    ///   too long to count.
    pub fn set_tick_time_ms(&self, millis: u32, mode: Mode) -> Result<Schedule, Error> {
        let setup = self.setup_for(Usage::Timing)?;
        let schedule = decompose(millis, setup.tick, T::ID.layout().width, mode)?;
        self.slot.configure(&self.regs, T::ID, schedule);
        Ok(schedule)
    }

    /// Gate the clock with the configured prescaler.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPrescaler`] before [`init`](Self::init).
    /// - [`Error::NotConfigured`] without an interval or duty cycle.
    pub fn start(&self) -> Result<(), Error> {
        let setup = self.setup().ok_or(Error::InvalidPrescaler)?;
        self.slot.start(&self.regs, T::ID, setup.prescaler)
    }

    /// Stop the clock.
    pub fn stop(&self) {
        self.slot.stop(&self.regs, T::ID);
    }

    /// Select fast PWM with the given duty cycle.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConfigured`] before [`init`](Self::init).
    /// - [`Error::InvalidMode`] if the driver was set up for timing.
    pub fn set_duty_fast_pwm(&self, duty: DutyCycle, polarity: Polarity) -> Result<(), Error> {
        self.set_duty(PwmKind::Fast, duty, polarity)
    }

    /// Select phase correct PWM with the given duty cycle.
    ///
    /// # Errors
    ///
    /// As [`set_duty_fast_pwm`](Self::set_duty_fast_pwm).
    pub fn set_duty_phase_correct(&self, duty: DutyCycle, polarity: Polarity) -> Result<(), Error> {
        self.set_duty(PwmKind::PhaseCorrect, duty, polarity)
    }

    /// Register the function called when the interval elapses.
    ///
    /// # Errors
    ///
    /// [`Error::NullCallback`] if `callback` is `None`.
    pub fn set_callback(&self, callback: Option<Callback>) -> Result<(), Error> {
        self.callback.register(callback)
    }

    /// Overflow interrupt handler body.
    pub fn on_overflow(&self) {
        self.dispatch(Mode::Normal);
    }

    /// Compare match interrupt handler body.
    pub fn on_compare(&self) {
        self.dispatch(Mode::Ctc);
    }

    pub fn state(&self) -> TimerState {
        self.slot.state()
    }

    pub fn schedule(&self) -> Option<Schedule> {
        self.slot.schedule()
    }

    pub fn current_ticks(&self) -> u32 {
        self.slot.current_ticks()
    }

    /// Tick duration, once initialized.
    pub fn tick_time(&self) -> Option<TickTime> {
        self.setup().map(|setup| setup.tick)
    }

    fn dispatch(&self, source: Mode) {
        if self.slot.advance(&self.regs, T::ID, source) {
            self.callback.invoke();
        }
    }

    fn setup(&self) -> Option<Setup> {
        critical_section::with(|cs| self.setup.borrow(cs).get())
    }

    fn setup_for(&self, usage: Usage) -> Result<Setup, Error> {
        let setup = self.setup().ok_or(Error::NotConfigured)?;
        if setup.usage != usage {
            return Err(Error::InvalidMode);
        }
        Ok(setup)
    }

    fn set_duty(&self, kind: PwmKind, duty: DutyCycle, polarity: Polarity) -> Result<(), Error> {
        self.set_compare(kind, duty.compare_value(T::ID.layout().pwm_top), polarity)
    }

    fn set_compare(&self, kind: PwmKind, compare: u16, polarity: Polarity) -> Result<(), Error> {
        let mut setup = self.setup_for(Usage::Pwm)?;
        self.slot
            .set_pwm(&self.regs, T::ID, kind, polarity, compare, None);
        setup.polarity = Some(polarity);
        critical_section::with(|cs| self.setup.borrow(cs).set(Some(setup)));
        Ok(())
    }
}

impl<T: Instance, R: Registers> ErrorType for Driver<T, R> {
    type Error = Error;
}

/// Raw compare values once a PWM waveform is selected.
///
/// A zero duty cycle is rejected like 0 % is.
impl<T: Instance, R: Registers> SetDutyCycle for Driver<T, R> {
    fn max_duty_cycle(&self) -> u16 {
        T::ID.layout().pwm_top
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Error> {
        if duty == 0 || duty > self.max_duty_cycle() {
            return Err(Error::InvalidDutyCycle);
        }
        let TimerState::Pwm(kind) = self.state() else {
            return Err(Error::NotConfigured);
        };
        let polarity = self
            .setup()
            .and_then(|setup| setup.polarity)
            .ok_or(Error::NotConfigured)?;
        self.set_compare(kind, duty, polarity)
    }
}
