use core::num::NonZeroU32;

use super::{TimerId, TimerState, slot::Slot};
use crate::{
    callback::{Callback, CallbackTable},
    clock::CPU_FREQ_HZ,
    error::Error,
    interval::{Interval, Mode, Schedule, decompose},
    pwm::{DutyCycle, Polarity, PwmKind},
    regs::Registers,
    tick::{Prescaler, TickTime},
};

/// Prescaler used for every timer. Slowest clock, least interrupt load.
const PRESCALER: Prescaler = Prescaler::Div1024;

/// Every enabled timer behind one interface.
///
/// Meant to live in a `static`: all methods take `&self`, and the state the
/// interrupt handlers touch sits behind critical sections.
///
/// ```ignore
/// static TIMERS: Timers<Mmio> = Timers::new(Mmio);
///
/// TIMERS.init();
/// TIMERS.set_time(TimerId::Timer0, Mode::Ctc, Interval::MS_500)?;
/// TIMERS.set_callback(TimerId::Timer0, Some(&blink))?;
/// TIMERS.start(TimerId::Timer0)?;
/// ```
pub struct Timers<R> {
    regs: R,
    tick: TickTime,
    slots: [Slot; TimerId::COUNT],
    callbacks: CallbackTable<TimerId, { TimerId::COUNT }>,
}

impl<R: Registers> Timers<R> {
    /// Timers clocked from [`CPU_FREQ_HZ`].
    #[must_use]
    pub const fn new(regs: R) -> Self {
        Self::with_clock(regs, CPU_FREQ_HZ)
    }

    /// Timers clocked from `cpu_hz`.
    #[must_use]
    pub const fn with_clock(regs: R, cpu_hz: NonZeroU32) -> Self {
        Self {
            regs,
            tick: TickTime::calibrate(PRESCALER, cpu_hz),
            slots: [const { Slot::new() }; TimerId::COUNT],
            callbacks: CallbackTable::new(),
        }
    }

    /// Enable interrupts globally.
    ///
    /// Must not be called from inside a critical section.
    pub fn init(&self) {
        self.regs.enable_interrupts();
    }

    /// Duration of one counter tick.
    pub fn tick_time(&self) -> TickTime {
        self.tick
    }

    /// Configure `id` to raise its callback every `interval`.
    ///
    /// The clock is stopped and has to be started again with
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInterval`] if the interval is shorter than one tick.
    /// Nothing is written in that case.
    pub fn set_time(&self, id: TimerId, mode: Mode, interval: Interval) -> Result<Schedule, Error> {
        let schedule = decompose(interval.millis(), self.tick, id.layout().width, mode)?;
        self.slot(id).configure(&self.regs, id, schedule);
        Ok(schedule)
    }

    /// Register the function called when `id`'s interval elapses.
    ///
    /// # Errors
    ///
    /// [`Error::NullCallback`] if `callback` is `None`.
    pub fn set_callback(&self, id: TimerId, callback: Option<Callback>) -> Result<(), Error> {
        self.callbacks.register(id, callback)
    }

    /// Start counting.
    ///
    /// # Errors
    ///
    /// [`Error::NotConfigured`] if [`set_time`](Self::set_time) was never
    /// called for `id`.
    pub fn start(&self, id: TimerId) -> Result<(), Error> {
        self.slot(id).start(&self.regs, id, PRESCALER)
    }

    /// Stop the clock of `id`, keeping its configuration.
    pub fn stop(&self, id: TimerId) {
        self.slot(id).stop(&self.regs, id);
    }

    /// Drive the output compare pin of `id` with a fast PWM signal.
    ///
    /// The timer runs immediately; its timing interrupts are disabled.
    pub fn set_pwm_duty(
        &self,
        id: TimerId,
        duty: DutyCycle,
        polarity: Polarity,
    ) -> Result<(), Error> {
        let clock_bits = id.clock_select(PRESCALER)?;
        let compare = duty.compare_value(id.layout().pwm_top);
        self.slot(id)
            .set_pwm(&self.regs, id, PwmKind::Fast, polarity, compare, Some(clock_bits));
        Ok(())
    }

    /// Overflow interrupt handler body for `id`.
    pub fn on_overflow(&self, id: TimerId) {
        self.dispatch(id, Mode::Normal);
    }

    /// Compare match interrupt handler body for `id`.
    pub fn on_compare(&self, id: TimerId) {
        self.dispatch(id, Mode::Ctc);
    }

    pub fn state(&self, id: TimerId) -> TimerState {
        self.slot(id).state()
    }

    pub fn schedule(&self, id: TimerId) -> Option<Schedule> {
        self.slot(id).schedule()
    }

    /// Interrupts counted so far in the current interval.
    pub fn current_ticks(&self, id: TimerId) -> u32 {
        self.slot(id).current_ticks()
    }

    fn dispatch(&self, id: TimerId, source: Mode) {
        if self.slot(id).advance(&self.regs, id, source) {
            self.callbacks.invoke(id);
        }
    }

    fn slot(&self, id: TimerId) -> &Slot {
        &self.slots[id as usize]
    }
}
