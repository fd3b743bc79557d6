//! Per-timer state shared between configuration calls and interrupt handlers.

use core::cell::Cell;

use critical_section::Mutex;

use super::{
    TimerId, TimerState,
    layout::{CS_MASK, Waveform},
};
use crate::{
    error::Error,
    interval::{Mode, Schedule},
    pwm::{Polarity, PwmKind},
    regs::{Reg, Registers},
    tick::Prescaler,
};

#[derive(Clone, Copy)]
struct Record {
    state: TimerState,
    schedule: Option<Schedule>,
    current_ticks: u32,
}

impl Record {
    const RESET: Self = Self {
        state: TimerState::Unconfigured,
        schedule: None,
        current_ticks: 0,
    };
}

/// Soft-tick bookkeeping and register sequences of one timer.
///
/// Every register sequence runs inside a critical section together with the
/// matching state update, so an interrupt never sees one without the other.
pub(super) struct Slot {
    record: Mutex<Cell<Record>>,
}

impl Slot {
    pub(super) const fn new() -> Self {
        Self {
            record: Mutex::new(Cell::new(Record::RESET)),
        }
    }

    fn record(&self) -> Record {
        critical_section::with(|cs| self.record.borrow(cs).get())
    }

    pub(super) fn state(&self) -> TimerState {
        self.record().state
    }

    pub(super) fn schedule(&self) -> Option<Schedule> {
        self.record().schedule
    }

    pub(super) fn current_ticks(&self) -> u32 {
        self.record().current_ticks
    }

    /// Stop the clock and load `schedule`.
    pub(super) fn configure<R: Registers>(&self, regs: &R, id: TimerId, schedule: Schedule) {
        let layout = id.layout();
        let irq_mask = layout.irq_mask();

        critical_section::with(|cs| {
            regs.set_field(layout.clock, CS_MASK, 0);
            regs.set_field(Reg::Timsk, irq_mask, 0);

            match schedule.mode {
                Mode::Normal => {
                    id.select_waveform(regs, Waveform::Normal);
                    layout.counter.write(regs, schedule.preload);
                }
                Mode::Ctc => {
                    id.select_waveform(regs, Waveform::Ctc);
                    // The counter clears on the tick after the match.
                    layout.compare.write(regs, schedule.preload - 1);
                    layout.counter.write(regs, 0);
                }
            }

            // Drop flags raised under the previous configuration.
            regs.write(Reg::Tifr, irq_mask);
            regs.set_bit(Reg::Timsk, layout.irq_bit(schedule.mode));

            self.record.borrow(cs).set(Record {
                state: TimerState::Configured(schedule.mode),
                schedule: Some(schedule),
                current_ticks: 0,
            });
        });
    }

    /// Gate the clock through `prescaler`.
    pub(super) fn start<R: Registers>(
        &self,
        regs: &R,
        id: TimerId,
        prescaler: Prescaler,
    ) -> Result<(), Error> {
        let bits = id.clock_select(prescaler)?;
        let clock = id.layout().clock;

        critical_section::with(|cs| {
            let cell = self.record.borrow(cs);
            let mut record = cell.get();
            record.state = match record.state {
                TimerState::Unconfigured => return Err(Error::NotConfigured),
                TimerState::Configured(mode) | TimerState::Running(mode) => {
                    TimerState::Running(mode)
                }
                pwm @ TimerState::Pwm(_) => pwm,
            };
            regs.set_field(clock, CS_MASK, bits);
            cell.set(record);
            Ok(())
        })
    }

    /// Remove the clock. The configuration stays loaded.
    pub(super) fn stop<R: Registers>(&self, regs: &R, id: TimerId) {
        let clock = id.layout().clock;

        critical_section::with(|cs| {
            let cell = self.record.borrow(cs);
            let mut record = cell.get();
            regs.set_field(clock, CS_MASK, 0);
            if let TimerState::Running(mode) = record.state {
                record.state = TimerState::Configured(mode);
            }
            cell.set(record);
        });
    }

    /// Stop the clock, mask the timer's interrupts and forget the schedule.
    pub(super) fn reset<R: Registers>(&self, regs: &R, id: TimerId) {
        let layout = id.layout();
        let irq_mask = layout.irq_mask();

        critical_section::with(|cs| {
            regs.set_field(layout.clock, CS_MASK, 0);
            regs.set_field(Reg::Timsk, irq_mask, 0);
            regs.write(Reg::Tifr, irq_mask);
            self.record.borrow(cs).set(Record::RESET);
        });
    }

    /// Switch to a PWM waveform with the given compare value.
    ///
    /// Timing interrupts are disabled. The clock is gated with `clock_bits`
    /// when given and left as is otherwise.
    pub(super) fn set_pwm<R: Registers>(
        &self,
        regs: &R,
        id: TimerId,
        kind: PwmKind,
        polarity: Polarity,
        compare: u16,
        clock_bits: Option<u8>,
    ) {
        let layout = id.layout();

        critical_section::with(|cs| {
            regs.set_field(Reg::Timsk, layout.irq_mask(), 0);
            id.select_waveform(regs, Waveform::Pwm(kind, polarity));
            layout.compare.write(regs, compare);
            if let Some(bits) = clock_bits {
                regs.set_field(layout.clock, CS_MASK, bits);
            }

            self.record.borrow(cs).set(Record {
                state: TimerState::Pwm(kind),
                ..Record::RESET
            });
        });
    }

    /// Count one `source` interrupt.
    ///
    /// Returns `true` when the interval has elapsed; the counter is then
    /// reloaded in normal mode and the soft tick count starts over.
    pub(super) fn advance<R: Registers>(&self, regs: &R, id: TimerId, source: Mode) -> bool {
        critical_section::with(|cs| {
            let cell = self.record.borrow(cs);
            let mut record = cell.get();
            let Some(schedule) = record.schedule else {
                return false;
            };
            if record.state != TimerState::Running(source) {
                return false;
            }

            record.current_ticks += 1;
            let elapsed = record.current_ticks >= schedule.tick_count;
            if elapsed {
                record.current_ticks = 0;
                if source == Mode::Normal {
                    id.layout().counter.write(regs, schedule.preload);
                }
            }
            cell.set(record);
            elapsed
        })
    }
}
