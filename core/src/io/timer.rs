use num_integer::Integer;

use crate::io::interrupts::{Interrupt, Interrupts};

/// This register is incremented at a rate of 16384Hz (one tick per 64 machine cycles).
/// Writing any value to this register resets it to 00h.
pub const DIVIDER_REGISTER: u16 = 0xFF04;
/// This timer is incremented at a clock frequency specified by the TAC register ($FF07).
/// When the value overflows it is reset to the value specified in TMA (FF06),
/// and an interrupt is requested.
pub const TIMER_COUNTER: u16 = 0xFF05;
/// When TIMA overflows, this data will be loaded.
pub const TIMER_MODULO: u16 = 0xFF06;
/// Several flags to indicate the incrementing rate of the timer.
pub const TIMER_CONTROL: u16 = 0xFF07;

/// Machine cycles between DIV increments.
const DIVIDER_PERIOD: u32 = 64;

#[derive(Debug, Copy, Clone, PartialEq)]
enum InputClock {
    C1024 = 0x0,
    C16 = 0x1,
    C64 = 0x2,
    C256 = 0x3,
}

#[derive(Debug, Copy, Clone)]
pub struct TimerControl {
    timer_enabled: bool,
    input_select: InputClock,
}

/// The DIV and TIMA counters, both derived from the machine-cycle clock.
///
/// Each counter keeps its own cycle accumulator so that the driver can
/// advance the timer by whole instructions at a time.
#[derive(Debug, Default)]
pub struct TimerRegisters {
    pub divider: u8,
    pub timer_counter: u8,
    pub timer_modulo: u8,
    pub timer_control: TimerControl,
    divider_pool: u32,
    counter_pool: u32,
}

impl TimerRegisters {
    /// Advance both counters by the machine cycles of the last instruction.
    pub fn advance(&mut self, m_cycles: u32, interrupts: &mut Interrupts) {
        let (div_ticks, div_rest) = (self.divider_pool + m_cycles).div_rem(&DIVIDER_PERIOD);
        self.divider = self.divider.wrapping_add(div_ticks as u8);
        self.divider_pool = div_rest;

        if !self.timer_control.timer_enabled {
            return;
        }

        self.counter_pool += m_cycles;
        let period = self.timer_control.input_select.period();
        while self.counter_pool >= period {
            self.counter_pool -= period;

            let (new_value, overflowed) = self.timer_counter.overflowing_add(1);
            if overflowed {
                self.timer_counter = self.timer_modulo;
                interrupts.request(Interrupt::Timer);
            } else {
                self.timer_counter = new_value;
            }
        }
    }

    /// Any CPU write to DIV resets it, enforced by the bus write-action table.
    pub fn reset_divider(&mut self) {
        self.divider = 0;
        self.divider_pool = 0;
    }

    pub fn set_timer_counter(&mut self, value: u8) {
        self.timer_counter = value;
    }

    pub fn set_tma(&mut self, value: u8) {
        self.timer_modulo = value;
    }

    pub fn set_timer_control(&mut self, value: u8) {
        self.timer_control = TimerControl::from(value);
    }
}

impl TimerControl {
    pub fn to_bits(&self) -> u8 {
        let result = if self.timer_enabled { 0x4 } else { 0 };

        result | self.input_select as u8
    }
}

impl Default for TimerControl {
    fn default() -> Self {
        TimerControl {
            timer_enabled: false,
            input_select: InputClock::C1024,
        }
    }
}

impl From<u8> for TimerControl {
    fn from(val: u8) -> Self {
        TimerControl {
            timer_enabled: val & 0b0000_0100 > 0,
            input_select: InputClock::from(val),
        }
    }
}

impl From<u8> for InputClock {
    fn from(val: u8) -> Self {
        match val & 0x3 {
            0x0 => InputClock::C1024,
            0x1 => InputClock::C16,
            0x2 => InputClock::C64,
            0x3 => InputClock::C256,
            _ => unreachable!("Invalid value passed to the InputClock parser."),
        }
    }
}

impl InputClock {
    /// The TIMA increment period in machine cycles.
    pub fn period(&self) -> u32 {
        match self {
            InputClock::C1024 => 256,
            InputClock::C16 => 4,
            InputClock::C64 => 16,
            InputClock::C256 => 64,
        }
    }
}
