use bitflags::*;

/// The flag register (IF) used by peripherals to request an interrupt.
pub const INTERRUPTS_FLAG: u16 = 0xFF0F;
/// The enable register (IE) which gates which requests may be dispatched.
pub const INTERRUPTS_ENABLE: u16 = 0xFFFF;

/// The five interrupt sources of the DMG, ordered by dispatch priority
/// (lowest bit wins).
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum Interrupt {
    Vblank = 0b0000_0001,
    LcdStat = 0b0000_0010,
    Timer = 0b0000_0100,
    Serial = 0b0000_1000,
    Joypad = 0b0001_0000,
}

impl Interrupt {
    /// All interrupts in dispatch-priority order.
    pub fn iter() -> impl Iterator<Item = Interrupt> {
        use Interrupt::*;
        [Vblank, LcdStat, Timer, Serial, Joypad].iter().copied()
    }

    /// The address the CPU jumps to when servicing this interrupt.
    pub fn handler_address(self) -> u16 {
        match self {
            Interrupt::Vblank => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }

    pub fn to_flags(self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(self as u8)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct InterruptFlags: u8 {
        /// V-Blank
        const VBLANK = 0b0000_0001;
        /// LCD Stat
        const LCD    = 0b0000_0010;
        /// Timer
        const TIMER  = 0b0000_0100;
        /// Serial
        const SERIAL = 0b0000_1000;
        /// Joypad
        const JOYPAD = 0b0001_0000;
    }
}

/// The two interrupt registers, logically part of the bus.
#[derive(Default, Debug, Clone)]
pub struct Interrupts {
    pub interrupt_enable: InterruptFlags,
    pub interrupt_flag: InterruptFlags,
}

impl Interrupts {
    /// Request an interrupt by setting its bit in IF.
    pub fn request(&mut self, interrupt: Interrupt) {
        self.interrupt_flag.insert(interrupt.to_flags());
    }

    /// `IF & IE & 0x1F`, the set of interrupts that may be dispatched.
    pub fn pending(&self) -> InterruptFlags {
        self.interrupt_flag & self.interrupt_enable
    }

    /// The highest-priority pending interrupt, if any.
    pub fn next_pending(&self) -> Option<Interrupt> {
        let pending = self.pending();
        Interrupt::iter().find(|intr| pending.contains(intr.to_flags()))
    }

    /// Acknowledge a dispatched interrupt by clearing its IF bit.
    pub fn acknowledge(&mut self, interrupt: Interrupt) {
        self.interrupt_flag.remove(interrupt.to_flags());
    }

    pub fn overwrite_if(&mut self, value: u8) {
        self.interrupt_flag = InterruptFlags::from_bits_truncate(value);
    }

    pub fn overwrite_ie(&mut self, value: u8) {
        self.interrupt_enable = InterruptFlags::from_bits_truncate(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut interrupts = Interrupts::default();
        interrupts.overwrite_ie(0xFF);
        interrupts.request(Interrupt::Timer);
        interrupts.request(Interrupt::LcdStat);

        assert_eq!(interrupts.next_pending(), Some(Interrupt::LcdStat));

        interrupts.acknowledge(Interrupt::LcdStat);

        assert_eq!(interrupts.next_pending(), Some(Interrupt::Timer));
    }

    #[test]
    fn test_disabled_interrupts_stay_pending() {
        let mut interrupts = Interrupts::default();
        interrupts.request(Interrupt::Joypad);

        assert_eq!(interrupts.next_pending(), None);
        assert_eq!(interrupts.interrupt_flag, InterruptFlags::JOYPAD);
    }

    #[test]
    fn test_handler_addresses() {
        for (i, interrupt) in Interrupt::iter().enumerate() {
            assert_eq!(interrupt.handler_address(), 0x0040 + 8 * i as u16);
        }
    }
}
