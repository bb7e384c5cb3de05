//! Fetch helpers and interrupt dispatch, split off so the main mod.rs
//! doesn't get too cluttered.

use crate::hardware::cpu::CPU;
use crate::hardware::mmu::MemoryMapper;
use crate::io::interrupts::Interrupt;

impl<M: MemoryMapper> CPU<M> {
    /// Charge machine cycles to the current step.
    #[inline]
    pub(crate) fn add_cycles(&mut self, m_cycles: u32) {
        self.step_cycles += m_cycles;
    }

    /// Read the next opcode, advance the PC, and execute from the prefix table.
    pub fn cb_prefix_call(&mut self) {
        self.opcode = self.get_instr_u8();
        self.execute_prefix(self.opcode);
    }

    /// Dispatch the highest-priority pending interrupt, if the machine state
    /// allows it.
    ///
    /// Any pending enabled interrupt wakes a halted CPU, even with IME off;
    /// in that case execution simply continues without a dispatch.
    ///
    /// # Returns
    ///
    /// `true` when an interrupt was dispatched (the 5 cycle charge included).
    pub(crate) fn handle_interrupts(&mut self) -> bool {
        let interrupt = match self.mmu.interrupts().next_pending() {
            Some(interrupt) => interrupt,
            None => return false,
        };

        self.halted = false;

        if !self.ime {
            return false;
        }

        self.mmu.interrupts_mut().acknowledge(interrupt);
        self.ime = false;
        self.interrupt_routine(interrupt);
        true
    }

    /// Jump to the interrupt's handler: two internal wait cycles, push PC,
    /// set PC. Five machine cycles in total.
    fn interrupt_routine(&mut self, interrupt: Interrupt) {
        log::debug!("Servicing {:?} interrupt", interrupt);
        self.add_cycles(2);
        self.push_helper(self.registers.pc);
        self.registers.pc = interrupt.handler_address();
    }

    /// Interpret the byte at `PC` as a `u8` value.
    ///
    /// Advances the `PC` by 1.
    pub fn get_instr_u8(&mut self) -> u8 {
        let result = self.read_byte_cycle(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);

        result
    }

    /// Interpret the bytes at `PC` and `PC + 1` as a `u16` value resolved as
    /// little endian (least significant byte first).
    ///
    /// Advances the `PC` by 2.
    pub fn get_instr_u16(&mut self) -> u16 {
        let least_s_byte = self.get_instr_u8() as u16;
        let most_s_byte = self.get_instr_u8() as u16;

        (most_s_byte << 8) | least_s_byte
    }

    /// Read a byte from the bus, charging one machine cycle.
    pub fn read_byte_cycle(&mut self, address: u16) -> u8 {
        self.add_cycles(1);
        self.mmu.read_byte(address)
    }

    /// Write a byte to the bus, charging one machine cycle.
    pub fn write_byte_cycle(&mut self, address: u16, value: u8) {
        self.add_cycles(1);
        self.mmu.write_byte(address, value);
    }

    /// Read a `short` from the bus, charging two machine cycles.
    pub fn read_short_cycle(&mut self, address: u16) -> u16 {
        let least_s_byte = self.read_byte_cycle(address) as u16;
        let most_s_byte = self.read_byte_cycle(address.wrapping_add(1)) as u16;

        (most_s_byte << 8) | least_s_byte
    }

    /// Write a `short` to the bus, charging two machine cycles.
    pub fn write_short_cycle(&mut self, address: u16, value: u16) {
        self.write_byte_cycle(address, (value & 0xFF) as u8); // Least significant byte first.
        self.write_byte_cycle(address.wrapping_add(1), (value >> 8) as u8);
    }
}
