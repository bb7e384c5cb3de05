//! Operand resolution for the instruction set: an instruction target can be
//! a plain register, or one of the memory addressing modes, and the generic
//! instruction implementations shouldn't care which.

use crate::hardware::cpu::execute::{InstructionAddress, WrapperEnum};
use crate::hardware::cpu::registers::{Reg16, Reg8};
use crate::hardware::cpu::CPU;
use crate::hardware::mmu::MemoryMapper;

/// Resolve a target to a `u8`, regardless of whether it is a register or a
/// pointer into memory. Memory accesses add their machine cycles.
pub trait ToU8<T: Copy> {
    fn read_u8_value(&mut self, target: T) -> u8;
}

pub trait SetU8<T: Copy> {
    fn set_u8_value(&mut self, target: T, value: u8);
}

pub trait ToU16<T: Copy> {
    fn read_u16_value(&mut self, target: T) -> u16;
}

pub trait SetU16<T: Copy> {
    fn set_u16_value(&mut self, target: T, value: u16);
}

impl<M: MemoryMapper> ToU8<Reg8> for CPU<M> {
    fn read_u8_value(&mut self, target: Reg8) -> u8 {
        use Reg8::*;
        match target {
            A => self.registers.a,
            B => self.registers.b,
            C => self.registers.c,
            D => self.registers.d,
            E => self.registers.e,
            H => self.registers.h,
            L => self.registers.l,
        }
    }
}

impl<M: MemoryMapper> SetU8<Reg8> for CPU<M> {
    fn set_u8_value(&mut self, target: Reg8, value: u8) {
        use Reg8::*;
        match target {
            A => self.registers.a = value,
            B => self.registers.b = value,
            C => self.registers.c = value,
            D => self.registers.d = value,
            E => self.registers.e = value,
            H => self.registers.h = value,
            L => self.registers.l = value,
        }
    }
}

impl<M: MemoryMapper> ToU8<InstructionAddress> for CPU<M> {
    fn read_u8_value(&mut self, target: InstructionAddress) -> u8 {
        use InstructionAddress::*;
        match target {
            BCI => self.read_byte_cycle(self.registers.bc()),
            DEI => self.read_byte_cycle(self.registers.de()),
            HLI => self.read_byte_cycle(self.registers.hl()),
            HLIP => {
                let address = self.registers.hl();
                self.registers.set_hl(address.wrapping_add(1));
                self.read_byte_cycle(address)
            }
            HLIN => {
                let address = self.registers.hl();
                self.registers.set_hl(address.wrapping_sub(1));
                self.read_byte_cycle(address)
            }
            DIRECT => self.get_instr_u8(),
            DirectMem => {
                let address = self.get_instr_u16();
                self.read_byte_cycle(address)
            }
            IoDirect => {
                let offset = self.get_instr_u8();
                self.read_byte_cycle(0xFF00 + offset as u16)
            }
            IoC => self.read_byte_cycle(0xFF00 + self.registers.c as u16),
        }
    }
}

impl<M: MemoryMapper> SetU8<InstructionAddress> for CPU<M> {
    fn set_u8_value(&mut self, target: InstructionAddress, value: u8) {
        use InstructionAddress::*;
        match target {
            BCI => self.write_byte_cycle(self.registers.bc(), value),
            DEI => self.write_byte_cycle(self.registers.de(), value),
            HLI => self.write_byte_cycle(self.registers.hl(), value),
            HLIP => {
                let address = self.registers.hl();
                self.registers.set_hl(address.wrapping_add(1));
                self.write_byte_cycle(address, value);
            }
            HLIN => {
                let address = self.registers.hl();
                self.registers.set_hl(address.wrapping_sub(1));
                self.write_byte_cycle(address, value);
            }
            DIRECT => unreachable!("Can't write to an immediate operand"),
            DirectMem => {
                let address = self.get_instr_u16();
                self.write_byte_cycle(address, value);
            }
            IoDirect => {
                let offset = self.get_instr_u8();
                self.write_byte_cycle(0xFF00 + offset as u16, value);
            }
            IoC => self.write_byte_cycle(0xFF00 + self.registers.c as u16, value),
        }
    }
}

impl<M: MemoryMapper> ToU8<WrapperEnum> for CPU<M> {
    fn read_u8_value(&mut self, target: WrapperEnum) -> u8 {
        match target {
            WrapperEnum::Reg8(result) => self.read_u8_value(result),
            WrapperEnum::InstructionAddress(result) => self.read_u8_value(result),
        }
    }
}

impl<M: MemoryMapper> SetU8<WrapperEnum> for CPU<M> {
    fn set_u8_value(&mut self, target: WrapperEnum, value: u8) {
        match target {
            WrapperEnum::Reg8(result) => self.set_u8_value(result, value),
            WrapperEnum::InstructionAddress(result) => self.set_u8_value(result, value),
        }
    }
}

impl<M: MemoryMapper> ToU16<Reg16> for CPU<M> {
    fn read_u16_value(&mut self, target: Reg16) -> u16 {
        use Reg16::*;
        match target {
            AF => self.registers.af(),
            BC => self.registers.bc(),
            DE => self.registers.de(),
            HL => self.registers.hl(),
            SP => self.registers.sp,
        }
    }
}

impl<M: MemoryMapper> SetU16<Reg16> for CPU<M> {
    fn set_u16_value(&mut self, target: Reg16, value: u16) {
        use Reg16::*;
        match target {
            // The low nibble of F is forced to zero by the register file.
            AF => self.registers.set_af(value),
            BC => self.registers.set_bc(value),
            DE => self.registers.set_de(value),
            HL => self.registers.set_hl(value),
            SP => self.registers.sp = value,
        }
    }
}

impl<M: MemoryMapper> ToU16<InstructionAddress> for CPU<M> {
    fn read_u16_value(&mut self, target: InstructionAddress) -> u16 {
        use InstructionAddress::*;
        match target {
            DIRECT => self.get_instr_u16(),
            _ => unreachable!("Unimplemented u16 addressing mode: {:?}", target),
        }
    }
}

impl<M: MemoryMapper> SetU16<InstructionAddress> for CPU<M> {
    fn set_u16_value(&mut self, target: InstructionAddress, value: u16) {
        use InstructionAddress::*;
        match target {
            DirectMem => {
                let address = self.get_instr_u16();
                self.write_short_cycle(address, value);
            }
            _ => unreachable!("Unimplemented u16 addressing mode: {:?}", target),
        }
    }
}
