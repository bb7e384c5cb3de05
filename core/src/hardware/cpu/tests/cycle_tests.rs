//! Machine-cycle counts per opcode class, checked against the canonical
//! LR35902 timing tables.

use crate::hardware::cpu::tests::{initial_cpu, set_short, TestMemory};
use crate::hardware::cpu::CPU;
use crate::hardware::mmu::MemoryMapper;

/// Run a single instruction laid out at 0 and return its machine cycles.
fn cycles_for(setup: impl FnOnce(&mut CPU<TestMemory>)) -> u32 {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xFF00;
    setup(&mut cpu);
    cpu.step_cycle()
}

#[test]
fn test_basic_alu_cycles() {
    // NOP
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x00)), 1);
    // LD B, C
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x41)), 1);
    // ADD A, B
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x80)), 1);
    // LD B, d8
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x06)), 2);
    // ADD A, d8
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC6)), 2);
}

#[test]
fn test_hl_indirect_cycles() {
    // LD B, (HL)
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x46)), 2);
    // LD (HL), B
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x70)), 2);
    // LD (HL), d8
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x36)), 3);
    // INC (HL): read, modify, write.
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x34)), 3);
}

#[test]
fn test_16bit_load_cycles() {
    // LD BC, d16
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x01)), 3);
    // LD (a16), SP
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x08)), 5);
    // INC BC
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x03)), 2);
    // ADD HL, BC
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x09)), 2);
    // LD SP, HL
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xF9)), 2);
    // LD HL, SP+e8
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xF8)), 3);
    // ADD SP, e8
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xE8)), 4);
}

#[test]
fn test_absolute_memory_cycles() {
    // LD A, (a16)
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xFA)), 4);
    // LD (a16), A
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xEA)), 4);
    // LDH A, (a8)
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xF0)), 3);
    // LD A, (C)
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xF2)), 2);
}

#[test]
fn test_jump_cycles() {
    // JR taken / not taken (Z clear).
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x18)), 3);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x20)), 3);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0x28)), 2);

    // JP taken / not taken.
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC3)), 4);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC2)), 4);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xCA)), 3);

    // JP HL
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xE9)), 1);
}

#[test]
fn test_call_and_ret_cycles() {
    // CALL taken / not taken.
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xCD)), 6);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC4)), 6);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xCC)), 3);

    // RET unconditional.
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC9)), 4);
    // RET NZ taken / not taken.
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC0)), 5);
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC8)), 2);
    // RETI
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xD9)), 4);

    // RST
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xEF)), 4);
}

#[test]
fn test_stack_cycles() {
    // PUSH BC
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC5)), 4);
    // POP BC
    assert_eq!(cycles_for(|cpu| cpu.set_instruction(0xC1)), 3);
}

#[test]
fn test_prefixed_cycles() {
    // RLC B
    assert_eq!(
        cycles_for(|cpu| {
            cpu.set_instruction(0xCB);
            cpu.mmu.write_byte(1, 0x00);
        }),
        2
    );
    // BIT 0, (HL): read only.
    assert_eq!(
        cycles_for(|cpu| {
            cpu.set_instruction(0xCB);
            cpu.mmu.write_byte(1, 0x46);
        }),
        3
    );
    // SET 0, (HL): read and write back.
    assert_eq!(
        cycles_for(|cpu| {
            cpu.set_instruction(0xCB);
            cpu.mmu.write_byte(1, 0xC6);
        }),
        4
    );
}

#[test]
fn test_interrupt_dispatch_cycles() {
    let cycles = cycles_for(|cpu| {
        cpu.ime = true;
        cpu.mmu.interrupts_mut().overwrite_ie(0x01);
        cpu.mmu.interrupts_mut().overwrite_if(0x01);
    });

    assert_eq!(cycles, 5);
}

#[test]
fn test_halted_idle_cycles() {
    let cycles = cycles_for(|cpu| cpu.halted = true);
    assert_eq!(cycles, 1);
}

#[test]
fn test_taken_branch_through_program() {
    // A small program: CALL 0x0010; at 0x0010 RET. 6 + 4 cycles.
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xFF00;
    cpu.set_instruction(0xCD);
    set_short(&mut cpu, 1, 0x0010);
    cpu.mmu.write_byte(0x0010, 0xC9);

    let call_cycles = cpu.step_cycle();
    let ret_cycles = cpu.step_cycle();

    assert_eq!(call_cycles, 6);
    assert_eq!(ret_cycles, 4);
    assert_eq!(cpu.registers.pc, 3);
    assert_eq!(cpu.cycles_performed, 10);
}
