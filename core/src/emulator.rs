use std::sync::atomic::{AtomicBool, Ordering};

use crate::hardware::cpu::CPU;
use crate::hardware::mmu::Memory;
use crate::hardware::ppu::palette::RGB;
use crate::hardware::ppu::FRAMEBUFFER_SIZE;
use crate::EmulatorOptions;

/// The nominal dot clock of the DMG.
pub const DMG_CLOCK_SPEED: u64 = 4_194_304;
/// Machine cycles per second.
pub const MACHINE_CYCLES_PER_SECOND: u64 = DMG_CLOCK_SPEED / 4;
/// Machine cycles per full frame (154 scanlines of 456 dots).
pub const CYCLES_PER_FRAME: u64 = 154 * 456 / 4;

/// Receives every completed frame, on the 143 -> 144 scanline transition.
///
/// The framebuffer is passed by shared borrow: copy or consume it before
/// returning, the core overwrites it on the next scanline.
pub trait VideoSink {
    fn frame_ready(&mut self, frame: &[RGB; FRAMEBUFFER_SIZE]);
}

/// Receives interleaved stereo samples at the configured sample rate.
/// Blocking longer than a frame causes audible pacing drift.
pub trait AudioSink {
    fn push_samples(&mut self, samples: &[f32]);
}

/// Exposes the current state of the 8 buttons, ordered
/// `{Right, Left, Up, Down, A, B, Select, Start}`. Must not block; a stale
/// snapshot is acceptable.
pub trait InputSource {
    fn buttons(&mut self) -> [bool; 8];
}

/// A sink that simply discards frames and samples, for headless operation.
#[derive(Debug, Default)]
pub struct NullSink;

impl VideoSink for NullSink {
    fn frame_ready(&mut self, _frame: &[RGB; FRAMEBUFFER_SIZE]) {}
}

impl AudioSink for NullSink {
    fn push_samples(&mut self, _samples: &[f32]) {}
}

/// An input source with no buttons ever pressed.
#[derive(Debug, Default)]
pub struct NullInput;

impl InputSource for NullInput {
    fn buttons(&mut self) -> [bool; 8] {
        [false; 8]
    }
}

/// The assembled machine: the CPU owning the bus, which in turn owns every
/// other component.
pub struct Emulator {
    cpu: CPU<Memory>,
    stop_requested: bool,
}

impl Emulator {
    pub fn new(cartridge: &[u8], emu_opts: EmulatorOptions) -> Self {
        Emulator {
            cpu: CPU::new(Memory::new(cartridge, emu_opts)),
            stop_requested: false,
        }
    }

    /// Run one driver tick: a single CPU instruction, then the Timer, PPU
    /// and APU catch up by the cycles it took (plus any DMA charge).
    ///
    /// # Returns
    ///
    /// The machine cycles consumed by this tick.
    pub fn emulate_cycle(
        &mut self,
        video: &mut dyn VideoSink,
        audio: &mut dyn AudioSink,
        input: &mut dyn InputSource,
    ) -> u32 {
        let mut m_cycles = self.cpu.step_cycle();
        m_cycles += self.cpu.mmu.take_dma_cycles();

        let frame_ready = self.cpu.mmu.advance_components(m_cycles);
        if frame_ready {
            video.frame_ready(self.cpu.mmu.ppu.frame_buffer());
        }

        if !self.cpu.mmu.apu.output_buffer().is_empty() {
            audio.push_samples(self.cpu.mmu.apu.output_buffer());
            self.cpu.mmu.apu.clear_output_buffer();
        }

        self.cpu.mmu.update_joypad(input.buttons());

        if self.cpu.take_stop_request() {
            self.stop_requested = true;
        }

        m_cycles
    }

    /// Drive the machine until the external stop flag is raised or a STOP
    /// instruction executes. Real-time pacing is the caller's concern.
    pub fn run(
        &mut self,
        stop: &AtomicBool,
        video: &mut dyn VideoSink,
        audio: &mut dyn AudioSink,
        input: &mut dyn InputSource,
    ) {
        while !stop.load(Ordering::Relaxed) && !self.stop_requested {
            self.emulate_cycle(video, audio, input);
        }
    }

    /// Whether a STOP instruction has been executed.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// The current framebuffer, for pull-style frontends.
    pub fn frame_buffer(&self) -> &[RGB; FRAMEBUFFER_SIZE] {
        self.cpu.mmu.ppu.frame_buffer()
    }

    /// Everything test ROMs printed over the serial port so far.
    pub fn serial_output(&self) -> &[u8] {
        self.cpu.mmu.serial_output()
    }

    /// The battery-backed external RAM, if the cartridge has any, for the
    /// host's save functionality.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.cpu.mmu.cartridge().battery_ram()
    }

    pub fn cycles_performed(&self) -> u64 {
        self.cpu.cycles_performed
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hardware::ppu::palette::DisplayColour;
    use crate::EmulatorOptionsBuilder;

    /// Assemble a ROM image with `program` at the entry point 0x0100.
    fn rom_with_program(program: &[u8]) -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x100..0x100 + program.len()].copy_from_slice(program);
        rom
    }

    fn emulator_with_program(program: &[u8]) -> Emulator {
        Emulator::new(&rom_with_program(program), EmulatorOptionsBuilder::new().build())
    }

    fn run_cycles(emu: &mut Emulator, cycles: u64) {
        let mut spent = 0u64;
        while spent < cycles {
            spent += emu.emulate_cycle(&mut NullSink, &mut NullSink, &mut NullInput) as u64;
        }
    }

    #[test]
    fn test_halt_keeps_pc_stable() {
        // LD A, 1 / ADD A, A / HALT, with the Timer interrupt enabled but
        // never requested: the CPU works out A and then sleeps forever.
        let mut emu = emulator_with_program(&[0x3E, 0x01, 0x87, 0x76]);
        emu.cpu.mmu.write_byte(0xFFFF, 0x04);

        run_cycles(&mut emu, 200);

        assert!(emu.cpu.halted);
        assert_eq!(emu.cpu.registers().a, 2);
        assert_eq!(emu.cpu.registers().pc, 0x104);

        run_cycles(&mut emu, 200);
        assert_eq!(emu.cpu.registers().pc, 0x104);
    }

    #[test]
    fn test_pending_interrupt_wakes_halt() {
        // As above, but the Timer interrupt is also requested: HALT falls
        // through immediately (IME is off, so nothing is serviced).
        let mut emu = emulator_with_program(&[0x3E, 0x01, 0x87, 0x76, 0x00]);
        emu.cpu.mmu.write_byte(0xFFFF, 0x04);
        emu.cpu.mmu.write_byte(0xFF0F, 0x04);

        run_cycles(&mut emu, 200);

        assert!(!emu.cpu.halted);
        assert_eq!(emu.cpu.registers().a, 2);
        assert_ne!(emu.cpu.registers().pc, 0x104);
    }

    #[test]
    fn test_timer_interrupt_fires_after_1024_cycles() {
        // TAC = 0x05 (enabled, one increment per 4 machine cycles), DI.
        // 256 increments overflow TIMA after exactly 1024 machine cycles.
        let mut emu = emulator_with_program(&[
            0xF3, // DI
            0x3E, 0x05, // LD A, 0x05
            0xE0, 0x07, // LDH (TAC), A
            0x3E, 0xFE, // LD A, 0xFE
            0xE0, 0x06, // LDH (TMA), A
            0x18, 0xFE, // JR -2 (spin)
        ]);

        // The five setup instructions; the ticks after the TAC write
        // already count towards TIMA (8 cycles worth).
        for _ in 0..5 {
            emu.emulate_cycle(&mut NullSink, &mut NullSink, &mut NullInput);
        }

        run_cycles(&mut emu, 1000);
        assert_eq!(emu.cpu.mmu.interrupts.interrupt_flag.bits() & 0x04, 0);

        run_cycles(&mut emu, 40);
        assert_ne!(emu.cpu.mmu.interrupts.interrupt_flag.bits() & 0x04, 0);
    }

    #[test]
    fn test_framebuffer_renders_tile_zero() {
        // Point tilemap entry (0,0) at an all-ones tile 0 and give BGP a
        // palette where colour index 3 is the darkest shade.
        let mut emu = emulator_with_program(&[0x76]);

        for i in 0..16 {
            emu.cpu.mmu.write_byte(0x8000 + i, 0xFF);
        }
        emu.cpu.mmu.write_byte(0xFF47, 0xC0);
        // 0x8000 addressing + BG enable + LCD on.
        emu.cpu.mmu.write_byte(0xFF40, 0x91);

        run_cycles(&mut emu, CYCLES_PER_FRAME + 100);

        let black = DisplayColour::default().black;
        assert_eq!(emu.frame_buffer()[0], black);
        assert_eq!(black, crate::hardware::ppu::palette::RGB(0x08, 0x18, 0x20));
    }

    #[test]
    fn test_video_sink_called_once_per_frame() {
        struct CountingSink(usize);
        impl VideoSink for CountingSink {
            fn frame_ready(&mut self, _frame: &[RGB; FRAMEBUFFER_SIZE]) {
                self.0 += 1;
            }
        }

        let mut emu = emulator_with_program(&[0x18, 0xFE]); // JR -2
        let mut video = CountingSink(0);

        let mut spent = 0u64;
        while spent < CYCLES_PER_FRAME * 3 {
            spent += emu.emulate_cycle(&mut video, &mut NullSink, &mut NullInput) as u64;
        }

        assert_eq!(video.0, 3);
    }

    #[test]
    fn test_audio_sink_receives_sample_stream() {
        struct CountingSink(usize);
        impl AudioSink for CountingSink {
            fn push_samples(&mut self, samples: &[f32]) {
                self.0 += samples.len();
            }
        }

        let mut emu = emulator_with_program(&[0x18, 0xFE]);
        let mut audio = CountingSink(0);

        // One emulated second of spinning.
        let mut spent = 0u64;
        while spent < MACHINE_CYCLES_PER_SECOND {
            spent += emu.emulate_cycle(&mut NullSink, &mut audio, &mut NullInput) as u64;
        }

        // ~32768 stereo pairs, allow slack for the last partial window.
        let pairs = audio.0 / 2;
        assert!((32700..=32800).contains(&pairs), "got {} pairs", pairs);
    }

    #[test]
    fn test_deterministic_replay() {
        let program = [
            0x3E, 0x30, // LD A, 0x30
            0xE0, 0x00, // LDH (JOYP), A
            0x04, // INC B
            0x18, 0xFB, // JR -5
        ];

        let run = |frames: u64| -> Vec<RGB> {
            let mut emu = emulator_with_program(&program);
            run_cycles(&mut emu, CYCLES_PER_FRAME * frames);
            emu.frame_buffer().to_vec()
        };

        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_stop_instruction_ends_run() {
        let mut emu = emulator_with_program(&[0x00, 0x10]);
        let stop = AtomicBool::new(false);

        emu.run(&stop, &mut NullSink, &mut NullSink, &mut NullInput);

        assert!(emu.stop_requested());
    }

    #[test]
    fn test_external_stop_flag_ends_run() {
        let mut emu = emulator_with_program(&[0x18, 0xFE]);
        let stop = AtomicBool::new(true);

        emu.run(&stop, &mut NullSink, &mut NullSink, &mut NullInput);

        assert!(!emu.stop_requested());
    }

    #[test]
    fn test_dma_transfer_charges_driver_tick() {
        // Copy a page from WRAM into OAM via the DMA register.
        let mut emu = emulator_with_program(&[
            0x3E, 0xC0, // LD A, 0xC0
            0xE0, 0x46, // LDH (DMA), A
            0x76, // HALT
        ]);
        emu.cpu.mmu.write_byte(0xC000, 0x42);

        let mut dma_tick = 0;
        for _ in 0..2 {
            dma_tick = emu.emulate_cycle(&mut NullSink, &mut NullSink, &mut NullInput);
        }

        // 3 cycles for the LDH itself plus the 160 cycle transfer.
        assert_eq!(dma_tick, 163);
        assert_eq!(emu.cpu.mmu.read_byte(0xFE00), 0x42);
    }
}
