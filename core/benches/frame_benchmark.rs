use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dotboy_core::emulator::{Emulator, NullInput, NullSink, CYCLES_PER_FRAME};
use dotboy_core::EmulatorOptionsBuilder;

/// A ROM-only image spinning over the arithmetic block while scrolling the
/// background, to keep both the CPU and the PPU render path busy.
fn synthetic_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    let program = [
        0x3C, // INC A
        0xE0, 0x43, // LDH (SCX), A
        0x87, // ADD A, A
        0xB8, // CP B
        0x04, // INC B
        0x18, 0xF8, // JR -8
    ];
    rom[0x100..0x100 + program.len()].copy_from_slice(&program);
    rom
}

fn frame_benchmark(c: &mut Criterion) {
    c.bench_function("emulate_frame", |b| {
        let rom = synthetic_rom();
        let mut emulator = Emulator::new(&rom, EmulatorOptionsBuilder::new().build());

        b.iter(|| {
            let mut spent = 0u64;
            while spent < CYCLES_PER_FRAME {
                spent += emulator.emulate_cycle(&mut NullSink, &mut NullSink, &mut NullInput) as u64;
            }
            black_box(emulator.frame_buffer()[0]);
        });
    });
}

criterion_group!(benches, frame_benchmark);
criterion_main!(benches);
