use crate::hardware::apu::channel_features::LengthFeature;
use crate::hardware::apu::test_bit;
use crate::hardware::mmu::INVALID_READ;

/// Voice 3 of the DMG: plays 4-bit samples straight out of wave RAM.
///
/// # Properties:
/// * Length Counter
#[derive(Debug)]
pub struct WaveformChannel {
    length: LengthFeature,
    active: bool,
    pending_trigger: bool,
    dac_power: bool,
    frequency: u16,
    timer: u16,
    volume_load: u8,
    volume_shift: u8,
    sample_buffer: [u8; 32],
    sample_pointer: usize,
}

impl WaveformChannel {
    pub fn new() -> Self {
        WaveformChannel {
            length: LengthFeature::new(256),
            active: false,
            pending_trigger: false,
            dac_power: false,
            frequency: 0,
            timer: 0,
            volume_load: 0,
            volume_shift: 4,
            // The DMG power-on wave RAM pattern; some games rely on it.
            sample_buffer: [
                0x8, 0x4, 0x4, 0x0, 0x4, 0x3, 0xA, 0xA, 0x2, 0xD, 0x7, 0x8, 0x9, 0x2, 0x3, 0xC, 0x6, 0x0, 0x5, 0x9,
                0x5, 0x9, 0xB, 0x0, 0x3, 0x4, 0xB, 0x8, 0x2, 0xE, 0xD, 0xA,
            ],
            sample_pointer: 0,
        }
    }

    pub fn output_volume(&self) -> u8 {
        if self.active && self.dac_power {
            self.sample_buffer[self.sample_pointer] >> self.volume_shift
        } else {
            0
        }
    }

    pub fn active(&self) -> bool {
        self.active && self.dac_power
    }

    /// Step through the 32 wave RAM nibbles, one per `(2048 - frequency) * 2` dots.
    pub fn tick_timer(&mut self, mut dots: u32) {
        while dots >= self.timer as u32 {
            dots -= self.timer as u32;
            self.timer = (2048 - self.frequency) * 2;
            self.sample_pointer = (self.sample_pointer + 1) % 32;
        }
        self.timer -= dots as u16;
    }

    pub fn tick_length(&mut self) {
        self.length.tick(&mut self.active);
    }

    pub fn read_register(&self, address: u16) -> u8 {
        // Expects the address to already have had an & 0xFF.
        match address {
            0x1A => 0x7F | if self.dac_power { 0x80 } else { 0 },
            0x1B => INVALID_READ, // NR31 is write-only.
            0x1C => 0x9F | self.volume_load,
            0x1D => INVALID_READ, // NR33 is write-only.
            0x1E => 0xBF | if self.length.length_enable { 0x40 } else { 0x0 },
            0x30..=0x3F => {
                let offset_address = ((address - 0x30) * 2) as usize;
                (self.sample_buffer[offset_address] << 4) | self.sample_buffer[offset_address + 1]
            }
            _ => unreachable!("Invalid wave channel register read: 0xFF{:02X}", address),
        }
    }

    pub fn write_register(&mut self, address: u16, value: u8) {
        // Expects the address to already have had an & 0xFF.
        match address {
            0x1A => {
                self.dac_power = test_bit(value, 7);
                if !self.dac_power {
                    self.active = false;
                }
            }
            0x1B => self.length.write_register(value),
            0x1C => self.set_volume_from_val(value),
            0x1D => self.frequency = (self.frequency & 0x0700) | value as u16,
            0x1E => {
                self.length.length_enable = test_bit(value, 6);
                self.frequency = (self.frequency & 0xFF) | (((value & 0x07) as u16) << 8);
                if test_bit(value, 7) {
                    self.pending_trigger = true;
                }
            }
            0x30..=0x3F => {
                let offset_address = ((address - 0x30) * 2) as usize;
                self.sample_buffer[offset_address] = value >> 4;
                self.sample_buffer[offset_address + 1] = value & 0xF;
            }
            _ => unreachable!("Invalid wave channel register write: 0xFF{:02X}", address),
        }
    }

    pub fn consume_trigger(&mut self) {
        if !self.pending_trigger {
            return;
        }
        self.pending_trigger = false;

        self.active = self.dac_power;
        self.length.trigger();
        self.timer = (2048 - self.frequency) * 2;
        self.sample_pointer = 0;
    }

    /// NR32 bits 5-6 select the output level: mute, 100%, 50% or 25%,
    /// implemented as a right shift of the 4-bit sample.
    fn set_volume_from_val(&mut self, value: u8) {
        self.volume_load = value & 0x60;
        self.volume_shift = match self.volume_load >> 5 {
            0b00 => 4,
            0b01 => 0,
            0b10 => 1,
            _ => 2,
        };
    }

    pub fn reset(&mut self) {
        let sample_buffer = self.sample_buffer;
        *self = Self::new();
        // Wave RAM survives an APU power cycle.
        self.sample_buffer = sample_buffer;
    }
}
