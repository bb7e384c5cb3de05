pub mod emulator;
pub mod hardware;
mod io;

pub use crate::hardware::ppu::palette::{DisplayColour, RGB};
pub use crate::io::joypad::InputKey;

/// Struct wrapping the various options for the `Emulator`.
#[derive(Debug)]
pub struct EmulatorOptions {
    /// Battery-backed external RAM from a previous session, if any.
    pub saved_ram: Option<Vec<u8>>,
    /// The concrete colours the four monochrome shades resolve to.
    pub display_colours: DisplayColour,
    /// The audio output sample rate in Hz.
    pub sample_rate: u32,
}

#[derive(Debug)]
pub struct EmulatorOptionsBuilder {
    saved_ram: Option<Vec<u8>>,
    display_colours: DisplayColour,
    sample_rate: u32,
}

impl EmulatorOptionsBuilder {
    pub fn new() -> Self {
        EmulatorOptionsBuilder {
            saved_ram: None,
            display_colours: DisplayColour::default(),
            sample_rate: crate::hardware::apu::SAMPLE_RATE,
        }
    }

    pub fn saved_ram(mut self, saved_ram: Option<Vec<u8>>) -> Self {
        self.saved_ram = saved_ram;
        self
    }

    pub fn display_colours(mut self, display_colours: DisplayColour) -> Self {
        self.display_colours = display_colours;
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn build(self) -> EmulatorOptions {
        EmulatorOptions {
            saved_ram: self.saved_ram,
            display_colours: self.display_colours,
            sample_rate: self.sample_rate,
        }
    }
}

impl Default for EmulatorOptionsBuilder {
    fn default() -> Self {
        EmulatorOptionsBuilder::new()
    }
}

impl From<EmulatorOptions> for EmulatorOptionsBuilder {
    fn from(from: EmulatorOptions) -> Self {
        EmulatorOptionsBuilder {
            saved_ram: from.saved_ram,
            display_colours: from.display_colours,
            sample_rate: from.sample_rate,
        }
    }
}
