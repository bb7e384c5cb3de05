use std::io;
use std::path::Path;

use nanoserde::{DeJson, SerJson};

/// The machine-readable summary of a headless run, for regression tooling.
#[derive(Debug, SerJson, DeJson)]
pub struct RunReport {
    pub rom: String,
    pub frames: u64,
    pub machine_cycles: u64,
    /// Blake2s hash of the final framebuffer, hex encoded.
    pub frame_hash: String,
    /// Whatever the ROM printed over the serial port, lossily decoded.
    pub serial_output: String,
}

impl RunReport {
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, self.serialize_json())
    }
}
