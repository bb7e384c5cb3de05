use std::str::from_utf8;

pub const HEADER_START: u16 = 0x0100;
pub const HEADER_END: u16 = 0x014F;

/// The sizes of external RAM a cartridge can report at 0x0149.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RamSize {
    None,
    Unused,
    Banks1,
    Banks4,
    Banks16,
}

impl RamSize {
    pub fn bank_count(self) -> usize {
        match self {
            RamSize::None | RamSize::Unused => 0,
            RamSize::Banks1 => 1,
            RamSize::Banks4 => 4,
            RamSize::Banks16 => 16,
        }
    }

    pub fn to_usize(self) -> usize {
        self.bank_count() * super::mbc::EXTERNAL_RAM_SIZE
    }
}

impl From<u8> for RamSize {
    fn from(value: u8) -> Self {
        match value {
            0x0 => RamSize::None,
            0x1 => RamSize::Unused,
            0x2 => RamSize::Banks1,
            0x3 => RamSize::Banks4,
            _ => RamSize::Banks16,
        }
    }
}

/// The parsed cartridge header at 0x0100-0x014F.
#[derive(Debug, Default)]
pub struct CartridgeHeader {
    /// Upper case ASCII, 16 characters, zero filled if less than that.
    pub title: String,
    /// Specifies which Memory Bank Controller (if any) is used in the cartridge,
    /// and if further external hardware exists in the cartridge.
    pub cartridge_type: u8,
    /// Specifies the ROM size of the cartridge, calculated as `32 KiB << value`.
    pub rom_size: u8,
    /// Specifies the size of the external RAM in the cartridge (if any).
    pub ram_size: RamSize,
    /// Contains an 8 bit checksum across the cartridge header bytes 0134-014C.
    pub header_checksum: u8,
    /// Contains a 16 bit checksum (upper byte first) across the whole cartridge ROM.
    /// Real hardware doesn't verify this one.
    pub global_checksum: u16,
}

impl CartridgeHeader {
    pub fn new(rom: &[u8]) -> Self {
        CartridgeHeader {
            title: read_title(rom),
            cartridge_type: rom[0x147],
            rom_size: rom[0x148],
            ram_size: RamSize::from(rom[0x149]),
            header_checksum: rom[0x14D],
            global_checksum: ((rom[0x14E] as u16) << 8) | rom[0x14F] as u16,
        }
    }

    /// The number of 16 KiB ROM banks this cartridge reports.
    pub fn rom_bank_count(&self) -> usize {
        2 << self.rom_size as usize
    }
}

impl Default for RamSize {
    fn default() -> Self {
        RamSize::None
    }
}

fn read_title(rom: &[u8]) -> String {
    from_utf8(&rom[0x134..=0x143])
        .unwrap_or("INVALID TITLE")
        .trim_matches(char::from(0))
        .to_owned()
}
