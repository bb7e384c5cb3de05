use crate::hardware::cartridge::header::CartridgeHeader;
use crate::hardware::cartridge::mbc::{Mbc, Mbc1, RomOnly};

pub mod header;
pub mod mbc;

/// A loaded cartridge: the parsed header plus the memory bank controller
/// the header told us to instantiate.
pub struct Cartridge {
    header: CartridgeHeader,
    mbc: Box<dyn Mbc>,
}

impl Cartridge {
    /// Build a cartridge from a raw ROM dump. `saved_ram` optionally
    /// restores a previous session's battery-backed external RAM.
    pub fn new(rom: &[u8], saved_ram: Option<Vec<u8>>) -> Self {
        let header = CartridgeHeader::new(rom);
        log::info!(
            "Loading cartridge \"{}\" (type 0x{:02X}, {} ROM banks, {} RAM banks)",
            header.title,
            header.cartridge_type,
            header.rom_bank_count(),
            header.ram_size.bank_count()
        );

        let mbc: Box<dyn Mbc> = match header.cartridge_type {
            0x0 => Box::new(RomOnly::new(rom.to_vec())),
            0x1..=0x3 => Box::new(Mbc1::new(
                rom.to_vec(),
                header.cartridge_type == 0x3,
                header.ram_size.to_usize(),
                saved_ram,
            )),
            unsupported => {
                log::error!("Unsupported MBC type 0x{:02X}, continuing without banking", unsupported);
                Box::new(RomOnly::new(rom.to_vec()))
            }
        };

        Cartridge { header, mbc }
    }

    pub fn cartridge_header(&self) -> &CartridgeHeader {
        &self.header
    }

    /// The battery-backed external RAM, if the cartridge has any.
    /// Intended for the host's save functionality.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.mbc.battery_ram()
    }

    pub fn read_0000_3fff(&self, address: u16) -> u8 {
        self.mbc.read_3fff(address)
    }

    pub fn read_4000_7fff(&self, address: u16) -> u8 {
        self.mbc.read_7fff(address)
    }

    pub fn read_external_ram(&self, address: u16) -> u8 {
        self.mbc.read_ex_ram(address)
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.mbc.write_byte(address, value);
    }
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cartridge: {:?}", self.header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_falls_back_to_rom_only() {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x13;
        rom[0x4000] = 0xAB;

        let cartridge = Cartridge::new(&rom, None);

        // The switchable region still reads the second bank of the raw image.
        assert_eq!(cartridge.read_4000_7fff(0x4000), 0xAB);
    }

    #[test]
    fn test_battery_ram_round_trip() {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x03;
        rom[0x149] = 0x02;

        let saved = vec![0x55; 0x2000];
        let mut cartridge = Cartridge::new(&rom, Some(saved));

        cartridge.write_byte(0x0000, 0x0A);
        assert_eq!(cartridge.read_external_ram(0xA000), 0x55);

        cartridge.write_byte(0xA000, 0x66);
        assert_eq!(cartridge.battery_ram().unwrap()[0], 0x66);
    }
}
