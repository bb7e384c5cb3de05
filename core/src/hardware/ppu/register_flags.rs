use bitflags::*;

use crate::hardware::ppu::Mode;

bitflags! {
    /// FF40
    /// LCDC is a powerful tool: each bit controls a lot of behavior,
    /// and can be modified at any time during the frame.
    #[derive(Default)]
    pub struct LcdControl: u8 {
        /// When this bit is cleared, both background and window become blank (white),
        /// and the window display bit is ignored. Only sprites may still be
        /// displayed (if enabled in bit 1).
        const BG_WINDOW_PRIORITY = 0b0000_0001;
        /// This bit toggles whether sprites are displayed or not.
        /// This can be toggled mid-frame, for example to avoid sprites
        /// being displayed on top of a status bar or text box.
        const SPRITE_DISPLAY_ENABLE = 0b0000_0010;
        /// This bit controls the sprite size (1 tile or 2 stacked vertically).
        const SPRITE_SIZE = 0b0000_0100;
        /// If the bit is reset the BG uses tilemap `$9800`, otherwise `$9C00`.
        const BG_TILE_MAP_SELECT = 0b0000_1000;
        /// 0=8800-97FF (signed indexing from $9000), 1=8000-8FFF.
        /// Controls which addressing mode the BG and window use to pick tiles.
        /// Sprites always use $8000 addressing.
        const BG_WINDOW_TILE_SELECT = 0b0001_0000;
        /// Whether the window is displayed; overridden on DMG by bit 0.
        const WINDOW_DISPLAY = 0b0010_0000;
        /// Which tilemap the window uses: 0 is `$9800`, 1 is `$9C00`.
        const WINDOW_MAP_SELECT = 0b0100_0000;
        /// Whether the LCD is on and the PPU is active. Turning it off
        /// resets the mode machine and grants full access to VRAM/OAM.
        const LCD_DISPLAY = 0b1000_0000;
    }
}

bitflags! {
    /// FF41
    /// The mode bits are read-only from the CPU's point of view; bits 3-6
    /// select which transitions raise a STAT interrupt.
    #[derive(Default)]
    pub struct LcdStatus: u8 {
        /// Mode flag bit 0 (read only).
        const MODE_FLAG_0 = 0b0000_0001;
        /// Mode flag bit 1 (read only).
        const MODE_FLAG_1 = 0b0000_0010;
        /// 0: LYC != LY, 1: LYC == LY (read only).
        const COINCIDENCE_FLAG = 0b0000_0100;
        /// Mode 0 H-Blank interrupt enable.
        const MODE_0_H_INTERRUPT = 0b0000_1000;
        /// Mode 1 V-Blank interrupt enable.
        const MODE_1_V_INTERRUPT = 0b0001_0000;
        /// Mode 2 OAM interrupt enable.
        const MODE_2_OAM_INTERRUPT = 0b0010_0000;
        /// LYC=LY coincidence interrupt enable.
        const COINCIDENCE_INTERRUPT = 0b0100_0000;

        const UNUSED = 0b1000_0000;
    }
}

bitflags! {
    /// The attribute byte of an OAM entry.
    #[derive(Default)]
    pub struct AttributeFlags: u8 {
        /// 0=OBP0, 1=OBP1.
        const PALETTE_NUMBER = 0b0001_0000;
        /// 0=Normal, 1=Horizontally mirrored.
        const X_FLIP = 0b0010_0000;
        /// 0=Normal, 1=Vertically mirrored.
        const Y_FLIP = 0b0100_0000;
        /// 0=OBJ above BG, 1=OBJ behind BG colours 1-3
        /// (BG colour 0 is always behind the object).
        const OBJ_TO_BG_PRIORITY = 0b1000_0000;
    }
}

impl LcdStatus {
    pub fn mode_flag(&self) -> Mode {
        match self.bits() & 0x3 {
            0 => Mode::HBlank,
            1 => Mode::VBlank,
            2 => Mode::OamScan,
            _ => Mode::Drawing,
        }
    }

    pub fn set_mode_flag(&mut self, value: Mode) {
        let bits = match value {
            Mode::HBlank => 0,
            Mode::VBlank => 1,
            Mode::OamScan => 2,
            Mode::Drawing => 3,
        };
        *self = LcdStatus::from_bits_truncate((self.bits() & 0xFC) | bits);
    }
}
