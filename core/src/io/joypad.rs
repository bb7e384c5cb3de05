//! Joypad register emulation. Games select either the direction or the
//! button group via bits 4/5 and read the group's state from the lower
//! nibble, where a cleared bit means "pressed".

use bitflags::*;

use crate::io::interrupts::{Interrupt, Interrupts};

pub const JOYPAD_REGISTER: u16 = 0xFF00;

/// Buttons in the order the host's `InputSource` reports them.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum InputKey {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl InputKey {
    pub fn iter() -> impl Iterator<Item = InputKey> {
        use InputKey::*;
        [Right, Left, Up, Down, A, B, Select, Start].iter().copied()
    }

    fn to_flags(self) -> JoypadFlags {
        match self {
            InputKey::Right | InputKey::A => JoypadFlags::RIGHT_A,
            InputKey::Left | InputKey::B => JoypadFlags::LEFT_B,
            InputKey::Up | InputKey::Select => JoypadFlags::UP_SELECT,
            InputKey::Down | InputKey::Start => JoypadFlags::DOWN_START,
        }
    }

    fn is_direction(self) -> bool {
        matches!(self, InputKey::Right | InputKey::Left | InputKey::Up | InputKey::Down)
    }
}

#[derive(Debug, Clone)]
pub struct JoyPad {
    pressed_directions: JoypadFlags,
    pressed_buttons: JoypadFlags,
    selected_mode: JoypadFlags,
}

impl JoyPad {
    pub fn new() -> Self {
        JoyPad {
            pressed_directions: JoypadFlags::empty(),
            pressed_buttons: JoypadFlags::empty(),
            selected_mode: JoypadFlags::from_bits_truncate(0xFF),
        }
    }

    /// The register value for the currently selected group, bits inverted
    /// such that `0` means pressed.
    pub fn get_register(&self) -> u8 {
        !self.selected_mode.bits()
    }

    /// Games write the upper nibble to select a group; writes to the lower
    /// nibble are discarded.
    pub fn set_register(&mut self, mode: u8) {
        self.selected_mode = JoypadFlags::from_bits_truncate(!mode);
        self.update_flags();
    }

    pub fn press_key(&mut self, input: InputKey, interrupts: &mut Interrupts) {
        let group = if input.is_direction() {
            &mut self.pressed_directions
        } else {
            &mut self.pressed_buttons
        };

        if !group.contains(input.to_flags()) {
            group.insert(input.to_flags());
            interrupts.request(Interrupt::Joypad);
        }
        self.update_flags();
    }

    pub fn release_key(&mut self, input: InputKey) {
        if input.is_direction() {
            self.pressed_directions.remove(input.to_flags());
        } else {
            self.pressed_buttons.remove(input.to_flags());
        }
        self.update_flags();
    }

    /// Refresh the full button state from the host's input snapshot,
    /// ordered `{Right, Left, Up, Down, A, B, Select, Start}`.
    pub fn update_state(&mut self, buttons: [bool; 8], interrupts: &mut Interrupts) {
        for (pressed, key) in buttons.iter().zip(InputKey::iter()) {
            if *pressed {
                self.press_key(key, interrupts);
            } else {
                self.release_key(key);
            }
        }
    }

    fn update_flags(&mut self) {
        // Keep only the group-select bits, then mix the relevant group back in.
        self.selected_mode = JoypadFlags::from_bits_truncate(self.selected_mode.bits() & 0b0011_0000);
        if self.selected_mode.contains(JoypadFlags::BUTTON_KEYS) {
            self.selected_mode.insert(self.pressed_buttons);
        }
        if self.selected_mode.contains(JoypadFlags::DIRECTION_KEYS) {
            self.selected_mode.insert(self.pressed_directions);
        }
    }
}

bitflags! {
    #[derive(Default)]
    struct JoypadFlags: u8 {
        /// Right or A
        const RIGHT_A         = 0b0000_0001;
        /// Left or B
        const LEFT_B          = 0b0000_0010;
        /// Up or Select
        const UP_SELECT       = 0b0000_0100;
        /// Down or Start
        const DOWN_START      = 0b0000_1000;
        /// Select direction keys
        const DIRECTION_KEYS  = 0b0001_0000;
        /// Select button keys
        const BUTTON_KEYS     = 0b0010_0000;
        /// Unused, but necessary for bits() to return 0xFF
        const UNUSED_0        = 0b0100_0000;
        /// Unused, but necessary for bits() to return 0xFF
        const UNUSED_1        = 0b1000_0000;
    }
}
