/*
 * Copyright (C) 2022-2024 by Christian Fischer
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

//! The joypad (P1, 0xff00). Button state is tracked as a flat 8 bit mask; reading P1
//! ORs in whichever of the d-pad/button matrices the game has currently selected via
//! bits 4/5, both inverted since the hardware uses active-low logic (spec.md §4.8).

use crate::cpu::interrupts::Interrupt;
use crate::mmu::locations::MEMORY_LOCATION_P1;
use crate::mmu::memory_bus::{MemoryBusConnection, MemoryBusSignals};
use crate::utils::get_bit;

#[derive(Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    fn bit(&self) -> u8 {
        match self {
            Button::Right | Button::A => 0,
            Button::Left | Button::B => 1,
            Button::Up | Button::Select => 2,
            Button::Down | Button::Start => 3,
        }
    }

    fn is_dpad(&self) -> bool {
        matches!(self, Button::Right | Button::Left | Button::Up | Button::Down)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Input {
    /// Bit set when the matching button is held down.
    dpad_state: u8,
    buttons_state: u8,

    select_buttons: bool,
    select_dpad: bool,

    last_unselected: u8,

    #[cfg_attr(feature = "serde", serde(skip))]
    signals: MemoryBusSignals,
}

impl Input {
    pub fn new() -> Self {
        Self {
            dpad_state: 0,
            buttons_state: 0,
            select_buttons: false,
            select_dpad: false,
            last_unselected: 0x0f,
            signals: MemoryBusSignals::default(),
        }
    }

    pub fn set_button_pressed(&mut self, button: Button, pressed: bool) {
        let mask = 1 << button.bit();
        let state = if button.is_dpad() { &mut self.dpad_state } else { &mut self.buttons_state };

        if pressed {
            *state |= mask;
        }
        else {
            *state &= !mask;
        }
    }

    fn currently_unselected(&self) -> u8 {
        let mut result = 0x0f;

        if self.select_dpad {
            result &= !self.dpad_state;
        }
        if self.select_buttons {
            result &= !self.buttons_state;
        }

        result
    }

    /// Raises the Joypad interrupt on a high-to-low transition of any of the four
    /// observed signal lines, matching real hardware's edge-triggered wiring.
    pub fn update(&mut self) {
        let unselected = self.currently_unselected();

        let pressed_edge = (self.last_unselected & !unselected) != 0;
        if pressed_edge {
            self.signals.request(Interrupt::Joypad);
        }

        self.last_unselected = unselected;
    }

    pub fn take_signals(&mut self) -> MemoryBusSignals {
        core::mem::take(&mut self.signals)
    }
}

impl MemoryBusConnection for Input {
    fn on_read(&self, address: u16) -> u8 {
        match address {
            MEMORY_LOCATION_P1 => {
                0xc0
                    | (if self.select_buttons { 0 } else { 0x20 })
                    | (if self.select_dpad { 0 } else { 0x10 })
                    | self.currently_unselected()
            }
            _ => 0xff,
        }
    }

    fn on_write(&mut self, address: u16, value: u8) {
        if address == MEMORY_LOCATION_P1 {
            self.select_buttons = !get_bit(value, 5);
            self.select_dpad = !get_bit(value, 4);
        }
    }
}
