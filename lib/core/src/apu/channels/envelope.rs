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

//! The volume envelope shared by channels 1, 2 and 4 (spec.md APU §4.5).

#[derive(Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    pub initial_volume: u8,
    pub increasing: bool,
    pub period: u8,

    volume: u8,
    timer: u8,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses NRx2: bits 7-4 initial volume, bit 3 direction, bits 2-0 period.
    pub fn write_register(&mut self, value: u8) {
        self.initial_volume = value >> 4;
        self.increasing = (value & 0x08) != 0;
        self.period = value & 0x07;
    }

    pub fn read_register(&self) -> u8 {
        (self.initial_volume << 4) | (if self.increasing { 0x08 } else { 0 }) | self.period
    }

    /// True if this channel's DAC is enabled, i.e. the upper 5 bits of NRx2 are not all zero.
    pub fn dac_enabled(&self) -> bool {
        (self.initial_volume != 0) || self.increasing
    }

    pub fn trigger(&mut self) {
        self.volume = self.initial_volume;
        self.timer = self.period;
    }

    /// Ticked at 64 Hz by the frame sequencer.
    pub fn tick(&mut self) {
        if self.period == 0 {
            return;
        }

        if self.timer > 0 {
            self.timer -= 1;
        }

        if self.timer == 0 {
            self.timer = self.period;

            if self.increasing && self.volume < 15 {
                self.volume += 1;
            }
            else if !self.increasing && self.volume > 0 {
                self.volume -= 1;
            }
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }
}
