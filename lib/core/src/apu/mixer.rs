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

//! Mixes the four channel outputs into stereo according to NR50/NR51 (spec.md APU §4.5).

use crate::apu::sample::StereoSample;
use crate::utils::get_bit;

#[derive(Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mixer {
    nr50: u8,
    nr51: u8,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.nr50 = 0;
        self.nr51 = 0;
    }

    pub fn read_nr50(&self) -> u8 {
        self.nr50
    }

    pub fn write_nr50(&mut self, value: u8) {
        self.nr50 = value;
    }

    pub fn read_nr51(&self) -> u8 {
        self.nr51
    }

    pub fn write_nr51(&mut self, value: u8) {
        self.nr51 = value;
    }

    fn volume_left(&self) -> f32 {
        (((self.nr50 >> 4) & 0x07) + 1) as f32 / 8.0
    }

    fn volume_right(&self) -> f32 {
        ((self.nr50 & 0x07) + 1) as f32 / 8.0
    }

    /// Mixes one sample per channel (already converted to a -1.0..1.0 DAC value) into a
    /// stereo pair, honouring the NR51 panning bits (0-3 right, 4-7 left).
    pub fn mix(&self, channels: [f32; 4]) -> StereoSample {
        let mut left = 0.0f32;
        let mut right = 0.0f32;

        for (i, value) in channels.iter().enumerate() {
            if get_bit(self.nr51, i as u8) {
                right += value;
            }
            if get_bit(self.nr51, (i + 4) as u8) {
                left += value;
            }
        }

        StereoSample::new(left * self.volume_left() / 4.0, right * self.volume_right() / 4.0)
    }
}
