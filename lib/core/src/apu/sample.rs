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

//! A minimal stereo float sample type, accumulated by [crate::apu::audio_output::AudioOutput]
//! and produced by [crate::apu::mixer::Mixer].

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StereoSample {
    pub left: f32,
    pub right: f32,
}

impl StereoSample {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

impl core::ops::Add for StereoSample {
    type Output = StereoSample;

    fn add(self, rhs: Self) -> Self::Output {
        StereoSample { left: self.left + rhs.left, right: self.right + rhs.right }
    }
}

impl core::ops::AddAssign for StereoSample {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl core::ops::Mul<f32> for StereoSample {
    type Output = StereoSample;

    fn mul(self, rhs: f32) -> Self::Output {
        StereoSample { left: self.left * rhs, right: self.right * rhs }
    }
}
