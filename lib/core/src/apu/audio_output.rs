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

use std::cmp::min;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::apu::sample::StereoSample;
use crate::cpu::cpu::CPU_CLOCK_SPEED;
use crate::gameboy::{Clock, DeviceConfig};


/// The size of the sample buffer to be transmitted to the receiver of generated audio data.
pub const SAMPLE_BUFFER_SIZE: usize = 1024;

pub type SampleBuffer = [StereoSample; SAMPLE_BUFFER_SIZE];
pub type SamplesSender = Sender<Box<SampleBuffer>>;
pub type SamplesReceiver = Receiver<Box<SampleBuffer>>;


/// Stores the configuration to initialize the audio generation.
pub struct AudioOutputSpec {
    pub sample_rate: u32,
}


/// A buffer object receiving the audio data generated by the APU and resampling it to
/// a frontend-chosen output rate by averaging over each output period.
pub struct AudioOutput {
    sample_rate: u32,
    time_passed: Clock,
    next_sample_time: Clock,
    sample_multiplier: f32,
    current_sample: StereoSample,
    buffer: Box<SampleBuffer>,
    buffer_insert_pos: usize,
    sender: Option<SamplesSender>,

    #[allow(dead_code)]
    device_config: DeviceConfig,
}


impl AudioOutput {
    pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

    pub fn new(device_config: DeviceConfig) -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            time_passed: 0,
            next_sample_time: 0,
            sample_multiplier: 0.0,
            current_sample: StereoSample::default(),
            buffer: Box::new([StereoSample::default(); SAMPLE_BUFFER_SIZE]),
            buffer_insert_pos: 0,
            sender: None,
            device_config,
        }
    }

    pub fn get_sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Accumulates a sample value held steady for `cycles` T-states, splitting the run
    /// across output-sample boundaries as needed to keep the running average correct.
    pub(crate) fn push(&mut self, sample: StereoSample, cycles: Clock) {
        let mut remaining_cycles = cycles;

        while remaining_cycles > 0 {
            let time_to_next_sample = self.next_sample_time.saturating_sub(self.time_passed).max(1);
            let run_cycles = min(remaining_cycles, time_to_next_sample);

            self.current_sample += sample * (run_cycles as f32) * self.sample_multiplier;

            self.time_passed += run_cycles;
            if self.time_passed >= self.next_sample_time {
                self.finish_sample();

                if self.next_sample_time > CPU_CLOCK_SPEED {
                    self.next_sample_time -= CPU_CLOCK_SPEED;
                    self.time_passed -= CPU_CLOCK_SPEED;
                }

                let sample_rate = self.sample_rate as Clock;
                let last_sample_time = self.next_sample_time;
                let current_sample_number = (self.next_sample_time + 1) * sample_rate / CPU_CLOCK_SPEED;
                let next_sample_number = current_sample_number + 1;
                let next_sample_time = next_sample_number * CPU_CLOCK_SPEED / sample_rate;
                self.next_sample_time = next_sample_time;

                let time_diff = next_sample_time - last_sample_time;
                self.sample_multiplier = 1.0 / (time_diff.max(1) as f32);
            }

            remaining_cycles -= run_cycles;
        }
    }

    fn finish_sample(&mut self) {
        self.buffer[self.buffer_insert_pos] = self.current_sample;
        self.current_sample = StereoSample::default();
        self.buffer_insert_pos += 1;

        if self.buffer_insert_pos >= SAMPLE_BUFFER_SIZE {
            if let Some(sender) = &self.sender {
                if sender.send(self.buffer.clone()).is_err() {
                    self.sender = None;
                }
            }

            self.buffer_insert_pos = 0;
        }
    }

    /// Opens a channel to receive audio samples from the emulator backend at the given
    /// sample rate, replacing any previously opened channel.
    pub fn open_channel(&mut self, spec: AudioOutputSpec) -> Option<SamplesReceiver> {
        assert_ne!(spec.sample_rate, 0);

        let (s, r) = channel::<Box<SampleBuffer>>();
        self.sample_rate = spec.sample_rate;
        self.sender = Some(s);

        Some(r)
    }
}
