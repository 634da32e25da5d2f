/*
 * Copyright (C) 2022-2025 by Christian Fischer
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

//! The Audio Processing Unit: four sound-generating channels, a 512 Hz frame sequencer
//! that periodically ticks their length/sweep/envelope components, and a mixer producing
//! stereo output (spec.md APU §4.5).
//!
//! Unlike the const-generic `Channel<Generator, FEATURE_*>` shape this module grew from,
//! each channel here is a concrete struct. The register layout, frame sequencer timing and
//! LFSR algorithm are unchanged; only the generic plumbing around them was flattened, to
//! keep the four channels' differences (channel 1's sweep, channel 3's direct volume
//! shift, channel 4's missing duty cycle) explicit rather than routed through trait
//! objects.

use crate::apu::audio_output::AudioOutput;
use crate::apu::channels::envelope::Envelope;
use crate::apu::channels::freq_sweep::{FrequencySweep, FrequencySweepResult};
use crate::apu::channels::length_timer::LengthTimer;
use crate::apu::channels::noise::NoiseGenerator;
use crate::apu::channels::pulse::PulseGenerator;
use crate::apu::channels::wave::WaveGenerator;
use crate::apu::mixer::Mixer;
use crate::gameboy::{Clock, DeviceConfig};
use crate::mmu::locations::*;
use crate::mmu::memory_bus::{MemoryBusConnection, MemoryBusSignals};
use crate::utils::{as_bit_flag, get_bit};

pub const APU_UPDATE_PERIOD: Clock = 8_192;

const NR52_NON_READABLE_BITS: u8 = 0b_0111_0000;


/// The frame sequencer ticks at 512 Hz (once every 8192 T-states), cycling through 8
/// steps that each activate a subset of the length/sweep/envelope units.
#[derive(Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct FrameSequencer {
    clock: Clock,
    step: u8,
}

impl FrameSequencer {
    fn advance(&mut self, cycles: Clock) -> u32 {
        self.clock += cycles;

        let mut steps = 0;
        while self.clock >= APU_UPDATE_PERIOD {
            self.clock -= APU_UPDATE_PERIOD;
            self.step = self.step.wrapping_add(1) & 0x07;
            steps += 1;
        }

        steps
    }

    fn is_length_timer_step(&self) -> bool {
        (self.step & 0b0001) == 0
    }

    fn is_freq_sweep_step(&self) -> bool {
        (self.step & 0b0011) == 0b10
    }

    fn is_volume_envelope_step(&self) -> bool {
        self.step == 0b0111
    }
}


/// Channel 1: pulse wave with frequency sweep and volume envelope.
#[derive(Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Channel1 {
    generator: PulseGenerator,
    envelope: Envelope,
    length: LengthTimer,
    sweep: FrequencySweep,
    enabled: bool,
}

/// Channel 2: pulse wave with volume envelope, no sweep.
#[derive(Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Channel2 {
    generator: PulseGenerator,
    envelope: Envelope,
    length: LengthTimer,
    enabled: bool,
}

/// Channel 3: wave table playback with a direct volume shift, no envelope.
#[derive(Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Channel3 {
    generator: WaveGenerator,
    length: LengthTimer,
    enabled: bool,
}

/// Channel 4: LFSR noise with volume envelope, no frequency register.
#[derive(Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Channel4 {
    generator: NoiseGenerator,
    envelope: Envelope,
    length: LengthTimer,
    enabled: bool,
}


/// The GameBoy's Audio Processing Unit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Apu {
    apu_on: bool,
    fs: FrameSequencer,

    ch1: Channel1,
    ch2: Channel2,
    ch3: Channel3,
    ch4: Channel4,

    mixer: Mixer,
    audio_output: AudioOutput,

    #[cfg_attr(feature = "serde", serde(skip))]
    signals: MemoryBusSignals,
}

impl Channel1 {
    fn new() -> Self {
        Self { length: LengthTimer::new(64), ..Default::default() }
    }
}

impl Channel2 {
    fn new() -> Self {
        Self { length: LengthTimer::new(64), ..Default::default() }
    }
}

impl Channel3 {
    fn new() -> Self {
        Self { length: LengthTimer::new(256), ..Default::default() }
    }
}

impl Channel4 {
    fn new() -> Self {
        Self { length: LengthTimer::new(64), ..Default::default() }
    }
}

impl Apu {
    pub fn new(device_config: DeviceConfig) -> Self {
        Self {
            apu_on: true,
            fs: FrameSequencer::default(),
            ch1: Channel1::new(),
            ch2: Channel2::new(),
            ch3: Channel3::new(),
            ch4: Channel4::new(),
            mixer: Mixer::new(),
            audio_output: AudioOutput::new(device_config),
            signals: MemoryBusSignals::default(),
        }
    }

    pub fn update(&mut self, cycles: Clock) {
        if self.apu_on {
            let steps = self.fs.advance(cycles);
            for _ in 0..steps {
                self.tick_frame_sequencer_step();
            }
        }

        self.update_channels(cycles);
    }

    fn tick_frame_sequencer_step(&mut self) {
        if self.fs.is_length_timer_step() {
            if self.ch1.length.tick() { self.ch1.enabled = false; }
            if self.ch2.length.tick() { self.ch2.enabled = false; }
            if self.ch3.length.tick() { self.ch3.enabled = false; }
            if self.ch4.length.tick() { self.ch4.enabled = false; }
        }

        if self.fs.is_freq_sweep_step() {
            match self.ch1.sweep.tick() {
                FrequencySweepResult::NewFrequency(f) => self.ch1.generator.frequency = f,
                FrequencySweepResult::ChannelDisabled => self.ch1.enabled = false,
                FrequencySweepResult::Unchanged => {}
            }
        }

        if self.fs.is_volume_envelope_step() {
            self.ch1.envelope.tick();
            self.ch2.envelope.tick();
            self.ch4.envelope.tick();
        }
    }

    fn update_channels(&mut self, cycles: Clock) {
        self.ch1.generator.update(cycles);
        self.ch2.generator.update(cycles);
        self.ch3.generator.update(cycles);
        self.ch4.generator.update(cycles);

        let s1 = if self.ch1.enabled { self.ch1.generator.amplitude() as f32 * self.ch1.envelope.volume() as f32 } else { 0.0 };
        let s2 = if self.ch2.enabled { self.ch2.generator.amplitude() as f32 * self.ch2.envelope.volume() as f32 } else { 0.0 };
        let s3 = if self.ch3.enabled { self.ch3.generator.amplitude() as f32 } else { 0.0 };
        let s4 = if self.ch4.enabled { self.ch4.generator.amplitude() as f32 * self.ch4.envelope.volume() as f32 } else { 0.0 };

        let sample = self.mixer.mix([s1, s2, s3, s4]);
        self.audio_output.push(sample, cycles);
    }

    fn power_on(&mut self) {
        self.fs = FrameSequencer::default();
    }

    fn power_off(&mut self) {
        self.mixer.reset();
        self.ch1 = Channel1::new();
        self.ch2 = Channel2::new();
        self.ch3 = Channel3::new();
        self.ch4 = Channel4::new();
    }

    pub fn is_any_dac_enabled(&self) -> bool {
        self.ch1.envelope.dac_enabled()
            || self.ch2.envelope.dac_enabled()
            || self.ch3.generator.dac_enabled
            || self.ch4.envelope.dac_enabled()
    }

    pub fn get_audio_output(&mut self) -> &mut AudioOutput {
        &mut self.audio_output
    }

    pub fn take_signals(&mut self) -> MemoryBusSignals {
        core::mem::take(&mut self.signals)
    }
}

impl MemoryBusConnection for Apu {
    fn on_read(&self, address: u16) -> u8 {
        match address {
            MEMORY_LOCATION_APU_NR10 => self.ch1.sweep.read_register(),
            MEMORY_LOCATION_APU_NR11 => (self.ch1.generator.duty << 6) | 0x3f,
            MEMORY_LOCATION_APU_NR12 => self.ch1.envelope.read_register(),
            MEMORY_LOCATION_APU_NR14 => as_bit_flag(self.ch1.length.enabled, 6) | 0xbf,

            MEMORY_LOCATION_APU_NR21 => (self.ch2.generator.duty << 6) | 0x3f,
            MEMORY_LOCATION_APU_NR22 => self.ch2.envelope.read_register(),
            MEMORY_LOCATION_APU_NR24 => as_bit_flag(self.ch2.length.enabled, 6) | 0xbf,

            MEMORY_LOCATION_APU_NR30 => as_bit_flag(self.ch3.generator.dac_enabled, 7) | 0x7f,
            MEMORY_LOCATION_APU_NR32 => (self.ch3.generator.volume_shift << 5) | 0x9f,
            MEMORY_LOCATION_APU_NR34 => as_bit_flag(self.ch3.length.enabled, 6) | 0xbf,

            MEMORY_LOCATION_APU_NR42 => self.ch4.envelope.read_register(),
            MEMORY_LOCATION_APU_NR44 => as_bit_flag(self.ch4.length.enabled, 6) | 0xbf,

            MEMORY_LOCATION_APU_NR50 => self.mixer.read_nr50(),
            MEMORY_LOCATION_APU_NR51 => self.mixer.read_nr51(),

            MEMORY_LOCATION_APU_NR52 => {
                if self.apu_on {
                    NR52_NON_READABLE_BITS
                        | as_bit_flag(self.apu_on, 7)
                        | as_bit_flag(self.ch1.enabled, 0)
                        | as_bit_flag(self.ch2.enabled, 1)
                        | as_bit_flag(self.ch3.enabled, 2)
                        | as_bit_flag(self.ch4.enabled, 3)
                }
                else {
                    NR52_NON_READABLE_BITS
                }
            }

            MEMORY_LOCATION_APU_WAVE_RAM_BEGIN..=MEMORY_LOCATION_APU_WAVE_RAM_END => {
                self.ch3.generator.read_wave_ram(address - MEMORY_LOCATION_APU_WAVE_RAM_BEGIN)
            }

            _ => 0xff,
        }
    }

    fn on_write(&mut self, address: u16, value: u8) {
        if !self.apu_on && address != MEMORY_LOCATION_APU_NR52
            && !(MEMORY_LOCATION_APU_WAVE_RAM_BEGIN..=MEMORY_LOCATION_APU_WAVE_RAM_END).contains(&address)
        {
            return;
        }

        match address {
            MEMORY_LOCATION_APU_NR10 => self.ch1.sweep.write_register(value),
            MEMORY_LOCATION_APU_NR11 => {
                self.ch1.generator.duty = value >> 6;
                self.ch1.length.load(value & 0x3f);
            }
            MEMORY_LOCATION_APU_NR12 => {
                self.ch1.envelope.write_register(value);
                if !self.ch1.envelope.dac_enabled() { self.ch1.enabled = false; }
            }
            MEMORY_LOCATION_APU_NR13 => {
                self.ch1.generator.frequency = (self.ch1.generator.frequency & 0x700) | value as u16;
            }
            MEMORY_LOCATION_APU_NR14 => {
                self.ch1.generator.frequency = (self.ch1.generator.frequency & 0xff) | (((value & 0x07) as u16) << 8);
                self.ch1.length.enabled = get_bit(value, 6);
                if get_bit(value, 7) { self.trigger_ch1(); }
            }

            MEMORY_LOCATION_APU_NR21 => {
                self.ch2.generator.duty = value >> 6;
                self.ch2.length.load(value & 0x3f);
            }
            MEMORY_LOCATION_APU_NR22 => {
                self.ch2.envelope.write_register(value);
                if !self.ch2.envelope.dac_enabled() { self.ch2.enabled = false; }
            }
            MEMORY_LOCATION_APU_NR23 => {
                self.ch2.generator.frequency = (self.ch2.generator.frequency & 0x700) | value as u16;
            }
            MEMORY_LOCATION_APU_NR24 => {
                self.ch2.generator.frequency = (self.ch2.generator.frequency & 0xff) | (((value & 0x07) as u16) << 8);
                self.ch2.length.enabled = get_bit(value, 6);
                if get_bit(value, 7) { self.trigger_ch2(); }
            }

            MEMORY_LOCATION_APU_NR30 => {
                self.ch3.generator.dac_enabled = get_bit(value, 7);
                if !self.ch3.generator.dac_enabled { self.ch3.enabled = false; }
            }
            MEMORY_LOCATION_APU_NR31 => self.ch3.length.load(value),
            MEMORY_LOCATION_APU_NR32 => self.ch3.generator.volume_shift = (value >> 5) & 0x03,
            MEMORY_LOCATION_APU_NR33 => {
                self.ch3.generator.frequency = (self.ch3.generator.frequency & 0x700) | value as u16;
            }
            MEMORY_LOCATION_APU_NR34 => {
                self.ch3.generator.frequency = (self.ch3.generator.frequency & 0xff) | (((value & 0x07) as u16) << 8);
                self.ch3.length.enabled = get_bit(value, 6);
                if get_bit(value, 7) { self.trigger_ch3(); }
            }

            MEMORY_LOCATION_APU_NR41 => self.ch4.length.load(value & 0x3f),
            MEMORY_LOCATION_APU_NR42 => {
                self.ch4.envelope.write_register(value);
                if !self.ch4.envelope.dac_enabled() { self.ch4.enabled = false; }
            }
            MEMORY_LOCATION_APU_NR43 => self.ch4.generator.write_register(value),
            MEMORY_LOCATION_APU_NR44 => {
                self.ch4.length.enabled = get_bit(value, 6);
                if get_bit(value, 7) { self.trigger_ch4(); }
            }

            MEMORY_LOCATION_APU_NR50 => self.mixer.write_nr50(value),
            MEMORY_LOCATION_APU_NR51 => self.mixer.write_nr51(value),

            MEMORY_LOCATION_APU_NR52 => {
                let enabled = get_bit(value, 7);
                if self.apu_on != enabled {
                    self.apu_on = enabled;
                    if enabled { self.power_on(); } else { self.power_off(); }
                }
            }

            MEMORY_LOCATION_APU_WAVE_RAM_BEGIN..=MEMORY_LOCATION_APU_WAVE_RAM_END => {
                self.ch3.generator.write_wave_ram(address - MEMORY_LOCATION_APU_WAVE_RAM_BEGIN, value);
            }

            _ => {}
        }
    }
}

impl Apu {
    fn trigger_ch1(&mut self) {
        self.ch1.generator.trigger();
        self.ch1.envelope.trigger();
        self.ch1.length.on_trigger();
        let _ = self.ch1.sweep.trigger(self.ch1.generator.frequency);
        self.ch1.enabled = self.ch1.envelope.dac_enabled();
    }

    fn trigger_ch2(&mut self) {
        self.ch2.generator.trigger();
        self.ch2.envelope.trigger();
        self.ch2.length.on_trigger();
        self.ch2.enabled = self.ch2.envelope.dac_enabled();
    }

    fn trigger_ch3(&mut self) {
        self.ch3.generator.trigger();
        self.ch3.length.on_trigger();
        self.ch3.enabled = self.ch3.generator.dac_enabled;
    }

    fn trigger_ch4(&mut self) {
        self.ch4.generator.trigger();
        self.ch4.envelope.trigger();
        self.ch4.length.on_trigger();
        self.ch4.enabled = self.ch4.envelope.dac_enabled();
    }
}
