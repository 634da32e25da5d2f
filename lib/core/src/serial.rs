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

//! A simplified serial port implementation whose main purpose is receiving data from
//! test ROMs like Blargg's, which print their results by writing to SB with the
//! transfer bit set on SC (spec.md §6). Does not model precise bit timing, an external
//! clock source or double speed mode.

use alloc::vec::Vec;

use crate::cpu::interrupts::Interrupt;
use crate::gameboy::Clock;
use crate::mmu::locations::{MEMORY_LOCATION_SB, MEMORY_LOCATION_SC};
use crate::mmu::memory_bus::{MemoryBusConnection, MemoryBusSignals};
use crate::utils::get_bit;

const UPDATE_TIME_SERIAL_TRANSFER: Clock = 4096;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialPort {
    clock: Clock,
    sb: u8,
    sc: u8,

    output_queue: Vec<u8>,
    output_queue_enabled: bool,

    #[cfg_attr(feature = "serde", serde(skip))]
    signals: MemoryBusSignals,
}

impl SerialPort {
    pub fn new() -> Self {
        Self {
            clock: 0,
            sb: 0,
            sc: 0x7e,
            output_queue: Vec::new(),
            output_queue_enabled: false,
            signals: MemoryBusSignals::default(),
        }
    }

    pub fn update(&mut self, cycles: Clock) {
        if !get_bit(self.sc, 7) {
            return;
        }

        self.clock += cycles;

        if self.clock >= UPDATE_TIME_SERIAL_TRANSFER {
            self.clock -= UPDATE_TIME_SERIAL_TRANSFER;

            if self.output_queue_enabled {
                self.output_queue.push(self.sb);
            }

            self.sc &= !0x80;
            self.signals.request(Interrupt::Serial);
        }
    }

    pub fn take_signals(&mut self) -> MemoryBusSignals {
        core::mem::take(&mut self.signals)
    }

    /// Enables or disables recording transferred bytes; off by default so plain
    /// emulation doesn't pay for an unbounded buffer.
    pub fn enable_output_queue(&mut self, enabled: bool) {
        self.output_queue_enabled = enabled;
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.output_queue)
    }

    #[cfg(feature = "std")]
    pub fn take_output_as_text(&mut self) -> std::string::String {
        self.take_output().into_iter().map(|b| b as char).collect()
    }
}

impl MemoryBusConnection for SerialPort {
    fn on_read(&self, address: u16) -> u8 {
        match address {
            MEMORY_LOCATION_SB => self.sb,
            MEMORY_LOCATION_SC => self.sc | 0x7e,
            _ => 0xff,
        }
    }

    fn on_write(&mut self, address: u16, value: u8) {
        match address {
            MEMORY_LOCATION_SB => self.sb = value,
            MEMORY_LOCATION_SC => {
                self.sc = value;
                if get_bit(value, 7) {
                    self.clock = 0;
                }
            }
            _ => {}
        }
    }
}
