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

//! The DIV/TIMA/TMA/TAC timer (spec.md §4.6). TIMA increments are driven by a falling
//! edge on one bit of the internal 16 bit `div_counter`, selected by TAC's clock select
//! bits; this, rather than a simple "increment every N cycles" model, is what produces
//! the well known TIMA-write-during-DIV-reset quirks real test ROMs rely on.

use crate::cpu::interrupts::Interrupt;
use crate::gameboy::Clock;
use crate::mmu::memory_bus::{MemoryBusConnection, MemoryBusSignals};
use crate::mmu::locations::*;
use crate::utils::get_bit16;

/// Bit of `div_counter` observed for each of TAC's four clock select values.
const TIMA_SELECT_BITS: [u8; 4] = [9, 3, 5, 7];

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timer {
    div_counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,

    last_and_result: bool,

    /// Set for one M-cycle after TIMA overflows, during which the reload from TMA and
    /// the Timer interrupt both happen; a write to TIMA during this window is ignored
    /// and a write to TMA takes effect immediately.
    overflow_pending: bool,

    #[cfg_attr(feature = "serde", serde(skip))]
    signals: MemoryBusSignals,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            div_counter: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            last_and_result: false,
            overflow_pending: false,
            signals: MemoryBusSignals::default(),
        }
    }

    /// Seeds the internal counter and TAC to the value the boot ROM would have left
    /// behind, used when skipping boot ROM execution (spec.md §4.9).
    pub fn initialize_counter(&mut self, div_counter: u16, tac: u8) {
        self.div_counter = div_counter;
        self.tac = tac;
    }

    fn timer_enabled(&self) -> bool {
        get_bit16(self.tac as u16, 2)
    }

    fn selected_bit(&self) -> u8 {
        TIMA_SELECT_BITS[(self.tac & 0x03) as usize]
    }

    fn current_and_result(&self) -> bool {
        self.timer_enabled() && get_bit16(self.div_counter, self.selected_bit())
    }

    pub fn update(&mut self, cycles: Clock) {
        for _ in 0..cycles {
            self.tick_one_t_state();
        }
    }

    fn tick_one_t_state(&mut self) {
        if self.overflow_pending {
            self.overflow_pending = false;
            self.tima = self.tma;
            self.signals.request(Interrupt::Timer);
        }

        self.div_counter = self.div_counter.wrapping_add(1);

        let and_result = self.current_and_result();
        if self.last_and_result && !and_result {
            let (value, overflow) = self.tima.overflowing_add(1);
            self.tima = value;

            if overflow {
                self.overflow_pending = true;
            }
        }

        self.last_and_result = and_result;
    }

    pub fn take_signals(&mut self) -> MemoryBusSignals {
        core::mem::take(&mut self.signals)
    }
}

impl MemoryBusConnection for Timer {
    fn on_read(&self, address: u16) -> u8 {
        match address {
            MEMORY_LOCATION_DIV => (self.div_counter >> 8) as u8,
            MEMORY_LOCATION_TIMA => self.tima,
            MEMORY_LOCATION_TMA => self.tma,
            MEMORY_LOCATION_TAC => self.tac | 0xf8,
            _ => 0xff,
        }
    }

    fn on_write(&mut self, address: u16, value: u8) {
        match address {
            MEMORY_LOCATION_DIV => {
                self.div_counter = 0;
                let and_result = self.current_and_result();
                if self.last_and_result && !and_result {
                    let (value, overflow) = self.tima.overflowing_add(1);
                    self.tima = value;
                    if overflow { self.overflow_pending = true; }
                }
                self.last_and_result = and_result;
            }

            MEMORY_LOCATION_TIMA => {
                if !self.overflow_pending {
                    self.tima = value;
                }
            }

            MEMORY_LOCATION_TMA => {
                self.tma = value;
                if self.overflow_pending {
                    self.tima = value;
                }
            }

            MEMORY_LOCATION_TAC => {
                self.tac = value & 0x07;
            }

            _ => {}
        }
    }
}
