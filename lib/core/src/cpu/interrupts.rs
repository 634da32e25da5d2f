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

use flagset::{flags, FlagSet};

flags! {
    /// The five interrupt sources of the SM83, in priority order
    /// (spec.md §4.2 "Interrupt servicing"). The discriminant is the bit
    /// position shared by IE (0xffff) and IF (0xff0f).
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum Interrupt : u8 {
        VBlank  = 0b0000_0001,
        LcdStat = 0b0000_0010,
        Timer   = 0b0000_0100,
        Serial  = 0b0000_1000,
        Joypad  = 0b0001_0000,
    }
}

impl Interrupt {
    /// The bit index of this interrupt within IE/IF.
    pub fn bit(&self) -> u8 {
        match self {
            Interrupt::VBlank  => 0,
            Interrupt::LcdStat => 1,
            Interrupt::Timer   => 2,
            Interrupt::Serial  => 3,
            Interrupt::Joypad  => 4,
        }
    }

    /// The address of this interrupt's service routine.
    pub fn vector(&self) -> u16 {
        match self {
            Interrupt::VBlank  => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::Timer   => 0x0050,
            Interrupt::Serial  => 0x0058,
            Interrupt::Joypad  => 0x0060,
        }
    }

    /// Iterates the five interrupt sources in priority order.
    pub fn priority_order() -> [Interrupt; 5] {
        [Interrupt::VBlank, Interrupt::LcdStat, Interrupt::Timer, Interrupt::Serial, Interrupt::Joypad]
    }
}


/// Upper three bits of IF always read back as set; there is no latch for
/// them on real hardware.
const IF_UNUSED_BITS: u8 = 0b1110_0000;


/// IE (0xffff) / IF (0xff0f), the interrupt enable and interrupt request
/// registers (spec.md §4.7).
#[derive(Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptRegisters {
    ie: u8,
    if_: u8,
}

impl InterruptRegisters {
    pub fn new() -> Self {
        Self { ie: 0x00, if_: 0x00 }
    }

    pub fn get_ie(&self) -> u8 {
        self.ie
    }

    pub fn set_ie(&mut self, value: u8) {
        self.ie = value;
    }

    pub fn get_if(&self) -> u8 {
        self.if_ | IF_UNUSED_BITS
    }

    pub fn set_if(&mut self, value: u8) {
        self.if_ = value & 0x1f;
    }

    /// Requests one interrupt by setting its IF bit.
    pub fn request(&mut self, interrupt: Interrupt) {
        self.if_ |= interrupt.bit_pos();
    }

    /// Requests every interrupt present in `interrupts` at once; used to
    /// forward the signals aggregated from all peripherals after an update
    /// (spec.md §9 "Global/process-wide state" - this is the single place
    /// the aggregation lands).
    pub fn request_interrupts(&mut self, interrupts: FlagSet<Interrupt>) {
        self.if_ |= interrupts.bits();
    }

    /// Clears a single interrupt's IF bit, e.g. once it has been serviced.
    pub fn clear(&mut self, interrupt: Interrupt) {
        self.if_ &= !interrupt.bit_pos();
    }

    /// `IE & IF & 0x1F` — the set of interrupts both enabled and pending.
    pub fn pending(&self) -> u8 {
        self.ie & self.if_ & 0x1f
    }

    /// True if any interrupt source is both enabled and requested,
    /// irrespective of IME. Used to wake the CPU from HALT.
    pub fn any_pending(&self) -> bool {
        self.pending() != 0
    }

    /// Finds the highest-priority pending interrupt, if any.
    pub fn highest_priority_pending(&self) -> Option<Interrupt> {
        let pending = self.pending();

        for interrupt in Interrupt::priority_order() {
            if pending & interrupt.bit_pos() != 0 {
                return Some(interrupt);
            }
        }

        None
    }
}

trait BitPos {
    fn bit_pos(&self) -> u8;
}

impl BitPos for Interrupt {
    fn bit_pos(&self) -> u8 {
        1 << self.bit()
    }
}
