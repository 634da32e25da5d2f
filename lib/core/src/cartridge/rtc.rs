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

//! The MBC3 real time clock: five registers (seconds, minutes, hours, day-counter
//! low/high) ticked off the same master clock as the rest of the device, with a
//! latch mechanism that freezes a read-only snapshot for the CPU to observe
//! (spec.md §6 "Cartridge load" MBC3).

use crate::cpu::cpu::CPU_CLOCK_SPEED;
use crate::gameboy::Clock;

/// Day-counter carry flag, set once the 9 bit day counter overflows past 511.
const DH_CARRY: u8 = 0x80;
/// Halt flag: while set, the clock stops advancing.
const DH_HALT: u8 = 0x40;
/// Bit 8 of the day counter.
const DH_DAY_HIGH: u8 = 0x01;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct RtcRegisters {
    seconds: u8,
    minutes: u8,
    hours: u8,
    day_low: u8,
    day_high: u8,
}

impl RtcRegisters {
    fn new() -> Self {
        Self { seconds: 0, minutes: 0, hours: 0, day_low: 0, day_high: 0 }
    }

    fn tick_second(&mut self) {
        if (self.day_high & DH_HALT) != 0 {
            return;
        }

        self.seconds += 1;
        if self.seconds < 60 {
            return;
        }
        self.seconds = 0;

        self.minutes += 1;
        if self.minutes < 60 {
            return;
        }
        self.minutes = 0;

        self.hours += 1;
        if self.hours < 24 {
            return;
        }
        self.hours = 0;

        if self.day_low == 0xff {
            self.day_low = 0;

            if (self.day_high & DH_DAY_HIGH) != 0 {
                self.day_high = (self.day_high & !DH_DAY_HIGH) | DH_CARRY;
            } else {
                self.day_high |= DH_DAY_HIGH;
            }
        } else {
            self.day_low += 1;
        }
    }
}

/// Selects which of the five RTC registers register index 0x08-0x0c maps to.
#[derive(Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RtcRegister {
    Seconds,
    Minutes,
    Hours,
    DayLow,
    DayHigh,
}

impl RtcRegister {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0x08 => Some(Self::Seconds),
            0x09 => Some(Self::Minutes),
            0x0a => Some(Self::Hours),
            0x0b => Some(Self::DayLow),
            0x0c => Some(Self::DayHigh),
            _ => None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rtc {
    live: RtcRegisters,
    latched: RtcRegisters,
    latch_write_pending_zero: bool,
    cycle_accumulator: Clock,
}

impl Rtc {
    pub fn new() -> Self {
        Self {
            live: RtcRegisters::new(),
            latched: RtcRegisters::new(),
            latch_write_pending_zero: false,
            cycle_accumulator: 0,
        }
    }

    pub fn update(&mut self, cycles: Clock) {
        self.cycle_accumulator += cycles;

        while self.cycle_accumulator >= CPU_CLOCK_SPEED as Clock {
            self.cycle_accumulator -= CPU_CLOCK_SPEED as Clock;
            self.live.tick_second();
        }
    }

    /// Writes to 0x6000-0x7fff: a 0x00 then 0x01 write latches the live
    /// registers into the read-only snapshot (pandocs-documented MBC3 quirk).
    pub fn write_latch_trigger(&mut self, value: u8) {
        match value {
            0x00 => self.latch_write_pending_zero = true,
            0x01 if self.latch_write_pending_zero => {
                self.latched = RtcRegisters {
                    seconds: self.live.seconds,
                    minutes: self.live.minutes,
                    hours: self.live.hours,
                    day_low: self.live.day_low,
                    day_high: self.live.day_high,
                };
                self.latch_write_pending_zero = false;
            }
            _ => self.latch_write_pending_zero = false,
        }
    }

    pub fn read(&self, register: RtcRegister) -> u8 {
        match register {
            RtcRegister::Seconds => self.latched.seconds,
            RtcRegister::Minutes => self.latched.minutes,
            RtcRegister::Hours => self.latched.hours,
            RtcRegister::DayLow => self.latched.day_low,
            RtcRegister::DayHigh => self.latched.day_high | 0x3e,
        }
    }

    pub fn write(&mut self, register: RtcRegister, value: u8) {
        match register {
            RtcRegister::Seconds => self.live.seconds = value % 60,
            RtcRegister::Minutes => self.live.minutes = value % 60,
            RtcRegister::Hours => self.live.hours = value % 24,
            RtcRegister::DayLow => self.live.day_low = value,
            RtcRegister::DayHigh => self.live.day_high = value & (DH_CARRY | DH_HALT | DH_DAY_HIGH),
        }
    }
}
