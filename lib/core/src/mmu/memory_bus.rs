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

use crate::cpu::interrupts::Interrupt;
use crate::debug::DebugEvents;
use crate::gameboy::Clock;

use flagset::FlagSet;


/// The contract every memory mapped peripheral provides to the [crate::mmu::mmu::Mmu]
/// for dispatching reads and writes into the 0xff00-0xff7f I/O range (and a handful of
/// other mapped registers). Peripherals advance their own internal clocks through a
/// separate `update(cycles)` method invoked once per machine cycle by the `Mmu`; this
/// trait only covers the register interface.
pub trait MemoryBusConnection {
    fn on_read(&self, address: u16) -> u8;
    fn on_write(&mut self, address: u16, value: u8);
}


/// The set of interrupts requested and debug events raised while advancing peripherals.
/// Every peripheral accumulates these into its own `signals` field as it runs and hands
/// them off via `take_signals`; the `Mmu` ORs all of them together once per machine cycle
/// before forwarding the interrupt bits into `InterruptRegisters`.
#[derive(Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryBusSignals {
    pub interrupts: FlagSet<Interrupt>,
    pub events: DebugEvents,
}

impl MemoryBusSignals {
    pub fn request(&mut self, interrupt: Interrupt) {
        self.interrupts |= interrupt;
    }

    pub fn raise(&mut self, event: crate::debug::DebugEvent) {
        self.events |= event;
    }
}

impl core::ops::BitOr for MemoryBusSignals {
    type Output = MemoryBusSignals;

    fn bitor(self, rhs: Self) -> Self::Output {
        MemoryBusSignals {
            interrupts: self.interrupts | rhs.interrupts,
            events: self.events | rhs.events,
        }
    }
}

impl core::ops::BitOrAssign for MemoryBusSignals {
    fn bitor_assign(&mut self, rhs: Self) {
        self.interrupts |= rhs.interrupts;
        self.events |= rhs.events;
    }
}

/// How many master T-states one machine cycle takes, depending on whether the CGB
/// double-speed mode is currently engaged (spec.md §3 "Clocks").
pub fn m_cycle_master_ticks(double_speed: bool) -> Clock {
    if double_speed { 2 } else { 4 }
}
