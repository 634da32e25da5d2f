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
    /// Events raised by peripherals while updating, collected per step and
    /// surfaced to the host via [crate::gameboy::EmulatorUpdateResults].
    /// This doubles as the core's diagnostics/logging channel: the host
    /// frontends decide whether to print, ignore or act on them.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum DebugEvent : u16 {
        /// The PPU completed rendering a full frame (entered VBlank on line 144).
        PpuFrameCompleted,

        /// A breakpoint address was hit (set by a debugger frontend).
        BreakpointHit,

        /// The CPU executed a read of WRAM/HRAM that was never written since
        /// power-on. Not fatal, just a hint the ROM may be relying on
        /// uninitialised memory contents.
        UninitialisedMemoryRead,

        /// The CPU has executed a long streak of NOPs, which usually means
        /// it has run off the rails (corrupted PC) rather than intentionally
        /// idling.
        NopWatchdog,

        /// The H-Blank DMA engine transferred one block during PPU H-Blank.
        HdmaBlockTransferred,
    }
}

/// A set of [DebugEvent]s raised during a single `update`.
pub type DebugEvents = FlagSet<DebugEvent>;
