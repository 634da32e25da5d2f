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

//! The SM83 instruction dispatcher (spec.md §4.2): fetch-execute loop, HALT/HALT-bug
//! handling, the EI/DI/RETI delayed-IME dance, and interrupt servicing.

use crate::cpu::opcode::{Instruction, OpCodeContext, OPCODE_TABLE, OPCODE_TABLE_EXTENDED};
pub use crate::cpu::registers::{CpuFlag, RegisterR16, RegisterR8};
use crate::cpu::registers::Registers;
use crate::gameboy::Clock;
use crate::mmu::mmu::Mmu;
use crate::utils::{get_high, get_low};

#[cfg(feature = "std")]
use std::fmt::{Display, Formatter};

/// T-states per second at normal (single) speed.
pub const CPU_CLOCK_SPEED: u32 = 4_194_304;

/// The cost, in T-states, of servicing one interrupt: two pushes plus the
/// cancelled opcode fetch and one internal delay (spec.md §4.2).
const INTERRUPT_ENTRY_CYCLES: Clock = 20;

/// A fatal CPU condition (spec.md §7 "Illegal opcode"). The dispatcher tables have
/// no entries for these bytes; hitting one halts the CPU and surfaces the fault
/// rather than panicking.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpuError {
    IllegalOpcode {
        address: u16,
        opcode: u8,
        prefixed: bool,
    },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cpu {
    pub(crate) registers: Registers,
    mmu: Mmu,

    pub(crate) ime: bool,
    pub(crate) pending_ime: bool,
    pub(crate) halted: bool,
    pub(crate) halt_bug: bool,
    pub(crate) fault: Option<CpuError>,

    pub(crate) double_speed: bool,
    pub(crate) speed_switch_armed: bool,
}

impl Cpu {
    pub fn new(mmu: Mmu) -> Self {
        Self {
            registers: Registers::new(),
            mmu,
            ime: false,
            pending_ime: false,
            halted: false,
            halt_bug: false,
            fault: None,
            double_speed: false,
            speed_switch_armed: false,
        }
    }

    pub fn get_mmu(&self) -> &Mmu {
        &self.mmu
    }

    pub fn get_mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    pub fn get_r8(&self, r: RegisterR8) -> u8 {
        self.registers.get_r8(r)
    }

    pub fn set_r8(&mut self, r: RegisterR8, value: u8) {
        self.registers.set_r8(r, value);
    }

    pub fn get_r16(&self, r: RegisterR16) -> u16 {
        self.registers.get_r16(r)
    }

    pub fn set_r16(&mut self, r: RegisterR16, value: u16) {
        self.registers.set_r16(r, value);
    }

    pub fn get_flag(&self, flag: CpuFlag) -> bool {
        self.registers.get_flag(flag)
    }

    pub fn set_flag(&mut self, flag: CpuFlag, value: bool) {
        self.registers.set_flag(flag, value);
    }

    pub fn get_instruction_pointer(&self) -> u16 {
        self.registers.pc
    }

    pub fn set_instruction_pointer(&mut self, pc: u16) {
        self.registers.pc = pc;
    }

    pub fn get_stack_pointer(&self) -> u16 {
        self.registers.sp
    }

    pub fn set_stack_pointer(&mut self, sp: u16) {
        self.registers.sp = sp;
    }

    pub fn is_double_speed(&self) -> bool {
        self.double_speed
    }

    /// Arms the pending double-speed switch; consumed the next time `STOP` executes
    /// (CGB `KEY1`, spec.md "Glue" §SPEC_FULL, write to 0xFF4D bit 0).
    pub fn arm_speed_switch(&mut self) {
        self.speed_switch_armed = true;
    }

    pub fn is_speed_switch_armed(&self) -> bool {
        self.speed_switch_armed
    }

    /// Performs the armed speed switch, toggling `double_speed`. Called by the
    /// `STOP` opcode handler.
    pub fn perform_speed_switch(&mut self) {
        if self.speed_switch_armed {
            self.double_speed = !self.double_speed;
            self.speed_switch_armed = false;
        }
    }

    /// Whether the CPU is currently executing normally (as opposed to halted
    /// waiting for an interrupt). Waking from HALT happens here: per spec.md §4.2,
    /// any enabled-or-not pending interrupt source wakes the CPU regardless of IME.
    pub fn is_running(&mut self) -> bool {
        if self.halted && self.mmu.get_peripherals().interrupts.any_pending() {
            self.halted = false;
        }

        self.fault.is_none() && !self.halted
    }

    pub fn has_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn get_fault(&self) -> Option<CpuError> {
        self.fault
    }

    /// Promotes a scheduled `EI` to take effect, if one is pending. Must be called
    /// once per tick, *before* that tick's instruction executes: this is what
    /// lets a `HALT` immediately following `EI` observe the now-enabled `IME` for
    /// its own halt-bug check (spec.md §4.2 "EI delay"), while the instruction
    /// `EI` itself scheduled still runs to completion under the *old* `IME` (the
    /// promotion a given `EI` schedules is consumed by the tick that runs the
    /// instruction right after it, never by `EI`'s own tick).
    pub fn apply_pending_ime(&mut self) {
        if self.pending_ime {
            self.ime = true;
            self.pending_ime = false;
        }
    }

    /// Services at most one pending interrupt using the *current* `ime`. Returns
    /// `Some(cycles)` when one was actually serviced (the caller applies those
    /// cycles to every other component); `None` means nothing was serviced and
    /// the caller's next fetch proceeds as usual.
    ///
    /// Callers must invoke this only after the tick's own instruction (if any)
    /// has fully executed, so that an interrupt can preempt the *next* fetch but
    /// never the instruction already in flight (spec.md §4.2 steps 3-4; this is
    /// what guarantees the instruction immediately after `EI` always runs before
    /// any interrupt is serviced).
    pub fn service_pending_interrupt(&mut self) -> Option<Clock> {
        if !self.ime {
            return None;
        }

        let interrupt = self.mmu.get_peripherals().interrupts.highest_priority_pending()?;

        self.ime = false;
        self.halted = false;

        let pc = self.registers.pc;
        let sp1 = self.registers.sp.wrapping_sub(1);
        self.mmu.write_u8(sp1, get_high(pc));
        let sp2 = sp1.wrapping_sub(1);
        self.mmu.write_u8(sp2, get_low(pc));
        self.registers.sp = sp2;

        self.mmu.get_peripherals_mut().interrupts.clear(interrupt);
        self.registers.pc = interrupt.vector();

        Some(INTERRUPT_ENTRY_CYCLES)
    }

    /// Fetches and decodes the next instruction at the current PC, consuming the
    /// HALT-bug condition if one is pending (spec.md §4.2 "HALT").
    pub fn fetch_next_instruction(&mut self) -> Instruction {
        let opcode_address = self.registers.pc;
        let first_byte = self.mmu.read_u8(self.registers.pc);

        if self.halt_bug {
            self.halt_bug = false;
        } else {
            self.registers.pc = self.registers.pc.wrapping_add(1);
        }

        if first_byte == 0xcb {
            let cb_byte = self.mmu.read_u8(self.registers.pc);
            self.registers.pc = self.registers.pc.wrapping_add(1);

            Instruction {
                opcode_address,
                opcode_id: 0x100 + (cb_byte as u16),
                opcode: &OPCODE_TABLE_EXTENDED[cb_byte as usize],
            }
        } else {
            Instruction {
                opcode_address,
                opcode_id: first_byte as u16,
                opcode: &OPCODE_TABLE[first_byte as usize],
            }
        }
    }

    /// Reads the next byte of the instruction stream, advancing PC. Used by opcode
    /// handlers while decoding immediate operands.
    pub fn fetch_u8(&mut self) -> u8 {
        let value = self.mmu.read_u8(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        value
    }

    /// Enters HALT, latching the HALT-bug condition when IME is disabled but an
    /// interrupt is already pending (spec.md §4.2).
    pub fn enter_halt(&mut self) {
        self.halted = true;

        if !self.ime && self.mmu.get_peripherals().interrupts.any_pending() {
            self.halt_bug = true;
        }
    }

    pub fn get_ime(&self) -> bool {
        self.ime
    }

    pub fn set_ime(&mut self, value: bool) {
        self.ime = value;
        self.pending_ime = false;
    }

    pub fn request_ei(&mut self) {
        self.pending_ime = true;
    }

    pub fn raise_fault(&mut self, context: &OpCodeContext) {
        self.fault = Some(CpuError::IllegalOpcode {
            address: context.opcode_address(),
            opcode: context.opcode_byte(),
            prefixed: context.is_prefixed(),
        });
        self.halted = true;
    }

    /// Advances components owned directly by the CPU (currently a no-op placeholder
    /// for symmetry with the other peripherals' `update(cycles)`; the CPU's own
    /// state machine advances purely through `fetch_next_instruction`/
    /// `apply_pending_ime`/`service_pending_interrupt`).
    pub fn update(&mut self, _cycles: Clock) {}
}

#[cfg(feature = "std")]
impl Display for Cpu {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} IME={}", self.registers, self.ime as u8)
    }
}

#[cfg(feature = "std")]
impl Display for CpuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CpuError::IllegalOpcode { address, opcode, prefixed } => {
                write!(
                    f,
                    "illegal opcode {}{:02x} at {:04x}",
                    if *prefixed { "cb " } else { "" },
                    opcode,
                    address
                )
            }
        }
    }
}
