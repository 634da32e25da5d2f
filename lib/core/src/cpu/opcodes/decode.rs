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

//! Shared decode helpers for the opcode dispatchers: the SM83 map groups its
//! operands into a handful of regular index schemes (8-bit register index 0..7,
//! 16-bit pair index 0..3 in two flavours, and a 2-bit condition code), so both
//! `unprefixed` and `prefixed` build on the same small set of functions here
//! instead of repeating the same decode logic 256 times each.

use crate::cpu::cpu::{CpuFlag, RegisterR16, RegisterR8};
use crate::gameboy::GameBoy;

/// Reads an 8-bit operand selected by the standard `B,C,D,E,H,L,(HL),A` index
/// scheme used throughout the unprefixed and CB-prefixed tables.
pub fn read_r8_index(gb: &mut GameBoy, index: u8) -> u8 {
    match index {
        0 => gb.cpu.get_r8(RegisterR8::B),
        1 => gb.cpu.get_r8(RegisterR8::C),
        2 => gb.cpu.get_r8(RegisterR8::D),
        3 => gb.cpu.get_r8(RegisterR8::E),
        4 => gb.cpu.get_r8(RegisterR8::H),
        5 => gb.cpu.get_r8(RegisterR8::L),
        6 => {
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            gb.get_mmu_mut().read_u8(hl)
        }
        7 => gb.cpu.get_r8(RegisterR8::A),
        _ => unreachable!(),
    }
}

pub fn write_r8_index(gb: &mut GameBoy, index: u8, value: u8) {
    match index {
        0 => gb.cpu.set_r8(RegisterR8::B, value),
        1 => gb.cpu.set_r8(RegisterR8::C, value),
        2 => gb.cpu.set_r8(RegisterR8::D, value),
        3 => gb.cpu.set_r8(RegisterR8::E, value),
        4 => gb.cpu.set_r8(RegisterR8::H, value),
        5 => gb.cpu.set_r8(RegisterR8::L, value),
        6 => {
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            gb.get_mmu_mut().write_u8(hl, value);
        }
        7 => gb.cpu.set_r8(RegisterR8::A, value),
        _ => unreachable!(),
    }
}

/// `BC,DE,HL,SP` grouping, selected by bits 4-5 of the opcode. Used by
/// `LD rp,d16`, `INC rp`, `DEC rp` and `ADD HL,rp`.
pub fn rp_table(opcode: u8) -> RegisterR16 {
    match (opcode >> 4) & 0x03 {
        0 => RegisterR16::BC,
        1 => RegisterR16::DE,
        2 => RegisterR16::HL,
        3 => RegisterR16::SP,
        _ => unreachable!(),
    }
}

/// `BC,DE,HL,AF` grouping, selected by bits 4-5 of the opcode. Used by
/// `PUSH rp2`/`POP rp2`.
pub fn rp2_table(opcode: u8) -> RegisterR16 {
    match (opcode >> 4) & 0x03 {
        0 => RegisterR16::BC,
        1 => RegisterR16::DE,
        2 => RegisterR16::HL,
        3 => RegisterR16::AF,
        _ => unreachable!(),
    }
}

/// Evaluates one of the four branch conditions (`NZ,Z,NC,C`).
pub fn condition(gb: &GameBoy, cc: u8) -> bool {
    match cc & 0x03 {
        0 => !gb.cpu.get_flag(CpuFlag::Zero),
        1 => gb.cpu.get_flag(CpuFlag::Zero),
        2 => !gb.cpu.get_flag(CpuFlag::Carry),
        3 => gb.cpu.get_flag(CpuFlag::Carry),
        _ => unreachable!(),
    }
}

pub fn push_u16(gb: &mut GameBoy, value: u16) {
    let sp = gb.cpu.get_stack_pointer();
    let hi = (value >> 8) as u8;
    let lo = (value & 0xff) as u8;
    let sp1 = sp.wrapping_sub(1);
    gb.get_mmu_mut().write_u8(sp1, hi);
    let sp2 = sp1.wrapping_sub(1);
    gb.get_mmu_mut().write_u8(sp2, lo);
    gb.cpu.set_stack_pointer(sp2);
}

pub fn pop_u16(gb: &mut GameBoy) -> u16 {
    let sp = gb.cpu.get_stack_pointer();
    let lo = gb.get_mmu_mut().read_u8(sp);
    let hi = gb.get_mmu_mut().read_u8(sp.wrapping_add(1));
    gb.cpu.set_stack_pointer(sp.wrapping_add(2));
    ((hi as u16) << 8) | (lo as u16)
}
