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

//! Semantics of the 256 CB-prefixed opcodes (spec.md §4.2): rotate/shift,
//! `BIT`, `RES` and `SET`, each addressing one of the eight `B,C,D,E,H,L,(HL),A`
//! operands. Same single-stage-then-done shape as `unprefixed`.

use crate::cpu::cpu::CpuFlag;
use crate::cpu::opcode::{OpCodeContext, OpCodeResult};
use crate::cpu::opcodes::decode::{read_r8_index, write_r8_index};
use crate::gameboy::{Clock, GameBoy};
use crate::utils::{get_bit, set_bit};

pub fn execute_prefixed(gb: &mut GameBoy, context: &mut OpCodeContext) -> OpCodeResult {
    if context.stage() > 0 {
        return context.done();
    }

    let opcode = context.opcode_byte();
    let extra = dispatch(gb, opcode);
    context.stage_done(extra)
}

fn dispatch(gb: &mut GameBoy, opcode: u8) -> Clock {
    let col = opcode & 0x07;
    let is_hl = col == 6;

    match opcode {
        0x00..=0x3f => {
            let row = (opcode >> 3) & 0x07;
            op_shift(gb, row, col);
            if is_hl { 8 } else { 0 }
        }
        0x40..=0x7f => {
            let bit = (opcode >> 3) & 0x07;
            op_bit(gb, bit, col);
            if is_hl { 4 } else { 0 }
        }
        0x80..=0xbf => {
            let bit = (opcode >> 3) & 0x07;
            op_res_set(gb, bit, col, false);
            if is_hl { 8 } else { 0 }
        }
        0xc0..=0xff => {
            let bit = (opcode >> 3) & 0x07;
            op_res_set(gb, bit, col, true);
            if is_hl { 8 } else { 0 }
        }
    }
}

/// `row` selects the shift/rotate variant: 0 RLC, 1 RRC, 2 RL, 3 RR, 4 SLA,
/// 5 SRA, 6 SWAP, 7 SRL.
fn op_shift(gb: &mut GameBoy, row: u8, col: u8) {
    let value = read_r8_index(gb, col);
    let carry_in = gb.cpu.get_flag(CpuFlag::Carry);

    let (result, carry_out) = match row {
        0 => ((value << 1) | (value >> 7), (value & 0x80) != 0),
        1 => ((value >> 1) | (value << 7), (value & 0x01) != 0),
        2 => ((value << 1) | (carry_in as u8), (value & 0x80) != 0),
        3 => ((value >> 1) | ((carry_in as u8) << 7), (value & 0x01) != 0),
        4 => (value << 1, (value & 0x80) != 0),
        5 => ((value >> 1) | (value & 0x80), (value & 0x01) != 0),
        6 => ((value << 4) | (value >> 4), false),
        7 => (value >> 1, (value & 0x01) != 0),
        _ => unreachable!(),
    };

    write_r8_index(gb, col, result);
    gb.cpu.set_flag(CpuFlag::Zero, result == 0);
    gb.cpu.set_flag(CpuFlag::Negative, false);
    gb.cpu.set_flag(CpuFlag::HalfCarry, false);
    gb.cpu.set_flag(CpuFlag::Carry, carry_out);
}

fn op_bit(gb: &mut GameBoy, bit: u8, col: u8) {
    let value = read_r8_index(gb, col);
    gb.cpu.set_flag(CpuFlag::Zero, !get_bit(value, bit));
    gb.cpu.set_flag(CpuFlag::Negative, false);
    gb.cpu.set_flag(CpuFlag::HalfCarry, true);
}

fn op_res_set(gb: &mut GameBoy, bit: u8, col: u8, set: bool) {
    let value = read_r8_index(gb, col);
    write_r8_index(gb, col, set_bit(value, bit, set));
}
