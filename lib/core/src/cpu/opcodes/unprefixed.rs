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

//! Semantics of the 256 unprefixed opcodes (spec.md §4.2). Every handler runs
//! to completion in a single stage: it performs the full register/memory
//! effect directly, then reports how many T-states beyond the opcode fetch
//! (`OpCode::cycles_ahead`) the instruction actually took. The dispatcher
//! wrapper turns that into the two-call `StageDone`/`Done` shape
//! [crate::cpu::opcode::OpCodeContext] expects.

use crate::cpu::cpu::{CpuFlag, RegisterR16, RegisterR8};
use crate::cpu::opcode::{OpCodeContext, OpCodeResult};
use crate::cpu::opcodes::decode::*;
use crate::gameboy::{Clock, GameBoy};
use crate::utils::{borrowing_sub_u8, carrying_add_u8, to_u16};

pub fn execute_unprefixed(gb: &mut GameBoy, context: &mut OpCodeContext) -> OpCodeResult {
    if context.stage() > 0 {
        return context.done();
    }

    let opcode = context.opcode_byte();
    let extra = dispatch(gb, context, opcode);
    context.stage_done(extra)
}

fn dispatch(gb: &mut GameBoy, context: &OpCodeContext, opcode: u8) -> Clock {
    match opcode {
        0x00 => 0,

        // LD rp,d16
        0x01 | 0x11 | 0x21 | 0x31 => {
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            gb.cpu.set_r16(rp_table(opcode), to_u16(hi, lo));
            8
        }

        // LD (BC),A / LD (DE),A
        0x02 | 0x12 => {
            let rp = if opcode == 0x02 { RegisterR16::BC } else { RegisterR16::DE };
            let addr = gb.cpu.get_r16(rp);
            let a = gb.cpu.get_r8(RegisterR8::A);
            gb.get_mmu_mut().write_u8(addr, a);
            4
        }

        // INC rp / DEC rp
        0x03 | 0x13 | 0x23 | 0x33 => {
            let rp = rp_table(opcode);
            let v = gb.cpu.get_r16(rp).wrapping_add(1);
            gb.cpu.set_r16(rp, v);
            4
        }
        0x0b | 0x1b | 0x2b | 0x3b => {
            let rp = rp_table(opcode);
            let v = gb.cpu.get_r16(rp).wrapping_sub(1);
            gb.cpu.set_r16(rp, v);
            4
        }

        // INC r8 / DEC r8 / LD r8,d8, rows of 8 opcodes each
        _ if opcode <= 0x3f && (opcode & 0x07) == 0x04 => {
            let idx = (opcode >> 3) & 0x07;
            op_inc_r8(gb, idx)
        }
        _ if opcode <= 0x3f && (opcode & 0x07) == 0x05 => {
            let idx = (opcode >> 3) & 0x07;
            op_dec_r8(gb, idx)
        }
        _ if opcode <= 0x3f && (opcode & 0x07) == 0x06 => {
            let idx = (opcode >> 3) & 0x07;
            let value = gb.cpu.fetch_u8();
            write_r8_index(gb, idx, value);
            if idx == 6 { 8 } else { 4 }
        }

        0x07 => op_rotate_a(gb, Rotate::Rlc),
        0x0f => op_rotate_a(gb, Rotate::Rrc),
        0x17 => op_rotate_a(gb, Rotate::Rl),
        0x1f => op_rotate_a(gb, Rotate::Rr),

        // LD (a16),SP
        0x08 => {
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            let addr = to_u16(hi, lo);
            let sp = gb.cpu.get_stack_pointer();
            gb.get_mmu_mut().write_u8(addr, (sp & 0xff) as u8);
            gb.get_mmu_mut().write_u8(addr.wrapping_add(1), (sp >> 8) as u8);
            16
        }

        // ADD HL,rp
        0x09 | 0x19 | 0x29 | 0x39 => {
            let rp = rp_table(opcode);
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            let v = gb.cpu.get_r16(rp);
            let sum = (hl as u32) + (v as u32);
            let half = (hl & 0x0fff) + (v & 0x0fff) > 0x0fff;
            gb.cpu.set_r16(RegisterR16::HL, sum as u16);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, half);
            gb.cpu.set_flag(CpuFlag::Carry, sum > 0xffff);
            4
        }

        // LD A,(BC) / LD A,(DE)
        0x0a | 0x1a => {
            let rp = if opcode == 0x0a { RegisterR16::BC } else { RegisterR16::DE };
            let addr = gb.cpu.get_r16(rp);
            let value = gb.get_mmu_mut().read_u8(addr);
            gb.cpu.set_r8(RegisterR8::A, value);
            4
        }

        // STOP
        0x10 => {
            let _ = gb.cpu.fetch_u8();
            if gb.cpu.is_speed_switch_armed() {
                gb.cpu.perform_speed_switch();
                8200
            } else {
                0
            }
        }

        // JR r8
        0x18 => {
            let offset = gb.cpu.fetch_u8() as i8;
            let pc = gb.cpu.get_instruction_pointer();
            gb.cpu.set_instruction_pointer(pc.wrapping_add(offset as i16 as u16));
            8
        }

        // JR cc,r8
        0x20 | 0x28 | 0x30 | 0x38 => {
            let cc = (opcode >> 3) & 0x03;
            let offset = gb.cpu.fetch_u8() as i8;
            if condition(gb, cc) {
                let pc = gb.cpu.get_instruction_pointer();
                gb.cpu.set_instruction_pointer(pc.wrapping_add(offset as i16 as u16));
                8
            } else {
                4
            }
        }

        // LD (HL+),A / LD (HL-),A / LD A,(HL+) / LD A,(HL-)
        0x22 | 0x32 => {
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            let a = gb.cpu.get_r8(RegisterR8::A);
            gb.get_mmu_mut().write_u8(hl, a);
            gb.cpu.set_r16(RegisterR16::HL, if opcode == 0x22 { hl.wrapping_add(1) } else { hl.wrapping_sub(1) });
            4
        }
        0x2a | 0x3a => {
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            let value = gb.get_mmu_mut().read_u8(hl);
            gb.cpu.set_r8(RegisterR8::A, value);
            gb.cpu.set_r16(RegisterR16::HL, if opcode == 0x2a { hl.wrapping_add(1) } else { hl.wrapping_sub(1) });
            4
        }

        0x27 => op_daa(gb),
        0x2f => {
            let a = gb.cpu.get_r8(RegisterR8::A);
            gb.cpu.set_r8(RegisterR8::A, !a);
            gb.cpu.set_flag(CpuFlag::Negative, true);
            gb.cpu.set_flag(CpuFlag::HalfCarry, true);
            0
        }
        0x37 => {
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, false);
            gb.cpu.set_flag(CpuFlag::Carry, true);
            0
        }
        0x3f => {
            let c = gb.cpu.get_flag(CpuFlag::Carry);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, false);
            gb.cpu.set_flag(CpuFlag::Carry, !c);
            0
        }

        // LD r,r' / HALT
        0x76 => {
            gb.cpu.enter_halt();
            0
        }
        0x40..=0x7f => {
            let dst = (opcode >> 3) & 0x07;
            let src = opcode & 0x07;
            let value = read_r8_index(gb, src);
            write_r8_index(gb, dst, value);
            if dst == 6 || src == 6 { 4 } else { 0 }
        }

        // ALU A,r
        0x80..=0xbf => {
            let row = (opcode >> 3) & 0x07;
            let src = opcode & 0x07;
            let value = read_r8_index(gb, src);
            op_alu(gb, row, value);
            if src == 6 { 4 } else { 0 }
        }

        // RET cc
        0xc0 | 0xc8 | 0xd0 | 0xd8 => {
            let cc = (opcode >> 3) & 0x03;
            if condition(gb, cc) {
                let pc = pop_u16(gb);
                gb.cpu.set_instruction_pointer(pc);
                16
            } else {
                4
            }
        }

        // POP rp2
        0xc1 | 0xd1 | 0xe1 | 0xf1 => {
            let rp = rp2_table(opcode);
            let value = pop_u16(gb);
            gb.cpu.set_r16(rp, value);
            8
        }

        // JP cc,a16
        0xc2 | 0xca | 0xd2 | 0xda => {
            let cc = (opcode >> 3) & 0x03;
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            if condition(gb, cc) {
                gb.cpu.set_instruction_pointer(to_u16(hi, lo));
                12
            } else {
                8
            }
        }

        // JP a16
        0xc3 => {
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            gb.cpu.set_instruction_pointer(to_u16(hi, lo));
            12
        }

        // CALL cc,a16
        0xc4 | 0xcc | 0xd4 | 0xdc => {
            let cc = (opcode >> 3) & 0x03;
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            if condition(gb, cc) {
                let ret = gb.cpu.get_instruction_pointer();
                push_u16(gb, ret);
                gb.cpu.set_instruction_pointer(to_u16(hi, lo));
                20
            } else {
                8
            }
        }

        // PUSH rp2
        0xc5 | 0xd5 | 0xe5 | 0xf5 => {
            let rp = rp2_table(opcode);
            let value = gb.cpu.get_r16(rp);
            push_u16(gb, value);
            12
        }

        // ALU A,d8
        0xc6 | 0xce | 0xd6 | 0xde | 0xe6 | 0xee | 0xf6 | 0xfe => {
            let row = (opcode >> 3) & 0x07;
            let value = gb.cpu.fetch_u8();
            op_alu(gb, row, value);
            4
        }

        // RST n
        0xc7 | 0xcf | 0xd7 | 0xdf | 0xe7 | 0xef | 0xf7 | 0xff => {
            let vector = (opcode & 0x38) as u16;
            let ret = gb.cpu.get_instruction_pointer();
            push_u16(gb, ret);
            gb.cpu.set_instruction_pointer(vector);
            12
        }

        // RET / RETI
        0xc9 | 0xd9 => {
            let pc = pop_u16(gb);
            gb.cpu.set_instruction_pointer(pc);
            if opcode == 0xd9 {
                gb.cpu.set_ime(true);
            }
            12
        }

        // CALL a16
        0xcd => {
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            let ret = gb.cpu.get_instruction_pointer();
            push_u16(gb, ret);
            gb.cpu.set_instruction_pointer(to_u16(hi, lo));
            20
        }

        // LDH (a8),A / LDH A,(a8)
        0xe0 => {
            let offset = gb.cpu.fetch_u8();
            let addr = 0xff00u16 + offset as u16;
            let a = gb.cpu.get_r8(RegisterR8::A);
            gb.get_mmu_mut().write_u8(addr, a);
            8
        }
        0xf0 => {
            let offset = gb.cpu.fetch_u8();
            let addr = 0xff00u16 + offset as u16;
            let value = gb.get_mmu_mut().read_u8(addr);
            gb.cpu.set_r8(RegisterR8::A, value);
            8
        }

        // LD (C),A / LD A,(C)
        0xe2 => {
            let c = gb.cpu.get_r8(RegisterR8::C);
            let addr = 0xff00u16 + c as u16;
            let a = gb.cpu.get_r8(RegisterR8::A);
            gb.get_mmu_mut().write_u8(addr, a);
            4
        }
        0xf2 => {
            let c = gb.cpu.get_r8(RegisterR8::C);
            let addr = 0xff00u16 + c as u16;
            let value = gb.get_mmu_mut().read_u8(addr);
            gb.cpu.set_r8(RegisterR8::A, value);
            4
        }

        // ADD SP,r8
        0xe8 => {
            let e8 = gb.cpu.fetch_u8();
            let sp = gb.cpu.get_stack_pointer();
            let (_, half, carry) = carrying_add_u8((sp & 0xff) as u8, e8, false);
            let result = sp.wrapping_add(e8 as i8 as i16 as u16);
            gb.cpu.set_stack_pointer(result);
            gb.cpu.set_flag(CpuFlag::Zero, false);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, half);
            gb.cpu.set_flag(CpuFlag::Carry, carry);
            12
        }

        // JP HL
        0xe9 => {
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            gb.cpu.set_instruction_pointer(hl);
            0
        }

        // LD (a16),A / LD A,(a16)
        0xea => {
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            let a = gb.cpu.get_r8(RegisterR8::A);
            gb.get_mmu_mut().write_u8(to_u16(hi, lo), a);
            12
        }
        0xfa => {
            let lo = gb.cpu.fetch_u8();
            let hi = gb.cpu.fetch_u8();
            let value = gb.get_mmu_mut().read_u8(to_u16(hi, lo));
            gb.cpu.set_r8(RegisterR8::A, value);
            12
        }

        0xf3 => {
            gb.cpu.set_ime(false);
            0
        }
        0xfb => {
            gb.cpu.request_ei();
            0
        }

        // LD HL,SP+r8
        0xf8 => {
            let e8 = gb.cpu.fetch_u8();
            let sp = gb.cpu.get_stack_pointer();
            let (_, half, carry) = carrying_add_u8((sp & 0xff) as u8, e8, false);
            let result = sp.wrapping_add(e8 as i8 as i16 as u16);
            gb.cpu.set_r16(RegisterR16::HL, result);
            gb.cpu.set_flag(CpuFlag::Zero, false);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, half);
            gb.cpu.set_flag(CpuFlag::Carry, carry);
            8
        }

        // LD SP,HL
        0xf9 => {
            let hl = gb.cpu.get_r16(RegisterR16::HL);
            gb.cpu.set_stack_pointer(hl);
            4
        }

        // Illegal opcodes.
        0xd3 | 0xdb | 0xdd | 0xe3 | 0xe4 | 0xeb | 0xec | 0xed | 0xf4 | 0xfc | 0xfd => {
            gb.cpu.raise_fault(context);
            0
        }

        _ => unreachable!("unhandled unprefixed opcode {:#04x}", opcode),
    }
}

enum Rotate {
    Rlc,
    Rrc,
    Rl,
    Rr,
}

fn op_rotate_a(gb: &mut GameBoy, op: Rotate) -> Clock {
    let a = gb.cpu.get_r8(RegisterR8::A);
    let carry_in = gb.cpu.get_flag(CpuFlag::Carry);
    let (result, carry_out) = rotate_byte(&op, a, carry_in);
    gb.cpu.set_r8(RegisterR8::A, result);
    gb.cpu.set_flag(CpuFlag::Zero, false);
    gb.cpu.set_flag(CpuFlag::Negative, false);
    gb.cpu.set_flag(CpuFlag::HalfCarry, false);
    gb.cpu.set_flag(CpuFlag::Carry, carry_out);
    0
}

fn rotate_byte(op: &Rotate, value: u8, carry_in: bool) -> (u8, bool) {
    match op {
        Rotate::Rlc => ((value << 1) | (value >> 7), (value & 0x80) != 0),
        Rotate::Rrc => ((value >> 1) | (value << 7), (value & 0x01) != 0),
        Rotate::Rl => ((value << 1) | (carry_in as u8), (value & 0x80) != 0),
        Rotate::Rr => ((value >> 1) | ((carry_in as u8) << 7), (value & 0x01) != 0),
    }
}

fn op_inc_r8(gb: &mut GameBoy, idx: u8) -> Clock {
    let value = read_r8_index(gb, idx);
    let result = value.wrapping_add(1);
    write_r8_index(gb, idx, result);
    gb.cpu.set_flag(CpuFlag::Zero, result == 0);
    gb.cpu.set_flag(CpuFlag::Negative, false);
    gb.cpu.set_flag(CpuFlag::HalfCarry, (value & 0x0f) == 0x0f);
    if idx == 6 { 8 } else { 0 }
}

fn op_dec_r8(gb: &mut GameBoy, idx: u8) -> Clock {
    let value = read_r8_index(gb, idx);
    let result = value.wrapping_sub(1);
    write_r8_index(gb, idx, result);
    gb.cpu.set_flag(CpuFlag::Zero, result == 0);
    gb.cpu.set_flag(CpuFlag::Negative, true);
    gb.cpu.set_flag(CpuFlag::HalfCarry, (value & 0x0f) == 0x00);
    if idx == 6 { 8 } else { 0 }
}

/// Shared ALU core for both `ALU A,r` (0x80-0xbf) and `ALU A,d8`. `row` selects
/// the operation: 0 ADD, 1 ADC, 2 SUB, 3 SBC, 4 AND, 5 XOR, 6 OR, 7 CP.
fn op_alu(gb: &mut GameBoy, row: u8, value: u8) {
    let a = gb.cpu.get_r8(RegisterR8::A);
    let carry = gb.cpu.get_flag(CpuFlag::Carry);

    match row {
        0 => alu_add(gb, a, value, false),
        1 => alu_add(gb, a, value, carry),
        2 => alu_sub(gb, a, value, false, true),
        3 => alu_sub(gb, a, value, carry, true),
        4 => {
            let result = a & value;
            gb.cpu.set_r8(RegisterR8::A, result);
            gb.cpu.set_flag(CpuFlag::Zero, result == 0);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, true);
            gb.cpu.set_flag(CpuFlag::Carry, false);
        }
        5 => {
            let result = a ^ value;
            gb.cpu.set_r8(RegisterR8::A, result);
            gb.cpu.set_flag(CpuFlag::Zero, result == 0);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, false);
            gb.cpu.set_flag(CpuFlag::Carry, false);
        }
        6 => {
            let result = a | value;
            gb.cpu.set_r8(RegisterR8::A, result);
            gb.cpu.set_flag(CpuFlag::Zero, result == 0);
            gb.cpu.set_flag(CpuFlag::Negative, false);
            gb.cpu.set_flag(CpuFlag::HalfCarry, false);
            gb.cpu.set_flag(CpuFlag::Carry, false);
        }
        7 => alu_sub(gb, a, value, false, false),
        _ => unreachable!(),
    }
}

fn alu_add(gb: &mut GameBoy, a: u8, b: u8, carry_in: bool) {
    let (result, half, carry) = carrying_add_u8(a, b, carry_in);
    gb.cpu.set_r8(RegisterR8::A, result);
    gb.cpu.set_flag(CpuFlag::Zero, result == 0);
    gb.cpu.set_flag(CpuFlag::Negative, false);
    gb.cpu.set_flag(CpuFlag::HalfCarry, half);
    gb.cpu.set_flag(CpuFlag::Carry, carry);
}

/// `store`=false implements CP, which computes flags but discards the result.
fn alu_sub(gb: &mut GameBoy, a: u8, b: u8, borrow_in: bool, store: bool) {
    let (result, half, borrow) = borrowing_sub_u8(a, b, borrow_in);
    if store {
        gb.cpu.set_r8(RegisterR8::A, result);
    }
    gb.cpu.set_flag(CpuFlag::Zero, result == 0);
    gb.cpu.set_flag(CpuFlag::Negative, true);
    gb.cpu.set_flag(CpuFlag::HalfCarry, half);
    gb.cpu.set_flag(CpuFlag::Carry, borrow);
}

fn op_daa(gb: &mut GameBoy) -> Clock {
    let mut a = gb.cpu.get_r8(RegisterR8::A);
    let n = gb.cpu.get_flag(CpuFlag::Negative);
    let h = gb.cpu.get_flag(CpuFlag::HalfCarry);
    let mut c = gb.cpu.get_flag(CpuFlag::Carry);

    let mut adjust: u8 = 0;
    if h || (!n && (a & 0x0f) > 0x09) {
        adjust |= 0x06;
    }
    if c || (!n && a > 0x99) {
        adjust |= 0x60;
        c = true;
    }

    a = if n { a.wrapping_sub(adjust) } else { a.wrapping_add(adjust) };
    gb.cpu.set_r8(RegisterR8::A, a);

    gb.cpu.set_flag(CpuFlag::Zero, a == 0);
    gb.cpu.set_flag(CpuFlag::HalfCarry, false);
    gb.cpu.set_flag(CpuFlag::Carry, c);
    0
}
