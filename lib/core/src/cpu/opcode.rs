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

//! Opcode metadata and the staged-execution contract between [crate::gameboy::GameBoy]
//! and the CPU (spec.md §4.2, §9 "Opcode dispatch"). Each entry names an opcode's
//! mnemonic and encoded length; actual decode/execute logic lives in
//! [crate::cpu::opcodes] and is shared by all entries of a table through the generic
//! `execute_unprefixed`/`execute_prefixed` dispatchers, which re-decode the opcode byte
//! carried in [OpCodeContext] rather than each getting a dedicated function pointer —
//! the SM83 map is regular enough that per-opcode closures would just repeat the same
//! handful of addressing-mode patterns 256 times.

use crate::gameboy::{Clock, GameBoy};
use crate::cpu::opcodes::{execute_prefixed, execute_unprefixed};

#[cfg(feature = "std")]
use std::string::{String, ToString};


/// The outcome of one invocation of an opcode's `proc` function.
pub enum OpCodeResult {
    /// The opcode needs more machine cycles; `proc` will be invoked again after
    /// [OpCodeContext::enter_next_stage] once the given number of T-states has been
    /// applied to every other component.
    StageDone(Clock),

    /// The opcode has fully executed; any cycles not yet reflected in
    /// [OpCodeContext::get_cycles_consumed] are applied and the step ends.
    Done,
}


/// Static metadata plus the execution entry point for one opcode.
pub struct OpCode {
    /// Assembly mnemonic, as used for disassembly and opcode tracing.
    pub name: &'static str,

    /// Total encoded length in bytes (opcode byte plus immediate operand bytes).
    pub bytes: u8,

    /// T-states consumed fetching the opcode byte(s) themselves, applied by
    /// [crate::gameboy::GameBoy] before the first call to `proc`. 4 for unprefixed
    /// opcodes (one byte), 8 for CB-prefixed ones (the 0xCB byte plus the actual
    /// opcode byte).
    pub cycles_ahead: Clock,

    /// Executes one stage of the opcode. Any immediate operand bytes are read from
    /// the instruction stream by this function itself (each such read is its own
    /// machine cycle, reported via [OpCodeContext::stage_done]).
    pub proc: fn(&mut GameBoy, &mut OpCodeContext) -> OpCodeResult,
}


/// A decoded instruction ready for execution: the opcode metadata plus the address
/// it was fetched from and its numeric id (0..=0xff for unprefixed opcodes, 0x100..=
/// 0x1ff for CB-prefixed ones, matching [OPCODE_TABLE_EXTENDED] offset by 0x100).
pub struct Instruction {
    pub opcode_address: u16,
    pub opcode_id: u16,
    pub opcode: &'static OpCode,
}

impl Instruction {
    #[cfg(feature = "std")]
    pub fn to_string(&self) -> String {
        self.opcode.name.to_string()
    }
}


/// A single element of a tokenized disassembly line, used by frontends (e.g. the
/// debugger's disassembly view) that want to apply syntax highlighting instead of
/// treating [Instruction::to_string] as an opaque blob.
#[derive(Clone, Debug)]
pub enum Token {
    Mnemonic(&'static str),
    Register(&'static str),
    Immediate8(u8),
    Immediate16(u16),
    Address(u16),
    SignedOffset(i8),
    Text(&'static str),
}


/// Scratch space and progress counter carried between successive invocations of an
/// opcode's `proc` function. Local variables inside `proc` do not persist across
/// calls (the same function is re-entered once per stage), so any value that needs
/// to survive to a later stage — a fetched immediate, an address being assembled out
/// of two reads — is stashed here instead.
pub struct OpCodeContext {
    opcode_address: u16,
    opcode_id: u16,
    stage: u8,
    cycles_consumed: Clock,

    pub scratch8: [u8; 4],
    pub scratch16: u16,
}

impl OpCodeContext {
    pub fn for_instruction(instruction: &Instruction) -> Self {
        Self {
            opcode_address: instruction.opcode_address,
            opcode_id: instruction.opcode_id,
            stage: 0,
            cycles_consumed: instruction.opcode.cycles_ahead,
            scratch8: [0; 4],
            scratch16: 0,
        }
    }

    pub fn opcode_address(&self) -> u16 {
        self.opcode_address
    }

    pub fn opcode_id(&self) -> u16 {
        self.opcode_id
    }

    /// The raw opcode byte, regardless of whether this is a CB-prefixed instruction.
    pub fn opcode_byte(&self) -> u8 {
        (self.opcode_id & 0xff) as u8
    }

    pub fn is_prefixed(&self) -> bool {
        self.opcode_id > 0xff
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn enter_next_stage(&mut self) {
        self.stage += 1;
    }

    /// Accounts `cycles` T-states against this instruction's total and reports them
    /// back to [crate::gameboy::GameBoy] so it can advance every other component
    /// before this opcode's next stage runs.
    pub fn stage_done(&mut self, cycles: Clock) -> OpCodeResult {
        self.cycles_consumed += cycles;
        OpCodeResult::StageDone(cycles)
    }

    pub fn done(&self) -> OpCodeResult {
        OpCodeResult::Done
    }

    pub fn get_cycles_consumed(&self) -> Clock {
        self.cycles_consumed
    }
}


macro_rules! op {
    ($name:expr, $bytes:expr, $cycles_ahead:expr, $proc:expr) => {
        OpCode { name: $name, bytes: $bytes, cycles_ahead: $cycles_ahead, proc: $proc }
    };
}

pub static OPCODE_TABLE: [OpCode; 256] = [
    op!("NOP", 1, 4, execute_unprefixed), // 0x00
    op!("LD BC,d16", 3, 4, execute_unprefixed), // 0x01
    op!("LD (BC),A", 1, 4, execute_unprefixed), // 0x02
    op!("INC BC", 1, 4, execute_unprefixed), // 0x03
    op!("INC B", 1, 4, execute_unprefixed), // 0x04
    op!("DEC B", 1, 4, execute_unprefixed), // 0x05
    op!("LD B,d8", 2, 4, execute_unprefixed), // 0x06
    op!("RLCA", 1, 4, execute_unprefixed), // 0x07
    op!("LD (a16),SP", 3, 4, execute_unprefixed), // 0x08
    op!("ADD HL,BC", 1, 4, execute_unprefixed), // 0x09
    op!("LD A,(BC)", 1, 4, execute_unprefixed), // 0x0a
    op!("DEC BC", 1, 4, execute_unprefixed), // 0x0b
    op!("INC C", 1, 4, execute_unprefixed), // 0x0c
    op!("DEC C", 1, 4, execute_unprefixed), // 0x0d
    op!("LD C,d8", 2, 4, execute_unprefixed), // 0x0e
    op!("RRCA", 1, 4, execute_unprefixed), // 0x0f
    op!("STOP", 2, 4, execute_unprefixed), // 0x10
    op!("LD DE,d16", 3, 4, execute_unprefixed), // 0x11
    op!("LD (DE),A", 1, 4, execute_unprefixed), // 0x12
    op!("INC DE", 1, 4, execute_unprefixed), // 0x13
    op!("INC D", 1, 4, execute_unprefixed), // 0x14
    op!("DEC D", 1, 4, execute_unprefixed), // 0x15
    op!("LD D,d8", 2, 4, execute_unprefixed), // 0x16
    op!("RLA", 1, 4, execute_unprefixed), // 0x17
    op!("JR r8", 2, 4, execute_unprefixed), // 0x18
    op!("ADD HL,DE", 1, 4, execute_unprefixed), // 0x19
    op!("LD A,(DE)", 1, 4, execute_unprefixed), // 0x1a
    op!("DEC DE", 1, 4, execute_unprefixed), // 0x1b
    op!("INC E", 1, 4, execute_unprefixed), // 0x1c
    op!("DEC E", 1, 4, execute_unprefixed), // 0x1d
    op!("LD E,d8", 2, 4, execute_unprefixed), // 0x1e
    op!("RRA", 1, 4, execute_unprefixed), // 0x1f
    op!("JR NZ,r8", 2, 4, execute_unprefixed), // 0x20
    op!("LD HL,d16", 3, 4, execute_unprefixed), // 0x21
    op!("LD (HL+),A", 1, 4, execute_unprefixed), // 0x22
    op!("INC HL", 1, 4, execute_unprefixed), // 0x23
    op!("INC H", 1, 4, execute_unprefixed), // 0x24
    op!("DEC H", 1, 4, execute_unprefixed), // 0x25
    op!("LD H,d8", 2, 4, execute_unprefixed), // 0x26
    op!("DAA", 1, 4, execute_unprefixed), // 0x27
    op!("JR Z,r8", 2, 4, execute_unprefixed), // 0x28
    op!("ADD HL,HL", 1, 4, execute_unprefixed), // 0x29
    op!("LD A,(HL+)", 1, 4, execute_unprefixed), // 0x2a
    op!("DEC HL", 1, 4, execute_unprefixed), // 0x2b
    op!("INC L", 1, 4, execute_unprefixed), // 0x2c
    op!("DEC L", 1, 4, execute_unprefixed), // 0x2d
    op!("LD L,d8", 2, 4, execute_unprefixed), // 0x2e
    op!("CPL", 1, 4, execute_unprefixed), // 0x2f
    op!("JR NC,r8", 2, 4, execute_unprefixed), // 0x30
    op!("LD SP,d16", 3, 4, execute_unprefixed), // 0x31
    op!("LD (HL-),A", 1, 4, execute_unprefixed), // 0x32
    op!("INC SP", 1, 4, execute_unprefixed), // 0x33
    op!("INC (HL)", 1, 4, execute_unprefixed), // 0x34
    op!("DEC (HL)", 1, 4, execute_unprefixed), // 0x35
    op!("LD (HL),d8", 2, 4, execute_unprefixed), // 0x36
    op!("SCF", 1, 4, execute_unprefixed), // 0x37
    op!("JR C,r8", 2, 4, execute_unprefixed), // 0x38
    op!("ADD HL,SP", 1, 4, execute_unprefixed), // 0x39
    op!("LD A,(HL-)", 1, 4, execute_unprefixed), // 0x3a
    op!("DEC SP", 1, 4, execute_unprefixed), // 0x3b
    op!("INC A", 1, 4, execute_unprefixed), // 0x3c
    op!("DEC A", 1, 4, execute_unprefixed), // 0x3d
    op!("LD A,d8", 2, 4, execute_unprefixed), // 0x3e
    op!("CCF", 1, 4, execute_unprefixed), // 0x3f
    op!("LD B,B", 1, 4, execute_unprefixed), // 0x40
    op!("LD B,C", 1, 4, execute_unprefixed), // 0x41
    op!("LD B,D", 1, 4, execute_unprefixed), // 0x42
    op!("LD B,E", 1, 4, execute_unprefixed), // 0x43
    op!("LD B,H", 1, 4, execute_unprefixed), // 0x44
    op!("LD B,L", 1, 4, execute_unprefixed), // 0x45
    op!("LD B,(HL)", 1, 4, execute_unprefixed), // 0x46
    op!("LD B,A", 1, 4, execute_unprefixed), // 0x47
    op!("LD C,B", 1, 4, execute_unprefixed), // 0x48
    op!("LD C,C", 1, 4, execute_unprefixed), // 0x49
    op!("LD C,D", 1, 4, execute_unprefixed), // 0x4a
    op!("LD C,E", 1, 4, execute_unprefixed), // 0x4b
    op!("LD C,H", 1, 4, execute_unprefixed), // 0x4c
    op!("LD C,L", 1, 4, execute_unprefixed), // 0x4d
    op!("LD C,(HL)", 1, 4, execute_unprefixed), // 0x4e
    op!("LD C,A", 1, 4, execute_unprefixed), // 0x4f
    op!("LD D,B", 1, 4, execute_unprefixed), // 0x50
    op!("LD D,C", 1, 4, execute_unprefixed), // 0x51
    op!("LD D,D", 1, 4, execute_unprefixed), // 0x52
    op!("LD D,E", 1, 4, execute_unprefixed), // 0x53
    op!("LD D,H", 1, 4, execute_unprefixed), // 0x54
    op!("LD D,L", 1, 4, execute_unprefixed), // 0x55
    op!("LD D,(HL)", 1, 4, execute_unprefixed), // 0x56
    op!("LD D,A", 1, 4, execute_unprefixed), // 0x57
    op!("LD E,B", 1, 4, execute_unprefixed), // 0x58
    op!("LD E,C", 1, 4, execute_unprefixed), // 0x59
    op!("LD E,D", 1, 4, execute_unprefixed), // 0x5a
    op!("LD E,E", 1, 4, execute_unprefixed), // 0x5b
    op!("LD E,H", 1, 4, execute_unprefixed), // 0x5c
    op!("LD E,L", 1, 4, execute_unprefixed), // 0x5d
    op!("LD E,(HL)", 1, 4, execute_unprefixed), // 0x5e
    op!("LD E,A", 1, 4, execute_unprefixed), // 0x5f
    op!("LD H,B", 1, 4, execute_unprefixed), // 0x60
    op!("LD H,C", 1, 4, execute_unprefixed), // 0x61
    op!("LD H,D", 1, 4, execute_unprefixed), // 0x62
    op!("LD H,E", 1, 4, execute_unprefixed), // 0x63
    op!("LD H,H", 1, 4, execute_unprefixed), // 0x64
    op!("LD H,L", 1, 4, execute_unprefixed), // 0x65
    op!("LD H,(HL)", 1, 4, execute_unprefixed), // 0x66
    op!("LD H,A", 1, 4, execute_unprefixed), // 0x67
    op!("LD L,B", 1, 4, execute_unprefixed), // 0x68
    op!("LD L,C", 1, 4, execute_unprefixed), // 0x69
    op!("LD L,D", 1, 4, execute_unprefixed), // 0x6a
    op!("LD L,E", 1, 4, execute_unprefixed), // 0x6b
    op!("LD L,H", 1, 4, execute_unprefixed), // 0x6c
    op!("LD L,L", 1, 4, execute_unprefixed), // 0x6d
    op!("LD L,(HL)", 1, 4, execute_unprefixed), // 0x6e
    op!("LD L,A", 1, 4, execute_unprefixed), // 0x6f
    op!("LD (HL),B", 1, 4, execute_unprefixed), // 0x70
    op!("LD (HL),C", 1, 4, execute_unprefixed), // 0x71
    op!("LD (HL),D", 1, 4, execute_unprefixed), // 0x72
    op!("LD (HL),E", 1, 4, execute_unprefixed), // 0x73
    op!("LD (HL),H", 1, 4, execute_unprefixed), // 0x74
    op!("LD (HL),L", 1, 4, execute_unprefixed), // 0x75
    op!("HALT", 1, 4, execute_unprefixed), // 0x76
    op!("LD (HL),A", 1, 4, execute_unprefixed), // 0x77
    op!("LD A,B", 1, 4, execute_unprefixed), // 0x78
    op!("LD A,C", 1, 4, execute_unprefixed), // 0x79
    op!("LD A,D", 1, 4, execute_unprefixed), // 0x7a
    op!("LD A,E", 1, 4, execute_unprefixed), // 0x7b
    op!("LD A,H", 1, 4, execute_unprefixed), // 0x7c
    op!("LD A,L", 1, 4, execute_unprefixed), // 0x7d
    op!("LD A,(HL)", 1, 4, execute_unprefixed), // 0x7e
    op!("LD A,A", 1, 4, execute_unprefixed), // 0x7f
    op!("ADD A,B", 1, 4, execute_unprefixed), // 0x80
    op!("ADD A,C", 1, 4, execute_unprefixed), // 0x81
    op!("ADD A,D", 1, 4, execute_unprefixed), // 0x82
    op!("ADD A,E", 1, 4, execute_unprefixed), // 0x83
    op!("ADD A,H", 1, 4, execute_unprefixed), // 0x84
    op!("ADD A,L", 1, 4, execute_unprefixed), // 0x85
    op!("ADD A,(HL)", 1, 4, execute_unprefixed), // 0x86
    op!("ADD A,A", 1, 4, execute_unprefixed), // 0x87
    op!("ADC A,B", 1, 4, execute_unprefixed), // 0x88
    op!("ADC A,C", 1, 4, execute_unprefixed), // 0x89
    op!("ADC A,D", 1, 4, execute_unprefixed), // 0x8a
    op!("ADC A,E", 1, 4, execute_unprefixed), // 0x8b
    op!("ADC A,H", 1, 4, execute_unprefixed), // 0x8c
    op!("ADC A,L", 1, 4, execute_unprefixed), // 0x8d
    op!("ADC A,(HL)", 1, 4, execute_unprefixed), // 0x8e
    op!("ADC A,A", 1, 4, execute_unprefixed), // 0x8f
    op!("SUB B", 1, 4, execute_unprefixed), // 0x90
    op!("SUB C", 1, 4, execute_unprefixed), // 0x91
    op!("SUB D", 1, 4, execute_unprefixed), // 0x92
    op!("SUB E", 1, 4, execute_unprefixed), // 0x93
    op!("SUB H", 1, 4, execute_unprefixed), // 0x94
    op!("SUB L", 1, 4, execute_unprefixed), // 0x95
    op!("SUB (HL)", 1, 4, execute_unprefixed), // 0x96
    op!("SUB A", 1, 4, execute_unprefixed), // 0x97
    op!("SBC A,B", 1, 4, execute_unprefixed), // 0x98
    op!("SBC A,C", 1, 4, execute_unprefixed), // 0x99
    op!("SBC A,D", 1, 4, execute_unprefixed), // 0x9a
    op!("SBC A,E", 1, 4, execute_unprefixed), // 0x9b
    op!("SBC A,H", 1, 4, execute_unprefixed), // 0x9c
    op!("SBC A,L", 1, 4, execute_unprefixed), // 0x9d
    op!("SBC A,(HL)", 1, 4, execute_unprefixed), // 0x9e
    op!("SBC A,A", 1, 4, execute_unprefixed), // 0x9f
    op!("AND B", 1, 4, execute_unprefixed), // 0xa0
    op!("AND C", 1, 4, execute_unprefixed), // 0xa1
    op!("AND D", 1, 4, execute_unprefixed), // 0xa2
    op!("AND E", 1, 4, execute_unprefixed), // 0xa3
    op!("AND H", 1, 4, execute_unprefixed), // 0xa4
    op!("AND L", 1, 4, execute_unprefixed), // 0xa5
    op!("AND (HL)", 1, 4, execute_unprefixed), // 0xa6
    op!("AND A", 1, 4, execute_unprefixed), // 0xa7
    op!("XOR B", 1, 4, execute_unprefixed), // 0xa8
    op!("XOR C", 1, 4, execute_unprefixed), // 0xa9
    op!("XOR D", 1, 4, execute_unprefixed), // 0xaa
    op!("XOR E", 1, 4, execute_unprefixed), // 0xab
    op!("XOR H", 1, 4, execute_unprefixed), // 0xac
    op!("XOR L", 1, 4, execute_unprefixed), // 0xad
    op!("XOR (HL)", 1, 4, execute_unprefixed), // 0xae
    op!("XOR A", 1, 4, execute_unprefixed), // 0xaf
    op!("OR B", 1, 4, execute_unprefixed), // 0xb0
    op!("OR C", 1, 4, execute_unprefixed), // 0xb1
    op!("OR D", 1, 4, execute_unprefixed), // 0xb2
    op!("OR E", 1, 4, execute_unprefixed), // 0xb3
    op!("OR H", 1, 4, execute_unprefixed), // 0xb4
    op!("OR L", 1, 4, execute_unprefixed), // 0xb5
    op!("OR (HL)", 1, 4, execute_unprefixed), // 0xb6
    op!("OR A", 1, 4, execute_unprefixed), // 0xb7
    op!("CP B", 1, 4, execute_unprefixed), // 0xb8
    op!("CP C", 1, 4, execute_unprefixed), // 0xb9
    op!("CP D", 1, 4, execute_unprefixed), // 0xba
    op!("CP E", 1, 4, execute_unprefixed), // 0xbb
    op!("CP H", 1, 4, execute_unprefixed), // 0xbc
    op!("CP L", 1, 4, execute_unprefixed), // 0xbd
    op!("CP (HL)", 1, 4, execute_unprefixed), // 0xbe
    op!("CP A", 1, 4, execute_unprefixed), // 0xbf
    op!("RET NZ", 1, 4, execute_unprefixed), // 0xc0
    op!("POP BC", 1, 4, execute_unprefixed), // 0xc1
    op!("JP NZ,a16", 3, 4, execute_unprefixed), // 0xc2
    op!("JP a16", 3, 4, execute_unprefixed), // 0xc3
    op!("CALL NZ,a16", 3, 4, execute_unprefixed), // 0xc4
    op!("PUSH BC", 1, 4, execute_unprefixed), // 0xc5
    op!("ADD A,d8", 2, 4, execute_unprefixed), // 0xc6
    op!("RST 00H", 1, 4, execute_unprefixed), // 0xc7
    op!("RET Z", 1, 4, execute_unprefixed), // 0xc8
    op!("RET", 1, 4, execute_unprefixed), // 0xc9
    op!("JP Z,a16", 3, 4, execute_unprefixed), // 0xca
    op!("PREFIX CB", 1, 4, execute_unprefixed), // 0xcb
    op!("CALL Z,a16", 3, 4, execute_unprefixed), // 0xcc
    op!("CALL a16", 3, 4, execute_unprefixed), // 0xcd
    op!("ADC A,d8", 2, 4, execute_unprefixed), // 0xce
    op!("RST 08H", 1, 4, execute_unprefixed), // 0xcf
    op!("RET NC", 1, 4, execute_unprefixed), // 0xd0
    op!("POP DE", 1, 4, execute_unprefixed), // 0xd1
    op!("JP NC,a16", 3, 4, execute_unprefixed), // 0xd2
    op!("ILLEGAL_D3", 1, 4, execute_unprefixed), // 0xd3
    op!("CALL NC,a16", 3, 4, execute_unprefixed), // 0xd4
    op!("PUSH DE", 1, 4, execute_unprefixed), // 0xd5
    op!("SUB d8", 2, 4, execute_unprefixed), // 0xd6
    op!("RST 10H", 1, 4, execute_unprefixed), // 0xd7
    op!("RET C", 1, 4, execute_unprefixed), // 0xd8
    op!("RETI", 1, 4, execute_unprefixed), // 0xd9
    op!("JP C,a16", 3, 4, execute_unprefixed), // 0xda
    op!("ILLEGAL_DB", 1, 4, execute_unprefixed), // 0xdb
    op!("CALL C,a16", 3, 4, execute_unprefixed), // 0xdc
    op!("ILLEGAL_DD", 1, 4, execute_unprefixed), // 0xdd
    op!("SBC A,d8", 2, 4, execute_unprefixed), // 0xde
    op!("RST 18H", 1, 4, execute_unprefixed), // 0xdf
    op!("LDH (a8),A", 2, 4, execute_unprefixed), // 0xe0
    op!("POP HL", 1, 4, execute_unprefixed), // 0xe1
    op!("LD (C),A", 1, 4, execute_unprefixed), // 0xe2
    op!("ILLEGAL_E3", 1, 4, execute_unprefixed), // 0xe3
    op!("ILLEGAL_E4", 1, 4, execute_unprefixed), // 0xe4
    op!("PUSH HL", 1, 4, execute_unprefixed), // 0xe5
    op!("AND d8", 2, 4, execute_unprefixed), // 0xe6
    op!("RST 20H", 1, 4, execute_unprefixed), // 0xe7
    op!("ADD SP,r8", 2, 4, execute_unprefixed), // 0xe8
    op!("JP (HL)", 1, 4, execute_unprefixed), // 0xe9
    op!("LD (a16),A", 3, 4, execute_unprefixed), // 0xea
    op!("ILLEGAL_EB", 1, 4, execute_unprefixed), // 0xeb
    op!("ILLEGAL_EC", 1, 4, execute_unprefixed), // 0xec
    op!("ILLEGAL_ED", 1, 4, execute_unprefixed), // 0xed
    op!("XOR d8", 2, 4, execute_unprefixed), // 0xee
    op!("RST 28H", 1, 4, execute_unprefixed), // 0xef
    op!("LDH A,(a8)", 2, 4, execute_unprefixed), // 0xf0
    op!("POP AF", 1, 4, execute_unprefixed), // 0xf1
    op!("LD A,(C)", 1, 4, execute_unprefixed), // 0xf2
    op!("DI", 1, 4, execute_unprefixed), // 0xf3
    op!("ILLEGAL_F4", 1, 4, execute_unprefixed), // 0xf4
    op!("PUSH AF", 1, 4, execute_unprefixed), // 0xf5
    op!("OR d8", 2, 4, execute_unprefixed), // 0xf6
    op!("RST 30H", 1, 4, execute_unprefixed), // 0xf7
    op!("LD HL,SP+r8", 2, 4, execute_unprefixed), // 0xf8
    op!("LD SP,HL", 1, 4, execute_unprefixed), // 0xf9
    op!("LD A,(a16)", 3, 4, execute_unprefixed), // 0xfa
    op!("EI", 1, 4, execute_unprefixed), // 0xfb
    op!("ILLEGAL_FC", 1, 4, execute_unprefixed), // 0xfc
    op!("ILLEGAL_FD", 1, 4, execute_unprefixed), // 0xfd
    op!("CP d8", 2, 4, execute_unprefixed), // 0xfe
    op!("RST 38H", 1, 4, execute_unprefixed), // 0xff
];

pub static OPCODE_TABLE_EXTENDED: [OpCode; 256] = [
    op!("RLC B", 2, 8, execute_prefixed), // 0x00
    op!("RLC C", 2, 8, execute_prefixed), // 0x01
    op!("RLC D", 2, 8, execute_prefixed), // 0x02
    op!("RLC E", 2, 8, execute_prefixed), // 0x03
    op!("RLC H", 2, 8, execute_prefixed), // 0x04
    op!("RLC L", 2, 8, execute_prefixed), // 0x05
    op!("RLC (HL)", 2, 8, execute_prefixed), // 0x06
    op!("RLC A", 2, 8, execute_prefixed), // 0x07
    op!("RRC B", 2, 8, execute_prefixed), // 0x08
    op!("RRC C", 2, 8, execute_prefixed), // 0x09
    op!("RRC D", 2, 8, execute_prefixed), // 0x0a
    op!("RRC E", 2, 8, execute_prefixed), // 0x0b
    op!("RRC H", 2, 8, execute_prefixed), // 0x0c
    op!("RRC L", 2, 8, execute_prefixed), // 0x0d
    op!("RRC (HL)", 2, 8, execute_prefixed), // 0x0e
    op!("RRC A", 2, 8, execute_prefixed), // 0x0f
    op!("RL B", 2, 8, execute_prefixed), // 0x10
    op!("RL C", 2, 8, execute_prefixed), // 0x11
    op!("RL D", 2, 8, execute_prefixed), // 0x12
    op!("RL E", 2, 8, execute_prefixed), // 0x13
    op!("RL H", 2, 8, execute_prefixed), // 0x14
    op!("RL L", 2, 8, execute_prefixed), // 0x15
    op!("RL (HL)", 2, 8, execute_prefixed), // 0x16
    op!("RL A", 2, 8, execute_prefixed), // 0x17
    op!("RR B", 2, 8, execute_prefixed), // 0x18
    op!("RR C", 2, 8, execute_prefixed), // 0x19
    op!("RR D", 2, 8, execute_prefixed), // 0x1a
    op!("RR E", 2, 8, execute_prefixed), // 0x1b
    op!("RR H", 2, 8, execute_prefixed), // 0x1c
    op!("RR L", 2, 8, execute_prefixed), // 0x1d
    op!("RR (HL)", 2, 8, execute_prefixed), // 0x1e
    op!("RR A", 2, 8, execute_prefixed), // 0x1f
    op!("SLA B", 2, 8, execute_prefixed), // 0x20
    op!("SLA C", 2, 8, execute_prefixed), // 0x21
    op!("SLA D", 2, 8, execute_prefixed), // 0x22
    op!("SLA E", 2, 8, execute_prefixed), // 0x23
    op!("SLA H", 2, 8, execute_prefixed), // 0x24
    op!("SLA L", 2, 8, execute_prefixed), // 0x25
    op!("SLA (HL)", 2, 8, execute_prefixed), // 0x26
    op!("SLA A", 2, 8, execute_prefixed), // 0x27
    op!("SRA B", 2, 8, execute_prefixed), // 0x28
    op!("SRA C", 2, 8, execute_prefixed), // 0x29
    op!("SRA D", 2, 8, execute_prefixed), // 0x2a
    op!("SRA E", 2, 8, execute_prefixed), // 0x2b
    op!("SRA H", 2, 8, execute_prefixed), // 0x2c
    op!("SRA L", 2, 8, execute_prefixed), // 0x2d
    op!("SRA (HL)", 2, 8, execute_prefixed), // 0x2e
    op!("SRA A", 2, 8, execute_prefixed), // 0x2f
    op!("SWAP B", 2, 8, execute_prefixed), // 0x30
    op!("SWAP C", 2, 8, execute_prefixed), // 0x31
    op!("SWAP D", 2, 8, execute_prefixed), // 0x32
    op!("SWAP E", 2, 8, execute_prefixed), // 0x33
    op!("SWAP H", 2, 8, execute_prefixed), // 0x34
    op!("SWAP L", 2, 8, execute_prefixed), // 0x35
    op!("SWAP (HL)", 2, 8, execute_prefixed), // 0x36
    op!("SWAP A", 2, 8, execute_prefixed), // 0x37
    op!("SRL B", 2, 8, execute_prefixed), // 0x38
    op!("SRL C", 2, 8, execute_prefixed), // 0x39
    op!("SRL D", 2, 8, execute_prefixed), // 0x3a
    op!("SRL E", 2, 8, execute_prefixed), // 0x3b
    op!("SRL H", 2, 8, execute_prefixed), // 0x3c
    op!("SRL L", 2, 8, execute_prefixed), // 0x3d
    op!("SRL (HL)", 2, 8, execute_prefixed), // 0x3e
    op!("SRL A", 2, 8, execute_prefixed), // 0x3f
    op!("BIT 0,B", 2, 8, execute_prefixed), // 0x40
    op!("BIT 0,C", 2, 8, execute_prefixed), // 0x41
    op!("BIT 0,D", 2, 8, execute_prefixed), // 0x42
    op!("BIT 0,E", 2, 8, execute_prefixed), // 0x43
    op!("BIT 0,H", 2, 8, execute_prefixed), // 0x44
    op!("BIT 0,L", 2, 8, execute_prefixed), // 0x45
    op!("BIT 0,(HL)", 2, 8, execute_prefixed), // 0x46
    op!("BIT 0,A", 2, 8, execute_prefixed), // 0x47
    op!("BIT 1,B", 2, 8, execute_prefixed), // 0x48
    op!("BIT 1,C", 2, 8, execute_prefixed), // 0x49
    op!("BIT 1,D", 2, 8, execute_prefixed), // 0x4a
    op!("BIT 1,E", 2, 8, execute_prefixed), // 0x4b
    op!("BIT 1,H", 2, 8, execute_prefixed), // 0x4c
    op!("BIT 1,L", 2, 8, execute_prefixed), // 0x4d
    op!("BIT 1,(HL)", 2, 8, execute_prefixed), // 0x4e
    op!("BIT 1,A", 2, 8, execute_prefixed), // 0x4f
    op!("BIT 2,B", 2, 8, execute_prefixed), // 0x50
    op!("BIT 2,C", 2, 8, execute_prefixed), // 0x51
    op!("BIT 2,D", 2, 8, execute_prefixed), // 0x52
    op!("BIT 2,E", 2, 8, execute_prefixed), // 0x53
    op!("BIT 2,H", 2, 8, execute_prefixed), // 0x54
    op!("BIT 2,L", 2, 8, execute_prefixed), // 0x55
    op!("BIT 2,(HL)", 2, 8, execute_prefixed), // 0x56
    op!("BIT 2,A", 2, 8, execute_prefixed), // 0x57
    op!("BIT 3,B", 2, 8, execute_prefixed), // 0x58
    op!("BIT 3,C", 2, 8, execute_prefixed), // 0x59
    op!("BIT 3,D", 2, 8, execute_prefixed), // 0x5a
    op!("BIT 3,E", 2, 8, execute_prefixed), // 0x5b
    op!("BIT 3,H", 2, 8, execute_prefixed), // 0x5c
    op!("BIT 3,L", 2, 8, execute_prefixed), // 0x5d
    op!("BIT 3,(HL)", 2, 8, execute_prefixed), // 0x5e
    op!("BIT 3,A", 2, 8, execute_prefixed), // 0x5f
    op!("BIT 4,B", 2, 8, execute_prefixed), // 0x60
    op!("BIT 4,C", 2, 8, execute_prefixed), // 0x61
    op!("BIT 4,D", 2, 8, execute_prefixed), // 0x62
    op!("BIT 4,E", 2, 8, execute_prefixed), // 0x63
    op!("BIT 4,H", 2, 8, execute_prefixed), // 0x64
    op!("BIT 4,L", 2, 8, execute_prefixed), // 0x65
    op!("BIT 4,(HL)", 2, 8, execute_prefixed), // 0x66
    op!("BIT 4,A", 2, 8, execute_prefixed), // 0x67
    op!("BIT 5,B", 2, 8, execute_prefixed), // 0x68
    op!("BIT 5,C", 2, 8, execute_prefixed), // 0x69
    op!("BIT 5,D", 2, 8, execute_prefixed), // 0x6a
    op!("BIT 5,E", 2, 8, execute_prefixed), // 0x6b
    op!("BIT 5,H", 2, 8, execute_prefixed), // 0x6c
    op!("BIT 5,L", 2, 8, execute_prefixed), // 0x6d
    op!("BIT 5,(HL)", 2, 8, execute_prefixed), // 0x6e
    op!("BIT 5,A", 2, 8, execute_prefixed), // 0x6f
    op!("BIT 6,B", 2, 8, execute_prefixed), // 0x70
    op!("BIT 6,C", 2, 8, execute_prefixed), // 0x71
    op!("BIT 6,D", 2, 8, execute_prefixed), // 0x72
    op!("BIT 6,E", 2, 8, execute_prefixed), // 0x73
    op!("BIT 6,H", 2, 8, execute_prefixed), // 0x74
    op!("BIT 6,L", 2, 8, execute_prefixed), // 0x75
    op!("BIT 6,(HL)", 2, 8, execute_prefixed), // 0x76
    op!("BIT 6,A", 2, 8, execute_prefixed), // 0x77
    op!("BIT 7,B", 2, 8, execute_prefixed), // 0x78
    op!("BIT 7,C", 2, 8, execute_prefixed), // 0x79
    op!("BIT 7,D", 2, 8, execute_prefixed), // 0x7a
    op!("BIT 7,E", 2, 8, execute_prefixed), // 0x7b
    op!("BIT 7,H", 2, 8, execute_prefixed), // 0x7c
    op!("BIT 7,L", 2, 8, execute_prefixed), // 0x7d
    op!("BIT 7,(HL)", 2, 8, execute_prefixed), // 0x7e
    op!("BIT 7,A", 2, 8, execute_prefixed), // 0x7f
    op!("RES 0,B", 2, 8, execute_prefixed), // 0x80
    op!("RES 0,C", 2, 8, execute_prefixed), // 0x81
    op!("RES 0,D", 2, 8, execute_prefixed), // 0x82
    op!("RES 0,E", 2, 8, execute_prefixed), // 0x83
    op!("RES 0,H", 2, 8, execute_prefixed), // 0x84
    op!("RES 0,L", 2, 8, execute_prefixed), // 0x85
    op!("RES 0,(HL)", 2, 8, execute_prefixed), // 0x86
    op!("RES 0,A", 2, 8, execute_prefixed), // 0x87
    op!("RES 1,B", 2, 8, execute_prefixed), // 0x88
    op!("RES 1,C", 2, 8, execute_prefixed), // 0x89
    op!("RES 1,D", 2, 8, execute_prefixed), // 0x8a
    op!("RES 1,E", 2, 8, execute_prefixed), // 0x8b
    op!("RES 1,H", 2, 8, execute_prefixed), // 0x8c
    op!("RES 1,L", 2, 8, execute_prefixed), // 0x8d
    op!("RES 1,(HL)", 2, 8, execute_prefixed), // 0x8e
    op!("RES 1,A", 2, 8, execute_prefixed), // 0x8f
    op!("RES 2,B", 2, 8, execute_prefixed), // 0x90
    op!("RES 2,C", 2, 8, execute_prefixed), // 0x91
    op!("RES 2,D", 2, 8, execute_prefixed), // 0x92
    op!("RES 2,E", 2, 8, execute_prefixed), // 0x93
    op!("RES 2,H", 2, 8, execute_prefixed), // 0x94
    op!("RES 2,L", 2, 8, execute_prefixed), // 0x95
    op!("RES 2,(HL)", 2, 8, execute_prefixed), // 0x96
    op!("RES 2,A", 2, 8, execute_prefixed), // 0x97
    op!("RES 3,B", 2, 8, execute_prefixed), // 0x98
    op!("RES 3,C", 2, 8, execute_prefixed), // 0x99
    op!("RES 3,D", 2, 8, execute_prefixed), // 0x9a
    op!("RES 3,E", 2, 8, execute_prefixed), // 0x9b
    op!("RES 3,H", 2, 8, execute_prefixed), // 0x9c
    op!("RES 3,L", 2, 8, execute_prefixed), // 0x9d
    op!("RES 3,(HL)", 2, 8, execute_prefixed), // 0x9e
    op!("RES 3,A", 2, 8, execute_prefixed), // 0x9f
    op!("RES 4,B", 2, 8, execute_prefixed), // 0xa0
    op!("RES 4,C", 2, 8, execute_prefixed), // 0xa1
    op!("RES 4,D", 2, 8, execute_prefixed), // 0xa2
    op!("RES 4,E", 2, 8, execute_prefixed), // 0xa3
    op!("RES 4,H", 2, 8, execute_prefixed), // 0xa4
    op!("RES 4,L", 2, 8, execute_prefixed), // 0xa5
    op!("RES 4,(HL)", 2, 8, execute_prefixed), // 0xa6
    op!("RES 4,A", 2, 8, execute_prefixed), // 0xa7
    op!("RES 5,B", 2, 8, execute_prefixed), // 0xa8
    op!("RES 5,C", 2, 8, execute_prefixed), // 0xa9
    op!("RES 5,D", 2, 8, execute_prefixed), // 0xaa
    op!("RES 5,E", 2, 8, execute_prefixed), // 0xab
    op!("RES 5,H", 2, 8, execute_prefixed), // 0xac
    op!("RES 5,L", 2, 8, execute_prefixed), // 0xad
    op!("RES 5,(HL)", 2, 8, execute_prefixed), // 0xae
    op!("RES 5,A", 2, 8, execute_prefixed), // 0xaf
    op!("RES 6,B", 2, 8, execute_prefixed), // 0xb0
    op!("RES 6,C", 2, 8, execute_prefixed), // 0xb1
    op!("RES 6,D", 2, 8, execute_prefixed), // 0xb2
    op!("RES 6,E", 2, 8, execute_prefixed), // 0xb3
    op!("RES 6,H", 2, 8, execute_prefixed), // 0xb4
    op!("RES 6,L", 2, 8, execute_prefixed), // 0xb5
    op!("RES 6,(HL)", 2, 8, execute_prefixed), // 0xb6
    op!("RES 6,A", 2, 8, execute_prefixed), // 0xb7
    op!("RES 7,B", 2, 8, execute_prefixed), // 0xb8
    op!("RES 7,C", 2, 8, execute_prefixed), // 0xb9
    op!("RES 7,D", 2, 8, execute_prefixed), // 0xba
    op!("RES 7,E", 2, 8, execute_prefixed), // 0xbb
    op!("RES 7,H", 2, 8, execute_prefixed), // 0xbc
    op!("RES 7,L", 2, 8, execute_prefixed), // 0xbd
    op!("RES 7,(HL)", 2, 8, execute_prefixed), // 0xbe
    op!("RES 7,A", 2, 8, execute_prefixed), // 0xbf
    op!("SET 0,B", 2, 8, execute_prefixed), // 0xc0
    op!("SET 0,C", 2, 8, execute_prefixed), // 0xc1
    op!("SET 0,D", 2, 8, execute_prefixed), // 0xc2
    op!("SET 0,E", 2, 8, execute_prefixed), // 0xc3
    op!("SET 0,H", 2, 8, execute_prefixed), // 0xc4
    op!("SET 0,L", 2, 8, execute_prefixed), // 0xc5
    op!("SET 0,(HL)", 2, 8, execute_prefixed), // 0xc6
    op!("SET 0,A", 2, 8, execute_prefixed), // 0xc7
    op!("SET 1,B", 2, 8, execute_prefixed), // 0xc8
    op!("SET 1,C", 2, 8, execute_prefixed), // 0xc9
    op!("SET 1,D", 2, 8, execute_prefixed), // 0xca
    op!("SET 1,E", 2, 8, execute_prefixed), // 0xcb
    op!("SET 1,H", 2, 8, execute_prefixed), // 0xcc
    op!("SET 1,L", 2, 8, execute_prefixed), // 0xcd
    op!("SET 1,(HL)", 2, 8, execute_prefixed), // 0xce
    op!("SET 1,A", 2, 8, execute_prefixed), // 0xcf
    op!("SET 2,B", 2, 8, execute_prefixed), // 0xd0
    op!("SET 2,C", 2, 8, execute_prefixed), // 0xd1
    op!("SET 2,D", 2, 8, execute_prefixed), // 0xd2
    op!("SET 2,E", 2, 8, execute_prefixed), // 0xd3
    op!("SET 2,H", 2, 8, execute_prefixed), // 0xd4
    op!("SET 2,L", 2, 8, execute_prefixed), // 0xd5
    op!("SET 2,(HL)", 2, 8, execute_prefixed), // 0xd6
    op!("SET 2,A", 2, 8, execute_prefixed), // 0xd7
    op!("SET 3,B", 2, 8, execute_prefixed), // 0xd8
    op!("SET 3,C", 2, 8, execute_prefixed), // 0xd9
    op!("SET 3,D", 2, 8, execute_prefixed), // 0xda
    op!("SET 3,E", 2, 8, execute_prefixed), // 0xdb
    op!("SET 3,H", 2, 8, execute_prefixed), // 0xdc
    op!("SET 3,L", 2, 8, execute_prefixed), // 0xdd
    op!("SET 3,(HL)", 2, 8, execute_prefixed), // 0xde
    op!("SET 3,A", 2, 8, execute_prefixed), // 0xdf
    op!("SET 4,B", 2, 8, execute_prefixed), // 0xe0
    op!("SET 4,C", 2, 8, execute_prefixed), // 0xe1
    op!("SET 4,D", 2, 8, execute_prefixed), // 0xe2
    op!("SET 4,E", 2, 8, execute_prefixed), // 0xe3
    op!("SET 4,H", 2, 8, execute_prefixed), // 0xe4
    op!("SET 4,L", 2, 8, execute_prefixed), // 0xe5
    op!("SET 4,(HL)", 2, 8, execute_prefixed), // 0xe6
    op!("SET 4,A", 2, 8, execute_prefixed), // 0xe7
    op!("SET 5,B", 2, 8, execute_prefixed), // 0xe8
    op!("SET 5,C", 2, 8, execute_prefixed), // 0xe9
    op!("SET 5,D", 2, 8, execute_prefixed), // 0xea
    op!("SET 5,E", 2, 8, execute_prefixed), // 0xeb
    op!("SET 5,H", 2, 8, execute_prefixed), // 0xec
    op!("SET 5,L", 2, 8, execute_prefixed), // 0xed
    op!("SET 5,(HL)", 2, 8, execute_prefixed), // 0xee
    op!("SET 5,A", 2, 8, execute_prefixed), // 0xef
    op!("SET 6,B", 2, 8, execute_prefixed), // 0xf0
    op!("SET 6,C", 2, 8, execute_prefixed), // 0xf1
    op!("SET 6,D", 2, 8, execute_prefixed), // 0xf2
    op!("SET 6,E", 2, 8, execute_prefixed), // 0xf3
    op!("SET 6,H", 2, 8, execute_prefixed), // 0xf4
    op!("SET 6,L", 2, 8, execute_prefixed), // 0xf5
    op!("SET 6,(HL)", 2, 8, execute_prefixed), // 0xf6
    op!("SET 6,A", 2, 8, execute_prefixed), // 0xf7
    op!("SET 7,B", 2, 8, execute_prefixed), // 0xf8
    op!("SET 7,C", 2, 8, execute_prefixed), // 0xf9
    op!("SET 7,D", 2, 8, execute_prefixed), // 0xfa
    op!("SET 7,E", 2, 8, execute_prefixed), // 0xfb
    op!("SET 7,H", 2, 8, execute_prefixed), // 0xfc
    op!("SET 7,L", 2, 8, execute_prefixed), // 0xfd
    op!("SET 7,(HL)", 2, 8, execute_prefixed), // 0xfe
    op!("SET 7,A", 2, 8, execute_prefixed), // 0xff
];