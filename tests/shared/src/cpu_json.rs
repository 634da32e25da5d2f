/*
 * Copyright (C) 2022-2025 by Christian Fischer
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

//! Runs the GameboyCPUTests v2 conformance vectors (spec.md §6 "CPU test
//! format"): one JSON file per opcode, each holding a few hundred records of
//! `initial`/`final` CPU state plus the RAM cells the instruction touches.
//!
//! The harness builds a [gemi_core::gameboy::GameBoy] over a flat RAM bus
//! (`GameBoy::new_flat`), seeds it from `initial`, executes exactly one step
//! and compares every register and every addressed RAM cell against `final`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use gemi_core::cpu::registers::RegisterR8;
use gemi_core::device_type::{DeviceType, EmulationType};
use gemi_core::gameboy::{DeviceConfig, GameBoy};

#[derive(Deserialize)]
pub struct CpuTestCase {
    pub name: String,
    pub initial: CpuState,
    pub r#final: CpuState,

    /// Per-cycle bus trace the upstream suite ships; this harness only
    /// checks the end state, not the exact read/write sequence.
    #[serde(default)]
    pub cycles: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub h: u8,
    pub l: u8,
    pub pc: u16,
    pub sp: u16,

    #[serde(default)]
    pub ime: Option<u8>,

    #[serde(default)]
    pub ie: Option<u8>,

    pub ram: Vec<(u16, u8)>,
}

/// Loads the array of test cases stored at `path` (one file per opcode).
pub fn load_test_cases(path: &Path) -> std::io::Result<Vec<CpuTestCase>> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn new_flat_machine() -> GameBoy {
    GameBoy::new_flat(DeviceConfig {
        device: DeviceType::GameBoyDmg,
        emulation: EmulationType::DMG,
        print_opcodes: false,
    })
}

/// Runs a single record against a fresh flat-bus machine, returning a
/// human-readable mismatch description, or `None` when it passed.
pub fn run_case(case: &CpuTestCase) -> Option<String> {
    let mut gb = new_flat_machine();

    for &(address, value) in &case.initial.ram {
        gb.get_mmu_mut().write_u8_unchecked(address, value);
    }

    gb.cpu.set_r8(RegisterR8::A, case.initial.a);
    gb.cpu.set_r8(RegisterR8::B, case.initial.b);
    gb.cpu.set_r8(RegisterR8::C, case.initial.c);
    gb.cpu.set_r8(RegisterR8::D, case.initial.d);
    gb.cpu.set_r8(RegisterR8::E, case.initial.e);
    gb.cpu.set_r8(RegisterR8::F, case.initial.f);
    gb.cpu.set_r8(RegisterR8::H, case.initial.h);
    gb.cpu.set_r8(RegisterR8::L, case.initial.l);
    gb.cpu.set_instruction_pointer(case.initial.pc);
    gb.cpu.set_stack_pointer(case.initial.sp);
    gb.cpu.set_ime(case.initial.ime.unwrap_or(0) != 0);

    gb.run_single_step();

    let mut mismatches = Vec::new();

    macro_rules! check_r8 {
        ($reg:ident, $field:ident) => {
            let actual = gb.cpu.get_r8(RegisterR8::$reg);
            if actual != case.r#final.$field {
                mismatches.push(format!(
                    "{}: expected {:#04x}, got {:#04x}",
                    stringify!($reg), case.r#final.$field, actual
                ));
            }
        };
    }

    check_r8!(A, a);
    check_r8!(B, b);
    check_r8!(C, c);
    check_r8!(D, d);
    check_r8!(E, e);
    check_r8!(F, f);
    check_r8!(H, h);
    check_r8!(L, l);

    if gb.cpu.get_instruction_pointer() != case.r#final.pc {
        mismatches.push(format!(
            "pc: expected {:#06x}, got {:#06x}",
            case.r#final.pc, gb.cpu.get_instruction_pointer()
        ));
    }

    if gb.cpu.get_stack_pointer() != case.r#final.sp {
        mismatches.push(format!(
            "sp: expected {:#06x}, got {:#06x}",
            case.r#final.sp, gb.cpu.get_stack_pointer()
        ));
    }

    for &(address, expected) in &case.r#final.ram {
        let actual = gb.get_mmu().read_u8_unchecked(address);
        if actual != expected {
            mismatches.push(format!(
                "ram[{:#06x}]: expected {:#04x}, got {:#04x}",
                address, expected, actual
            ));
        }
    }

    if mismatches.is_empty() {
        None
    } else {
        Some(format!("{}: {}", case.name, mismatches.join(", ")))
    }
}

/// Runs every case in `path`, returning the mismatch descriptions of every
/// case that failed (empty when the whole file passed).
pub fn run_file(path: &Path) -> std::io::Result<Vec<String>> {
    let cases = load_test_cases(path)?;

    Ok(
        cases.iter()
            .filter_map(run_case)
            .collect()
    )
}
