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

//! Runs Blargg's test ROMs to completion (spec.md §6 "Blargg serial stub" /
//! §8 "Testable properties"). `cpu_instrs` and similar ROMs print their
//! result over the serial port; `dmg_sound`'s `rom_singles` variant instead
//! writes a status byte plus a signature to cartridge RAM.

use std::path::Path;
use std::time::{Duration, Instant};

use gemi_core::cartridge::Cartridge;
use gemi_core::gameboy::GameBoy;

/// A superset of the cycle budget any single Blargg ROM needs to reach
/// "Passed"/"Failed"; stops a hung ROM from looping the harness forever.
const MAX_CYCLES: u64 = 200_000_000;

pub enum SerialOutcome {
    Passed,
    Failed(String),
    TimedOut(String),
}

/// Runs a serial-output Blargg ROM (the `cpu_instrs`, `instr_timing`,
/// `mem_timing` families) until it prints "Passed" or "Failed", or the
/// cycle budget runs out.
pub fn run_serial_test(rom_path: &Path) -> std::io::Result<SerialOutcome> {
    let cartridge = Cartridge::load_file(rom_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", e)))?;

    let mut builder = GameBoy::build();
    builder.set_cartridge(cartridge);

    let mut gb = builder.finish().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", e))
    })?;

    gb.initialize();
    gb.get_peripherals_mut().serial.enable_output_queue(true);

    let mut cycles_run: u64 = 0;

    while cycles_run < MAX_CYCLES {
        let results = gb.run_frame();
        cycles_run += results.cycles as u64;

        let text = gb.get_peripherals_mut().serial.take_output_as_text();
        if text.contains("Passed") {
            return Ok(SerialOutcome::Passed);
        }
        if text.contains("Failed") {
            return Ok(SerialOutcome::Failed(text));
        }
    }

    Ok(SerialOutcome::TimedOut(format!("no result after {} cycles", cycles_run)))
}

/// Cartridge-RAM addresses the `dmg_sound`/`rom_singles` status protocol
/// uses: a status byte, followed by a three byte "magic" signature that
/// distinguishes "still running" (status not yet written) from "finished,
/// status happens to be zero".
const STATUS_ADDRESS: u16 = 0xa000;
const SIGNATURE_ADDRESS: u16 = 0xa001;
const SIGNATURE: [u8; 3] = [0xde, 0xb0, 0x61];

pub enum RamOutcome {
    Passed,
    Failed(u8),
    TimedOut,
}

/// Runs a cartridge-RAM-status Blargg ROM (the `dmg_sound`/`rom_singles`
/// variant) until the status byte transitions away from "running" (0x80)
/// or `timeout` elapses.
pub fn run_ram_status_test(rom_path: &Path, timeout: Duration) -> std::io::Result<RamOutcome> {
    let cartridge = Cartridge::load_file(rom_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", e)))?;

    let mut builder = GameBoy::build();
    builder.set_cartridge(cartridge);

    let mut gb = builder.finish().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", e))
    })?;

    gb.initialize();

    let started = Instant::now();

    loop {
        gb.run_frame();

        let signature_matches = (0 .. SIGNATURE.len()).all(|i| {
            gb.get_mmu().read_u8(SIGNATURE_ADDRESS + i as u16) == SIGNATURE[i]
        });

        if signature_matches {
            let status = gb.get_mmu().read_u8(STATUS_ADDRESS);
            if status == 0x00 {
                return Ok(RamOutcome::Passed);
            }
            if status != 0x80 {
                return Ok(RamOutcome::Failed(status));
            }
        }

        if started.elapsed() >= timeout {
            return Ok(RamOutcome::TimedOut);
        }
    }
}
