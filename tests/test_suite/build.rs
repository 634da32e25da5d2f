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

//! Fetches the conformance fixtures into the local cache (spec.md §8
//! "Testable properties") and writes one generated test module per
//! scenario into `OUT_DIR`, which `tests/generated.rs` then `include!`s.
//! Network access only happens the first time; every later build reuses
//! whatever `tests-shared::TestAssets` already extracted.

use std::env;
use std::fs;
use std::path::Path;

const CPU_TESTS_ARCHIVE: &str = "https://github.com/SingleStepTests/sm83/archive/refs/heads/main.zip";
const BLARGG_ROMS_ARCHIVE: &str = "https://github.com/retrio/gb-test-roms/archive/refs/heads/master.zip";
const ACID2_ROM: &str = "https://github.com/mattcurrie/dmg-acid2/releases/latest/download/dmg-acid2.gb";

const CPU_INSTRS_ROMS: &[&str] = &[
    "01-special.gb", "02-interrupts.gb", "03-op sp,hl.gb", "04-op r,imm.gb",
    "05-op rp.gb", "06-ld r,r.gb", "07-jr,jp,call,ret,rst.gb", "08-misc instrs.gb",
    "09-op r,r.gb", "10-bit ops.gb", "11-op a,(hl).gb",
];

const DMG_SOUND_ROMS: &[&str] = &[
    "01-registers.gb", "02-len ctr.gb", "03-trigger.gb", "04-sweep.gb",
    "05-sweep details.gb", "06-overflow on trigger.gb", "07-len sweep period sync.gb",
    "08-len ctr during power.gb", "09-wave read while on.gb", "10-wave trigger while on.gb",
    "11-regs after power.gb", "12-wave write while on.gb",
];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");

    let assets = match tests_shared::TestAssets::new() {
        Ok(assets) => assets,
        Err(e) => {
            write_generated(&out_dir, &format!("// could not create test cache: {e}\n"));
            return;
        }
    };

    let mut generated = String::new();

    match assets.ensure_extracted(CPU_TESTS_ARCHIVE, Path::new("sm83-main")) {
        Ok(root) => {
            generated.push_str(&tests_generator::generate_cpu_json_tests(&root.join("v1")));
        }
        Err(e) => println!("cargo:warning=could not fetch CPU JSON fixtures: {e}"),
    }

    match assets.ensure_extracted(BLARGG_ROMS_ARCHIVE, Path::new("gb-test-roms-master")) {
        Ok(root) => {
            let cpu_instrs_dir = root.join("cpu_instrs").join("individual");
            generated.push_str(&tests_generator::generate_blargg_serial_tests(&cpu_instrs_dir, CPU_INSTRS_ROMS));

            let dmg_sound_dir = root.join("dmg_sound").join("rom_singles");
            generated.push_str(&tests_generator::generate_blargg_ram_tests(&dmg_sound_dir, DMG_SOUND_ROMS, 10));
        }
        Err(e) => println!("cargo:warning=could not fetch Blargg ROMs: {e}"),
    }

    match assets.ensure_file(ACID2_ROM, Path::new("dmg-acid2.gb")) {
        Ok(rom_path) => generated.push_str(&tests_generator::generate_acid2_test(&rom_path)),
        Err(e) => println!("cargo:warning=could not fetch dmg-acid2: {e}"),
    }

    write_generated(&out_dir, &generated);

    println!("cargo:rerun-if-env-changed=GEMI_TEST_DATA");
}

fn write_generated(out_dir: &str, contents: &str) {
    fs::write(Path::new(out_dir).join("generated_tests.rs"), contents)
        .expect("failed to write generated test module");
}
