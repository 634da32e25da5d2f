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

//! Runs the Blargg ROM suites against the current build and writes a
//! `TEST_REPORT.md` table (spec.md §8 "Testable properties"), so a
//! regression in conformance shows up as a diff in version control rather
//! than only inside a CI log. Each ROM runs on a blocking task, since the
//! emulator itself is synchronous CPU work; `indicatif` drives a shared
//! progress bar across however many run concurrently.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use tests_shared::blargg::{run_ram_status_test, run_serial_test, RamOutcome, SerialOutcome};
use tests_shared::TestAssets;

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

struct RomResult {
    suite: &'static str,
    rom_name: String,
    passed: bool,
    detail: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> std::io::Result<()> {
    let assets = TestAssets::new()?;

    let roms_root = assets.ensure_extracted(
        "https://github.com/retrio/gb-test-roms/archive/refs/heads/master.zip",
        Path::new("gb-test-roms-master"),
    )?;

    let mut jobs: Vec<(&'static str, PathBuf)> = Vec::new();

    for &rom_name in CPU_INSTRS_ROMS {
        jobs.push(("cpu_instrs", roms_root.join("cpu_instrs").join("individual").join(rom_name)));
    }
    for &rom_name in DMG_SOUND_ROMS {
        jobs.push(("dmg_sound", roms_root.join("dmg_sound").join("rom_singles").join(rom_name)));
    }

    let progress = Arc::new(ProgressBar::new(jobs.len() as u64));
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut running = FuturesUnordered::new();

    for (suite, rom_path) in jobs {
        let progress = Arc::clone(&progress);

        running.push(tokio::task::spawn_blocking(move || {
            let rom_name = rom_path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let result = if suite == "dmg_sound" {
                match run_ram_status_test(&rom_path, std::time::Duration::from_secs(10)) {
                    Ok(RamOutcome::Passed) => RomResult { suite, rom_name, passed: true, detail: "passed".into() },
                    Ok(RamOutcome::Failed(status)) => RomResult { suite, rom_name, passed: false, detail: format!("status {status:#04x}") },
                    Ok(RamOutcome::TimedOut) => RomResult { suite, rom_name, passed: false, detail: "timed out".into() },
                    Err(e) => RomResult { suite, rom_name, passed: false, detail: format!("error: {e}") },
                }
            } else {
                match run_serial_test(&rom_path) {
                    Ok(SerialOutcome::Passed) => RomResult { suite, rom_name, passed: true, detail: "passed".into() },
                    Ok(SerialOutcome::Failed(output)) => RomResult { suite, rom_name, passed: false, detail: output },
                    Ok(SerialOutcome::TimedOut(reason)) => RomResult { suite, rom_name, passed: false, detail: reason },
                    Err(e) => RomResult { suite, rom_name, passed: false, detail: format!("error: {e}") },
                }
            };

            progress.inc(1);
            result
        }));
    }

    let mut results = Vec::new();
    while let Some(joined) = running.next().await {
        if let Ok(result) = joined {
            results.push(result);
        }
    }

    progress.finish_with_message("done");
    results.sort_by(|a, b| (a.suite, &a.rom_name).cmp(&(b.suite, &b.rom_name)));

    write_report(&results)?;

    let failures = results.iter().filter(|r| !r.passed).count();
    println!("{}/{} ROMs passed", results.len() - failures, results.len());

    Ok(())
}

fn write_report(results: &[RomResult]) -> std::io::Result<()> {
    let mut report = String::new();
    report.push_str("# Conformance test report\n\n");
    report.push_str("| Suite | ROM | Result |\n");
    report.push_str("|---|---|---|\n");

    for result in results {
        let _ = writeln!(
            report,
            "| {} | {} | {} |",
            result.suite,
            result.rom_name,
            if result.passed { "PASS".to_string() } else { format!("FAIL ({})", result.detail) },
        );
    }

    std::fs::write("TEST_REPORT.md", report)
}
