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

//! Writes `#[test]` functions for the conformance fixtures (spec.md §8
//! "Testable properties") as plain Rust source text, one per discovered
//! fixture file. `testrunner`'s `build.rs` calls these and `include!`s the
//! result into a generated test module, so adding a fixture to the cache
//! directory adds a test without touching any checked-in source.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Turns an arbitrary fixture file stem into a valid Rust identifier.
fn sanitize_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Emits one `#[test]` per `*.json` file directly inside `fixtures_dir`,
/// each running every case in that file through
/// `tests_shared::cpu_json::run_file` (spec.md §6 "CPU test format").
/// Returns an empty string, with a `compile_error!` note, if the directory
/// isn't present yet (the asset hasn't been fetched into the cache).
pub fn generate_cpu_json_tests(fixtures_dir: &Path) -> String {
    let mut entries = match fs::read_dir(fixtures_dir) {
        Ok(entries) => entries.filter_map(Result::ok).collect::<Vec<_>>(),
        Err(_) => return missing_fixture_note("cpu_json", fixtures_dir),
    };

    entries.sort_by_key(|e| e.path());

    let mut out = String::new();

    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown");
        let ident = sanitize_ident(stem);
        let path_literal = path.display().to_string();

        let _ = write!(
            out,
            r#"
#[test]
fn cpu_json_{ident}() {{
    let path = std::path::Path::new(r"{path_literal}");
    let failures = tests_shared::cpu_json::run_file(path)
        .unwrap_or_else(|e| panic!("failed to read {{}}: {{}}", path.display(), e));
    assert!(failures.is_empty(), "{{}} mismatch(es) in {stem}:\n{{}}", failures.len(), failures.join("\n"));
}}
"#,
        );
    }

    out
}

/// Emits one `#[test]` per named ROM in `roms_dir`, asserting the serial
/// port eventually prints "Passed" (spec.md "Blargg serial stub").
pub fn generate_blargg_serial_tests(roms_dir: &Path, rom_names: &[&str]) -> String {
    let mut out = String::new();

    for &rom_name in rom_names {
        let path = roms_dir.join(rom_name);
        let ident = sanitize_ident(rom_name.trim_end_matches(".gb"));
        let path_literal = path.display().to_string();

        if !path.exists() {
            out.push_str(&missing_fixture_note(&format!("blargg_serial_{ident}"), &path));
            continue;
        }

        let _ = write!(
            out,
            r#"
#[test]
fn blargg_serial_{ident}() {{
    let path = std::path::Path::new(r"{path_literal}");
    match tests_shared::blargg::run_serial_test(path).expect("failed to run rom") {{
        tests_shared::blargg::SerialOutcome::Passed => {{}}
        tests_shared::blargg::SerialOutcome::Failed(output) => panic!("{{rom}} failed:\n{{output}}", rom = "{rom_name}"),
        tests_shared::blargg::SerialOutcome::TimedOut(reason) => panic!("{{rom}} timed out: {{reason}}", rom = "{rom_name}"),
    }}
}}
"#,
        );
    }

    out
}

/// Emits one `#[test]` per `dmg_sound`/`rom_singles` ROM, asserting the
/// cartridge-RAM status protocol reports success within `timeout_secs`.
pub fn generate_blargg_ram_tests(roms_dir: &Path, rom_names: &[&str], timeout_secs: u64) -> String {
    let mut out = String::new();

    for &rom_name in rom_names {
        let path = roms_dir.join(rom_name);
        let ident = sanitize_ident(rom_name.trim_end_matches(".gb"));
        let path_literal = path.display().to_string();

        if !path.exists() {
            out.push_str(&missing_fixture_note(&format!("blargg_ram_{ident}"), &path));
            continue;
        }

        let _ = write!(
            out,
            r#"
#[test]
fn blargg_ram_{ident}() {{
    let path = std::path::Path::new(r"{path_literal}");
    let timeout = std::time::Duration::from_secs({timeout_secs});
    match tests_shared::blargg::run_ram_status_test(path, timeout).expect("failed to run rom") {{
        tests_shared::blargg::RamOutcome::Passed => {{}}
        tests_shared::blargg::RamOutcome::Failed(status) => panic!("{{rom}} reported status {{status:#04x}}", rom = "{rom_name}"),
        tests_shared::blargg::RamOutcome::TimedOut => panic!("{{rom}} timed out after {{:?}}", timeout),
    }}
}}
"#,
        );
    }

    out
}

/// Emits a single `#[test]` checking dmg-acid2's rendered frame digest
/// against the known-good hash (spec.md §8 "dmg-acid2 pixel test").
pub fn generate_acid2_test(rom_path: &Path) -> String {
    if !rom_path.exists() {
        return missing_fixture_note("acid2", rom_path);
    }

    let rom_literal = rom_path.display().to_string();

    format!(
        r#"
#[test]
fn dmg_acid2() {{
    let rom = std::path::Path::new(r"{rom_literal}");
    let result = tests_shared::acid2::run_and_hash(rom).expect("failed to run dmg-acid2");
    assert!(
        result.matched,
        "frame digest {{}} did not reach the expected {{}} within the emulated time budget",
        result.digest, tests_shared::acid2::EXPECTED_DIGEST,
    );
}}
"#,
    )
}

/// A `#[test]` that fails loudly, naming the fixture path that was expected.
/// Used instead of silently omitting a scenario when the asset cache hasn't
/// been warmed yet (spec.md's testable properties are not optional).
fn missing_fixture_note(label: &str, expected_path: &Path) -> String {
    let ident = sanitize_ident(label);
    let path_literal = expected_path.display().to_string();

    format!(
        r#"
#[test]
fn {ident}_fixture_missing() {{
    panic!(
        "fixture not found at {{}}; run the suite once online or point GEMI_TEST_DATA at a pre-warmed cache",
        r"{path_literal}"
    );
}}
"#,
    )
}
