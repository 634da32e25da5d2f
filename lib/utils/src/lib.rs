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

//! Common functionality used by frontends of the gemi GameBoy emulator.
//!
//! `gemi-core` treats ROM file I/O as an external collaborator with a narrow
//! interface (spec.md §1); this crate is that collaborator. It loads a ROM
//! off disk, builds a device around it, restores any battery backed RAM save
//! sitting next to it, and knows how to track when that RAM needs writing
//! back out.

use std::path::{Path, PathBuf};

use gemi_core::cartridge::Cartridge;
use gemi_core::device_type::DeviceType;
use gemi_core::gameboy::GameBoy;
use gemi_core::utils::ioerr;

/// Derives the path of the battery backed RAM save file belonging to a ROM,
/// by replacing its extension with `.sav`.
pub fn ram_save_path(rom_path: &Path) -> PathBuf {
    rom_path.with_extension("sav")
}

/// Loads the ROM at `rom_path`, restores a `.sav` file sitting next to it (if
/// any), and builds a ready-to-run device around it.
///
/// `device_type` overrides the preferred device chosen from the cartridge's
/// own header; pass `None` to let the cartridge decide.
pub fn quick_start(rom_path: &Path, device_type: Option<DeviceType>) -> ioerr::Result<GameBoy> {
    let mut cartridge = Cartridge::load_file(rom_path)?;

    let sav_path = ram_save_path(rom_path);
    if sav_path.exists() {
        // a missing or mismatched save is not fatal: the cartridge keeps its
        // freshly allocated, zero-filled RAM and the game just starts anew.
        let _ = cartridge.load_ram_file(&sav_path);
    }

    let mut builder = GameBoy::build();
    builder.set_cartridge(cartridge);

    if let Some(device_type) = device_type {
        builder.set_device_type(device_type);
    }

    let mut gb = builder.finish().map_err(|_| ioerr::Error {
        error_code: ioerr::ErrorCode::NotSupported,
        source: ioerr::Source::Cartridge,
        source_file: Some(rom_path.to_path_buf()),
    })?;

    gb.initialize();

    Ok(gb)
}

/// Tracks whether a device's battery backed RAM needs to be flushed to disk,
/// and throttles writes to happen no more than once per `min_interval_cycles`
/// of emulated time (a cartridge can write to its RAM many times per frame;
/// a host doesn't want to touch the filesystem that often).
pub struct AutoSaveRam {
    sav_path: PathBuf,
    min_interval_cycles: u64,
    last_saved_at: u64,
}

impl AutoSaveRam {
    /// Creates a tracker for the `.sav` file belonging to `rom_path`.
    pub fn new(rom_path: &Path, min_interval_cycles: u64) -> Self {
        Self {
            sav_path: ram_save_path(rom_path),
            min_interval_cycles,
            last_saved_at: 0,
        }
    }

    /// Saves the device's RAM to disk if enough emulated time has passed
    /// since the last save and the cartridge actually has battery backed RAM.
    pub fn maybe_save(&mut self, gb: &GameBoy) -> ioerr::Result<()> {
        let total_cycles = gb.get_total_cycles_processed();

        if total_cycles.saturating_sub(self.last_saved_at) < self.min_interval_cycles {
            return Ok(());
        }

        self.force_save(gb)
    }

    /// Saves the device's RAM to disk unconditionally, e.g. on shutdown.
    pub fn force_save(&mut self, gb: &GameBoy) -> ioerr::Result<()> {
        if let Some(cartridge) = gb.get_peripherals().mem.get_cartridge().as_ref() {
            cartridge.save_ram_file(&self.sav_path)?;
        }

        self.last_saved_at = gb.get_total_cycles_processed();
        Ok(())
    }
}
