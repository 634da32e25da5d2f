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

//! File-backed snapshots (spec.md §6 "Persisted snapshot"). `gemi-core`
//! already knows how to turn a [GameBoy] into a versioned, compressed byte
//! stream (`gemi_core::snapshots`); this module is the thin `std::fs` layer
//! a desktop host uses to park that stream next to a save file.

use std::fs;
use std::path::Path;

use gemi_core::gameboy::GameBoy;
use gemi_core::snapshots;
use gemi_core::utils::ioerr::{Error, ErrorCode, Result, Source};

/// Writes a full snapshot of `gb` to `path`, overwriting any existing file.
pub fn save_snapshot_to_file(gb: &GameBoy, path: &Path) -> Result<()> {
    let stream = snapshots::save_snapshot(gb)?;

    fs::write(path, stream).map_err(|_| Error {
        error_code: ErrorCode::UnknownError,
        source: Source::Snapshot,
        source_file: Some(path.to_path_buf()),
    })
}

/// Loads a snapshot previously written by [save_snapshot_to_file].
pub fn load_snapshot_from_file(path: &Path) -> Result<GameBoy> {
    let stream = fs::read(path).map_err(|_| Error {
        error_code: ErrorCode::UnknownError,
        source: Source::Snapshot,
        source_file: Some(path.to_path_buf()),
    })?;

    snapshots::load_snapshot(&stream).map_err(|mut error| {
        error.source_file = Some(path.to_path_buf());
        error
    })
}
