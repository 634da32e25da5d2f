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

//! The persisted snapshot format (spec.md §6 "Persisted snapshot"): a versioned
//! binary stream carrying the whole machine state, so a host can pause a
//! session and resume it bit-identically later (spec.md §8 "Round-trips").
//!
//! Layout: a 4-byte magic, a little-endian u32 version, then the [GameBoy]
//! value itself encoded with `bincode`. The payload is zstd-compressed to keep
//! battery-backed save directories small; `base64` lets a host embed a
//! snapshot inside a text container (e.g. browser local storage) without a
//! second encoding pass of its own.

use crate::gameboy::GameBoy;
use crate::utils::ioerr::{Error, ErrorCode, Result, Source};

/// Magic bytes identifying a gemi snapshot stream.
const SNAPSHOT_MAGIC: &[u8; 4] = b"GMI\0";

/// The current snapshot format version. Bumped whenever the encoded shape of
/// [GameBoy] changes in a way that breaks compatibility with older streams.
const SNAPSHOT_VERSION: u32 = 1;


/// Encodes the whole machine state into a versioned, compressed byte stream.
pub fn save_snapshot(gb: &GameBoy) -> Result<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(gb, bincode::config::standard())
        .map_err(|_| snapshot_error(ErrorCode::UnknownError))?;

    let compressed = zstd::encode_all(payload.as_slice(), 0)
        .map_err(|_| snapshot_error(ErrorCode::UnknownError))?;

    let mut stream = Vec::with_capacity(SNAPSHOT_MAGIC.len() + 4 + compressed.len());
    stream.extend_from_slice(SNAPSHOT_MAGIC);
    stream.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    stream.extend_from_slice(&compressed);

    Ok(stream)
}


/// Decodes a byte stream previously produced by [save_snapshot] into a fresh
/// [GameBoy] instance. The caller decides whether to replace its running
/// machine with the result; on error, the caller's current state is left
/// untouched (spec.md §7 "Snapshot mismatch").
pub fn load_snapshot(stream: &[u8]) -> Result<GameBoy> {
    if stream.len() < SNAPSHOT_MAGIC.len() + 4 || &stream[0 .. SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(snapshot_error(ErrorCode::SnapshotMismatch {
            expected_magic: SNAPSHOT_MAGIC,
            found_version: 0,
        }));
    }

    let version_bytes = &stream[SNAPSHOT_MAGIC.len() .. SNAPSHOT_MAGIC.len() + 4];
    let version = u32::from_le_bytes([version_bytes[0], version_bytes[1], version_bytes[2], version_bytes[3]]);

    if version != SNAPSHOT_VERSION {
        return Err(snapshot_error(ErrorCode::SnapshotMismatch {
            expected_magic: SNAPSHOT_MAGIC,
            found_version: version,
        }));
    }

    let compressed = &stream[SNAPSHOT_MAGIC.len() + 4 ..];

    let payload = zstd::decode_all(compressed)
        .map_err(|_| snapshot_error(ErrorCode::UnknownError))?;

    let (gb, _) : (GameBoy, usize) = bincode::serde::decode_from_slice(&payload, bincode::config::standard())
        .map_err(|_| snapshot_error(ErrorCode::UnknownError))?;

    Ok(gb)
}


/// Encodes a snapshot as a base64 string, suitable for storage inside a text
/// based container like browser local storage or a JSON save-game record.
pub fn save_snapshot_base64(gb: &GameBoy) -> Result<String> {
    Ok(base64::Engine::encode(&base64::engine::general_purpose::STANDARD, save_snapshot(gb)?))
}


/// Decodes a snapshot previously produced by [save_snapshot_base64].
pub fn load_snapshot_base64(data: &str) -> Result<GameBoy> {
    let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, data)
        .map_err(|_| snapshot_error(ErrorCode::UnknownError))?;

    load_snapshot(&bytes)
}


fn snapshot_error(error_code: ErrorCode) -> Error {
    Error {
        error_code,
        source: Source::Snapshot,

        #[cfg(feature = "file_io")]
        source_file: None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_type::DeviceType;

    fn new_test_machine() -> GameBoy {
        let mut builder = GameBoy::build();
        builder.set_device_type(DeviceType::GameBoyDmg);
        builder.finish().unwrap()
    }

    #[test]
    fn snapshot_round_trip_preserves_cpu_state() {
        let mut gb = new_test_machine();
        gb.initialize();

        for _ in 0 .. 1000 {
            gb.run_single_step();
        }

        let stream = save_snapshot(&gb).unwrap();
        let restored = load_snapshot(&stream).unwrap();

        assert_eq!(gb.cpu.get_instruction_pointer(), restored.cpu.get_instruction_pointer());
        assert_eq!(gb.get_total_cycles_processed(), restored.get_total_cycles_processed());
    }

    #[test]
    fn mismatched_magic_is_rejected_and_does_not_panic() {
        let result = load_snapshot(&[0u8; 16]);
        assert!(result.is_err());
    }

    #[test]
    fn mismatched_version_is_rejected() {
        let mut gb = new_test_machine();
        gb.initialize();

        let mut stream = save_snapshot(&gb).unwrap();
        // corrupt the version field
        stream[4] = 0xff;

        let result = load_snapshot(&stream);
        assert!(result.is_err());
    }
}
