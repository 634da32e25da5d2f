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

//! Convenience glue sitting on top of `gemi-core`: the `GameBoy`/`Builder`
//! types are used as-is (re-exported below), this crate only adds the
//! file-backed snapshot helpers that need `serde` + `bincode` + `zstd`,
//! which the core crate keeps behind its own `snapshots` feature.

pub mod gameboy;

#[cfg(feature = "snapshots")]
pub mod snapshot;

pub use gameboy::{GameBoy, Builder, BuilderErrorCode};
