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

#![cfg_attr(not(feature = "std"), no_std)]

//! `libgemi` bundles `gemi-core` with the optional `gemi-support` glue
//! behind a single dependency, so a frontend only has to add one crate to
//! its `Cargo.toml` and pick features (spec.md §1 "core" vs. the host's
//! own concerns).

pub use gemi_core as core;

#[cfg(feature = "support")]
pub use gemi_support as support;

#[cfg(feature = "support")]
pub use gemi_support::gameboy::{GameBoy, Builder, BuilderErrorCode};

#[cfg(not(feature = "support"))]
pub use gemi_core::gameboy::{GameBoy, Builder, BuilderErrorCode};
