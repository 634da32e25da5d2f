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

//! `gemi-core` already owns the full machine factory (spec.md §6): the
//! `gameboy::Builder` / `gameboy::GameBoy` pair. This crate re-exports them
//! rather than wrapping them a second time, and only adds the bits that need
//! dependencies `gemi-core` deliberately keeps out of its own tree (file
//! backed snapshots; see [crate::snapshot]).

pub use gemi_core::gameboy::{GameBoy, Builder, BuilderErrorCode};
