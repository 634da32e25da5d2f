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

//! Shared support for the conformance test suite (spec.md §8 "Testable
//! properties"): fetching and caching the external test assets (Blargg ROMs,
//! the GameboyCPUTests v2 JSON suite, dmg-acid2), running a machine against
//! them, and the comparisons the individual scenarios need.

pub mod acid2;
pub mod blargg;
pub mod cpu_json;
pub mod fetch;

pub use fetch::TestAssets;
