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

//! The 80 byte header living at 0x0100-0x014f of every cartridge ROM (spec.md §6
//! "Cartridge load"): title, CGB/SGB flags, licensee code, MBC selection bytes and
//! the two checksums.

use crate::utils::ioerr;

const HEADER_TITLE_BEGIN: usize = 0x0134;
const HEADER_TITLE_END: usize = 0x0143;
const HEADER_CGB_FLAG: usize = 0x0143;
const HEADER_NEW_LICENSEE_HIGH: usize = 0x0144;
const HEADER_NEW_LICENSEE_LOW: usize = 0x0145;
const HEADER_CART_TYPE: usize = 0x0147;
const HEADER_ROM_SIZE: usize = 0x0148;
const HEADER_RAM_SIZE: usize = 0x0149;
const HEADER_OLD_LICENSEE: usize = 0x014b;
const HEADER_CHECKSUM: usize = 0x014d;

pub const HEADER_SIZE: usize = 0x0150;


/// Whether a cartridge declares Game Boy Color support via the CGB flag at 0x0143.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameBoyColorSupport {
    /// No CGB flag set; runs in DMG compatibility mode on CGB/GBA hardware.
    None,

    /// CGB flag is 0x80: supports CGB features, still boots fine on a DMG.
    Supported,

    /// CGB flag is 0xc0: CGB features required, refuses to run on a plain DMG.
    Required,
}

/// The publisher/licensee code, in whichever of the two header formats the
/// cartridge uses. Only decoded to the extent `GameBoy::setup_initial_values`
/// needs it (spec.md §4.9): to tell whether it equals `1`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LicenseeCode {
    /// The single byte at 0x014b, used unless it reads 0x33.
    Old(u8),

    /// The two ASCII digits at 0x0144-0x0145, used when the old code is 0x33.
    New(u8),
}

/// The cartridge-type byte at 0x0147, naming which MBC (if any) the cartridge uses
/// and whether it carries RAM/battery/RTC/rumble hardware.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MbcType {
    None,
    Mbc1,
    Mbc3,
    Mbc5,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartridgeHeader {
    title_bytes: [u8; HEADER_TITLE_END - HEADER_TITLE_BEGIN + 1],
    cgb_support: GameBoyColorSupport,
    licensee_code: LicenseeCode,
    mbc_type: MbcType,
    has_ram: bool,
    has_battery: bool,
    has_rtc: bool,
    has_rumble: bool,
    rom_size: usize,
    ram_size: usize,
}

impl CartridgeHeader {
    /// Parses the header out of a full ROM image. `rom` must be at least
    /// [HEADER_SIZE] bytes long.
    pub fn parse(rom: &[u8]) -> Result<Self, ioerr::ErrorCode> {
        if rom.len() < HEADER_SIZE {
            return Err(ioerr::ErrorCode::InvalidFileSize(ioerr::InvalidFileSizeError {
                actual: rom.len(),
                expected: HEADER_SIZE,
            }));
        }

        let mut title_bytes = [0u8; HEADER_TITLE_END - HEADER_TITLE_BEGIN + 1];
        title_bytes.copy_from_slice(&rom[HEADER_TITLE_BEGIN..=HEADER_TITLE_END]);

        let cgb_support = match rom[HEADER_CGB_FLAG] {
            0xc0 => GameBoyColorSupport::Required,
            0x80 => GameBoyColorSupport::Supported,
            _ => GameBoyColorSupport::None,
        };

        let old_licensee = rom[HEADER_OLD_LICENSEE];
        let licensee_code = if old_licensee == 0x33 {
            // the new licensee code is two ASCII digits; decimal-decode them into
            // a single byte so callers can compare against `1` the same way as
            // the old format.
            let hi = ascii_digit(rom[HEADER_NEW_LICENSEE_HIGH]);
            let lo = ascii_digit(rom[HEADER_NEW_LICENSEE_LOW]);
            LicenseeCode::New(hi * 10 + lo)
        } else {
            LicenseeCode::Old(old_licensee)
        };

        let type_byte = rom[HEADER_CART_TYPE];
        let (mbc_type, has_ram, has_battery, has_rtc, has_rumble) = decode_cartridge_type(type_byte)
            .ok_or(ioerr::ErrorCode::UnsupportedMbc(type_byte))?;

        let rom_size = 0x8000usize << rom[HEADER_ROM_SIZE];
        let ram_size = match rom[HEADER_RAM_SIZE] {
            0x00 => 0,
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            0x05 => 0x10000,
            _ => 0,
        };

        Ok(Self {
            title_bytes,
            cgb_support,
            licensee_code,
            mbc_type,
            has_ram,
            has_battery,
            has_rtc,
            has_rumble,
            rom_size,
            ram_size,
        })
    }

    pub fn cgb_support(&self) -> GameBoyColorSupport {
        self.cgb_support
    }

    pub fn licensee_code(&self) -> LicenseeCode {
        self.licensee_code
    }

    pub fn mbc_type(&self) -> MbcType {
        self.mbc_type
    }

    pub fn has_ram(&self) -> bool {
        self.has_ram
    }

    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    pub fn has_rtc(&self) -> bool {
        self.has_rtc
    }

    pub fn has_rumble(&self) -> bool {
        self.has_rumble
    }

    pub fn rom_size(&self) -> usize {
        self.rom_size
    }

    pub fn ram_size(&self) -> usize {
        self.ram_size
    }

    /// Sum of the 16 title bytes (0x134-0x143), truncated to 8 bits. Computed by
    /// the CGB/GBA boot ROM to decide a handful of DMG-compatibility special
    /// cases baked into `GameBoy::setup_initial_values` (spec.md §4.9).
    pub fn compute_title_checksum(&self) -> u8 {
        self.title_bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
    }
}

fn ascii_digit(byte: u8) -> u8 {
    byte.wrapping_sub(b'0')
}

/// Maps the cartridge-type byte at 0x0147 to an MBC selection plus the RAM/
/// battery/RTC/rumble hardware flags packed into the same byte. Returns `None`
/// for bytes this core does not implement (MBC2, MBC6, MBC7, MMM01, Pocket
/// Camera, HuC1/3, TAMA5 — spec.md §7 "Unsupported cartridge type").
fn decode_cartridge_type(type_byte: u8) -> Option<(MbcType, bool, bool, bool, bool)> {
    use MbcType::*;

    Some(match type_byte {
        0x00 => (None, false, false, false, false),
        0x08 => (None, true, false, false, false),
        0x09 => (None, true, true, false, false),

        0x01 => (Mbc1, false, false, false, false),
        0x02 => (Mbc1, true, false, false, false),
        0x03 => (Mbc1, true, true, false, false),

        0x0f => (Mbc3, false, true, true, false),
        0x10 => (Mbc3, true, true, true, false),
        0x11 => (Mbc3, false, false, false, false),
        0x12 => (Mbc3, true, false, false, false),
        0x13 => (Mbc3, true, true, false, false),

        0x19 => (Mbc5, false, false, false, false),
        0x1a => (Mbc5, true, false, false, false),
        0x1b => (Mbc5, true, true, false, false),
        0x1c => (Mbc5, false, false, false, true),
        0x1d => (Mbc5, true, false, false, true),
        0x1e => (Mbc5, true, true, false, true),

        _ => return None,
    })
}
