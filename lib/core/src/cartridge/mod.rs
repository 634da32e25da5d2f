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

//! The inserted cartridge: header parsing, ROM/RAM storage and the active memory
//! bank controller (spec.md §6 "Cartridge load"). Loading a ROM whose header
//! names an unimplemented MBC returns [crate::utils::ioerr::ErrorCode::UnsupportedMbc]
//! rather than starting the machine (spec.md §7).

pub mod header;
pub mod mbc;
pub mod rtc;

pub use header::{GameBoyColorSupport, LicenseeCode};

use crate::cartridge::header::CartridgeHeader;
use crate::cartridge::mbc::Mbc;
use crate::gameboy::Clock;
use crate::utils::ioerr;

#[cfg(feature = "dyn_alloc")]
use crate::mmu::memory_data::{MemoryData, MemoryDataDynamic};

#[cfg(feature = "dyn_alloc")]
use alloc::vec::Vec;

#[cfg(feature = "file_io")]
use std::path::Path;


/// The cartridge currently inserted into the device: a ROM image, optional
/// battery backed RAM, and the memory bank controller selected by the header.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cartridge {
    header: CartridgeHeader,
    mbc: Mbc,

    #[cfg(feature = "dyn_alloc")]
    rom: MemoryDataDynamic,

    #[cfg(feature = "dyn_alloc")]
    ram: Option<MemoryDataDynamic>,
}

impl Cartridge {
    /// Parses `rom` and constructs the matching MBC. Allocates a zero-filled RAM
    /// image sized by the header when the cartridge declares RAM.
    #[cfg(feature = "dyn_alloc")]
    pub fn from_bytes(rom: Vec<u8>) -> Result<Self, ioerr::ErrorCode> {
        let header = CartridgeHeader::parse(&rom)?;
        let mbc = Mbc::new(header.mbc_type(), header.rom_size(), header.ram_size());

        let ram = if header.has_ram() && header.ram_size() > 0 {
            Some(MemoryDataDynamic::alloc(header.ram_size()))
        } else {
            None
        };

        let rom = MemoryDataDynamic::try_from(rom).map_err(|_| ioerr::ErrorCode::UnknownError)?;

        Ok(Self { header, mbc, rom, ram })
    }

    /// Loads a ROM image from a file (spec.md §6, the `file_io` plain load/save
    /// contract; anything beyond that, like archive formats, is out of scope).
    #[cfg(feature = "file_io")]
    pub fn load_file(filepath: &Path) -> Result<Self, ioerr::Error> {
        use std::fs::File;
        use std::io::Read;

        let mut file = File::open(filepath).map_err(|_| ioerr::Error {
            error_code: ioerr::ErrorCode::UnknownError,
            source: ioerr::Source::RomImage,
            source_file: Some(filepath.to_path_buf()),
        })?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).map_err(|_| ioerr::Error {
            error_code: ioerr::ErrorCode::UnknownError,
            source: ioerr::Source::RomImage,
            source_file: Some(filepath.to_path_buf()),
        })?;

        Self::from_bytes(buffer).map_err(|error_code| ioerr::Error {
            error_code,
            source: ioerr::Source::RomImage,
            source_file: Some(filepath.to_path_buf()),
        })
    }

    /// Loads a battery backed RAM image from a file, replacing the cartridge's
    /// currently allocated (zero-filled) RAM.
    #[cfg(feature = "file_io")]
    pub fn load_ram_file(&mut self, filepath: &Path) -> Result<(), ioerr::Error> {
        let ram = self.ram.as_mut().ok_or(ioerr::Error {
            error_code: ioerr::ErrorCode::NotSupported,
            source: ioerr::Source::RamImage,
            source_file: Some(filepath.to_path_buf()),
        })?;

        ram.read_from_file(filepath).map_err(|_| ioerr::Error {
            error_code: ioerr::ErrorCode::UnknownError,
            source: ioerr::Source::RamImage,
            source_file: Some(filepath.to_path_buf()),
        })
    }

    /// Persists the cartridge's RAM to a file, when it has any (spec.md §6
    /// "battery backed save").
    #[cfg(feature = "file_io")]
    pub fn save_ram_file(&self, filepath: &Path) -> Result<(), ioerr::Error> {
        let ram = self.ram.as_ref().ok_or(ioerr::Error {
            error_code: ioerr::ErrorCode::NotSupported,
            source: ioerr::Source::RamImage,
            source_file: Some(filepath.to_path_buf()),
        })?;

        ram.save_to_file(filepath).map_err(|_| ioerr::Error {
            error_code: ioerr::ErrorCode::UnknownError,
            source: ioerr::Source::RamImage,
            source_file: Some(filepath.to_path_buf()),
        })
    }

    pub fn get_cgb_support(&self) -> GameBoyColorSupport {
        self.header.cgb_support()
    }

    pub fn supports_cgb(&self) -> bool {
        !matches!(self.header.cgb_support(), GameBoyColorSupport::None)
    }

    pub fn get_licensee_code(&self) -> LicenseeCode {
        self.header.licensee_code()
    }

    pub fn compute_title_checksum(&self) -> u8 {
        self.header.compute_title_checksum()
    }

    pub fn has_battery(&self) -> bool {
        self.header.has_battery()
    }

    pub fn update(&mut self, cycles: Clock) {
        self.mbc.update(cycles);
    }

    #[cfg(feature = "dyn_alloc")]
    pub fn rom_read(&self, address: u16) -> u8 {
        let offset = self.mbc.translate_rom_address(address) % self.rom.size().max(1);
        self.rom.get_at(offset)
    }

    #[cfg(not(feature = "dyn_alloc"))]
    pub fn rom_read(&self, _address: u16) -> u8 {
        0xff
    }

    pub fn rom_write(&mut self, address: u16, value: u8) {
        self.mbc.write_rom_register(address, value);
    }

    #[cfg(feature = "dyn_alloc")]
    pub fn ram_read(&self, address: u16) -> u8 {
        if !self.mbc.ram_enabled() {
            return 0xff;
        }

        if self.mbc.rtc_register().is_some() {
            return self.mbc.read_rtc();
        }

        match &self.ram {
            Some(ram) if ram.size() > 0 => {
                let offset = self.mbc.translate_ram_address(address) % ram.size();
                ram.get_at(offset)
            }
            _ => 0xff,
        }
    }

    #[cfg(not(feature = "dyn_alloc"))]
    pub fn ram_read(&self, _address: u16) -> u8 {
        0xff
    }

    #[cfg(feature = "dyn_alloc")]
    pub fn ram_write(&mut self, address: u16, value: u8) {
        if !self.mbc.ram_enabled() {
            return;
        }

        if self.mbc.rtc_register().is_some() {
            self.mbc.write_rtc(value);
            return;
        }

        if let Some(ram) = &mut self.ram {
            if ram.size() > 0 {
                let offset = self.mbc.translate_ram_address(address) % ram.size();
                ram.set_at(offset, value);
            }
        }
    }

    #[cfg(not(feature = "dyn_alloc"))]
    pub fn ram_write(&mut self, _address: u16, _value: u8) {}
}
