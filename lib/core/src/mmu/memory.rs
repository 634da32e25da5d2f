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

use crate::boot_rom::BootRom;
use crate::cartridge::Cartridge;
use crate::gameboy::DeviceConfig;
use crate::mmu::memory_data::{MemoryData, MemoryDataFixedSize};

/// Raw, range-mapped byte storage: VRAM, WRAM, HRAM, OAM, the boot ROM
/// overlay and the currently inserted cartridge (spec.md §4.1 "Devices").
/// This component knows nothing about access gating or bus signalling —
/// that is [crate::mmu::mmu::Mmu]'s job; `Memory` is purely storage.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Memory {
    device_config: DeviceConfig,

    boot_rom: Option<BootRom>,
    boot_rom_enabled: bool,

    cartridge: Option<Cartridge>,

    /// Two 8 KiB banks on CGB, only bank 0 used on DMG.
    vram: [MemoryDataFixedSize<0x2000>; 2],
    vram_bank: u8,

    /// Eight 4 KiB banks on CGB (bank 0 fixed, banks 1-7 switchable into
    /// D000-DFFF); only banks 0/1 used on DMG.
    wram: [MemoryDataFixedSize<0x1000>; 8],
    wram_bank: u8,

    oam: MemoryDataFixedSize<0xa0>,
    hram: MemoryDataFixedSize<0x7f>,

    /// First-write tracking for WRAM, used by the uninitialised-memory
    /// debug aid (spec.md §7). Tracked per bank rather than per byte: once
    /// any byte of a bank has been written, reads of that bank stop being
    /// flagged. Coarser than hardware-perfect byte tracking, but this is a
    /// debug warning, not a correctness-critical invariant.
    wram_written: [bool; 8],
}

impl Memory {
    pub fn new(device_config: DeviceConfig) -> Self {
        Self {
            device_config,
            boot_rom: None,
            boot_rom_enabled: false,
            cartridge: None,
            vram: [MemoryDataFixedSize::new(), MemoryDataFixedSize::new()],
            vram_bank: 0,
            wram: core::array::from_fn(|_| MemoryDataFixedSize::new()),
            wram_bank: 1,
            oam: MemoryDataFixedSize::new(),
            hram: MemoryDataFixedSize::new(),
            wram_written: [false; 8],
        }
    }

    pub fn set_boot_rom(&mut self, boot_rom: BootRom) {
        self.boot_rom_enabled = true;
        self.boot_rom = Some(boot_rom);
    }

    pub fn has_boot_rom(&self) -> bool {
        self.boot_rom.is_some()
    }

    pub fn boot_rom_enabled(&self) -> bool {
        self.boot_rom_enabled && self.boot_rom.is_some()
    }

    pub fn disable_boot_rom(&mut self) {
        self.boot_rom_enabled = false;
    }

    pub fn set_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn get_cartridge(&self) -> &Option<Cartridge> {
        &self.cartridge
    }

    pub fn get_cartridge_mut(&mut self) -> &mut Option<Cartridge> {
        &mut self.cartridge
    }

    pub fn boot_rom_read(&self, address: u16) -> u8 {
        match &self.boot_rom {
            Some(rom) => rom.read(address),
            None => 0xff,
        }
    }

    // -- VRAM -----------------------------------------------------------

    pub fn get_vram_bank(&self) -> u8 {
        self.vram_bank
    }

    pub fn set_vram_bank(&mut self, bank: u8) {
        if self.device_config.is_gbc_enabled() {
            self.vram_bank = bank & 0x01;
        }
    }

    pub fn vram_read(&self, address: u16) -> u8 {
        self.vram_read_bank(address, self.vram_bank as usize)
    }

    pub fn vram_read_bank(&self, address: u16, bank: usize) -> u8 {
        self.vram[bank].get_at((address - 0x8000) as usize)
    }

    pub fn vram_write(&mut self, address: u16, value: u8) {
        let bank = self.vram_bank as usize;
        self.vram[bank].set_at((address - 0x8000) as usize, value);
    }

    // -- WRAM -------------------------------------------------------------

    pub fn get_wram_bank(&self) -> u8 {
        self.wram_bank
    }

    pub fn set_wram_bank(&mut self, bank: u8) {
        if self.device_config.is_gbc_enabled() {
            let bank = bank & 0x07;
            self.wram_bank = if bank == 0 { 1 } else { bank };
        }
    }

    pub fn wram_read(&self, address: u16) -> u8 {
        let offset = (address & 0x0fff) as usize;

        if address < 0xd000 {
            self.wram[0].get_at(offset)
        }
        else {
            self.wram[self.wram_bank as usize].get_at(offset)
        }
    }

    pub fn wram_write(&mut self, address: u16, value: u8) {
        let offset = (address & 0x0fff) as usize;

        let bank = if address < 0xd000 { 0 } else { self.wram_bank as usize };
        self.wram[bank].set_at(offset, value);
        self.wram_written[bank] = true;
    }

    /// Whether any byte of the bank backing `address` has been written to
    /// since power-on. Used by the uninitialised-memory-read debug aid; not
    /// byte-precise, see the field comment on `wram_written`.
    pub fn wram_was_written(&self, address: u16) -> bool {
        let bank = if address < 0xd000 { 0 } else { self.wram_bank as usize };
        self.wram_written[bank]
    }

    // -- OAM / HRAM ---------------------------------------------------

    pub fn oam_read(&self, address: u16) -> u8 {
        self.oam.get_at((address - 0xfe00) as usize)
    }

    pub fn oam_write(&mut self, address: u16, value: u8) {
        self.oam.set_at((address - 0xfe00) as usize, value);
    }

    pub fn oam_as_slice(&self) -> &[u8] {
        self.oam.as_slice()
    }

    pub fn hram_read(&self, address: u16) -> u8 {
        self.hram.get_at((address - 0xff80) as usize)
    }

    pub fn hram_write(&mut self, address: u16, value: u8) {
        self.hram.set_at((address - 0xff80) as usize, value);
    }
}
