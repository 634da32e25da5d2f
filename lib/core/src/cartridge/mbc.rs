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

//! Memory bank controllers (spec.md §6 "Cartridge load"). `Mbc` is a plain enum
//! rather than a trait object: the handful of variants this core supports
//! (`MbcNone`, `Mbc1`, `Mbc3`, `Mbc5`) is closed and known at compile time, and an
//! enum keeps dispatch allocation-free, which matters for the `no_std`/no-`alloc`
//! configuration that otherwise only has fixed-size storage available.

use crate::cartridge::header::MbcType;
use crate::cartridge::rtc::{Rtc, RtcRegister};
use crate::gameboy::Clock;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MbcNone {}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mbc1 {
    rom_bank_low: u8,
    bank_select_upper: u8,
    ram_enabled: bool,
    /// `false` selects the simple "16 Mbit ROM/8 KiB RAM" banking mode, `true`
    /// selects "4 Mbit ROM/32 KiB RAM" mode where `bank_select_upper` instead
    /// swaps the whole 0000-3fff ROM window and the RAM bank in lockstep.
    ram_banking_mode: bool,
    rom_banks: usize,
    ram_banks: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mbc3 {
    rom_bank: u8,
    ram_bank_or_rtc: u8,
    ram_and_rtc_enabled: bool,
    rom_banks: usize,
    ram_banks: usize,
    rtc: Rtc,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mbc5 {
    rom_bank: u16,
    ram_bank: u8,
    ram_enabled: bool,
    rom_banks: usize,
    ram_banks: usize,
}

/// The active memory bank controller plus its banking state. Translates CPU
/// addresses into offsets within the cartridge's flat ROM/RAM byte storage and
/// intercepts writes into the ROM address range, which on every MBC are really
/// writes to bank-select registers rather than to the (read-only) ROM itself.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mbc {
    None(MbcNone),
    Mbc1(Mbc1),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Mbc {
    pub fn new(mbc_type: MbcType, rom_size: usize, ram_size: usize) -> Self {
        let rom_banks = (rom_size / ROM_BANK_SIZE).max(1);
        let ram_banks = (ram_size / RAM_BANK_SIZE).max(1);

        match mbc_type {
            MbcType::None => Mbc::None(MbcNone {}),

            MbcType::Mbc1 => Mbc::Mbc1(Mbc1 {
                rom_bank_low: 1,
                bank_select_upper: 0,
                ram_enabled: false,
                ram_banking_mode: false,
                rom_banks,
                ram_banks,
            }),

            MbcType::Mbc3 => Mbc::Mbc3(Mbc3 {
                rom_bank: 1,
                ram_bank_or_rtc: 0,
                ram_and_rtc_enabled: false,
                rom_banks,
                ram_banks,
                rtc: Rtc::new(),
            }),

            MbcType::Mbc5 => Mbc::Mbc5(Mbc5 {
                rom_bank: 1,
                ram_bank: 0,
                ram_enabled: false,
                rom_banks,
                ram_banks,
            }),
        }
    }

    /// Advances components that tick off the master clock independent of bus
    /// access; currently only the MBC3 RTC.
    pub fn update(&mut self, cycles: Clock) {
        if let Mbc::Mbc3(mbc3) = self {
            mbc3.rtc.update(cycles);
        }
    }

    /// Translates a CPU address in 0x0000-0x7fff into a byte offset within the
    /// cartridge's flat ROM storage.
    pub fn translate_rom_address(&self, address: u16) -> usize {
        match self {
            Mbc::None(_) => address as usize,

            Mbc::Mbc1(mbc1) => {
                if address < 0x4000 {
                    let bank = if mbc1.ram_banking_mode {
                        (mbc1.bank_select_upper as usize) << 5
                    } else {
                        0
                    };
                    (bank % mbc1.rom_banks) * ROM_BANK_SIZE + (address as usize)
                } else {
                    let low = if mbc1.rom_bank_low == 0 { 1 } else { mbc1.rom_bank_low };
                    let bank = (low as usize) | ((mbc1.bank_select_upper as usize) << 5);
                    (bank % mbc1.rom_banks) * ROM_BANK_SIZE + (address as usize - 0x4000)
                }
            }

            Mbc::Mbc3(mbc3) => {
                if address < 0x4000 {
                    address as usize
                } else {
                    let bank = (mbc3.rom_bank.max(1) as usize) % mbc3.rom_banks;
                    bank * ROM_BANK_SIZE + (address as usize - 0x4000)
                }
            }

            Mbc::Mbc5(mbc5) => {
                if address < 0x4000 {
                    address as usize
                } else {
                    let bank = (mbc5.rom_bank as usize) % mbc5.rom_banks;
                    bank * ROM_BANK_SIZE + (address as usize - 0x4000)
                }
            }
        }
    }

    /// Handles a write into the 0x0000-0x7fff ROM address range: on real
    /// hardware this range is read-only, but every MBC intercepts writes here
    /// to drive its bank-select registers.
    pub fn write_rom_register(&mut self, address: u16, value: u8) {
        match self {
            Mbc::None(_) => {}

            Mbc::Mbc1(mbc1) => match address {
                0x0000..=0x1fff => mbc1.ram_enabled = (value & 0x0f) == 0x0a,
                0x2000..=0x3fff => mbc1.rom_bank_low = value & 0x1f,
                0x4000..=0x5fff => mbc1.bank_select_upper = value & 0x03,
                0x6000..=0x7fff => mbc1.ram_banking_mode = (value & 0x01) != 0,
                _ => {}
            },

            Mbc::Mbc3(mbc3) => match address {
                0x0000..=0x1fff => mbc3.ram_and_rtc_enabled = (value & 0x0f) == 0x0a,
                0x2000..=0x3fff => mbc3.rom_bank = value & 0x7f,
                0x4000..=0x5fff => mbc3.ram_bank_or_rtc = value,
                0x6000..=0x7fff => mbc3.rtc.write_latch_trigger(value),
                _ => {}
            },

            Mbc::Mbc5(mbc5) => match address {
                0x0000..=0x1fff => mbc5.ram_enabled = (value & 0x0f) == 0x0a,
                0x2000..=0x2fff => mbc5.rom_bank = (mbc5.rom_bank & 0x100) | (value as u16),
                0x3000..=0x3fff => mbc5.rom_bank = (mbc5.rom_bank & 0x0ff) | (((value & 0x01) as u16) << 8),
                0x4000..=0x5fff => mbc5.ram_bank = value & 0x0f, // rumble bit (0x08) ignored: no rumble motor to drive
                _ => {}
            },
        }
    }

    /// Whether the CPU address falls on a cartridge-RAM read/write that should
    /// be routed to the RTC rather than the flat RAM storage (MBC3 only).
    pub fn rtc_register(&self) -> Option<RtcRegister> {
        match self {
            Mbc::Mbc3(mbc3) => RtcRegister::from_index(mbc3.ram_bank_or_rtc),
            _ => None,
        }
    }

    pub fn read_rtc(&self) -> u8 {
        match self {
            Mbc::Mbc3(mbc3) => match self.rtc_register() {
                Some(reg) => mbc3.rtc.read(reg),
                None => 0xff,
            },
            _ => 0xff,
        }
    }

    pub fn write_rtc(&mut self, value: u8) {
        if let Mbc::Mbc3(mbc3) = self {
            if let Some(reg) = RtcRegister::from_index(mbc3.ram_bank_or_rtc) {
                mbc3.rtc.write(reg, value);
            }
        }
    }

    pub fn ram_enabled(&self) -> bool {
        match self {
            Mbc::None(_) => true,
            Mbc::Mbc1(mbc1) => mbc1.ram_enabled,
            Mbc::Mbc3(mbc3) => mbc3.ram_and_rtc_enabled,
            Mbc::Mbc5(mbc5) => mbc5.ram_enabled,
        }
    }

    /// Translates a CPU address in 0xa000-0xbfff into a byte offset within the
    /// cartridge's flat RAM storage. Only meaningful while [Self::ram_enabled]
    /// and, for MBC3, [Self::rtc_register] is `None`.
    pub fn translate_ram_address(&self, address: u16) -> usize {
        let offset = (address as usize) - 0xa000;

        match self {
            Mbc::None(_) => offset,

            Mbc::Mbc1(mbc1) => {
                let bank = if mbc1.ram_banking_mode { mbc1.bank_select_upper as usize } else { 0 };
                (bank % mbc1.ram_banks) * RAM_BANK_SIZE + offset
            }

            Mbc::Mbc3(mbc3) => {
                let bank = (mbc3.ram_bank_or_rtc as usize) % mbc3.ram_banks;
                bank * RAM_BANK_SIZE + offset
            }

            Mbc::Mbc5(mbc5) => {
                let bank = (mbc5.ram_bank as usize) % mbc5.ram_banks;
                bank * RAM_BANK_SIZE + offset
            }
        }
    }
}
