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

//! The memory bus (spec.md §4.1): dispatches every CPU-visible read and write into
//! the right device, applies OAM-DMA and PPU-mode access gating, and drives the
//! OAM DMA / CGB HDMA engines forward once per machine cycle.
//!
//! `Mmu` owns every peripheral (through [Peripherals]) rather than a flat byte
//! array: the 0xff00-0xff7f I/O range has no uniform storage, each register
//! belongs to whichever component implements it. `Memory` stores the regions
//! that really are flat arrays (VRAM, WRAM, OAM, HRAM, the cartridge and boot
//! ROM); `Mmu` is the thing deciding which of those arrays, or which
//! register, a given address resolves to.

use core::cell::Cell;

use alloc::boxed::Box;

use crate::debug::{DebugEvent, DebugEvents};
use crate::gameboy::{Clock, Peripherals};
use crate::mmu::dma::Dma;
use crate::mmu::hdma::{Hdma, HdmaMode};
use crate::mmu::locations::*;
use crate::mmu::memory_bus::{MemoryBusConnection, MemoryBusSignals};
use crate::ppu::ppu::PpuMode;
use crate::utils::as_bit_flag;

/// How many T-states the OAM DMA engine takes to transfer a single byte.
const DMA_CYCLES_PER_BYTE: Clock = 4;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mmu {
    peripherals: Peripherals,

    dma: Dma,
    dma_cycles_accumulated: Clock,

    hdma: Hdma,

    /// Bit 0 of KEY1 (0xFF4D), as last written by the program. Consumed by
    /// [crate::cpu::cpu::Cpu::arm_speed_switch] the next time a STOP opcode
    /// executes; not the same as `double_speed`, which the CPU owns.
    speed_switch_requested: bool,

    /// Mirrors [crate::cpu::cpu::Cpu::is_double_speed], refreshed once per
    /// `update` call, purely so KEY1 can be read back without giving the bus
    /// a reference back into its owning `Cpu`.
    double_speed: bool,

    signals: MemoryBusSignals,

    /// Events raised while servicing a read. Reads are `&self` (the CPU can
    /// inspect memory through a shared `&Mmu`, e.g. `GameBoy::get_mmu`), so
    /// this uses interior mutability rather than a plain field.
    #[cfg_attr(feature = "serde", serde(skip))]
    read_events: Cell<DebugEvents>,

    /// When set, every address resolves into this flat array instead of the
    /// device map below (spec.md §6 "CPU test format": the conformance suite
    /// runs opcodes against a bare 64 KiB RAM bus, not a cartridge-backed
    /// machine). `None` on every machine built through [GameBoy::build].
    #[cfg_attr(feature = "serde", serde(skip))]
    flat: Option<Box<[u8; 0x10000]>>,
}

impl Mmu {
    pub fn new(peripherals: Peripherals) -> Self {
        Self {
            peripherals,
            dma: Dma::new(),
            dma_cycles_accumulated: 0,
            hdma: Hdma::new(),
            speed_switch_requested: false,
            double_speed: false,
            signals: MemoryBusSignals::default(),
            read_events: Cell::new(DebugEvents::default()),
            flat: None,
        }
    }

    /// Builds a bus backed by a single flat 64 KiB array instead of the usual
    /// device map, for running isolated opcode fixtures against plain memory
    /// (spec.md §6 "CPU test format"). DMA/HDMA, the PPU access gates and
    /// every I/O register become inert; every address, including IE and the
    /// I/O range, is just a RAM cell.
    pub fn new_flat(peripherals: Peripherals) -> Self {
        let mut mmu = Self::new(peripherals);
        mmu.flat = Some(Box::new([0u8; 0x10000]));
        mmu
    }

    pub fn get_peripherals(&self) -> &Peripherals {
        &self.peripherals
    }

    pub fn get_peripherals_mut(&mut self) -> &mut Peripherals {
        &mut self.peripherals
    }

    pub fn take_signals(&mut self) -> MemoryBusSignals {
        let mut signals = core::mem::take(&mut self.signals);
        signals.events |= self.read_events.replace(DebugEvents::default());
        signals
    }

    /// Whether the program has requested a CGB double-speed switch (KEY1 bit
    /// 0) since the last time this was consumed. Polled by `GameBoy` once per
    /// step and forwarded into `Cpu::arm_speed_switch`.
    pub fn take_speed_switch_requested(&mut self) -> bool {
        core::mem::take(&mut self.speed_switch_requested)
    }

    /// Keeps KEY1's read-back of the current speed in sync with the CPU,
    /// which is the sole owner of the actual `double_speed` flag.
    pub fn set_double_speed(&mut self, double_speed: bool) {
        self.double_speed = double_speed;
    }

    fn is_oam_blocked(&self) -> bool {
        if self.dma.is_active() {
            return true;
        }

        matches!(self.peripherals.ppu.mode(), PpuMode::OamScan | PpuMode::Drawing)
    }

    fn is_vram_blocked(&self) -> bool {
        self.peripherals.ppu.mode() == PpuMode::Drawing
    }

    /// While OAM DMA is running, the CPU can only see HRAM (and IE); every
    /// other read returns 0xff and every other write is discarded (spec.md
    /// §4.3 "CPU memory access during DMA" / §7 edge cases). This is the
    /// well known "DMA bug" region games must avoid running code from.
    fn is_blocked_by_dma(&self, address: u16) -> bool {
        self.dma.is_active() && !(MEMORY_LOCATION_HRAM_BEGIN..=MEMORY_LOCATION_IE).contains(&address)
    }

    /// Reads a byte as the CPU would see it: subject to DMA and PPU-mode
    /// access gating.
    pub fn read_u8(&self, address: u16) -> u8 {
        if self.is_blocked_by_dma(address) {
            return 0xff;
        }

        self.read_u8_unchecked(address)
    }

    /// Writes a byte as the CPU would: subject to DMA and PPU-mode access
    /// gating.
    pub fn write_u8(&mut self, address: u16, value: u8) {
        if self.is_blocked_by_dma(address) {
            return;
        }

        self.write_u8_unchecked(address, value);
    }

    /// Reads a byte bypassing DMA gating, but still honouring PPU-mode VRAM
    /// and OAM blocking. Used internally by the DMA/HDMA engines, which read
    /// from ordinary address space while a transfer is in progress, and by
    /// tooling (disassembly, debugger memory views) that wants to see what
    /// the running program would see were it not for the DMA lockout.
    pub fn read_u8_unchecked(&self, address: u16) -> u8 {
        if let Some(flat) = &self.flat {
            return flat[address as usize];
        }

        match address {
            MEMORY_LOCATION_ROM_BANK_00_BEGIN..=MEMORY_LOCATION_ROM_BANK_00_END => {
                if address <= 0x00ff && self.peripherals.mem.boot_rom_enabled() {
                    self.peripherals.mem.boot_rom_read(address)
                } else {
                    self.cartridge_rom_read(address)
                }
            }

            MEMORY_LOCATION_ROM_BANK_N_BEGIN..=MEMORY_LOCATION_ROM_BANK_N_END => {
                self.cartridge_rom_read(address)
            }

            MEMORY_LOCATION_VRAM_BEGIN..=MEMORY_LOCATION_VRAM_END => {
                if self.is_vram_blocked() { 0xff } else { self.peripherals.mem.vram_read(address) }
            }

            MEMORY_LOCATION_CARTRIDGE_RAM_BEGIN..=MEMORY_LOCATION_CARTRIDGE_RAM_END => {
                self.cartridge_ram_read(address)
            }

            MEMORY_LOCATION_WRAM_00_BEGIN..=MEMORY_LOCATION_WRAM_N_END => {
                self.wram_read_with_debug_aid(address)
            }

            // Echo RAM mirrors 0xc000-0xddff (spec.md §3 "Echo RAM").
            MEMORY_LOCATION_ECHO_BEGIN..=MEMORY_LOCATION_ECHO_END => {
                self.wram_read_with_debug_aid(address - 0x2000)
            }

            MEMORY_LOCATION_OAM_BEGIN..=MEMORY_LOCATION_OAM_END => {
                if self.is_oam_blocked() {
                    0xff
                } else {
                    self.peripherals.mem.oam_read(address)
                }
            }

            // Unusable range; real hardware returns varying garbage depending on
            // revision and PPU mode. 0xff is the commonly emulated approximation.
            MEMORY_LOCATION_UNUSABLE_BEGIN..=MEMORY_LOCATION_UNUSABLE_END => 0xff,

            MEMORY_LOCATION_HRAM_BEGIN..=MEMORY_LOCATION_HRAM_END => {
                self.peripherals.mem.hram_read(address)
            }

            MEMORY_LOCATION_IE => self.peripherals.interrupts.get_ie(),

            MEMORY_LOCATION_IO_BEGIN..=MEMORY_LOCATION_IO_END => self.io_read(address),

            // address space is a full 16 bit range, this is unreachable, but
            // kept for completeness instead of relying on exhaustiveness.
            #[allow(unreachable_patterns)]
            _ => 0xff,
        }
    }

    /// Writes a byte bypassing DMA gating, but still honouring PPU-mode VRAM
    /// and OAM blocking.
    pub fn write_u8_unchecked(&mut self, address: u16, value: u8) {
        if let Some(flat) = &mut self.flat {
            flat[address as usize] = value;
            return;
        }

        match address {
            MEMORY_LOCATION_ROM_BANK_00_BEGIN..=MEMORY_LOCATION_ROM_BANK_N_END => {
                self.cartridge_rom_write(address, value);
            }

            MEMORY_LOCATION_VRAM_BEGIN..=MEMORY_LOCATION_VRAM_END => {
                if !self.is_vram_blocked() {
                    self.peripherals.mem.vram_write(address, value);
                }
            }

            MEMORY_LOCATION_CARTRIDGE_RAM_BEGIN..=MEMORY_LOCATION_CARTRIDGE_RAM_END => {
                self.cartridge_ram_write(address, value);
            }

            MEMORY_LOCATION_WRAM_00_BEGIN..=MEMORY_LOCATION_WRAM_N_END => {
                self.peripherals.mem.wram_write(address, value);
            }

            MEMORY_LOCATION_ECHO_BEGIN..=MEMORY_LOCATION_ECHO_END => {
                self.peripherals.mem.wram_write(address - 0x2000, value);
            }

            MEMORY_LOCATION_OAM_BEGIN..=MEMORY_LOCATION_OAM_END => {
                // DMG approximates sprite-attribute corruption (the "OAM bug")
                // triggered by incrementing 16 bit registers pointed at OAM
                // while the PPU is scanning it; this core does not model the
                // exact corruption pattern, only the plain access gate.
                if !self.is_oam_blocked() {
                    self.peripherals.mem.oam_write(address, value);
                }
            }

            MEMORY_LOCATION_UNUSABLE_BEGIN..=MEMORY_LOCATION_UNUSABLE_END => {}

            MEMORY_LOCATION_HRAM_BEGIN..=MEMORY_LOCATION_HRAM_END => {
                self.peripherals.mem.hram_write(address, value);
            }

            MEMORY_LOCATION_IE => self.peripherals.interrupts.set_ie(value),

            MEMORY_LOCATION_IO_BEGIN..=MEMORY_LOCATION_IO_END => self.io_write(address, value),

            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    fn wram_read_with_debug_aid(&self, address: u16) -> u8 {
        if !self.peripherals.mem.wram_was_written(address) {
            let mut events = self.read_events.get();
            events |= DebugEvent::UninitialisedMemoryRead;
            self.read_events.set(events);
        }

        self.peripherals.mem.wram_read(address)
    }

    fn cartridge_rom_read(&self, address: u16) -> u8 {
        match self.peripherals.mem.get_cartridge() {
            Some(cartridge) => cartridge.rom_read(address),
            None => 0xff,
        }
    }

    fn cartridge_rom_write(&mut self, address: u16, value: u8) {
        if let Some(cartridge) = self.peripherals.mem.get_cartridge_mut() {
            cartridge.rom_write(address, value);
        }
    }

    fn cartridge_ram_read(&self, address: u16) -> u8 {
        match self.peripherals.mem.get_cartridge() {
            Some(cartridge) => cartridge.ram_read(address),
            None => 0xff,
        }
    }

    fn cartridge_ram_write(&mut self, address: u16, value: u8) {
        if let Some(cartridge) = self.peripherals.mem.get_cartridge_mut() {
            cartridge.ram_write(address, value);
        }
    }

    fn io_read(&self, address: u16) -> u8 {
        match address {
            MEMORY_LOCATION_P1 => self.peripherals.input.on_read(address),

            MEMORY_LOCATION_SB | MEMORY_LOCATION_SC => self.peripherals.serial.on_read(address),

            MEMORY_LOCATION_DIV..=MEMORY_LOCATION_TAC => self.peripherals.timer.on_read(address),

            MEMORY_LOCATION_IF => self.peripherals.interrupts.get_if(),

            MEMORY_LOCATION_APU_NR10..=MEMORY_LOCATION_APU_NR52 => {
                #[cfg(feature = "apu")]
                { self.peripherals.apu.on_read(address) }
                #[cfg(not(feature = "apu"))]
                { 0xff }
            }
            MEMORY_LOCATION_APU_WAVE_RAM_BEGIN..=MEMORY_LOCATION_APU_WAVE_RAM_END => {
                #[cfg(feature = "apu")]
                { self.peripherals.apu.on_read(address) }
                #[cfg(not(feature = "apu"))]
                { 0xff }
            }

            // OAM DMA is mapped inside the PPU register block (0xff40-0xff4b) but
            // owned by the bus, so it must be matched ahead of the range below.
            MEMORY_LOCATION_DMA => self.dma.last_source_high_byte(),

            MEMORY_LOCATION_LCDC..=MEMORY_LOCATION_WX => self.peripherals.ppu.on_read(address),
            MEMORY_LOCATION_BCPS | MEMORY_LOCATION_BCPD
            | MEMORY_LOCATION_OCPS | MEMORY_LOCATION_OCPD
            | MEMORY_LOCATION_OPRI => self.peripherals.ppu.on_read(address),

            MEMORY_LOCATION_KEY1 => {
                as_bit_flag(self.double_speed, 7) | as_bit_flag(self.speed_switch_requested, 0) | 0x7e
            }
            MEMORY_LOCATION_VBK => self.peripherals.mem.get_vram_bank() | 0xfe,
            MEMORY_LOCATION_BOOT_ROM_DISABLE => 0xff,
            MEMORY_LOCATION_HDMA1..=MEMORY_LOCATION_HDMA4 => 0xff,
            MEMORY_LOCATION_HDMA5 => self.hdma.read_control(),
            MEMORY_LOCATION_SVBK => self.peripherals.mem.get_wram_bank() | 0xf8,

            _ => 0xff,
        }
    }

    fn io_write(&mut self, address: u16, value: u8) {
        match address {
            MEMORY_LOCATION_P1 => self.peripherals.input.on_write(address, value),

            MEMORY_LOCATION_SB | MEMORY_LOCATION_SC => self.peripherals.serial.on_write(address, value),

            MEMORY_LOCATION_DIV..=MEMORY_LOCATION_TAC => self.peripherals.timer.on_write(address, value),

            MEMORY_LOCATION_IF => self.peripherals.interrupts.set_if(value),

            MEMORY_LOCATION_APU_NR10..=MEMORY_LOCATION_APU_NR52 => {
                #[cfg(feature = "apu")]
                self.peripherals.apu.on_write(address, value);
            }
            MEMORY_LOCATION_APU_WAVE_RAM_BEGIN..=MEMORY_LOCATION_APU_WAVE_RAM_END => {
                #[cfg(feature = "apu")]
                self.peripherals.apu.on_write(address, value);
            }

            MEMORY_LOCATION_DMA => self.dma.start(value),

            MEMORY_LOCATION_LCDC..=MEMORY_LOCATION_WX => self.peripherals.ppu.on_write(address, value),
            MEMORY_LOCATION_BCPS | MEMORY_LOCATION_BCPD
            | MEMORY_LOCATION_OCPS | MEMORY_LOCATION_OCPD
            | MEMORY_LOCATION_OPRI => self.peripherals.ppu.on_write(address, value),

            MEMORY_LOCATION_KEY1 => self.speed_switch_requested = (value & 0x01) != 0,
            MEMORY_LOCATION_VBK => self.peripherals.mem.set_vram_bank(value),

            MEMORY_LOCATION_BOOT_ROM_DISABLE => {
                if value != 0 {
                    self.peripherals.mem.disable_boot_rom();
                }
            }

            MEMORY_LOCATION_HDMA1 => self.hdma.set_source_high(value),
            MEMORY_LOCATION_HDMA2 => self.hdma.set_source_low(value),
            MEMORY_LOCATION_HDMA3 => self.hdma.set_destination_high(value),
            MEMORY_LOCATION_HDMA4 => self.hdma.set_destination_low(value),
            MEMORY_LOCATION_HDMA5 => self.start_hdma(value),

            MEMORY_LOCATION_SVBK => self.peripherals.mem.set_wram_bank(value),

            _ => {}
        }
    }

    /// Handles a write to 0xFF55. General purpose transfers copy every
    /// remaining block immediately (the CPU stalls for the whole transfer on
    /// real hardware, spec.md §4.4); H-Blank transfers are left for `update`
    /// to drive one block per H-Blank period.
    fn start_hdma(&mut self, value: u8) {
        self.hdma.write_control(value);

        if self.hdma.mode() == HdmaMode::GeneralPurpose {
            while let Some(block) = self.hdma.next_block() {
                self.transfer_hdma_block(block);
            }
        }
    }

    fn transfer_hdma_block(&mut self, block: [(u16, u16); 16]) {
        for (source, destination) in block {
            let value = self.read_u8_unchecked(source);
            self.peripherals.mem.vram_write(destination, value);
        }

        self.signals.raise(DebugEvent::HdmaBlockTransferred);
    }

    /// Advances the DMA/HDMA engines and any state owned directly by the bus
    /// (as opposed to a peripheral) by `cycles` T-states. Called once per
    /// machine cycle from [crate::gameboy::GameBoy::update_components].
    pub fn update(&mut self, cycles: Clock) {
        if let Some(cartridge) = self.peripherals.mem.get_cartridge_mut() {
            cartridge.update(cycles);
        }

        self.advance_dma(cycles);
        self.advance_hdma();
    }

    /// Copies one byte of an active OAM DMA transfer for every
    /// `DMA_CYCLES_PER_BYTE` T-states that have elapsed.
    fn advance_dma(&mut self, cycles: Clock) {
        if !self.dma.is_active() {
            return;
        }

        self.dma_cycles_accumulated += cycles;

        while self.dma_cycles_accumulated >= DMA_CYCLES_PER_BYTE {
            self.dma_cycles_accumulated -= DMA_CYCLES_PER_BYTE;

            match self.dma.next_transfer() {
                Some((source, destination)) => {
                    let value = self.read_u8_unchecked(source);
                    self.peripherals.mem.oam_write(destination, value);
                }
                None => {
                    self.dma_cycles_accumulated = 0;
                    break;
                }
            }
        }
    }

    /// H-Blank HDMA transfers one 16 byte block per H-Blank period entered
    /// (spec.md §4.4). `Ppu::entered_h_blank` is a one-shot flag set by the
    /// PPU's own `update`, which this `Mmu` runs just ahead of within the
    /// same machine cycle, so the check below observes the previous step's
    /// transition; close enough for a block that is only ever copied once
    /// per scanline.
    fn advance_hdma(&mut self) {
        if self.hdma.mode() != HdmaMode::HBlank || !self.hdma.is_active() {
            return;
        }

        if !self.peripherals.ppu.entered_h_blank() {
            return;
        }

        if let Some(block) = self.hdma.next_block() {
            self.transfer_hdma_block(block);
        }
    }
}
