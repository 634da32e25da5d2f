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

//! The Pixel Processing Unit: the per-scanline OAM scan / drawing / H-Blank /
//! V-Blank state machine, background/window/sprite composition and the DMG
//! and CGB colour pipelines (spec.md §4.4).
//!
//! Mode 3 ("Drawing") is rendered atomically at the moment the PPU leaves it,
//! rather than pixel-by-pixel across its 172 T-states (spec.md's Open
//! Question on `Mode3Cycles` keeps the duration fixed regardless; nothing
//! observable on the bus changes mid-mode-3 in this core, so there is nothing
//! an incremental renderer would need to expose that an atomic one doesn't).

use alloc::boxed::Box;

use crate::cpu::interrupts::Interrupt;
use crate::debug::DebugEvent;
use crate::gameboy::{Clock, DeviceConfig};
use crate::mmu::locations::*;
use crate::mmu::memory::Memory;
use crate::mmu::memory_bus::{MemoryBusConnection, MemoryBusSignals};
use crate::ppu::palette::{dmg_shade, dmg_shade_to_rgba, CgbPaletteRam};
use crate::ppu::sprite::ScanlineSprites;
use crate::utils::{get_bit, set_bit, SerializableArray};

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

const FRAME_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

const OAM_SCAN_CYCLES: u16 = 80;

/// Fixed Mode 3 duration, per spec.md's Open Question resolution: real
/// hardware varies this with sprite count and SCX, this core does not.
pub const MODE3_CYCLES: u16 = 172;

const CPU_CYCLES_PER_SCANLINE: u16 = 456;
const HBLANK_CYCLES: u16 = CPU_CYCLES_PER_SCANLINE - OAM_SCAN_CYCLES - MODE3_CYCLES;
const LINES_PER_FRAME: u8 = 154;
const FIRST_VBLANK_LINE: u8 = 144;

/// Total T-states in one full frame: 154 scanlines of 456 T-states each.
pub const CPU_CYCLES_PER_FRAME: Clock = (CPU_CYCLES_PER_SCANLINE as Clock) * (LINES_PER_FRAME as Clock);

/// How many T-states into line 153 LY is reported as 0 rather than 153, per
/// spec.md's Open Question on implementer-tunable timing constants.
const LINE_153_LY_RESET_CYCLES: u16 = 8;

/// Burned before the first OAM scan after re-enabling the LCD, per spec.md's
/// Open Question resolution (`LcdEnableScanlineOffsetCycles`).
pub const LCD_ENABLE_SCANLINE_OFFSET_CYCLES: u16 = 6;

const LCDC_BIT_BG_WINDOW_ENABLE: u8 = 0;
const LCDC_BIT_OBJ_ENABLE: u8       = 1;
const LCDC_BIT_OBJ_SIZE: u8         = 2;
const LCDC_BIT_BG_TILE_MAP: u8      = 3;
const LCDC_BIT_BG_WINDOW_TILE_DATA: u8 = 4;
const LCDC_BIT_WINDOW_ENABLE: u8    = 5;
const LCDC_BIT_WINDOW_TILE_MAP: u8  = 6;
const LCDC_BIT_ENABLE: u8           = 7;

const STAT_BIT_HBLANK_INT_ENABLE: u8 = 3;
const STAT_BIT_VBLANK_INT_ENABLE: u8 = 4;
const STAT_BIT_OAM_INT_ENABLE: u8    = 5;
const STAT_BIT_LYC_INT_ENABLE: u8    = 6;

/// The four PPU modes. Discriminants match the value STAT bits 0-1 report.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PpuMode {
    HBlank  = 0,
    VBlank  = 1,
    OamScan = 2,
    Drawing = 3,
}

impl PpuMode {
    fn stat_bits(self) -> u8 {
        self as u8
    }
}

/// The GameBoy's Pixel Processing Unit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ppu {
    device_config: DeviceConfig,

    mode: PpuMode,
    mode_clock: u16,
    line: u8,
    line_153_wrapped: bool,
    lcd_enable_delay: u16,
    last_stat_line: bool,

    window_line_counter: u8,
    window_used_this_line: bool,

    lcdc: u8,
    stat: u8,
    scy: u8,
    scx: u8,
    lyc: u8,
    wy: u8,
    wx: u8,

    bgp: u8,
    obp0: u8,
    obp1: u8,

    bg_palette_ram: CgbPaletteRam,
    obj_palette_ram: CgbPaletteRam,
    opri: u8,

    scanline_sprites: ScanlineSprites,

    #[cfg_attr(feature = "serde", serde(skip))]
    entered_h_blank: bool,

    motion_blur_enabled: bool,
    frame_buffer: Box<SerializableArray<u8, FRAME_BUFFER_SIZE>>,
    motion_blur_accumulator: Box<SerializableArray<f32, FRAME_BUFFER_SIZE>>,

    #[cfg_attr(feature = "serde", serde(skip))]
    signals: MemoryBusSignals,
}

impl Ppu {
    pub fn new(device_config: DeviceConfig) -> Self {
        Self {
            device_config,
            mode: PpuMode::OamScan,
            mode_clock: 0,
            line: 0,
            line_153_wrapped: false,
            lcd_enable_delay: 0,
            last_stat_line: false,
            window_line_counter: 0,
            window_used_this_line: false,
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            lyc: 0,
            wy: 0,
            wx: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            bg_palette_ram: CgbPaletteRam::new(),
            obj_palette_ram: CgbPaletteRam::new(),
            opri: 0,
            scanline_sprites: ScanlineSprites::default(),
            entered_h_blank: false,
            motion_blur_enabled: false,
            frame_buffer: Box::new([0xff; FRAME_BUFFER_SIZE].into()),
            motion_blur_accumulator: Box::new([0.0; FRAME_BUFFER_SIZE].into()),
            signals: MemoryBusSignals::default(),
        }
    }

    /// The PPU's current mode, consulted by the `Mmu` for OAM access gating
    /// and by the `Hdma` engine to tell when a fresh H-Blank has started.
    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    /// Set by the most recent `update` call when Mode 3 just finished and
    /// H-Blank was entered. Consumed by the `Mmu`'s H-Blank DMA trigger.
    pub fn entered_h_blank(&self) -> bool {
        self.entered_h_blank
    }

    pub fn current_line(&self) -> u8 {
        self.line
    }

    pub fn is_motion_blur_enabled(&self) -> bool {
        self.motion_blur_enabled
    }

    pub fn set_motion_blur_enabled(&mut self, enabled: bool) {
        self.motion_blur_enabled = enabled;
    }

    /// The completed frame, RGBA8888, row-major, `SCREEN_WIDTH * SCREEN_HEIGHT * 4` bytes.
    pub fn get_frame_buffer(&self) -> &[u8] {
        self.frame_buffer.as_slice()
    }

    fn lcd_enabled(&self) -> bool {
        get_bit(self.lcdc, LCDC_BIT_ENABLE)
    }

    pub fn take_signals(&mut self) -> MemoryBusSignals {
        core::mem::take(&mut self.signals)
    }

    pub fn update(&mut self, cycles: Clock, mem: &Memory) {
        self.entered_h_blank = false;

        if !self.lcd_enabled() {
            return;
        }

        let mut remaining = cycles;
        while remaining > 0 {
            if self.lcd_enable_delay > 0 {
                let consumed = remaining.min(self.lcd_enable_delay as Clock);
                self.lcd_enable_delay -= consumed as u16;
                remaining -= consumed;
                continue;
            }

            let budget = (self.current_mode_length() - self.mode_clock) as Clock;
            let step = remaining.min(budget.max(1));
            self.mode_clock += step as u16;
            remaining -= step;

            // Line 153 reports LY as 0 a few T-states in rather than at the
            // start of the line; this is the well documented "line 153 wrap"
            // quirk, tracked separately from the line actually advancing.
            if self.mode == PpuMode::VBlank
                && self.line == 153
                && !self.line_153_wrapped
                && self.mode_clock >= LINE_153_LY_RESET_CYCLES
            {
                self.line = 0;
                self.line_153_wrapped = true;
                self.update_stat();
            }

            if self.mode_clock >= self.current_mode_length() {
                self.transition_mode(mem);
            }
        }
    }

    fn current_mode_length(&self) -> u16 {
        match self.mode {
            PpuMode::OamScan => OAM_SCAN_CYCLES,
            PpuMode::Drawing => MODE3_CYCLES,
            PpuMode::HBlank  => HBLANK_CYCLES,
            PpuMode::VBlank  => CPU_CYCLES_PER_SCANLINE,
        }
    }

    fn transition_mode(&mut self, mem: &Memory) {
        let length = self.current_mode_length();
        self.mode_clock -= length;

        match self.mode {
            PpuMode::OamScan => {
                self.scan_oam(mem);
                self.mode = PpuMode::Drawing;
            }

            PpuMode::Drawing => {
                self.render_scanline(mem);
                self.mode = PpuMode::HBlank;
                self.entered_h_blank = true;
            }

            PpuMode::HBlank => {
                if self.window_used_this_line {
                    self.window_line_counter = self.window_line_counter.wrapping_add(1);
                }
                self.window_used_this_line = false;

                self.line += 1;

                if self.line == FIRST_VBLANK_LINE {
                    self.mode = PpuMode::VBlank;
                    self.signals.request(Interrupt::VBlank);
                    self.signals.raise(DebugEvent::PpuFrameCompleted);
                } else {
                    self.mode = PpuMode::OamScan;
                }
            }

            PpuMode::VBlank => {
                if self.line_153_wrapped {
                    self.line_153_wrapped = false;
                    self.window_line_counter = 0;
                    self.mode = PpuMode::OamScan;
                } else {
                    self.line += 1;
                }
            }
        }

        self.update_stat();
    }

    fn update_stat(&mut self) {
        let coincidence = self.line == self.lyc;
        self.stat = set_bit(self.stat, 2, coincidence);

        let irq_line =
                (coincidence && get_bit(self.stat, STAT_BIT_LYC_INT_ENABLE))
            ||  (self.mode == PpuMode::OamScan && get_bit(self.stat, STAT_BIT_OAM_INT_ENABLE))
            ||  (self.mode == PpuMode::VBlank  && get_bit(self.stat, STAT_BIT_VBLANK_INT_ENABLE))
            ||  (self.mode == PpuMode::HBlank  && get_bit(self.stat, STAT_BIT_HBLANK_INT_ENABLE))
        ;

        if irq_line && !self.last_stat_line {
            self.signals.request(Interrupt::LcdStat);
        }
        self.last_stat_line = irq_line;
    }

    fn disable_lcd(&mut self) {
        self.mode = PpuMode::HBlank;
        self.mode_clock = 0;
        self.line = 0;
        self.line_153_wrapped = false;
        self.window_line_counter = 0;
        self.window_used_this_line = false;
        self.last_stat_line = false;
        self.stat = set_bit(self.stat, 2, false);

        for i in 0..FRAME_BUFFER_SIZE {
            self.frame_buffer.as_mut_slice()[i] = 0xff;
        }
    }

    fn enable_lcd(&mut self) {
        self.mode = PpuMode::OamScan;
        self.mode_clock = 0;
        self.lcd_enable_delay = LCD_ENABLE_SCANLINE_OFFSET_CYCLES;
        // suppress the STAT interrupt across this first transition
        self.last_stat_line = true;
    }

    fn should_keep_oam_order(&self) -> bool {
        self.device_config.is_gbc_enabled() && !get_bit(self.opri, 0)
    }

    fn scan_oam(&mut self, mem: &Memory) {
        let sprite_height = if get_bit(self.lcdc, LCDC_BIT_OBJ_SIZE) { 16 } else { 8 };
        let keep_oam_order = self.should_keep_oam_order();

        self.scanline_sprites = ScanlineSprites::scan(self.line, sprite_height, keep_oam_order, |i| {
            let base = MEMORY_LOCATION_OAM_BEGIN + (i as u16) * 4;
            [
                mem.oam_read(base),
                mem.oam_read(base + 1),
                mem.oam_read(base + 2),
                mem.oam_read(base + 3),
            ]
        });
    }

    fn bg_tilemap_base(&self) -> u16 {
        if get_bit(self.lcdc, LCDC_BIT_BG_TILE_MAP) { 0x9c00 } else { 0x9800 }
    }

    fn window_tilemap_base(&self) -> u16 {
        if get_bit(self.lcdc, LCDC_BIT_WINDOW_TILE_MAP) { 0x9c00 } else { 0x9800 }
    }

    /// Tile data address for a BG/window tile index, honouring LCDC bit 4's
    /// unsigned-from-0x8000 vs signed-from-0x9000 addressing modes.
    fn bg_window_tile_data_address(&self, tile_index: u8) -> u16 {
        if get_bit(self.lcdc, LCDC_BIT_BG_WINDOW_TILE_DATA) {
            0x8000u16.wrapping_add((tile_index as u16) * 16)
        } else {
            let signed = tile_index as i8 as i32;
            (0x9000i32 + signed * 16) as u16
        }
    }

    fn read_tile_row(&self, mem: &Memory, tile_data_addr: u16, row_in_tile: u8, bank: u8) -> (u8, u8) {
        let addr = tile_data_addr + (row_in_tile as u16) * 2;
        (mem.vram_read_bank(addr, bank as usize), mem.vram_read_bank(addr + 1, bank as usize))
    }

    /// Extracts the 2 bit colour index of one column out of a tile row's two
    /// bitplane bytes, honouring a per-tile X flip.
    fn color_index_from_row(low: u8, high: u8, col: u8, flip_x: bool) -> u8 {
        let bit = if flip_x { col } else { 7 - col };
        let lo = (low >> bit) & 1;
        let hi = (high >> bit) & 1;
        (hi << 1) | lo
    }

    fn render_scanline(&mut self, mem: &Memory) {
        let line = self.line;
        let cgb = self.device_config.is_gbc_enabled();
        let bg_window_enabled = get_bit(self.lcdc, LCDC_BIT_BG_WINDOW_ENABLE);
        let window_enabled = get_bit(self.lcdc, LCDC_BIT_WINDOW_ENABLE);

        let mut bg_color_idx = [0u8; SCREEN_WIDTH];
        let mut bg_priority = [false; SCREEN_WIDTH];
        let mut line_colors = [[0xffu8; 4]; SCREEN_WIDTH];
        let mut window_used = false;

        for x in 0..SCREEN_WIDTH {
            let use_window = window_enabled
                && bg_window_enabled
                && line >= self.wy
                && (x as i16 + 7) >= self.wx as i16;

            let (map_base, tile_x, tile_y, fine_x, fine_y) = if use_window {
                window_used = true;
                let window_x = (x as i16 + 7 - self.wx as i16) as u16;
                (
                    self.window_tilemap_base(),
                    window_x / 8,
                    (self.window_line_counter as u16) / 8,
                    (window_x % 8) as u8,
                    self.window_line_counter % 8,
                )
            } else {
                let bg_y = self.scy.wrapping_add(line);
                let bg_x = self.scx.wrapping_add(x as u8);
                (
                    self.bg_tilemap_base(),
                    (bg_x / 8) as u16,
                    (bg_y / 8) as u16,
                    bg_x % 8,
                    bg_y % 8,
                )
            };

            let map_addr = map_base + tile_y * 32 + tile_x;
            let tile_index = mem.vram_read_bank(map_addr, 0);

            let (palette_idx, bank, flip_x, flip_y, priority) = if cgb {
                let attr = mem.vram_read_bank(map_addr, 1);
                (attr & 0x07, (attr >> 3) & 1, get_bit(attr, 5), get_bit(attr, 6), get_bit(attr, 7))
            } else {
                (0, 0, false, false, false)
            };

            let row = if flip_y { 7 - fine_y } else { fine_y };
            let tile_data_addr = self.bg_window_tile_data_address(tile_index);
            let (lo, hi) = self.read_tile_row(mem, tile_data_addr, row, bank);
            let color_idx = Self::color_index_from_row(lo, hi, fine_x, flip_x);

            bg_color_idx[x] = color_idx;
            bg_priority[x] = priority;

            line_colors[x] = if !cgb && !bg_window_enabled {
                dmg_shade_to_rgba(0)
            } else if cgb {
                self.bg_palette_ram.color_rgba(palette_idx, color_idx)
            } else {
                dmg_shade_to_rgba(dmg_shade(self.bgp, color_idx))
            };
        }

        if window_used {
            self.window_used_this_line = true;
        }

        if get_bit(self.lcdc, LCDC_BIT_OBJ_ENABLE) {
            self.render_sprites(mem, &bg_color_idx, &bg_priority, cgb, bg_window_enabled, &mut line_colors);
        }

        for x in 0..SCREEN_WIDTH {
            self.write_pixel(x, line_colors[x]);
        }
    }

    fn render_sprites(
        &self,
        mem: &Memory,
        bg_color_idx: &[u8; SCREEN_WIDTH],
        bg_priority: &[bool; SCREEN_WIDTH],
        cgb: bool,
        // LCDC bit 0: on CGB this is the master BG/window-over-sprite priority switch
        // rather than a BG/window enable flag, so it gates priority here too.
        master_priority_enabled: bool,
        line_colors: &mut [[u8; 4]; SCREEN_WIDTH],
    ) {
        let sprite_height: i16 = if get_bit(self.lcdc, LCDC_BIT_OBJ_SIZE) { 16 } else { 8 };
        let line = self.line as i16;

        for x in 0..SCREEN_WIDTH {
            for sprite in self.scanline_sprites.as_slice() {
                let sprite_x = sprite.x as i16 - 8;
                if (x as i16) < sprite_x || (x as i16) >= sprite_x + 8 {
                    continue;
                }

                let mut row = line - (sprite.y as i16 - 16);
                if sprite.flip_y() {
                    row = sprite_height - 1 - row;
                }

                let tile_index = if sprite_height == 16 {
                    if row < 8 { sprite.tile & 0xfe } else { sprite.tile | 0x01 }
                } else {
                    sprite.tile
                };
                let row_in_tile = (row % 8) as u8;
                let bank = if cgb { sprite.cgb_bank() } else { 0 };

                let tile_addr = 0x8000u16 + (tile_index as u16) * 16;
                let (lo, hi) = self.read_tile_row(mem, tile_addr, row_in_tile, bank);
                let col = (x as i16 - sprite_x) as u8;
                let color_idx = Self::color_index_from_row(lo, hi, col, sprite.flip_x());

                // colour 0 is always transparent; try the next sprite in the shortlist
                if color_idx == 0 {
                    continue;
                }

                let hidden_behind_bg = !(cgb && !master_priority_enabled)
                    && (sprite.priority_behind_bg() || bg_priority[x])
                    && bg_color_idx[x] != 0;

                if !hidden_behind_bg {
                    line_colors[x] = if cgb {
                        self.obj_palette_ram.color_rgba(sprite.cgb_palette(), color_idx)
                    } else {
                        let palette = if sprite.dmg_palette() == 0 { self.obp0 } else { self.obp1 };
                        dmg_shade_to_rgba(dmg_shade(palette, color_idx))
                    };
                }

                // the first opaque sprite in shortlist order always wins the pixel,
                // whether or not it ends up hidden behind the background
                break;
            }
        }
    }

    fn write_pixel(&mut self, x: usize, rgba: [u8; 4]) {
        let idx = (self.line as usize * SCREEN_WIDTH + x) * 4;

        if !self.motion_blur_enabled {
            self.frame_buffer.as_mut_slice()[idx..idx + 4].copy_from_slice(&rgba);
            return;
        }

        for c in 0..4 {
            let acc = &mut self.motion_blur_accumulator.as_mut_slice()[idx + c];
            *acc = (*acc + rgba[c] as f32) * 0.5;
            self.frame_buffer.as_mut_slice()[idx + c] = *acc as u8;
        }
    }
}

impl MemoryBusConnection for Ppu {
    fn on_read(&self, address: u16) -> u8 {
        match address {
            MEMORY_LOCATION_LCDC => self.lcdc,
            MEMORY_LOCATION_STAT => self.stat | 0x80 | self.mode.stat_bits(),
            MEMORY_LOCATION_SCY  => self.scy,
            MEMORY_LOCATION_SCX  => self.scx,
            MEMORY_LOCATION_LY   => self.line,
            MEMORY_LOCATION_LYC  => self.lyc,
            MEMORY_LOCATION_BGP  => self.bgp,
            MEMORY_LOCATION_OBP0 => self.obp0,
            MEMORY_LOCATION_OBP1 => self.obp1,
            MEMORY_LOCATION_WY   => self.wy,
            MEMORY_LOCATION_WX   => self.wx,

            MEMORY_LOCATION_BCPS => self.bg_palette_ram.read_select(),
            MEMORY_LOCATION_BCPD => self.bg_palette_ram.read_data(),
            MEMORY_LOCATION_OCPS => self.obj_palette_ram.read_select(),
            MEMORY_LOCATION_OCPD => self.obj_palette_ram.read_data(),
            MEMORY_LOCATION_OPRI => self.opri | 0xfe,

            _ => 0xff,
        }
    }

    fn on_write(&mut self, address: u16, value: u8) {
        match address {
            MEMORY_LOCATION_LCDC => {
                let was_enabled = self.lcd_enabled();
                self.lcdc = value;
                let now_enabled = get_bit(value, 7);

                if was_enabled && !now_enabled {
                    self.disable_lcd();
                } else if !was_enabled && now_enabled {
                    self.enable_lcd();
                }
            }

            // mode (bits 0-1) and coincidence (bit 2) are read-only
            MEMORY_LOCATION_STAT => self.stat = (self.stat & 0x07) | (value & 0x78),

            MEMORY_LOCATION_SCY => self.scy = value,
            MEMORY_LOCATION_SCX => self.scx = value,
            MEMORY_LOCATION_LY  => {}
            MEMORY_LOCATION_LYC => self.lyc = value,
            MEMORY_LOCATION_BGP  => self.bgp = value,
            MEMORY_LOCATION_OBP0 => self.obp0 = value,
            MEMORY_LOCATION_OBP1 => self.obp1 = value,
            MEMORY_LOCATION_WY   => self.wy = value,
            MEMORY_LOCATION_WX   => self.wx = value,

            MEMORY_LOCATION_BCPS => self.bg_palette_ram.write_select(value),
            MEMORY_LOCATION_BCPD => self.bg_palette_ram.write_data(value),
            MEMORY_LOCATION_OCPS => self.obj_palette_ram.write_select(value),
            MEMORY_LOCATION_OCPD => self.obj_palette_ram.write_data(value),
            MEMORY_LOCATION_OPRI => self.opri = value & 0x01,

            _ => {}
        }
    }
}
