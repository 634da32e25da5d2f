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

//! Hand-assembled fixtures for the invariants, round-trips and worked
//! scenarios spec.md §8 lists directly, rather than drawing them from an
//! external conformance suite.

use gemi_core::cpu::interrupts::Interrupt;
use gemi_core::cpu::registers::{CpuFlag, RegisterR16, RegisterR8};
use gemi_core::device_type::{DeviceType, EmulationType};
use gemi_core::gameboy::{DeviceConfig, GameBoy};
use gemi_core::mmu::locations::{MEMORY_LOCATION_DMA, MEMORY_LOCATION_HRAM_BEGIN, MEMORY_LOCATION_OAM_BEGIN};

fn dmg_config() -> DeviceConfig {
    DeviceConfig {
        device: DeviceType::GameBoyDmg,
        emulation: EmulationType::DMG,
        print_opcodes: false,
    }
}

fn flat_machine_at(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::new_flat(dmg_config());
    for (offset, &byte) in program.iter().enumerate() {
        gb.get_mmu_mut().write_u8_unchecked(offset as u16, byte);
    }
    gb.cpu.set_instruction_pointer(0);
    gb
}

#[test]
fn f_register_low_nibble_is_always_zero() {
    // LD A,0xFF; ADD A,0x01 -> A=0, Z=1, but F low nibble must read 0.
    let mut gb = flat_machine_at(&[0x3e, 0xff, 0xc6, 0x01]);
    gb.run_single_step();
    gb.run_single_step();
    assert_eq!(gb.cpu.get_r8(RegisterR8::F) & 0x0f, 0);
}

#[test]
fn step_advances_cycles_by_the_instructions_cost() {
    // NOP is 1 M-cycle (4 T-states).
    let mut gb = flat_machine_at(&[0x00]);
    let results = gb.run_single_step();
    assert_eq!(results.cycles, 4);
}

#[test]
fn ei_takes_effect_after_the_following_step() {
    // EI; NOP; NOP
    let mut gb = flat_machine_at(&[0xfb, 0x00, 0x00]);

    gb.run_single_step(); // executes EI
    assert!(!gb.cpu.get_ime(), "IME must still be 0 in the step executing EI");

    gb.run_single_step(); // executes the NOP right after EI
    assert!(gb.cpu.get_ime(), "IME must be 1 from the step after EI onward");
}

#[test]
fn ei_does_not_let_an_already_pending_interrupt_preempt_the_next_instruction() {
    // EI; INC A; INC A, with VBlank already pending and enabled at the moment
    // EI executes. The step that runs EI must not also service the interrupt,
    // and the very next step must still be the INC A right after EI, not the
    // interrupt dispatch (spec.md §4.2 "EI delay").
    let mut gb = flat_machine_at(&[0xfb, 0x3c, 0x3c]);
    gb.get_peripherals_mut().interrupts.set_ie(0x01); // VBlank enabled
    gb.get_peripherals_mut().interrupts.request(Interrupt::VBlank);

    gb.run_single_step(); // executes EI
    assert!(!gb.cpu.get_ime(), "IME must still be 0 in the step executing EI");
    assert_eq!(
        gb.cpu.get_instruction_pointer(), 1,
        "the pending interrupt must not preempt the step that runs EI itself"
    );

    gb.run_single_step(); // must execute the INC A right after EI, not the ISR
    assert_eq!(
        gb.cpu.get_r8(RegisterR8::A), 1,
        "the instruction immediately after EI must run before any interrupt is serviced"
    );
    assert_eq!(
        gb.get_peripherals().interrupts.get_if() & 0x01, 0,
        "the pending interrupt must have been serviced by now, clearing its IF bit"
    );
    assert!(!gb.cpu.get_ime(), "servicing the interrupt must clear IME again");
    assert_eq!(
        gb.cpu.get_instruction_pointer(), 0x40,
        "PC must land on the VBlank vector after servicing"
    );
}

#[test]
fn push_pop_round_trip_leaves_registers_and_sp_unchanged() {
    // LD BC,0x1234; PUSH BC; POP BC
    let mut gb = flat_machine_at(&[0x01, 0x34, 0x12, 0xc5, 0xc1]);
    gb.cpu.set_stack_pointer(0xfffe);

    gb.run_single_step();
    let bc_before = gb.cpu.get_r16(RegisterR16::BC);
    let sp_before = gb.cpu.get_stack_pointer();

    gb.run_single_step();
    gb.run_single_step();

    assert_eq!(gb.cpu.get_r16(RegisterR16::BC), bc_before);
    assert_eq!(gb.cpu.get_stack_pointer(), sp_before);
}

#[test]
fn xor_a_a_twice_is_idempotent() {
    // XOR A,A; XOR A,A
    let mut gb = flat_machine_at(&[0xaf, 0xaf]);

    for _ in 0 .. 2 {
        gb.run_single_step();
        assert_eq!(gb.cpu.get_r8(RegisterR8::A), 0);
        assert!(gb.cpu.get_flag(CpuFlag::Zero));
        assert!(!gb.cpu.get_flag(CpuFlag::Negative));
        assert!(!gb.cpu.get_flag(CpuFlag::HalfCarry));
        assert!(!gb.cpu.get_flag(CpuFlag::Carry));
    }
}

#[test]
fn add_hl_bc_reports_half_carry_without_full_carry() {
    // LD HL,0x0fff; LD BC,0x0001; ADD HL,BC
    let mut gb = flat_machine_at(&[0x21, 0xff, 0x0f, 0x01, 0x01, 0x00, 0x09]);

    gb.run_single_step();
    gb.run_single_step();

    let zero_before = gb.cpu.get_flag(CpuFlag::Zero);
    let start = gb.cpu.get_instruction_pointer();

    let results = gb.run_single_step();

    assert_eq!(gb.cpu.get_r16(RegisterR16::HL), 0x1000);
    assert_eq!(gb.cpu.get_flag(CpuFlag::Zero), zero_before);
    assert!(!gb.cpu.get_flag(CpuFlag::Negative));
    assert!(gb.cpu.get_flag(CpuFlag::HalfCarry));
    assert!(!gb.cpu.get_flag(CpuFlag::Carry));
    assert_eq!(results.cycles, 8);
    assert_eq!(gb.cpu.get_instruction_pointer(), start + 1);
}

#[test]
fn daa_after_add_produces_the_packed_bcd_result() {
    // LD A,0x09; ADD A,0x01; DAA
    let mut gb = flat_machine_at(&[0x3e, 0x09, 0xc6, 0x01, 0x27]);

    gb.run_single_step();
    gb.run_single_step();
    assert_eq!(gb.cpu.get_r8(RegisterR8::A), 0x0a);

    gb.run_single_step();
    assert_eq!(gb.cpu.get_r8(RegisterR8::A), 0x10);
    assert!(!gb.cpu.get_flag(CpuFlag::Zero));
    assert!(!gb.cpu.get_flag(CpuFlag::HalfCarry));
    assert!(!gb.cpu.get_flag(CpuFlag::Carry));
}

#[test]
fn oam_dma_blocks_non_hram_reads_and_discards_writes() {
    let mut gb = GameBoy::new(dmg_config()).unwrap();

    gb.get_mmu_mut().write_u8(MEMORY_LOCATION_DMA, 0xc0);
    assert_eq!(gb.get_mmu().read_u8(MEMORY_LOCATION_OAM_BEGIN), 0xff);

    gb.get_mmu_mut().write_u8(MEMORY_LOCATION_HRAM_BEGIN, 0x42);
    assert_eq!(gb.get_mmu().read_u8(MEMORY_LOCATION_HRAM_BEGIN), 0x42);
}
