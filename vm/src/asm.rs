//! Encoders for the RV32I instructions used by the built-in machines.
//!
//! Arguments follow assembler operand order, e.g. `sw(rs2, rs1, imm)` for
//! `sw rs2, imm(rs1)`. Offsets are in bytes, relative to the instruction.

#![allow(clippy::identity_op)]

use crate::rv32::parse::*;

// ABI register names
pub const ZERO: u32 = 0;
pub const RA: u32 = 1;
pub const SP: u32 = 2;
pub const T0: u32 = 5;
pub const T1: u32 = 6;
pub const S0: u32 = 8;
pub const S1: u32 = 9;
pub const A0: u32 = 10;
pub const A1: u32 = 11;
pub const A7: u32 = 17;

pub const NOP_WORD: u32 = 0x00000013;
pub const ECALL_WORD: u32 = 0x00000073;
pub const UNIMP_WORD: u32 = 0xc0001073;

fn r_type(opc: u32, f3: u32, f7: u32, rd: u32, rs1: u32, rs2: u32) -> u32 {
    (f7 << 25) | (rs2 << 20) | (rs1 << 15) | (f3 << 12) | (rd << 7) | opc
}

fn i_type(opc: u32, f3: u32, rd: u32, rs1: u32, imm: i32) -> u32 {
    debug_assert!((-2048..2048).contains(&imm));
    let imm = imm as u32 & 0xfff;
    (imm << 20) | (rs1 << 15) | (f3 << 12) | (rd << 7) | opc
}

fn s_type(f3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    debug_assert!((-2048..2048).contains(&imm));
    let imm = imm as u32;
    (((imm >> 5) & 0x7f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (f3 << 12)
        | ((imm & 0x1f) << 7)
        | OPC_STORE
}

fn b_type(f3: u32, rs1: u32, rs2: u32, off: i32) -> u32 {
    debug_assert!(off % 2 == 0 && (-4096..4096).contains(&off));
    let imm = off as u32;
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (f3 << 12)
        | (((imm >> 1) & 0xf) << 8)
        | (((imm >> 11) & 1) << 7)
        | OPC_BR
}

/// `lui rd, imm >> 12`
pub fn lui(rd: u32, imm: u32) -> u32 {
    (imm & 0xfffff000) | (rd << 7) | OPC_LUI
}

/// `addi rd, rs1, imm`
pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OPC_ALUI, 0b000, rd, rs1, imm)
}

/// `mv rd, rs`
pub fn mv(rd: u32, rs: u32) -> u32 {
    addi(rd, rs, 0)
}

/// load a full 32-bit constant: `lui` followed by `addi`
pub fn li(rd: u32, val: u32) -> [u32; 2] {
    // addi sign-extends, so round the upper part up when bit 11 is set
    let hi = val.wrapping_add(0x800) & 0xfffff000;
    let lo = val.wrapping_sub(hi) as i32;
    [lui(rd, hi), addi(rd, rd, lo)]
}

/// `add rd, rs1, rs2`
pub fn add(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r_type(OPC_ALU, 0b000, 0b0000000, rd, rs1, rs2)
}

/// `sub rd, rs1, rs2`
pub fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r_type(OPC_ALU, 0b000, 0b0100000, rd, rs1, rs2)
}

/// `lw rd, imm(rs1)`
pub fn lw(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OPC_LOAD, 0b010, rd, rs1, imm)
}

/// `sw rs2, imm(rs1)`
pub fn sw(rs2: u32, rs1: u32, imm: i32) -> u32 {
    s_type(0b010, rs1, rs2, imm)
}

/// `beq rs1, rs2, off`
pub fn beq(rs1: u32, rs2: u32, off: i32) -> u32 {
    b_type(0b000, rs1, rs2, off)
}

/// `bne rs1, rs2, off`
pub fn bne(rs1: u32, rs2: u32, off: i32) -> u32 {
    b_type(0b001, rs1, rs2, off)
}

/// `bltu rs1, rs2, off`
pub fn bltu(rs1: u32, rs2: u32, off: i32) -> u32 {
    b_type(0b110, rs1, rs2, off)
}

/// `jal rd, off`
pub fn jal(rd: u32, off: i32) -> u32 {
    debug_assert!(off % 2 == 0 && (-(1 << 20)..(1 << 20)).contains(&off));
    let imm = off as u32;
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3ff) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xff) << 12)
        | (rd << 7)
        | OPC_JAL
}

/// `jalr rd, imm(rs1)`
pub fn jalr(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OPC_JALR, 0b000, rd, rs1, imm)
}
