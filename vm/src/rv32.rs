//! Abstract syntax of RV32I (based on RISC-V ISA V20191213)

mod display;
pub mod parse;

/// branch instruction type
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BOP {
    BEQ,
    BNE,
    BLT,
    BGE,
    BLTU,
    BGEU,
}
pub use BOP::*;

/// load instruction type
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LOP {
    LB,
    LH,
    LW,
    LBU,
    LHU,
}
pub use LOP::*;

/// store instruction type
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SOP {
    SB,
    SH,
    SW,
}
pub use SOP::*;

/// ALU instruction type
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AOP {
    ADD,
    SUB,
    SLT,
    SLTU,
    SLL,
    SRL,
    SRA,
    OR,
    AND,
    XOR,
}
pub use AOP::*;

/// RV32 instructions
#[rustfmt::skip]
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub enum RV32 {
    LUI   { rd: u32, imm: u32, },
    AUIPC { rd: u32, imm: u32, },

    JAL  { rd: u32, imm: u32, },
    JALR { rd: u32, rs1: u32, imm: u32, },

    BR { bop: BOP, rs1: u32, rs2: u32, imm: u32, },

    LOAD  { lop: LOP, rd: u32, rs1: u32, imm: u32, },
    STORE { sop: SOP, rs1: u32, rs2: u32, imm: u32, },

    ALUI { aop: AOP, rd: u32, rs1: u32, imm: u32, },
    ALU  { aop: AOP, rd: u32, rs1: u32, rs2: u32, },

    FENCE,
    ECALL { rd: u32 },  // result of the system call lands in rd (a0)
    EBREAK,

    #[default]
    UNIMP,
}
pub use RV32::*;

/// a parsed RV32 instruction
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Inst {
    /// program counter where instruction was found
    pub pc: u32,

    /// length of instruction in bytes
    pub len: u32,

    /// instruction as a 32-bit word
    pub word: u32,

    /// parsed instruction
    pub inst: RV32,
}
