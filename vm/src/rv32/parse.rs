//! A basic parser for RISC-V, RV32I

use super::*;
use crate::error::*;
use VMError::*;

fn bits(val: u32, start: u32, end: u32) -> u32 {
    debug_assert!(start <= end);
    debug_assert!(end < 32);

    (val << (31 - end)) >> (31 - end + start)
}

#[rustfmt::skip]
macro_rules! field {
    ($f:ident, $start:literal, $end:literal) => {
        #[doc=concat!("extract ", stringify!($f),
                      " field from instruction word, bits ",
                      $start, "-", $end)]
        pub fn $f(word: u32) -> u32 {
            bits(word, $start, $end)
        }
    };
}

// instruction encodings pg. 16 (and 18 for shamt)

field!(opcode, 0, 6);
field!(funct3, 12, 14);
field!(funct7, 25, 31);
field!(shamt, 20, 24);
field!(rd, 7, 11);
field!(rs1, 15, 19);
field!(rs2, 20, 24);

// encoding of immediate values pg. 16

fn signed(word: u32) -> bool {
    (word & 0x80000000) != 0
}

/// extract immediate from instruction of type I
pub fn immI(word: u32) -> u32 {
    let mut imm = if signed(word) { 0xfffff800 } else { 0 };
    imm |= bits(word, 20, 30);
    imm
}

/// extract immediate from instruction of type S
pub fn immS(word: u32) -> u32 {
    let mut imm = if signed(word) { 0xfffff800 } else { 0 };
    imm |= bits(word, 25, 30) << 5;
    imm |= bits(word, 7, 11);
    imm
}

/// extract immediate from instruction of type B
pub fn immB(word: u32) -> u32 {
    let mut imm = if signed(word) { 0xfffff000 } else { 0 };
    imm |= bits(word, 7, 7) << 11;
    imm |= bits(word, 25, 30) << 5;
    imm |= bits(word, 8, 11) << 1;
    imm
}

/// extract immediate from instruction of type U
pub fn immU(word: u32) -> u32 {
    word & 0xfffff000
}

/// extract immediate from instruction of type J
pub fn immJ(word: u32) -> u32 {
    let mut imm = if signed(word) { 0xfff00000 } else { 0 };
    imm |= bits(word, 12, 19) << 12;
    imm |= bits(word, 20, 20) << 11;
    imm |= bits(word, 21, 30) << 1;
    imm
}

// parsing of branch operation type pg. 22

fn bop(word: u32) -> Option<BOP> {
    let res = match funct3(word) {
        0b000 => BEQ,
        0b001 => BNE,
        0b100 => BLT,
        0b101 => BGE,
        0b110 => BLTU,
        0b111 => BGEU,
        _ => return None,
    };
    Some(res)
}

// parsing of load and store widths pg. 24-25

fn lop(word: u32) -> Option<LOP> {
    let res = match funct3(word) {
        0b000 => LB,
        0b001 => LH,
        0b010 => LW,
        0b100 => LBU,
        0b101 => LHU,
        _ => return None,
    };
    Some(res)
}

fn sop(word: u32) -> Option<SOP> {
    let res = match funct3(word) {
        0b000 => SB,
        0b001 => SH,
        0b010 => SW,
        _ => return None,
    };
    Some(res)
}

// parsing of arithmetic operations pg. 18-20
//
// funct7 only distinguishes ADD/SUB and SRL/SRA; any other value belongs to
// an extension (e.g. RV32M) and is rejected. For the immediate forms bits
// 25-31 are part of the immediate, except for the shifts.

const F7_BASE: u32 = 0b0000000;
const F7_ALT: u32 = 0b0100000;

fn aop_reg(word: u32) -> Option<AOP> {
    let res = match (funct3(word), funct7(word)) {
        (0b000, F7_BASE) => ADD,
        (0b000, F7_ALT) => SUB,
        (0b001, F7_BASE) => SLL,
        (0b010, F7_BASE) => SLT,
        (0b011, F7_BASE) => SLTU,
        (0b100, F7_BASE) => XOR,
        (0b101, F7_BASE) => SRL,
        (0b101, F7_ALT) => SRA,
        (0b110, F7_BASE) => OR,
        (0b111, F7_BASE) => AND,
        _ => return None,
    };
    Some(res)
}

fn aop_imm(word: u32) -> Option<AOP> {
    let res = match (funct3(word), funct7(word)) {
        (0b000, _) => ADD,
        (0b001, F7_BASE) => SLL,
        (0b010, _) => SLT,
        (0b011, _) => SLTU,
        (0b100, _) => XOR,
        (0b101, F7_BASE) => SRL,
        (0b101, F7_ALT) => SRA,
        (0b110, _) => OR,
        (0b111, _) => AND,
        _ => return None,
    };
    Some(res)
}

/// extract immediate from ALU instruction
pub fn immA(word: u32) -> u32 {
    match funct3(word) {
        0b001 | 0b101 => shamt(word),
        _ => immI(word),
    }
}

// instruction parsing by opcode

#[allow(clippy::unusual_byte_groupings)]
#[rustfmt::skip]
mod opcodes {
    pub const OPC_LUI   : u32 = 0b_011_0111;
    pub const OPC_AUIPC : u32 = 0b_001_0111;
    pub const OPC_JAL   : u32 = 0b_110_1111;
    pub const OPC_JALR  : u32 = 0b_110_0111;
    pub const OPC_BR    : u32 = 0b_110_0011;
    pub const OPC_LOAD  : u32 = 0b_000_0011;
    pub const OPC_STORE : u32 = 0b_010_0011;
    pub const OPC_ALUI  : u32 = 0b_001_0011;
    pub const OPC_ALU   : u32 = 0b_011_0011;
    pub const OPC_FENCE : u32 = 0b_000_1111;
    pub const OPC_ECALL : u32 = 0b_111_0011; // also captures EBREAK and UNIMP
}
pub use opcodes::*;

/// the system call result is returned in a0
const ECALL_RD: u32 = 10;

// parse a 32-bit word as an instruction
pub(crate) fn parse_u32(word: u32) -> Option<RV32> {
    let inst = match opcode(word) {
        OPC_LUI => LUI { rd: rd(word), imm: immU(word) },
        OPC_AUIPC => AUIPC { rd: rd(word), imm: immU(word) },
        OPC_JAL => JAL { rd: rd(word), imm: immJ(word) },
        OPC_JALR if funct3(word) == 0 => JALR {
            rd: rd(word),
            rs1: rs1(word),
            imm: immI(word),
        },
        OPC_BR => BR {
            bop: bop(word)?,
            rs1: rs1(word),
            rs2: rs2(word),
            imm: immB(word),
        },

        OPC_LOAD => LOAD {
            lop: lop(word)?,
            rd: rd(word),
            rs1: rs1(word),
            imm: immI(word),
        },
        OPC_STORE => STORE {
            sop: sop(word)?,
            rs1: rs1(word),
            rs2: rs2(word),
            imm: immS(word),
        },

        OPC_ALUI => ALUI {
            aop: aop_imm(word)?,
            rd: rd(word),
            rs1: rs1(word),
            imm: immA(word),
        },
        OPC_ALU => ALU {
            aop: aop_reg(word)?,
            rd: rd(word),
            rs1: rs1(word),
            rs2: rs2(word),
        },

        OPC_FENCE => FENCE,

        OPC_ECALL => match word {
            0x00000073 => ECALL { rd: ECALL_RD },
            0x00100073 => EBREAK,
            0xc0001073 => UNIMP, // csrrw x0, cycle, x0
            _ => return None,
        },

        _ => return None,
    };
    Some(inst)
}

// compute instruction size from first two bytes (pg. 8)

fn inst_size(b0: u8, b1: u8) -> u32 {
    fn ax(b: u8, n: u8) -> bool {
        ((b & n) ^ n) != 0
    }

    if ax(b0, 0b00000011) {
        2
    } else if ax(b0, 0b00011111) {
        4
    } else if ax(b0, 0b00111111) {
        6
    } else if ax(b0, 0b01111111) {
        8
    } else if ax(b1, 0b01110000) {
        (10 + 2 * ((b1 >> 4) & 0b111)) as u32
    } else {
        0
    }
}

/// parse a single instruction from a byte array
pub fn parse_inst(pc: u32, mem: &[u8]) -> Result<Inst> {
    if mem.len() < 2 {
        return Err(PartialInstruction(pc));
    }

    let sz = inst_size(mem[0], mem[1]);
    if sz != 4 {
        return Err(InvalidSize(pc, sz));
    }

    if mem.len() < (sz as usize) {
        return Err(PartialInstruction(pc));
    }

    let word = u32::from_le_bytes([mem[0], mem[1], mem[2], mem[3]]);

    match parse_u32(word) {
        None => Err(InvalidInstruction(pc, word)),
        Some(inst) => Ok(Inst { pc, len: sz, word, inst }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bits() {
        assert_eq!(bits(0b10011101, 0, 0), 0b1);
        assert_eq!(bits(0b10011101, 0, 2), 0b101);
        assert_eq!(bits(0b10011101, 1, 4), 0b1110);
        assert_eq!(bits(0b10011101, 4, 4), 0b1);

        assert_eq!(bits(0xcc000000, 0, 31), 0xcc000000);
        assert_eq!(bits(0xcc000000, 31, 31), 0x1);
        assert_eq!(bits(0xcc000000, 24, 31), 0xcc);
        assert_eq!(bits(0xcc000000, 26, 30), 0x13);

        assert_eq!(bits(0x80001837, 7, 11), 16);
    }

    #[test]
    fn test_immediates() {
        // bne x1, x2, -4
        assert_eq!(immB(0xfe209ee3), 0xfffffffc);
        assert_eq!(immB(0xfe209ee3 ^ 0x80000000), 0xffc);

        assert_eq!(immS(0xfe000f80), 0xffffffff);
        assert_eq!(immS(0x7e000f80), 0x7ff);

        assert_eq!(immI(0x01f00013), 31);
        assert_eq!(immI(0xfff00013), 0xffffffff);

        // jal x0, -8
        assert_eq!(immJ(0xff9ff06f), 0xfffffff8);
    }

    #[test]
    fn test_words() {
        assert_eq!(parse_u32(0x00100093), Some(ALUI { aop: ADD, rd: 1, rs1: 0, imm: 1 }));
        assert_eq!(parse_u32(0x001101b3), Some(ALU { aop: ADD, rd: 3, rs1: 2, rs2: 1 }));
        assert_eq!(parse_u32(0x40208033), Some(ALU { aop: SUB, rd: 0, rs1: 1, rs2: 2 }));
        assert_eq!(parse_u32(0x4020d093), Some(ALUI { aop: SRA, rd: 1, rs1: 1, imm: 2 }));
        assert_eq!(parse_u32(0x00008067), Some(JALR { rd: 0, rs1: 1, imm: 0 }));
        assert_eq!(
            parse_u32(0xfe209ee3),
            Some(BR { bop: BNE, rs1: 1, rs2: 2, imm: 0xfffffffc })
        );
        assert_eq!(
            parse_u32(0x00812223),
            Some(STORE { sop: SW, rs1: 2, rs2: 8, imm: 4 })
        );
        assert_eq!(
            parse_u32(0x00412403),
            Some(LOAD { lop: LW, rd: 8, rs1: 2, imm: 4 })
        );
        assert_eq!(parse_u32(0x00001537), Some(LUI { rd: 10, imm: 0x1000 }));
    }

    #[test]
    fn test_extension_words() {
        // mul a0, a0, a1 (RV32M)
        assert_eq!(parse_u32(0x02b50533), None);
        // divu a0, a0, a1
        assert_eq!(parse_u32(0x02b55533), None);
        // slli a0, a0, 32 is only valid on RV64
        assert_eq!(parse_u32(0x02051513), None);
        // sra with a stray funct7 bit
        assert_eq!(parse_u32(0x60b55533), None);

        assert_eq!(parse_u32(0x40355513), Some(ALUI { aop: SRA, rd: 10, rs1: 10, imm: 3 }));
        // bit 30 is just part of the immediate for addi
        assert_eq!(parse_u32(0x40050513), Some(ALUI { aop: ADD, rd: 10, rs1: 10, imm: 0x400 }));
        // jalr needs funct3 = 0
        assert_eq!(parse_u32(0x00009067), None);

        assert!(matches!(
            parse_inst(0x1000, &0x02b50533u32.to_le_bytes()),
            Err(InvalidInstruction(0x1000, 0x02b50533))
        ));
    }

    #[test]
    fn test_system() {
        assert_eq!(parse_u32(0x00000073), Some(ECALL { rd: 10 }));
        assert_eq!(parse_u32(0x00100073), Some(EBREAK));
        assert_eq!(parse_u32(0xc0001073), Some(UNIMP));
        // csr instructions are not part of RV32I
        assert_eq!(parse_u32(0x30002573), None);
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse_u32(0), None);
        assert_eq!(parse_u32(0x0000000f), Some(FENCE));
    }

    #[test]
    fn test_parse_inst() {
        let inst = parse_inst(0x1000, &[0x73, 0, 0, 0]).unwrap();
        assert_eq!(inst.inst, ECALL { rd: 10 });
        assert_eq!(inst.len, 4);

        // compressed encoding
        assert!(matches!(parse_inst(0x1000, &[0x01, 0x00]), Err(InvalidSize(0x1000, 2))));
        assert!(matches!(parse_inst(0x1000, &[0x13]), Err(PartialInstruction(0x1000))));
        assert!(matches!(parse_inst(0x1000, &[0x13, 0x00]), Err(PartialInstruction(0x1000))));
        assert!(matches!(
            parse_inst(0x1000, &[0, 0, 0, 0]),
            Err(InvalidSize(0x1000, 2))
        ));
        assert!(matches!(
            parse_inst(0x1004, &[0x3f, 0, 0, 0]),
            Err(InvalidSize(0x1004, 8))
        ));
    }
}
