use super::*;
use std::fmt::{Debug, Display, Formatter, Result};

fn lower<T: Debug>(f: &mut Formatter<'_>, x: T) -> Result {
    write!(f, "{}", format!("{:?}", x).to_lowercase())
}

macro_rules! display_lower {
    ($t:ty) => {
        impl Display for $t {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result {
                lower(f, self)
            }
        }
    };
}

display_lower!(BOP);
display_lower!(LOP);
display_lower!(SOP);
display_lower!(AOP);

impl Display for RV32 {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            LUI { rd, imm } => write!(f, "lui x{}, {:x}", rd, imm >> 12),
            AUIPC { rd, imm } => write!(f, "auipc x{}, {:x}", rd, imm >> 12),
            JAL { rd, imm } => write!(f, "jal x{}, {}", rd, *imm as i32),
            JALR { rd, rs1, imm } => write!(f, "jalr x{}, {}(x{})", rd, *imm as i32, rs1),
            BR { bop, rs1, rs2, imm } => {
                write!(f, "{} x{}, x{}, {}", bop, rs1, rs2, *imm as i32)
            }
            LOAD { lop, rd, rs1, imm } => write!(f, "{} x{}, {}(x{})", lop, rd, *imm as i32, rs1),
            STORE { sop, rs1, rs2, imm } => {
                write!(f, "{} x{}, {}(x{})", sop, rs2, *imm as i32, rs1)
            }
            ALUI { aop, rd, rs1, imm } => write!(f, "{}i x{}, x{}, {}", aop, rd, rs1, *imm as i32),
            ALU { aop, rd, rs1, rs2 } => write!(f, "{} x{}, x{}, x{}", aop, rd, rs1, rs2),
            ECALL { .. } => write!(f, "ecall"),
            _ => lower(f, self),
        }
    }
}

impl Display for Inst {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let w = match f.width() {
            Some(w) if w > 18 => w - 18,
            Some(_) => 0,
            None => 30,
        };
        write!(
            f,
            "{:07x} {:08x} {:w$}",
            self.pc,
            self.word,
            format!("{}", self.inst)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn disassemble() {
        let addi = ALUI { aop: ADD, rd: 10, rs1: 10, imm: 0xffffffff };
        assert_eq!(addi.to_string(), "addi x10, x10, -1");

        let sw = STORE { sop: SW, rs1: 2, rs2: 1, imm: 8 };
        assert_eq!(sw.to_string(), "sw x1, 8(x2)");

        let jal = JAL { rd: 1, imm: 0xffffffe0 };
        assert_eq!(jal.to_string(), "jal x1, -32");

        assert_eq!(ECALL { rd: 10 }.to_string(), "ecall");
        assert_eq!(UNIMP.to_string(), "unimp");
        assert_eq!(FENCE.to_string(), "fence");
    }

    #[test]
    fn inst_width() {
        let inst = Inst { pc: 0x1000, len: 4, word: 0x73, inst: ECALL { rd: 10 } };
        assert_eq!(format!("{inst:26}"), "0001000 00000073 ecall   ");
    }
}
