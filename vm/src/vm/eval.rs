use super::{mem::Mem, syscalls::Syscalls};
use crate::asm::SP;
use crate::error::*;
use crate::rv32::{parse::*, *};
use VMError::*;

/// virtual machine state
#[derive(Default)]
pub struct VM {
    /// ISA registers
    pub regs: Regs,
    /// Syscall implementation
    pub syscalls: Syscalls,
    /// machine memory
    pub mem: Mem,
    /// current instruction
    pub inst: Inst,
    /// destination register
    pub rd: u32,
    /// internal result register
    pub Z: u32,
    /// internal program counter
    pub PC: u32,
}

/// ISA defined registers
#[derive(Debug, PartialEq, Default)]
pub struct Regs {
    /// ISA defined program counter register
    pub pc: u32,
    /// ISA defined registers x0-x31
    pub x: [u32; 32],
}

impl VM {
    /// create a VM starting at `pc` with the stack pointer at `stack_top`
    pub fn new(pc: u32, stack_top: u32) -> Self {
        let mut vm = Self::default();
        vm.regs.pc = pc;
        vm.set_reg(SP, stack_top);
        vm
    }

    /// get value of register r
    pub fn get_reg(&self, r: u32) -> u32 {
        if r == 0 {
            0
        } else {
            self.regs.x[r as usize]
        }
    }

    /// set value of register r
    pub fn set_reg(&mut self, r: u32, val: u32) {
        if r != 0 {
            self.regs.x[r as usize] = val;
        }
    }

    /// initialize memory from slice
    pub fn init_memory(&mut self, addr: u32, bytes: &[u8]) {
        self.mem.store_n(addr, bytes);
    }
}

fn add32(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

fn sub32(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b)
}

fn br_op(bop: BOP, x: u32, y: u32) -> bool {
    match bop {
        BEQ => x == y,
        BNE => x != y,
        BLT => (x as i32) < (y as i32),
        BGE => (x as i32) >= (y as i32),
        BLTU => x < y,
        BGEU => x >= y,
    }
}

fn alu_op(aop: AOP, x: u32, y: u32) -> u32 {
    let shamt = y & 0x1f;
    match aop {
        ADD => add32(x, y),
        SUB => sub32(x, y),
        SLT => ((x as i32) < (y as i32)) as u32,
        SLTU => (x < y) as u32,
        SLL => x << shamt,
        SRL => x >> shamt,
        SRA => ((x as i32) >> shamt) as u32,
        AND => x & y,
        OR => x | y,
        XOR => x ^ y,
    }
}

fn check_align(pc: u32, addr: u32, size: u32) -> Result<u32> {
    if addr % size != 0 {
        return Err(MisalignedAccess(pc, addr));
    }
    Ok(addr)
}

/// finalize previous instruction and update machine state.
pub fn eval_writeback(vm: &mut VM) {
    vm.set_reg(vm.rd, vm.Z);
    vm.regs.pc = vm.PC;
}

/// evaluate next instruction
pub fn eval_inst(vm: &mut VM) -> Result<()> {
    let pc = vm.regs.pc;
    vm.inst = parse_inst(pc, vm.mem.rd_page(pc))?;

    // initialize micro-architecture state
    vm.rd = 0;
    vm.Z = 0;
    vm.PC = add32(pc, vm.inst.len);

    match vm.inst.inst {
        LUI { rd, imm } => {
            vm.rd = rd;
            vm.Z = imm;
        }
        AUIPC { rd, imm } => {
            vm.rd = rd;
            vm.Z = add32(pc, imm);
        }
        JAL { rd, imm } => {
            vm.rd = rd;
            vm.Z = add32(pc, 4);
            vm.PC = check_align(pc, add32(pc, imm), 4)?;
        }
        JALR { rd, rs1, imm } => {
            let X = vm.get_reg(rs1);
            vm.rd = rd;
            vm.Z = add32(pc, 4);
            vm.PC = check_align(pc, add32(X, imm) & !1, 4)?;
        }
        BR { bop, rs1, rs2, imm } => {
            let X = vm.get_reg(rs1);
            let Y = vm.get_reg(rs2);

            if br_op(bop, X, Y) {
                vm.PC = check_align(pc, add32(pc, imm), 4)?;
            }
        }
        LOAD { lop, rd, rs1, imm } => {
            let X = vm.get_reg(rs1);
            vm.rd = rd;

            let addr = add32(X, imm);
            vm.Z = match lop {
                LB => vm.mem.lb(addr),
                LBU => vm.mem.lbu(addr),
                LH => vm.mem.lh(check_align(pc, addr, 2)?),
                LHU => vm.mem.lhu(check_align(pc, addr, 2)?),
                LW => vm.mem.lw(check_align(pc, addr, 4)?),
            }
        }
        STORE { sop, rs1, rs2, imm } => {
            let X = vm.get_reg(rs1);
            let Y = vm.get_reg(rs2);

            let addr = add32(X, imm);
            match sop {
                SB => vm.mem.sb(addr, Y),
                SH => vm.mem.sh(check_align(pc, addr, 2)?, Y),
                SW => vm.mem.sw(check_align(pc, addr, 4)?, Y),
            }
        }
        ALUI { aop, rd, rs1, imm } => {
            let X = vm.get_reg(rs1);
            vm.rd = rd;
            vm.Z = alu_op(aop, X, imm);
        }
        ALU { aop, rd, rs1, rs2 } => {
            let X = vm.get_reg(rs1);
            let Y = vm.get_reg(rs2);
            vm.rd = rd;
            vm.Z = alu_op(aop, X, Y);
        }
        FENCE | EBREAK => {}
        ECALL { rd } => {
            vm.rd = rd;
            vm.Z = vm.syscalls.syscall(pc, &vm.regs.x, &vm.mem)?;
        }
        UNIMP => return Err(UnexpectedUnimp(pc)),
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asm::*;

    fn vm_with(code: &[u32]) -> VM {
        let mut vm = VM::new(0x1000, 0x8000);
        for (i, w) in code.iter().enumerate() {
            vm.mem.sw(0x1000 + 4 * i as u32, *w);
        }
        vm
    }

    fn step(vm: &mut VM) {
        eval_inst(vm).unwrap();
        eval_writeback(vm);
    }

    #[test]
    fn x0_is_hardwired() {
        let mut vm = vm_with(&[addi(ZERO, ZERO, 5)]);
        step(&mut vm);
        assert_eq!(vm.get_reg(ZERO), 0);
        assert_eq!(vm.regs.pc, 0x1004);
    }

    #[test]
    fn stack_pointer_initialized() {
        let vm = VM::new(0x1000, 0x8040_0000);
        assert_eq!(vm.get_reg(SP), 0x8040_0000);
        assert_eq!(vm.regs.pc, 0x1000);
    }

    #[test]
    fn arithmetic() {
        let mut vm = vm_with(&[
            addi(A0, ZERO, -3),
            addi(A1, ZERO, 5),
            add(T0, A0, A1),
            sub(T1, A0, A1),
        ]);
        for _ in 0..4 {
            step(&mut vm);
        }
        assert_eq!(vm.get_reg(A0), (-3i32) as u32);
        assert_eq!(vm.get_reg(T0), 2);
        assert_eq!(vm.get_reg(T1), (-8i32) as u32);
    }

    #[test]
    fn load_store() {
        let mut vm = vm_with(&[addi(T0, ZERO, 0x7ff), sw(T0, SP, -4), lw(A0, SP, -4)]);
        for _ in 0..3 {
            step(&mut vm);
        }
        assert_eq!(vm.mem.lw(0x8000 - 4), 0x7ff);
        assert_eq!(vm.get_reg(A0), 0x7ff);
    }

    #[test]
    fn call_and_return() {
        // 0x1000: jal ra, +8 ; 0x1004: unimp ; 0x1008: jalr x0, 0(ra)
        let mut vm = vm_with(&[jal(RA, 8), UNIMP_WORD, jalr(ZERO, RA, 0)]);
        step(&mut vm);
        assert_eq!(vm.regs.pc, 0x1008);
        assert_eq!(vm.get_reg(RA), 0x1004);
        step(&mut vm);
        assert_eq!(vm.regs.pc, 0x1004);
        assert!(matches!(eval_inst(&mut vm), Err(UnexpectedUnimp(0x1004))));
    }

    #[test]
    fn branches() {
        let mut vm = vm_with(&[
            addi(T0, ZERO, 2),
            bltu(ZERO, T0, 8),
            UNIMP_WORD,
            beq(ZERO, T0, 8),
        ]);
        step(&mut vm);
        step(&mut vm);
        assert_eq!(vm.regs.pc, 0x100c);
        step(&mut vm);
        assert_eq!(vm.regs.pc, 0x1010);
    }

    #[test]
    fn misaligned() {
        let mut vm = vm_with(&[lw(A0, ZERO, 0x102)]);
        assert!(matches!(eval_inst(&mut vm), Err(MisalignedAccess(0x1000, 0x102))));

        let mut vm = vm_with(&[jal(ZERO, 6)]);
        assert!(matches!(eval_inst(&mut vm), Err(MisalignedAccess(0x1000, 0x1006))));
    }

    #[test]
    fn ecall_result_in_a0() {
        let mut vm = vm_with(&[
            addi(A0, ZERO, 55),
            addi(A7, ZERO, fib_rt::SYS_TRAP as i32),
            ECALL_WORD,
        ]);
        for _ in 0..3 {
            step(&mut vm);
        }
        assert_eq!(vm.get_reg(A0), 55);
        assert_eq!(vm.syscalls.traps(), &[55]);
    }
}
