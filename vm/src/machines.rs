//! A set of small test machines.

use fib_rt::{SYS_EXIT, SYS_LOG, SYS_TRAP};

use crate::asm::*;
use crate::error::*;
use crate::vm::VM;

/// Address at which machine code is placed, as in the guest linker script.
pub const CODE_BASE: u32 = 0x1000;

/// Address of the message printed by the `hello` machine.
pub const DATA_BASE: u32 = 0x2000;

const HELLO: &[u8] = b"hello, world\n";

/// Largest `n` accepted by `nop<n>`.
pub const MAX_NOPS: u32 = 1 << 20;

/// Names of the built-in machines; `<n>` is a decimal argument.
pub const MACHINES: &[&str] = &["nop<n>", "loop<n>", "fib<n>", "hello"];

/// Lookup and initialize a test VM by name
pub fn lookup_test_machine(name: &str, stack_top: u32) -> Result<VM> {
    let code = lookup_test_code(name).ok_or_else(|| VMError::UnknownMachine(name.to_string()))?;
    let mut vm = assemble(&code, stack_top);
    if name == "hello" {
        vm.init_memory(DATA_BASE, HELLO);
    }
    Ok(vm)
}

/// Lookup a test code sequence by name
pub fn lookup_test_code(name: &str) -> Option<Vec<u32>> {
    fn arg(name: &str, prefix: &str) -> Option<u32> {
        name.strip_prefix(prefix)?.parse().ok()
    }

    if name == "hello" {
        Some(hello_code())
    } else if let Some(k) = arg(name, "nop") {
        // the code must fit between CODE_BASE and the top of memory
        (k <= MAX_NOPS).then(|| nop_code(k))
    } else if let Some(k) = arg(name, "loop") {
        Some(loop_code(k))
    } else {
        arg(name, "fib").map(fib_code)
    }
}

fn assemble(words: &[u32], stack_top: u32) -> VM {
    let mut vm = VM::new(CODE_BASE, stack_top);
    for (i, w) in words.iter().enumerate() {
        vm.mem.sw(CODE_BASE + i as u32 * 4, *w);
    }
    vm
}

// exit with the value currently in a0
fn exit_a0() -> [u32; 2] {
    [addi(A7, ZERO, SYS_EXIT as i32), ECALL_WORD]
}

/// k no-op instructions, then exit with 0
pub fn nop_code(k: u32) -> Vec<u32> {
    let mut v = vec![NOP_WORD; k as usize];
    v.extend(exit_a0());
    v
}

/// count to k in a loop, then exit with k
pub fn loop_code(k: u32) -> Vec<u32> {
    let mut v = li(T1, k).to_vec();
    v.extend([
        mv(T0, ZERO),
        beq(T0, T1, 12), // done
        addi(T0, T0, 1),
        jal(ZERO, -8),
        mv(A0, T0),
    ]);
    v.extend(exit_a0());
    v
}

/// print a greeting through the log call, then exit with 0
pub fn hello_code() -> Vec<u32> {
    let mut v = li(A0, DATA_BASE).to_vec();
    v.extend([
        addi(A1, ZERO, HELLO.len() as i32),
        addi(A7, ZERO, SYS_LOG as i32),
        ECALL_WORD,
        mv(A0, ZERO),
    ]);
    v.extend(exit_a0());
    v
}

/// Compute fib(n) by naive recursion, trap with the result, then exit with it.
///
/// The routine follows the standard calling convention: argument and result
/// in a0, return address in ra, callee-saved s0/s1 spilled to the stack.
pub fn fib_code(n: u32) -> Vec<u32> {
    const FIB: i32 = 8; // entry of the fib routine
    const RET: i32 = 25; // its final `ret`
    let off = |from: i32, to: i32| (to - from) * 4;

    let [hi, lo] = li(A0, n);
    let [li_exit, ecall_exit] = exit_a0();

    #[rustfmt::skip]
    let code = vec![
        hi,                                 // 0: li a0, n
        lo,                                 // 1
        jal(RA, off(2, FIB)),               // 2: call fib
        addi(A7, ZERO, SYS_TRAP as i32),    // 3
        ECALL_WORD,                         // 4: trap(a0)
        li_exit,                            // 5
        ecall_exit,                         // 6: exit(a0)
        UNIMP_WORD,                         // 7
        addi(T0, ZERO, 2),                  // 8: fib:
        bltu(A0, T0, off(9, RET)),          // 9: n < 2 => n
        addi(SP, SP, -12),                  // 10
        sw(RA, SP, 8),                      // 11
        sw(S0, SP, 4),                      // 12
        sw(S1, SP, 0),                      // 13
        mv(S0, A0),                         // 14
        addi(A0, S0, -1),                   // 15
        jal(RA, off(16, FIB)),              // 16: fib(n - 1)
        mv(S1, A0),                         // 17
        addi(A0, S0, -2),                   // 18
        jal(RA, off(19, FIB)),              // 19: fib(n - 2)
        add(A0, A0, S1),                    // 20
        lw(S1, SP, 0),                      // 21
        lw(S0, SP, 4),                      // 22
        lw(RA, SP, 8),                      // 23
        addi(SP, SP, 12),                   // 24
        jalr(ZERO, RA, 0),                  // 25: ret
    ];
    debug_assert_eq!(code.len(), RET as usize + 1);
    code
}
