#![cfg_attr(target_arch = "riscv32", no_std, no_main)]

use fib_guest::fib;

const N: u32 = 10;

fn run() -> u32 {
    let ret = fib(N);
    fib_rt::trap(ret);
    ret
}

fib_rt::entry!(run);
