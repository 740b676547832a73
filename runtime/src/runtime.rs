// fib-vm guest runtime environment
// Note: adapted from riscv-rt, which was adapted from cortex-m.
use crate::{exit, EXIT_PANIC};
use core::panic::PanicInfo;

// Program entry: establish gp and sp from linker-provided symbols, then
// hand over to `_start_rust`, which never returns.
core::arch::global_asm!(
    ".section .init, \"ax\"",
    ".global _start",
    "_start:",
    ".option push",
    ".option norelax",
    "la gp, __global_pointer$",
    ".option pop",
    "la sp, _stack_top",
    "call _start_rust",
    "unimp",
);

#[inline(never)]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    exit(EXIT_PANIC)
}

#[export_name = "error: fib-rt appears more than once"]
#[doc(hidden)]
pub static __ONCE__: () = ();

/// Rust entry point (_start_rust).
#[doc(hidden)]
#[link_section = ".init.rust"]
#[export_name = "_start_rust"]
pub unsafe extern "C" fn start_rust() -> ! {
    extern "Rust" {
        // This symbol will be provided by the guest via `fib_rt::entry!`
        fn main() -> u32;
    }

    // Run the program.
    let result = main();

    // Finish with exit syscall.
    exit(result)
}
