//! Guest runtime for programs executed by `fib-vm`.
//!
//! On `riscv32` targets this crate provides the program entry point, the
//! panic handler and the system calls understood by the VM. When compiled for
//! the host the same API is available, backed by the standard library, so
//! guest programs can be run and tested natively.

#![cfg_attr(target_arch = "riscv32", no_std)]

#[cfg(target_arch = "riscv32")]
mod runtime;

mod ecalls;
pub use ecalls::*;

// Ecall codes, placed in a7. Shared with the VM, which services them.
pub const SYS_LOG: u32 = 0x200;
pub const SYS_EXIT: u32 = 0x201;
pub const SYS_TRAP: u32 = 0x202;

// Exit codes.
pub const EXIT_SUCCESS: u32 = 0;
pub const EXIT_PANIC: u32 = 101;

/// Truncate a guest return value to the width of a process exit status.
pub const fn exit_status(value: u32) -> u8 {
    (value & 0xff) as u8
}

/// Macro for making an ecall with variable number of parameters:
/// - First parameter: syscall code (placed in a7)
/// - Second parameter: first input (placed in a0), also the output
/// - Remaining parameters: `(register, input)` pairs
#[macro_export]
macro_rules! ecall {
    ($code:expr, $input_0:expr, $(($reg:tt, $input:expr)),*) => {{
        let mut out: u32;
        unsafe {
            core::arch::asm!(
                "ecall",
                inout("a0") $input_0 => out,
                in("a7") $code,
                $(
                    in($reg) $input,
                )*
            )
        }
        out
    }};
    ($code:expr, $input_0:expr) => {{
        let mut out: u32;
        unsafe {
            core::arch::asm!(
                "ecall",
                inout("a0") $input_0 => out,
                in("a7") $code,
            )
        }
        out
    }};
}

/// Declare the guest entry function.
///
/// The function must have type `fn() -> u32`; its return value becomes the
/// exit code of the program.
#[macro_export]
macro_rules! entry {
    ($path:path) => {
        #[cfg(target_arch = "riscv32")]
        #[doc(hidden)]
        #[export_name = "main"]
        pub fn __fib_rt_main() -> u32 {
            let f: fn() -> u32 = $path;
            f()
        }

        #[cfg(not(target_arch = "riscv32"))]
        fn main() -> std::process::ExitCode {
            let f: fn() -> u32 = $path;
            std::process::ExitCode::from($crate::exit_status(f()))
        }
    };
}

/// Prints to the VM log
#[macro_export]
macro_rules! print {
    ($($as:tt)*) => {
        core::fmt::Write::write_fmt(&mut $crate::Log, core::format_args!($($as)*)).unwrap()
    }
}

/// Prints to the VM log, with a newline
#[macro_export]
macro_rules! println {
    () => {
        $crate::write_log("\n")
    };
    ($($as:tt)*) => {
        core::fmt::Write::write_fmt(&mut $crate::Log, core::format_args!("{}\n", core::format_args!($($as)*))).unwrap()
    }
}
