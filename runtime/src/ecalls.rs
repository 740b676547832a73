pub use core::fmt::Write;

#[cfg(target_arch = "riscv32")]
mod riscv32 {
    use crate::{ecall, SYS_EXIT, SYS_LOG, SYS_TRAP};

    /// Raise the environment trap with `value` in a0.
    ///
    /// Returns whatever the environment leaves in a0.
    pub fn trap(value: u32) -> u32 {
        ecall!(SYS_TRAP, value)
    }

    /// Write a string to the VM log (if any).
    pub fn write_log(s: &str) {
        let _ = ecall!(SYS_LOG, s.as_ptr(), ("a1", s.len()));
    }

    /// Terminate the program with exit code `code`.
    pub fn exit(code: u32) -> ! {
        let _ = ecall!(SYS_EXIT, code);
        // Ecall will trigger exit syscall, so we will never return.
        unsafe {
            core::hint::unreachable_unchecked();
        }
    }
}

#[cfg(target_arch = "riscv32")]
pub use riscv32::*;

#[cfg(not(target_arch = "riscv32"))]
mod native {
    use std::io::Write;

    /// There is no trap handler on the host: the trap is reported as a
    /// trace event and `value` is handed back unchanged.
    pub fn trap(value: u32) -> u32 {
        tracing::trace!(value, "guest trap");
        value
    }

    /// Write a string to stdout.
    pub fn write_log(s: &str) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(s.as_bytes());
        let _ = stdout.flush();
    }

    /// Terminate the process with exit code `code`.
    pub fn exit(code: u32) -> ! {
        std::process::exit(code as i32)
    }
}

#[cfg(not(target_arch = "riscv32"))]
pub use native::*;

/// An empty type representing the VM log
pub struct Log;

impl Write for Log {
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        write_log(s);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn native_trap_is_identity() {
        assert_eq!(trap(0), 0);
        assert_eq!(trap(55), 55);
        assert_eq!(trap(u32::MAX), u32::MAX);
    }

    #[test]
    fn log_macros() {
        crate::print!("fib({}) = ", 10);
        crate::println!("{}", 55);
        assert!(write!(&mut Log, "{:08x}", 0x37).is_ok());
    }
}
