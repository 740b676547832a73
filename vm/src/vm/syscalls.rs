//! Implementation of system calls

use std::io::Write;

use fib_rt::{SYS_EXIT, SYS_LOG, SYS_TRAP};
use tracing::info;

use super::mem::Mem;
use crate::error::{
    Result,
    VMError::{LogTooLong, UnknownECall},
};

/// Largest number of bytes a single log call may write.
pub const MAX_LOG_LEN: u32 = 1 << 16;

/// Holds information related to syscall implementation.
#[derive(Default)]
pub struct Syscalls {
    to_stdout: bool,
    log_buffer: Vec<u8>,
    traps: Vec<u32>,
    exit_code: Option<u32>,
}

pub enum SyscallCode {
    WriteLog,
    Exit,
    Trap,
}

impl SyscallCode {
    fn try_from(pc: u32, syscode: u32) -> Result<Self> {
        match syscode {
            SYS_LOG => Ok(SyscallCode::WriteLog),
            SYS_EXIT => Ok(SyscallCode::Exit),
            SYS_TRAP => Ok(SyscallCode::Trap),
            _ => Err(UnknownECall(pc, syscode)),
        }
    }
}

impl Syscalls {
    pub fn enable_stdout(&mut self) {
        self.to_stdout = true;
    }

    /// Log output captured while stdout is disabled.
    pub fn log_buffer(&self) -> &[u8] {
        &self.log_buffer
    }

    /// Values passed to the trap call, in order.
    pub fn traps(&self) -> &[u32] {
        &self.traps
    }

    /// Exit code, once the program has exited.
    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    /// Read `len` bytes from memory starting at `source` to log.
    /// If `to_stdout` is true, writes the log to standard output; otherwise, stores it in `log_buffer`.
    fn writelog(&mut self, pc: u32, source: u32, len: u32, memory: &Mem) -> Result<u32> {
        if len > MAX_LOG_LEN {
            return Err(LogTooLong(pc, len));
        }
        let bytes = memory.load_n(source, len);

        if self.to_stdout {
            let mut stdout = std::io::stdout();
            stdout.write_all(&bytes)?;
            let _ = stdout.flush();
        } else {
            self.log_buffer.extend(bytes);
        }
        Ok(0)
    }

    fn trap(&mut self, pc: u32, value: u32) -> Result<u32> {
        info!(pc, value, "guest trap");
        self.traps.push(value);
        Ok(value)
    }

    fn exit(&mut self, code: u32) -> Result<u32> {
        self.exit_code = Some(code);
        Ok(code)
    }

    /// Handles the syscall based on the given program counter, registers, and memory.
    /// The returned value is written back to a0.
    pub fn syscall(&mut self, pc: u32, regs: &[u32; 32], memory: &Mem) -> Result<u32> {
        let code = SyscallCode::try_from(pc, regs[17])?; // a7 = x17  syscall number
        let a0 = regs[10]; // a0 = x10
        let a1 = regs[11]; // a1 = x11

        match code {
            SyscallCode::WriteLog => self.writelog(pc, a0, a1, memory),
            SyscallCode::Exit => self.exit(a0),
            SyscallCode::Trap => self.trap(pc, a0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn regs(a7: u32, a0: u32, a1: u32) -> [u32; 32] {
        let mut x = [0; 32];
        x[17] = a7;
        x[10] = a0;
        x[11] = a1;
        x
    }

    #[test]
    fn trap_and_exit() {
        let mem = Mem::default();
        let mut sys = Syscalls::default();

        assert_eq!(sys.syscall(0x1000, &regs(SYS_TRAP, 55, 0), &mem).unwrap(), 55);
        assert_eq!(sys.traps(), &[55]);
        assert_eq!(sys.exit_code(), None);

        assert_eq!(sys.syscall(0x1004, &regs(SYS_EXIT, 55, 0), &mem).unwrap(), 55);
        assert_eq!(sys.exit_code(), Some(55));
    }

    #[test]
    fn log_is_buffered() {
        let mut mem = Mem::default();
        mem.store_n(0x2000, b"fib(10) = 55\n");
        let mut sys = Syscalls::default();

        sys.syscall(0x1000, &regs(SYS_LOG, 0x2000, 7), &mem).unwrap();
        sys.syscall(0x1000, &regs(SYS_LOG, 0x2007, 6), &mem).unwrap();
        assert_eq!(sys.log_buffer(), b"fib(10) = 55\n");
    }

    #[test]
    fn log_length_is_bounded() {
        let mem = Mem::default();
        let mut sys = Syscalls::default();

        let err = sys
            .syscall(0x100c, &regs(SYS_LOG, 0x2000, u32::MAX), &mem)
            .unwrap_err();
        assert!(matches!(err, LogTooLong(0x100c, u32::MAX)));
        assert!(sys.log_buffer().is_empty());

        sys.syscall(0x1010, &regs(SYS_LOG, 0x2000, MAX_LOG_LEN), &mem)
            .unwrap();
        assert_eq!(sys.log_buffer().len(), MAX_LOG_LEN as usize);
    }

    #[test]
    fn unknown_code() {
        let mem = Mem::default();
        let mut sys = Syscalls::default();
        let err = sys.syscall(0x1008, &regs(93, 0, 0), &mem).unwrap_err();
        assert!(matches!(err, UnknownECall(0x1008, 93)));
    }
}
