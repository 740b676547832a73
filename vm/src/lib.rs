//! A RISC-V (RV32I) virtual machine for `fib-rt` guest programs.
//!
//! The VM services the guest's system calls: the trap call is recorded and
//! the exit call halts the machine. Everything else is plain RV32I.

#![allow(non_snake_case)]

pub mod asm;
pub mod config;
mod error;
pub mod machines;
pub mod rv32;
pub mod vm;

pub use error::*;
use vm::*;

use clap::Args;
use elf::{
    abi::{EM_RISCV, PT_LOAD},
    endian::LittleEndian,
    file::Class,
    ElfBytes,
};
use std::fs::read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use config::VmConfig;

/// Load a VM state from an ELF file
pub fn load_elf(path: &Path, config: &VmConfig) -> Result<VM> {
    let file_data = read(path)?;
    let slice = file_data.as_slice();
    let file = ElfBytes::<LittleEndian>::minimal_parse(slice)?;

    if file.ehdr.class != Class::ELF32 {
        return Err(VMError::UnsupportedELF("not a 32-bit ELF file".into()));
    }
    if file.ehdr.e_machine != EM_RISCV {
        return Err(VMError::UnsupportedELF(format!(
            "machine {} is not RISC-V",
            file.ehdr.e_machine
        )));
    }
    let segments = file.segments().ok_or(VMError::NoSegments)?;

    // ELF32 fields are read as 32-bit values, so these never truncate
    let mut vm = VM::new(file.ehdr.e_entry as u32, config.stack_top);

    for p in segments.iter().filter(|phdr| phdr.p_type == PT_LOAD) {
        let vaddr = p.p_vaddr as u32;
        debug!(
            vaddr,
            filesz = p.p_filesz,
            memsz = p.p_memsz,
            "loading segment"
        );
        let bytes = usize::try_from(p.p_offset)
            .ok()
            .zip(usize::try_from(p.p_filesz).ok())
            .and_then(|(s, n)| slice.get(s..s.checked_add(n)?))
            .ok_or(VMError::TruncatedSegment(vaddr))?;
        vm.init_memory(vaddr, bytes);
    }

    Ok(vm)
}

/// A structure describing a VM to load.
/// This structure can be used with clap.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct VMOpts {
    /// Use a built-in machine: nop<n>, loop<n>, fib<n> or hello
    #[arg(short, long)]
    pub machine: Option<String>,

    /// Input file, RISC-V 32i ELF
    pub file: Option<PathBuf>,
}

/// Load the VM described by `opts`
pub fn load_vm(opts: &VMOpts, config: &VmConfig) -> Result<VM> {
    if let Some(name) = &opts.machine {
        machines::lookup_test_machine(name, config.stack_top)
    } else if let Some(path) = &opts.file {
        load_elf(path, config)
    } else {
        Err(VMError::NoInput)
    }
}

/// The observable result of running a guest to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// value passed to the exit call
    pub exit_code: u32,
    /// values passed to the trap call, in order
    pub traps: Vec<u32>,
    /// number of instructions executed
    pub steps: u64,
    /// log output, unless it went to stdout
    pub log: Vec<u8>,
}

impl Outcome {
    /// The exit code truncated to a process exit status.
    pub fn exit_status(&self) -> u8 {
        fib_rt::exit_status(self.exit_code)
    }
}

/// Evaluate a program starting from a given machine state
pub fn eval(vm: &mut VM, config: &VmConfig, show: bool) -> Result<Outcome> {
    if show {
        println!("\nExecution:");
        println!(
            "{:7} {:8} {:32} {:>8} {:>8}",
            "pc", "mem[pc]", "inst", "Z", "PC"
        );
    }
    debug!(pc = vm.regs.pc, max_steps = config.max_steps, "starting VM");

    let mut steps = 0;
    let exit_code = loop {
        if steps >= config.max_steps {
            warn!(steps, pc = vm.regs.pc, "step limit reached");
            return Err(VMError::StepLimit(config.max_steps));
        }

        eval_inst(vm)?;
        trace!(pc = vm.inst.pc, inst = %vm.inst.inst, result = vm.Z, next = vm.PC);
        if show {
            println!("{:50} {:8x} {:8x}", vm.inst, vm.Z, vm.PC);
        }
        eval_writeback(vm);
        steps += 1;

        if let Some(code) = vm.syscalls.exit_code() {
            break code;
        }
    };
    info!(exit_code, steps, "guest exited");

    fn table(name: &str, mem: &[u32]) {
        for (i, w) in mem.iter().enumerate() {
            print!("  {}{:02}: {:8x}", name, i, w);
            if (i % 8) == 7 {
                println!();
            }
        }
        println!();
    }

    if show {
        println!("\nFinal Machine State: pc: {:x}", vm.regs.pc);
        table("x", &vm.regs.x);
    }

    Ok(Outcome {
        exit_code,
        traps: vm.syscalls.traps().to_vec(),
        steps,
        log: vm.syscalls.log_buffer().to_vec(),
    })
}
