//! A Virtual Machine for RV32I guest programs

pub mod eval;
/// Sparse paged memory
pub mod mem;
/// System calls serviced on behalf of the guest
pub mod syscalls;

pub use eval::*;
