//! Fibonacci numbers, the slow way.

#![cfg_attr(target_arch = "riscv32", no_std)]

/// Compute the n-th Fibonacci number by naive double recursion.
///
/// `fib(0) = 0`, `fib(1) = 1`. Results beyond `u32::MAX` wrap around.
pub fn fib(n: u32) -> u32 {
    match n {
        0 | 1 => n,
        _ => fib(n - 1).wrapping_add(fib(n - 2)),
    }
}

/// The n-th Fibonacci number, computed iteratively, or `None` if it does
/// not fit in a `u32`.
pub fn checked_fib(n: u32) -> Option<u32> {
    if n == 0 {
        return Some(0);
    }
    let (mut a, mut b) = (0u32, 1u32);
    for _ in 1..n {
        (a, b) = (b, a.checked_add(b)?);
    }
    Some(b)
}
