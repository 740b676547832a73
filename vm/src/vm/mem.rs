#![deny(missing_docs)]

// RISC-V leaves the meaning of misaligned loads and stores up to the
// Execution Environment Interface (EEI). This VM traps on them (see
// `eval`), so every half-word and word access handled here stays within
// a single page.

use std::collections::BTreeMap;

/// A simple memory for RV32
///
/// Memory is organized as a collection of 4K pages.
/// A binary tree is used to represent a sparsely
/// populated memory space of 4K pages.
#[derive(Default)]
pub struct Mem {
    tree: BTreeMap<u32, Page>,
}
type Page = [u8; 4096];

impl Mem {
    pub(crate) fn wr_page(&mut self, addr: u32) -> &mut [u8] {
        let page = addr >> 12;
        let offset = (addr & 0xfff) as usize;
        let arr = self.tree.entry(page).or_insert_with(|| [0u8; 4096]);
        &mut arr[offset..]
    }

    pub(crate) fn rd_page(&self, addr: u32) -> &[u8] {
        let page = addr >> 12;
        let offset = (addr & 0xfff) as usize;

        static ZEROS: [u8; 4] = [0; 4];
        match self.tree.get(&page) {
            None => &ZEROS,
            Some(arr) => &arr[offset..],
        }
    }

    /// number of populated pages
    pub fn pages(&self) -> usize {
        self.tree.len()
    }

    /// store the lowest byte of val at addr
    pub fn sb(&mut self, addr: u32, val: u32) {
        self.wr_page(addr)[0] = (val & 0xff) as u8;
    }

    /// store the lowest two bytes of val at addr
    pub fn sh(&mut self, addr: u32, val: u32) {
        let arr = self.wr_page(addr);
        arr[..2].copy_from_slice(&(val as u16).to_le_bytes());
    }

    /// store val at addr
    pub fn sw(&mut self, addr: u32, val: u32) {
        let arr = self.wr_page(addr);
        arr[..4].copy_from_slice(&val.to_le_bytes());
    }

    /// load byte at addr, zero-extended
    pub fn lbu(&self, addr: u32) -> u32 {
        self.rd_page(addr)[0] as u32
    }

    /// load 16-bit value at addr, zero-extended
    pub fn lhu(&self, addr: u32) -> u32 {
        let arr = self.rd_page(addr);
        u16::from_le_bytes([arr[0], arr[1]]) as u32
    }

    /// load 32-bit value at addr
    pub fn lw(&self, addr: u32) -> u32 {
        let arr = self.rd_page(addr);
        u32::from_le_bytes([arr[0], arr[1], arr[2], arr[3]])
    }

    /// load byte at addr, sign-extended
    pub fn lb(&self, addr: u32) -> u32 {
        self.lbu(addr) as u8 as i8 as i32 as u32
    }

    /// load 16-bit value at addr, sign-extended
    pub fn lh(&self, addr: u32) -> u32 {
        self.lhu(addr) as u16 as i16 as i32 as u32
    }

    /// copy `len` bytes starting at addr; may cross pages
    pub fn load_n(&self, addr: u32, len: u32) -> Vec<u8> {
        (0..len)
            .map(|i| self.lbu(addr.wrapping_add(i)) as u8)
            .collect()
    }

    /// copy `bytes` into memory starting at addr; may cross pages
    pub fn store_n(&mut self, addr: u32, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.sb(addr.wrapping_add(i as u32), *b as u32);
        }
    }
}
