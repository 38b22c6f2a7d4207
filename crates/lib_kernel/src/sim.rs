//! Host-side doubles for the hardware seams.
//!
//! [`SimulatedPorts`] is a software register file: each port has a sticky
//! value plus an optional FIFO of one-shot values that are returned first.
//! Writes are logged but never change what a later read returns, because on
//! the hardware this layer drives several ports are read/write pairs of
//! different registers (ATA status vs. command, for instance).
//!
//! PCI configuration space is modelled separately: a 32-bit write to
//! `0xCF8` latches the address and a 32-bit read from `0xCFC` looks it up.
//! Unpopulated configuration addresses read as all ones.

use std::collections::{HashMap, VecDeque};

use crate::cpu::{CpuidRegs, CpuidSource};
use crate::port::PortIo;

const CONFIG_ADDRESS: u16 = 0xCF8;
const CONFIG_DATA: u16 = 0xCFC;

/// Access width of a logged port write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
    Dword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortWrite {
    pub port: u16,
    pub value: u32,
    pub width: Width,
}

#[derive(Debug, Default)]
pub struct SimulatedPorts {
    sticky: HashMap<u16, u32>,
    queued: HashMap<u16, VecDeque<u32>>,
    config: HashMap<u32, u32>,
    config_address: u32,
    writes: Vec<PortWrite>,
    reads: HashMap<u16, usize>,
}

impl SimulatedPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value returned by every read of `port` once its queue is empty.
    pub fn set(&mut self, port: u16, value: u32) -> &mut Self {
        self.sticky.insert(port, value);
        self
    }

    /// Appends a one-shot value for the next unconsumed read of `port`.
    pub fn queue(&mut self, port: u16, value: u32) -> &mut Self {
        self.queued.entry(port).or_default().push_back(value);
        self
    }

    pub fn queue_words(&mut self, port: u16, words: &[u16]) -> &mut Self {
        let fifo = self.queued.entry(port).or_default();
        fifo.extend(words.iter().map(|&w| u32::from(w)));
        self
    }

    /// Populates one configuration dword. `offset` is rounded down to a
    /// dword boundary.
    pub fn set_config_dword(&mut self, bus: u8, slot: u8, func: u8, offset: u8, value: u32) -> &mut Self {
        let address = 0x8000_0000
            | (u32::from(bus) << 16)
            | (u32::from(slot & 0x1F) << 11)
            | (u32::from(func & 0x07) << 8)
            | u32::from(offset & 0xFC);
        self.config.insert(address, value);
        self
    }

    pub fn writes(&self) -> &[PortWrite] {
        &self.writes
    }

    /// Values written to `port`, oldest first.
    pub fn writes_to(&self, port: u16) -> Vec<u32> {
        self.writes.iter().filter(|w| w.port == port).map(|w| w.value).collect()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn read_count(&self, port: u16) -> usize {
        self.reads.get(&port).copied().unwrap_or(0)
    }

    /// Total reads across all ports.
    pub fn total_reads(&self) -> usize {
        self.reads.values().sum()
    }

    pub fn pending_reads(&self, port: u16) -> usize {
        self.queued.get(&port).map_or(0, VecDeque::len)
    }

    fn read(&mut self, port: u16) -> u32 {
        *self.reads.entry(port).or_insert(0) += 1;
        if port == CONFIG_DATA {
            return self.config.get(&self.config_address).copied().unwrap_or(0xFFFF_FFFF);
        }
        if let Some(value) = self.queued.get_mut(&port).and_then(VecDeque::pop_front) {
            return value;
        }
        self.sticky.get(&port).copied().unwrap_or(0)
    }

    fn write(&mut self, port: u16, value: u32, width: Width) {
        if port == CONFIG_ADDRESS && width == Width::Dword {
            self.config_address = value;
        }
        self.writes.push(PortWrite { port, value, width });
    }
}

impl PortIo for SimulatedPorts {
    fn inb(&mut self, port: u16) -> u8 {
        self.read(port) as u8
    }

    fn outb(&mut self, port: u16, value: u8) {
        self.write(port, u32::from(value), Width::Byte);
    }

    fn inw(&mut self, port: u16) -> u16 {
        self.read(port) as u16
    }

    fn outw(&mut self, port: u16, value: u16) {
        self.write(port, u32::from(value), Width::Word);
    }

    fn inl(&mut self, port: u16) -> u32 {
        self.read(port)
    }

    fn outl(&mut self, port: u16, value: u32) {
        self.write(port, value, Width::Dword);
    }
}

/// CPUID answered from a table. Unknown leaves return all zeros.
#[derive(Debug, Default, Clone)]
pub struct ScriptedCpuid {
    leaves: HashMap<u32, CpuidRegs>,
    queried: Vec<u32>,
}

impl ScriptedCpuid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(mut self, leaf: u32, regs: CpuidRegs) -> Self {
        self.leaves.insert(leaf, regs);
        self
    }

    /// Leaves queried so far, in order.
    pub fn queried(&self) -> &[u32] {
        &self.queried
    }
}

impl CpuidSource for ScriptedCpuid {
    fn cpuid(&mut self, leaf: u32) -> CpuidRegs {
        self.queried.push(leaf);
        self.leaves.get(&leaf).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_before_sticky() {
        let mut io = SimulatedPorts::new();
        io.set(0x1F7, 0x50).queue(0x1F7, 0x80).queue(0x1F7, 0x88);

        assert_eq!(io.inb(0x1F7), 0x80);
        assert_eq!(io.inb(0x1F7), 0x88);
        assert_eq!(io.inb(0x1F7), 0x50);
        assert_eq!(io.inb(0x1F7), 0x50);
        assert_eq!(io.read_count(0x1F7), 4);
        assert_eq!(io.pending_reads(0x1F7), 0);
    }

    #[test]
    fn test_writes_do_not_change_reads() {
        let mut io = SimulatedPorts::new();
        io.set(0x1F7, 0x58);
        io.outb(0x1F7, 0xEC);

        assert_eq!(io.inb(0x1F7), 0x58);
        assert_eq!(io.writes_to(0x1F7), vec![0xEC]);
        assert_eq!(io.writes()[0].width, Width::Byte);
    }

    #[test]
    fn test_config_space_latch() {
        let mut io = SimulatedPorts::new();
        io.set_config_dword(0, 1, 1, 0x00, 0x7010_8086);

        io.outl(CONFIG_ADDRESS, 0x8000_0900);
        assert_eq!(io.inl(CONFIG_DATA), 0x7010_8086);

        io.outl(CONFIG_ADDRESS, 0x8000_0800);
        assert_eq!(io.inl(CONFIG_DATA), 0xFFFF_FFFF);
    }
}
