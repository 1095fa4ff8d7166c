//! CPU-side memory bus.

/// CPU-side memory bus.
///
/// Each call is exactly one bus cycle. Reads may have side effects on the
/// far end (status registers that clear on read, controller shift
/// registers, mappers counting accesses), so a dummy read is still a read.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// 64 KiB of undecoded RAM.
///
/// Useful as a stand-in system bus for tests and for hosts that only need
/// a flat address space.
pub struct FlatRam {
    memory: Box<[u8]>,
}

impl FlatRam {
    /// Zero-filled RAM covering the full 16-bit address space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000].into_boxed_slice(),
        }
    }

    /// Copy `bytes` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        let mut addr = address;
        for &byte in bytes {
            self.memory[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read without counting as a bus cycle.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    /// Write without counting as a bus cycle.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    /// Store a little-endian word, typically an interrupt vector.
    pub fn poke_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.poke(address, lo);
        self.poke(address.wrapping_add(1), hi);
    }
}

impl Default for FlatRam {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FlatRam {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }
}
