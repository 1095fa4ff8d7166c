//! Processor status register (P).
//!
//! Bits 4 and 5 are not storage: they only exist on the copy pushed to
//! the stack. [`Status`] keeps bit 5 set and bit 4 clear at all times and
//! the push helpers decide what the stack sees.

/// Carry.
pub const C: u8 = 0x01;

/// Zero.
pub const Z: u8 = 0x02;

/// Interrupt disable. Masks IRQ; never masks NMI or reset.
pub const I: u8 = 0x04;

/// Decimal mode. Settable, but the 2A03 has no BCD adder.
pub const D: u8 = 0x08;

/// Break. Set on the stack copy pushed by BRK and PHP.
pub const B: u8 = 0x10;

/// Unused, always reads as 1.
pub const U: u8 = 0x20;

/// Overflow.
pub const V: u8 = 0x40;

/// Negative.
pub const N: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Load from a stack byte or test fixture. B is dropped, U forced.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self((value | U) & !B)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Copy pushed by BRK, PHP and IRQ.
    #[must_use]
    pub const fn to_byte_brk(self) -> u8 {
        self.0 | B
    }

    /// Copy pushed by NMI.
    #[must_use]
    pub const fn to_byte_nmi(self) -> u8 {
        self.0 & !B
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag & !B;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag | U;
    }

    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Shared N/Z rule: Z iff zero, N mirrors bit 7.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}
