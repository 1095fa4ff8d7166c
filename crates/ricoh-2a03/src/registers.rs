//! Programmer-visible registers.

use crate::Status;

/// 2A03 register set.
///
/// - A: accumulator
/// - X, Y: index registers
/// - S: stack pointer into $0100-$01FF
/// - PC: program counter
/// - P: status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub pc: u16,
    pub p: Status,
}

impl Registers {
    /// Power-on contents. The reset sequence then walks S down to $FD and
    /// sets I.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0,
            pc: 0,
            p: Status::new(),
        }
    }

    /// Address S currently points at.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        0x0100 | (self.s as u16)
    }

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
        self.p.update_nz(value);
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
        self.p.update_nz(value);
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
        self.p.update_nz(value);
    }
}
