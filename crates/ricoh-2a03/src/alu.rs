//! Opcode actions: the register/ALU half of each instruction.
//!
//! Addressing micro-ops fetch the operand into `tmp` and then call
//! [`execute`] with the action for the current opcode. Read-modify-write
//! actions leave their result in `tmp` for the final write cycle.

use crate::Registers;
use crate::flags::{C, D, I, N, V, Z};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Addressing only (NOPs, stores, branches, stack ops).
    None,
    Ora,
    And,
    Eor,
    Adc,
    Sbc,
    Cmp,
    Cpx,
    Cpy,
    Bit,
    Lda,
    Ldx,
    Ldy,
    AslA,
    AslM,
    LsrA,
    LsrM,
    RolA,
    RolM,
    RorA,
    RorM,
    IncM,
    DecM,
    Inx,
    Iny,
    Dex,
    Dey,
    Tax,
    Tay,
    Txa,
    Tya,
    Tsx,
    Txs,
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,
    // Undocumented.
    Slo,
    Rla,
    Sre,
    Rra,
    Dcp,
    Isc,
    Lax,
    /// ANC: AND, then C = N.
    Anc,
    /// ALR/ASR: AND, then LSR A.
    Alr,
    Arr,
    /// ANE/XAA: A = X & operand.
    Xaa,
    /// LXA/ATX: A = X = operand.
    Lxa,
    /// AXS/SBX: X = (A & X) - operand, flags as CMP.
    Axs,
    /// LAS: A = X = S = operand & S.
    Las,
    Kil,
}

/// Side effects the engine has to apply itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done,
    /// CLI/SEI: queue the I change for the next interrupt check.
    QueueInterruptDisable(bool),
    Jam,
}

const fn decode(opcode: u8) -> Action {
    use Action as A;
    match opcode {
        0x01 | 0x05 | 0x09 | 0x0D | 0x11 | 0x15 | 0x19 | 0x1D => A::Ora,
        0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => {
            A::Kil
        }
        0x03 | 0x07 | 0x0F | 0x13 | 0x17 | 0x1B | 0x1F => A::Slo,
        0x06 | 0x0E | 0x16 | 0x1E => A::AslM,
        0x0A => A::AslA,
        0x0B | 0x2B => A::Anc,
        0x18 => A::Clc,
        0x21 | 0x25 | 0x29 | 0x2D | 0x31 | 0x35 | 0x39 | 0x3D => A::And,
        0x23 | 0x27 | 0x2F | 0x33 | 0x37 | 0x3B | 0x3F => A::Rla,
        0x24 | 0x2C => A::Bit,
        0x26 | 0x2E | 0x36 | 0x3E => A::RolM,
        0x2A => A::RolA,
        0x38 => A::Sec,
        0x41 | 0x45 | 0x49 | 0x4D | 0x51 | 0x55 | 0x59 | 0x5D => A::Eor,
        0x43 | 0x47 | 0x4F | 0x53 | 0x57 | 0x5B | 0x5F => A::Sre,
        0x46 | 0x4E | 0x56 | 0x5E => A::LsrM,
        0x4A => A::LsrA,
        0x4B => A::Alr,
        0x58 => A::Cli,
        0x61 | 0x65 | 0x69 | 0x6D | 0x71 | 0x75 | 0x79 | 0x7D => A::Adc,
        0x63 | 0x67 | 0x6F | 0x73 | 0x77 | 0x7B | 0x7F => A::Rra,
        0x66 | 0x6E | 0x76 | 0x7E => A::RorM,
        0x6A => A::RorA,
        0x6B => A::Arr,
        0x78 => A::Sei,
        0x88 => A::Dey,
        0x8A => A::Txa,
        0x8B => A::Xaa,
        0x98 => A::Tya,
        0x9A => A::Txs,
        0xA0 | 0xA4 | 0xAC | 0xB4 | 0xBC => A::Ldy,
        0xA1 | 0xA5 | 0xA9 | 0xAD | 0xB1 | 0xB5 | 0xB9 | 0xBD => A::Lda,
        0xA2 | 0xA6 | 0xAE | 0xB6 | 0xBE => A::Ldx,
        0xA3 | 0xA7 | 0xAF | 0xB3 | 0xB7 | 0xBF => A::Lax,
        0xA8 => A::Tay,
        0xAA => A::Tax,
        0xAB => A::Lxa,
        0xB8 => A::Clv,
        0xBA => A::Tsx,
        0xBB => A::Las,
        0xC0 | 0xC4 | 0xCC => A::Cpy,
        0xC1 | 0xC5 | 0xC9 | 0xCD | 0xD1 | 0xD5 | 0xD9 | 0xDD => A::Cmp,
        0xC3 | 0xC7 | 0xCF | 0xD3 | 0xD7 | 0xDB | 0xDF => A::Dcp,
        0xC6 | 0xCE | 0xD6 | 0xDE => A::DecM,
        0xC8 => A::Iny,
        0xCA => A::Dex,
        0xCB => A::Axs,
        0xD8 => A::Cld,
        0xE0 | 0xE4 | 0xEC => A::Cpx,
        0xE1 | 0xE5 | 0xE9 | 0xEB | 0xED | 0xF1 | 0xF5 | 0xF9 | 0xFD => A::Sbc,
        0xE3 | 0xE7 | 0xEF | 0xF3 | 0xF7 | 0xFB | 0xFF => A::Isc,
        0xE6 | 0xEE | 0xF6 | 0xFE => A::IncM,
        0xE8 => A::Inx,
        0xF8 => A::Sed,
        _ => A::None,
    }
}

const fn build_actions() -> [Action; 256] {
    let mut table = [Action::None; 256];
    let mut opcode = 0;
    while opcode < 256 {
        table[opcode] = decode(opcode as u8);
        opcode += 1;
    }
    table
}

/// Action for every opcode.
pub(crate) static ACTIONS: [Action; 256] = build_actions();

fn adc(regs: &mut Registers, operand: u8) {
    let sum = u16::from(regs.a) + u16::from(operand) + u16::from(regs.p.is_set(C));
    let result = sum as u8;
    regs.p.set_if(C, sum > 0xFF);
    regs.p
        .set_if(V, (regs.a ^ result) & (operand ^ result) & 0x80 != 0);
    regs.set_a(result);
}

/// Compare `register` with `operand`; returns the difference.
fn compare(regs: &mut Registers, register: u8, operand: u8) -> u8 {
    let result = register.wrapping_sub(operand);
    regs.p.set_if(C, register >= operand);
    regs.p.update_nz(result);
    result
}

fn asl(regs: &mut Registers, value: u8) -> u8 {
    regs.p.set_if(C, value & 0x80 != 0);
    let result = value << 1;
    regs.p.update_nz(result);
    result
}

fn lsr(regs: &mut Registers, value: u8) -> u8 {
    regs.p.set_if(C, value & 0x01 != 0);
    let result = value >> 1;
    regs.p.update_nz(result);
    result
}

fn rol(regs: &mut Registers, value: u8) -> u8 {
    let carry_in = u8::from(regs.p.is_set(C));
    regs.p.set_if(C, value & 0x80 != 0);
    let result = (value << 1) | carry_in;
    regs.p.update_nz(result);
    result
}

fn ror(regs: &mut Registers, value: u8) -> u8 {
    let carry_in = if regs.p.is_set(C) { 0x80 } else { 0 };
    regs.p.set_if(C, value & 0x01 != 0);
    let result = (value >> 1) | carry_in;
    regs.p.update_nz(result);
    result
}

fn modify(regs: &mut Registers, value: u8) -> u8 {
    regs.p.update_nz(value);
    value
}

/// Run `action` against the registers with operand/RMW value `tmp`.
pub(crate) fn execute(action: Action, regs: &mut Registers, tmp: &mut u8) -> Outcome {
    let operand = *tmp;
    match action {
        Action::None => {}
        Action::Ora => regs.set_a(regs.a | operand),
        Action::And => regs.set_a(regs.a & operand),
        Action::Eor => regs.set_a(regs.a ^ operand),
        Action::Adc => adc(regs, operand),
        Action::Sbc => adc(regs, !operand),
        Action::Cmp => {
            compare(regs, regs.a, operand);
        }
        Action::Cpx => {
            compare(regs, regs.x, operand);
        }
        Action::Cpy => {
            compare(regs, regs.y, operand);
        }
        Action::Bit => {
            regs.p.set_if(Z, regs.a & operand == 0);
            regs.p.set_if(V, operand & 0x40 != 0);
            regs.p.set_if(N, operand & 0x80 != 0);
        }
        Action::Lda => regs.set_a(operand),
        Action::Ldx => regs.set_x(operand),
        Action::Ldy => regs.set_y(operand),
        Action::AslA => {
            let a = asl(regs, regs.a);
            regs.a = a;
        }
        Action::AslM => *tmp = asl(regs, operand),
        Action::LsrA => {
            let a = lsr(regs, regs.a);
            regs.a = a;
        }
        Action::LsrM => *tmp = lsr(regs, operand),
        Action::RolA => {
            let a = rol(regs, regs.a);
            regs.a = a;
        }
        Action::RolM => *tmp = rol(regs, operand),
        Action::RorA => {
            let a = ror(regs, regs.a);
            regs.a = a;
        }
        Action::RorM => *tmp = ror(regs, operand),
        Action::IncM => *tmp = modify(regs, operand.wrapping_add(1)),
        Action::DecM => *tmp = modify(regs, operand.wrapping_sub(1)),
        Action::Inx => regs.set_x(regs.x.wrapping_add(1)),
        Action::Iny => regs.set_y(regs.y.wrapping_add(1)),
        Action::Dex => regs.set_x(regs.x.wrapping_sub(1)),
        Action::Dey => regs.set_y(regs.y.wrapping_sub(1)),
        Action::Tax => regs.set_x(regs.a),
        Action::Tay => regs.set_y(regs.a),
        Action::Txa => regs.set_a(regs.x),
        Action::Tya => regs.set_a(regs.y),
        Action::Tsx => regs.set_x(regs.s),
        Action::Txs => regs.s = regs.x,
        Action::Clc => regs.p.clear(C),
        Action::Sec => regs.p.set(C),
        Action::Cli => return Outcome::QueueInterruptDisable(false),
        Action::Sei => return Outcome::QueueInterruptDisable(true),
        Action::Clv => regs.p.clear(V),
        Action::Cld => regs.p.clear(D),
        Action::Sed => regs.p.set(D),
        Action::Slo => {
            *tmp = asl(regs, operand);
            regs.set_a(regs.a | *tmp);
        }
        Action::Rla => {
            *tmp = rol(regs, operand);
            regs.set_a(regs.a & *tmp);
        }
        Action::Sre => {
            *tmp = lsr(regs, operand);
            regs.set_a(regs.a ^ *tmp);
        }
        Action::Rra => {
            *tmp = ror(regs, operand);
            adc(regs, *tmp);
        }
        Action::Dcp => {
            *tmp = operand.wrapping_sub(1);
            compare(regs, regs.a, *tmp);
        }
        Action::Isc => {
            *tmp = operand.wrapping_add(1);
            adc(regs, !*tmp);
        }
        Action::Lax => {
            regs.set_a(operand);
            regs.x = operand;
        }
        Action::Anc => {
            regs.set_a(regs.a & operand);
            regs.p.set_if(C, regs.p.is_set(N));
        }
        Action::Alr => {
            let anded = regs.a & operand;
            let a = lsr(regs, anded);
            regs.a = a;
        }
        Action::Arr => {
            let anded = regs.a & operand;
            let a = ror(regs, anded);
            regs.a = a;
            let bit6 = a & 0x40 != 0;
            let bit5 = a & 0x20 != 0;
            regs.p.set_if(C, bit6);
            regs.p.set_if(V, bit6 ^ bit5);
        }
        Action::Xaa => regs.set_a(regs.x & operand),
        Action::Lxa => {
            regs.set_a(operand);
            regs.x = operand;
        }
        Action::Axs => {
            let x = compare(regs, regs.a & regs.x, operand);
            regs.x = x;
        }
        Action::Las => {
            let value = operand & regs.s;
            regs.set_a(value);
            regs.x = value;
            regs.s = value;
        }
        Action::Kil => return Outcome::Jam,
    }
    Outcome::Done
}
