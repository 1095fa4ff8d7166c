//! Per-cycle micro-operation sequences.
//!
//! Every instruction, and every interrupt entry, is a fixed list of
//! micro-ops, one per CPU clock. Each micro-op performs exactly one bus
//! access. The final entry of every list is [`MicroOp::Fetch`], which
//! reads the next opcode and re-points the cursor.

#![allow(clippy::enum_glob_use)]

/// Branch conditions, tested against P when the offset byte is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Condition {
    CarryClear,
    CarrySet,
    NotEqual,
    Equal,
    Plus,
    Minus,
    OverflowClear,
    OverflowSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Index {
    X,
    Y,
}

/// Register (or register combination) written by a plain store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreSource {
    A,
    X,
    Y,
    /// SAX: A & X.
    AX,
}

/// Undocumented stores whose value depends on the base address high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnstableStore {
    /// SHA/AHX: A & X & (H + 1).
    Sha,
    /// TAS/SHS: S = A & X, then S & (H + 1).
    Tas,
    /// SHY: Y & (H + 1).
    Shy,
    /// SHX: X & (H + 1).
    Shx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vector {
    Nmi,
    Reset,
    Irq,
}

impl Vector {
    pub(crate) const fn address(self) -> u16 {
        match self {
            Vector::Nmi => 0xFFFA,
            Vector::Reset => 0xFFFC,
            Vector::Irq => 0xFFFE,
        }
    }
}

/// One CPU clock of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MicroOp {
    /// Read the opcode at PC, or divert into an interrupt sequence.
    Fetch,

    // Dummy reads of PC with an internal side effect.
    DummyReadPc,
    DummyReadPcInc,
    /// Taken branch that crossed a page: PC gets the real target.
    DummyReadPcFixBranch,
    /// Implied/accumulator instructions: the action runs here.
    DummyReadPcExecute,
    DummyReadPcAddZeroPage(Index),
    /// (zp,X): add X to the pointer.
    DummyReadPcPointerAddX,
    DummyReadPcStackInc,
    DummyReadPcStackDec,
    /// Last stack decrement of reset, which also sets I.
    DummyReadPcResetFlags,

    // Reads from PC.
    ReadPcToTmp,
    ReadImmediateExecute,
    ReadBranchOffset(Condition),
    BranchSetup,
    /// JSR/JMP abs: PCL from tmp, PCH from the bus.
    JumpFromTmp,
    ReadZeroPageAddress,
    ReadAddressLow,
    ReadAddressHigh,
    /// Absolute indexed: high byte read, low byte already indexed.
    ReadAddressHighIndexed(Index),

    // Reads through the zero-page pointer in tmp.
    ReadPointerLow,
    ReadPointerHigh,
    ReadPointerHighIndexedY,

    // Reads from the effective address.
    ReadEffective,
    /// Dummy read at the unfixed address, then apply the page fix.
    ReadEffectiveFixup,
    ReadEffectiveExecute,
    /// Read; with no page fix needed this is the final read and the
    /// next (fixed-address) entry is skipped.
    ReadEffectiveExecuteFixup,
    /// JMP (ind) high byte, without carry into the pointer's page.
    JumpIndirectHigh,

    // Writes to the effective address.
    WriteTmp,
    Store(StoreSource),
    StoreUnstable(UnstableStore),
    /// Read-modify-write: write back the old value, then modify.
    WriteTmpExecute,

    // Stack.
    PullA,
    /// PLP: the I change is deferred by one instruction.
    PullP,
    /// RTI: P is restored immediately.
    PullPInc,
    PullPcLowInc,
    PullPcHigh,
    PushA,
    PushP,
    PushPcHigh,
    PushPcLow,
    /// NMI: push with B clear, then set I.
    PushPNmi,
    /// BRK and IRQ: push with B set, then set I.
    PushPBreak,

    ReadVectorLow(Vector),
    ReadVectorHigh(Vector),
}

/// What a micro-op would put on the bus. The DMA arbitrator repeats the
/// read when it halts the CPU on this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BusAccess {
    Pc,
    Pointer,
    Effective,
    Stack,
    Fixed(u16),
    Write,
}

impl MicroOp {
    pub(crate) const fn bus_access(self) -> BusAccess {
        match self {
            Fetch
            | DummyReadPc
            | DummyReadPcInc
            | DummyReadPcFixBranch
            | DummyReadPcExecute
            | DummyReadPcAddZeroPage(_)
            | DummyReadPcPointerAddX
            | DummyReadPcStackInc
            | DummyReadPcStackDec
            | DummyReadPcResetFlags
            | ReadPcToTmp
            | ReadImmediateExecute
            | ReadBranchOffset(_)
            | BranchSetup
            | JumpFromTmp
            | ReadZeroPageAddress
            | ReadAddressLow
            | ReadAddressHigh
            | ReadAddressHighIndexed(_) => BusAccess::Pc,
            ReadPointerLow | ReadPointerHigh | ReadPointerHighIndexedY => BusAccess::Pointer,
            ReadEffective
            | ReadEffectiveFixup
            | ReadEffectiveExecute
            | ReadEffectiveExecuteFixup
            | JumpIndirectHigh => BusAccess::Effective,
            PullA | PullP | PullPInc | PullPcLowInc | PullPcHigh => BusAccess::Stack,
            ReadVectorLow(v) => BusAccess::Fixed(v.address()),
            ReadVectorHigh(v) => BusAccess::Fixed(v.address() + 1),
            WriteTmp | Store(_) | StoreUnstable(_) | WriteTmpExecute | PushA | PushP
            | PushPcHigh | PushPcLow | PushPNmi | PushPBreak => BusAccess::Write,
        }
    }
}

use Condition as Cond;
use Index::{X as IX, Y as IY};
use MicroOp::*;

pub(crate) type Sequence = &'static [MicroOp];

/// Power-on/idle cursor: fetch immediately.
pub(crate) const START: Sequence = &[Fetch];

pub(crate) const RESET: Sequence = &[
    DummyReadPcStackDec,
    DummyReadPcStackDec,
    DummyReadPcResetFlags,
    ReadVectorLow(Vector::Reset),
    ReadVectorHigh(Vector::Reset),
    Fetch,
];
pub(crate) const NMI: Sequence = &[
    DummyReadPc,
    PushPcHigh,
    PushPcLow,
    PushPNmi,
    ReadVectorLow(Vector::Nmi),
    ReadVectorHigh(Vector::Nmi),
    Fetch,
];
pub(crate) const IRQ: Sequence = &[
    DummyReadPc,
    PushPcHigh,
    PushPcLow,
    PushPBreak,
    ReadVectorLow(Vector::Irq),
    ReadVectorHigh(Vector::Irq),
    Fetch,
];

const KIL: Sequence = &[DummyReadPcExecute, Fetch];
const BRK: Sequence = &[
    DummyReadPcInc,
    PushPcHigh,
    PushPcLow,
    PushPBreak,
    ReadVectorLow(Vector::Irq),
    ReadVectorHigh(Vector::Irq),
    Fetch,
];
const RTI: Sequence = &[
    DummyReadPc,
    DummyReadPcStackInc,
    PullPInc,
    PullPcLowInc,
    PullPcHigh,
    Fetch,
];
const RTS: Sequence = &[
    DummyReadPc,
    DummyReadPcStackInc,
    PullPcLowInc,
    PullPcHigh,
    DummyReadPcInc,
    Fetch,
];
const PHP: Sequence = &[DummyReadPc, PushP, Fetch];
const PHA: Sequence = &[DummyReadPc, PushA, Fetch];
const PLP: Sequence = &[DummyReadPc, DummyReadPcStackInc, PullP, Fetch];
const PLA: Sequence = &[DummyReadPc, DummyReadPcStackInc, PullA, Fetch];
const JSR: Sequence = &[
    ReadPcToTmp,
    DummyReadPc,
    PushPcHigh,
    PushPcLow,
    JumpFromTmp,
    Fetch,
];
const JMP_ABS: Sequence = &[ReadPcToTmp, JumpFromTmp, Fetch];
const JMP_IND: Sequence = &[
    ReadAddressLow,
    ReadAddressHigh,
    ReadEffective,
    JumpIndirectHigh,
    Fetch,
];

const fn branch(condition: Condition) -> [MicroOp; 4] {
    [
        ReadBranchOffset(condition),
        BranchSetup,
        DummyReadPcFixBranch,
        Fetch,
    ]
}

const BPL: Sequence = &branch(Cond::Plus);
const BMI: Sequence = &branch(Cond::Minus);
const BVC: Sequence = &branch(Cond::OverflowClear);
const BVS: Sequence = &branch(Cond::OverflowSet);
const BCC: Sequence = &branch(Cond::CarryClear);
const BCS: Sequence = &branch(Cond::CarrySet);
const BNE: Sequence = &branch(Cond::NotEqual);
const BEQ: Sequence = &branch(Cond::Equal);

// Stores.
const fn zp_store(source: StoreSource) -> [MicroOp; 3] {
    [ReadZeroPageAddress, Store(source), Fetch]
}

const fn zp_indexed_store(index: Index, source: StoreSource) -> [MicroOp; 4] {
    [
        ReadZeroPageAddress,
        DummyReadPcAddZeroPage(index),
        Store(source),
        Fetch,
    ]
}

const fn abs_store(source: StoreSource) -> [MicroOp; 4] {
    [ReadAddressLow, ReadAddressHigh, Store(source), Fetch]
}

const ZP_STA: Sequence = &zp_store(StoreSource::A);
const ZP_STX: Sequence = &zp_store(StoreSource::X);
const ZP_STY: Sequence = &zp_store(StoreSource::Y);
const ZP_SAX: Sequence = &zp_store(StoreSource::AX);
const ZPX_STA: Sequence = &zp_indexed_store(IX, StoreSource::A);
const ZPX_STY: Sequence = &zp_indexed_store(IX, StoreSource::Y);
const ZPY_STX: Sequence = &zp_indexed_store(IY, StoreSource::X);
const ZPY_SAX: Sequence = &zp_indexed_store(IY, StoreSource::AX);
const ABS_STA: Sequence = &abs_store(StoreSource::A);
const ABS_STX: Sequence = &abs_store(StoreSource::X);
const ABS_STY: Sequence = &abs_store(StoreSource::Y);
const ABS_SAX: Sequence = &abs_store(StoreSource::AX);

const ABSX_STA: Sequence = &[
    ReadAddressLow,
    ReadAddressHighIndexed(IX),
    ReadEffectiveFixup,
    Store(StoreSource::A),
    Fetch,
];
const ABSY_STA: Sequence = &[
    ReadAddressLow,
    ReadAddressHighIndexed(IY),
    ReadEffectiveFixup,
    Store(StoreSource::A),
    Fetch,
];

const fn abs_unstable(index: Index, store: UnstableStore) -> [MicroOp; 5] {
    [
        ReadAddressLow,
        ReadAddressHighIndexed(index),
        ReadEffective,
        StoreUnstable(store),
        Fetch,
    ]
}

const ABSX_SHY: Sequence = &abs_unstable(IX, UnstableStore::Shy);
const ABSY_SHX: Sequence = &abs_unstable(IY, UnstableStore::Shx);
const ABSY_TAS: Sequence = &abs_unstable(IY, UnstableStore::Tas);
const ABSY_SHA: Sequence = &abs_unstable(IY, UnstableStore::Sha);

const INDX_STA: Sequence = &[
    ReadPcToTmp,
    DummyReadPcPointerAddX,
    ReadPointerLow,
    ReadPointerHigh,
    Store(StoreSource::A),
    Fetch,
];
const INDX_SAX: Sequence = &[
    ReadPcToTmp,
    DummyReadPcPointerAddX,
    ReadPointerLow,
    ReadPointerHigh,
    Store(StoreSource::AX),
    Fetch,
];
const INDY_STA: Sequence = &[
    ReadPcToTmp,
    ReadPointerLow,
    ReadPointerHighIndexedY,
    ReadEffectiveFixup,
    Store(StoreSource::A),
    Fetch,
];
const INDY_SHA: Sequence = &[
    ReadPcToTmp,
    ReadPointerLow,
    ReadPointerHighIndexedY,
    ReadEffective,
    StoreUnstable(UnstableStore::Sha),
    Fetch,
];

// Reads and read-modify-writes, shared across many opcodes.
const IMPLIED: Sequence = &[DummyReadPcExecute, Fetch];
const IMMEDIATE: Sequence = &[ReadImmediateExecute, Fetch];

const ZP_READ: Sequence = &[ReadZeroPageAddress, ReadEffectiveExecute, Fetch];
const ZP_RMW: Sequence = &[
    ReadZeroPageAddress,
    ReadEffective,
    WriteTmpExecute,
    WriteTmp,
    Fetch,
];
const ZPX_READ: Sequence = &[
    ReadZeroPageAddress,
    DummyReadPcAddZeroPage(IX),
    ReadEffectiveExecute,
    Fetch,
];
const ZPY_READ: Sequence = &[
    ReadZeroPageAddress,
    DummyReadPcAddZeroPage(IY),
    ReadEffectiveExecute,
    Fetch,
];
const ZPX_RMW: Sequence = &[
    ReadZeroPageAddress,
    DummyReadPcAddZeroPage(IX),
    ReadEffective,
    WriteTmpExecute,
    WriteTmp,
    Fetch,
];

const ABS_READ: Sequence = &[ReadAddressLow, ReadAddressHigh, ReadEffectiveExecute, Fetch];
const ABS_RMW: Sequence = &[
    ReadAddressLow,
    ReadAddressHigh,
    ReadEffective,
    WriteTmpExecute,
    WriteTmp,
    Fetch,
];

const fn abs_indexed_read(index: Index) -> [MicroOp; 5] {
    [
        ReadAddressLow,
        ReadAddressHighIndexed(index),
        ReadEffectiveExecuteFixup,
        ReadEffectiveExecute,
        Fetch,
    ]
}

const fn abs_indexed_rmw(index: Index) -> [MicroOp; 7] {
    [
        ReadAddressLow,
        ReadAddressHighIndexed(index),
        ReadEffectiveFixup,
        ReadEffective,
        WriteTmpExecute,
        WriteTmp,
        Fetch,
    ]
}

const ABSX_READ: Sequence = &abs_indexed_read(IX);
const ABSY_READ: Sequence = &abs_indexed_read(IY);
const ABSX_RMW: Sequence = &abs_indexed_rmw(IX);
const ABSY_RMW: Sequence = &abs_indexed_rmw(IY);

const INDX_READ: Sequence = &[
    ReadPcToTmp,
    DummyReadPcPointerAddX,
    ReadPointerLow,
    ReadPointerHigh,
    ReadEffectiveExecute,
    Fetch,
];
const INDX_RMW: Sequence = &[
    ReadPcToTmp,
    DummyReadPcPointerAddX,
    ReadPointerLow,
    ReadPointerHigh,
    ReadEffective,
    WriteTmpExecute,
    WriteTmp,
    Fetch,
];
const INDY_READ: Sequence = &[
    ReadPcToTmp,
    ReadPointerLow,
    ReadPointerHighIndexedY,
    ReadEffectiveExecuteFixup,
    ReadEffectiveExecute,
    Fetch,
];
const INDY_RMW: Sequence = &[
    ReadPcToTmp,
    ReadPointerLow,
    ReadPointerHighIndexedY,
    ReadEffectiveFixup,
    ReadEffective,
    WriteTmpExecute,
    WriteTmp,
    Fetch,
];

/// Micro-op sequence for every opcode.
#[rustfmt::skip]
pub(crate) static INSTRUCTIONS: [Sequence; 256] = [
    // 0x00
    BRK, INDX_READ, KIL, INDX_RMW, ZP_READ, ZP_READ, ZP_RMW, ZP_RMW,
    PHP, IMMEDIATE, IMPLIED, IMMEDIATE, ABS_READ, ABS_READ, ABS_RMW, ABS_RMW,
    // 0x10
    BPL, INDY_READ, KIL, INDY_RMW, ZPX_READ, ZPX_READ, ZPX_RMW, ZPX_RMW,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_RMW, ABSX_READ, ABSX_READ, ABSX_RMW, ABSX_RMW,
    // 0x20
    JSR, INDX_READ, KIL, INDX_RMW, ZP_READ, ZP_READ, ZP_RMW, ZP_RMW,
    PLP, IMMEDIATE, IMPLIED, IMMEDIATE, ABS_READ, ABS_READ, ABS_RMW, ABS_RMW,
    // 0x30
    BMI, INDY_READ, KIL, INDY_RMW, ZPX_READ, ZPX_READ, ZPX_RMW, ZPX_RMW,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_RMW, ABSX_READ, ABSX_READ, ABSX_RMW, ABSX_RMW,
    // 0x40
    RTI, INDX_READ, KIL, INDX_RMW, ZP_READ, ZP_READ, ZP_RMW, ZP_RMW,
    PHA, IMMEDIATE, IMPLIED, IMMEDIATE, JMP_ABS, ABS_READ, ABS_RMW, ABS_RMW,
    // 0x50
    BVC, INDY_READ, KIL, INDY_RMW, ZPX_READ, ZPX_READ, ZPX_RMW, ZPX_RMW,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_RMW, ABSX_READ, ABSX_READ, ABSX_RMW, ABSX_RMW,
    // 0x60
    RTS, INDX_READ, KIL, INDX_RMW, ZP_READ, ZP_READ, ZP_RMW, ZP_RMW,
    PLA, IMMEDIATE, IMPLIED, IMMEDIATE, JMP_IND, ABS_READ, ABS_RMW, ABS_RMW,
    // 0x70
    BVS, INDY_READ, KIL, INDY_RMW, ZPX_READ, ZPX_READ, ZPX_RMW, ZPX_RMW,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_RMW, ABSX_READ, ABSX_READ, ABSX_RMW, ABSX_RMW,
    // 0x80
    IMMEDIATE, INDX_STA, IMMEDIATE, INDX_SAX, ZP_STY, ZP_STA, ZP_STX, ZP_SAX,
    IMPLIED, IMMEDIATE, IMPLIED, IMMEDIATE, ABS_STY, ABS_STA, ABS_STX, ABS_SAX,
    // 0x90
    BCC, INDY_STA, KIL, INDY_SHA, ZPX_STY, ZPX_STA, ZPY_STX, ZPY_SAX,
    IMPLIED, ABSY_STA, IMPLIED, ABSY_TAS, ABSX_SHY, ABSX_STA, ABSY_SHX, ABSY_SHA,
    // 0xA0
    IMMEDIATE, INDX_READ, IMMEDIATE, INDX_READ, ZP_READ, ZP_READ, ZP_READ, ZP_READ,
    IMPLIED, IMMEDIATE, IMPLIED, IMMEDIATE, ABS_READ, ABS_READ, ABS_READ, ABS_READ,
    // 0xB0
    BCS, INDY_READ, KIL, INDY_READ, ZPX_READ, ZPX_READ, ZPY_READ, ZPY_READ,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_READ, ABSX_READ, ABSX_READ, ABSY_READ, ABSY_READ,
    // 0xC0
    IMMEDIATE, INDX_READ, IMMEDIATE, INDX_RMW, ZP_READ, ZP_READ, ZP_RMW, ZP_RMW,
    IMPLIED, IMMEDIATE, IMPLIED, IMMEDIATE, ABS_READ, ABS_READ, ABS_RMW, ABS_RMW,
    // 0xD0
    BNE, INDY_READ, KIL, INDY_RMW, ZPX_READ, ZPX_READ, ZPX_RMW, ZPX_RMW,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_RMW, ABSX_READ, ABSX_READ, ABSX_RMW, ABSX_RMW,
    // 0xE0
    IMMEDIATE, INDX_READ, IMMEDIATE, INDX_RMW, ZP_READ, ZP_READ, ZP_RMW, ZP_RMW,
    IMPLIED, IMMEDIATE, IMPLIED, IMMEDIATE, ABS_READ, ABS_READ, ABS_RMW, ABS_RMW,
    // 0xF0
    BEQ, INDY_READ, KIL, INDY_RMW, ZPX_READ, ZPX_READ, ZPX_RMW, ZPX_RMW,
    IMPLIED, ABSY_READ, IMPLIED, ABSY_RMW, ABSX_READ, ABSX_READ, ABSX_RMW, ABSX_RMW,
];
