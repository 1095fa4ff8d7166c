//! 6502 execution engine.
//!
//! Cycle-accurate: each [`Cpu::step`] is one CPU clock and performs
//! exactly one bus access, either for the DMA arbitrator or for the
//! micro-op under the cursor.

use emu_core::{Bus, FlatRam, Observable, Value};
use ricoh_apu_2a03::DmcDma;

use crate::alu::{self, ACTIONS, Outcome};
use crate::dma::Dma;
use crate::error::StepError;
use crate::flags::{C, D, I, N, V, Z};
use crate::interrupt::Interrupts;
use crate::microcode::{
    BusAccess, Condition, INSTRUCTIONS, IRQ, Index, MicroOp, NMI, RESET, START, Sequence,
    StoreSource, UnstableStore, Vector,
};
use crate::{Registers, Status};

/// The CPU's view of the rest of the system.
///
/// Besides plain memory access, the engine samples the NMI and IRQ inputs
/// and notifies the far side of a few events. Every hook has a no-op
/// default so a plain memory bus works as-is.
pub trait CpuBus: Bus {
    /// NMI edge pending. Called on the last cycle of each instruction.
    fn poll_nmi(&mut self) -> bool {
        false
    }

    /// Level of the shared IRQ line.
    fn irq_asserted(&self) -> bool {
        false
    }

    /// The CPU has entered its IRQ sequence.
    fn irq_serviced(&mut self) {}

    /// A byte fetched by DMC DMA.
    fn dmc_byte(&mut self, _value: u8) {}

    /// The CPU has begun servicing a reset.
    fn reset_taken(&mut self) {}
}

impl CpuBus for FlatRam {}

#[derive(Debug, Clone)]
pub struct Cpu {
    regs: Registers,
    seq: Sequence,
    pos: usize,
    opcode: u8,
    /// Operand, RMW value or zero-page pointer.
    tmp: u8,
    /// Effective address.
    abs: u16,
    /// Page-correct indexed address (or branch target) held until the
    /// fix-up cycle.
    indexed: u16,
    needs_fix: bool,
    odd_cycle: bool,
    interrupts: Interrupts,
    dma: Dma,
    /// Locked up by a KIL opcode.
    jammed: bool,
    /// A fatal microcode error occurred.
    halted: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Power-on state with a reset pending. The first steps run the reset
    /// sequence and load PC from $FFFC.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            seq: START,
            pos: 0,
            opcode: 0,
            tmp: 0,
            abs: 0,
            indexed: 0,
            needs_fix: false,
            odd_cycle: false,
            interrupts: Interrupts::power_on(),
            dma: Dma::new(),
            jammed: false,
            halted: false,
        }
    }

    /// Start from the given registers, fetching at `regs.pc` on the next
    /// step. No reset is pending.
    #[must_use]
    pub fn with_registers(regs: Registers) -> Self {
        Self {
            regs,
            interrupts: Interrupts::default(),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Opcode of the instruction under way.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Parity flag toggled at the start of every step.
    #[must_use]
    pub fn odd_cycle(&self) -> bool {
        self.odd_cycle
    }

    #[must_use]
    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    /// True when the next step fetches an opcode (or diverts into an
    /// interrupt) rather than continuing an instruction.
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        !self.dma.is_active() && self.seq.get(self.pos) == Some(&MicroOp::Fetch)
    }

    #[must_use]
    pub fn dma(&self) -> &Dma {
        &self.dma
    }

    pub fn dma_mut(&mut self) -> &mut Dma {
        &mut self.dma
    }

    /// Queue a sprite DMA from `page` (e.g. $0200).
    pub fn request_oam_dma(&mut self, page: u16) {
        self.dma.request_oam(page);
    }

    /// Queue a DMC sample fetch from `address`.
    pub fn request_dmc_dma(&mut self, address: u16) {
        self.dma.request_dmc_dma(address);
    }

    #[must_use]
    pub fn dmc_dma_in_progress(&self) -> bool {
        self.dma.dmc_dma_in_progress()
    }

    /// Latch a reset, taken at the next opcode fetch. Also releases a KIL
    /// lock-up.
    pub fn soft_reset(&mut self) {
        log::debug!("soft reset requested at ${:04X}", self.regs.pc);
        self.interrupts.reset = true;
        if self.jammed {
            self.jammed = false;
            self.seq = START;
            self.pos = 0;
        }
    }

    /// Advance one CPU clock.
    pub fn step<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), StepError> {
        if self.halted {
            return Err(StepError::Halted);
        }
        self.odd_cycle = !self.odd_cycle;
        if self.jammed {
            return Ok(());
        }

        let Some(&op) = self.seq.get(self.pos) else {
            self.halted = true;
            let err = StepError::MicrocodeOverrun {
                opcode: self.opcode,
                position: self.pos,
            };
            log::error!("{err}");
            return Err(err);
        };

        let halt_address = self.halt_address(op);
        if self.dma.run(self.odd_cycle, halt_address, bus) {
            return Ok(());
        }

        self.pos += 1;
        if op != MicroOp::Fetch && self.seq.get(self.pos) == Some(&MicroOp::Fetch) {
            self.poll_interrupts(bus);
        }
        self.execute(op, bus);
        Ok(())
    }

    /// Address the CPU would read this cycle, or `None` for a write.
    fn halt_address(&self, op: MicroOp) -> Option<u16> {
        match op.bus_access() {
            BusAccess::Pc => Some(self.regs.pc),
            BusAccess::Pointer => Some(u16::from(self.tmp)),
            BusAccess::Effective => Some(self.abs),
            BusAccess::Stack => Some(self.regs.stack_addr()),
            BusAccess::Fixed(address) => Some(address),
            BusAccess::Write => None,
        }
    }

    fn poll_interrupts<B: CpuBus>(&mut self, bus: &mut B) {
        let nmi = bus.poll_nmi();
        let irq = bus.irq_asserted();
        self.interrupts.poll(nmi, irq, self.regs.p);
    }

    fn run_action(&mut self) {
        match alu::execute(ACTIONS[usize::from(self.opcode)], &mut self.regs, &mut self.tmp) {
            Outcome::Done => {}
            Outcome::QueueInterruptDisable(disable) => self.interrupts.pending_i = Some(disable),
            Outcome::Jam => {
                log::warn!(
                    "KIL ${:02X} at ${:04X}: CPU locked up",
                    self.opcode,
                    self.regs.pc.wrapping_sub(1)
                );
                self.jammed = true;
            }
        }
    }

    const fn branch_taken(&self, condition: Condition) -> bool {
        let p = self.regs.p;
        match condition {
            Condition::CarryClear => !p.is_set(C),
            Condition::CarrySet => p.is_set(C),
            Condition::NotEqual => !p.is_set(Z),
            Condition::Equal => p.is_set(Z),
            Condition::Plus => !p.is_set(N),
            Condition::Minus => p.is_set(N),
            Condition::OverflowClear => !p.is_set(V),
            Condition::OverflowSet => p.is_set(V),
        }
    }

    const fn index(&self, index: Index) -> u8 {
        match index {
            Index::X => self.regs.x,
            Index::Y => self.regs.y,
        }
    }

    fn read_pc_inc<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        bus.write(self.regs.stack_addr(), value);
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    /// Index the low byte of `abs` and read the high byte from `address`.
    /// A carry out of the low byte is remembered for the fix-up cycle.
    fn index_high<B: Bus>(&mut self, bus: &mut B, address: u16, index: Index) {
        let base = self.abs.wrapping_add(u16::from(self.index(index)));
        self.needs_fix = self.abs & 0xFF00 != base & 0xFF00;
        let high = u16::from(bus.read(address)) << 8;
        self.abs = high | (base & 0x00FF);
        self.indexed = base.wrapping_add(high);
    }

    /// Apply a pending page fix. Returns false if none was needed.
    fn fix_address(&mut self) -> bool {
        if self.needs_fix {
            self.abs = self.indexed;
            self.needs_fix = false;
            true
        } else {
            false
        }
    }

    fn fetch<B: CpuBus>(&mut self, bus: &mut B) {
        let opcode = bus.read(self.regs.pc);
        self.interrupts.apply_pending_i(&mut self.regs.p);
        self.pos = 0;
        match self.interrupts.take() {
            Some(Vector::Reset) => {
                log::debug!("reset");
                bus.reset_taken();
                self.seq = RESET;
            }
            Some(Vector::Nmi) => {
                log::debug!("NMI at ${:04X}", self.regs.pc);
                self.seq = NMI;
            }
            Some(Vector::Irq) => {
                log::debug!("IRQ at ${:04X}", self.regs.pc);
                bus.irq_serviced();
                self.seq = IRQ;
            }
            None => {
                self.opcode = opcode;
                self.seq = INSTRUCTIONS[usize::from(opcode)];
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
        }
    }

    fn execute<B: CpuBus>(&mut self, op: MicroOp, bus: &mut B) {
        match op {
            MicroOp::Fetch => self.fetch(bus),

            MicroOp::DummyReadPc => {
                bus.read(self.regs.pc);
            }
            MicroOp::DummyReadPcInc => {
                self.read_pc_inc(bus);
            }
            MicroOp::DummyReadPcFixBranch => {
                bus.read(self.regs.pc);
                if self.needs_fix {
                    self.regs.pc = self.indexed;
                    self.needs_fix = false;
                }
            }
            MicroOp::DummyReadPcExecute => {
                bus.read(self.regs.pc);
                self.run_action();
            }
            MicroOp::DummyReadPcAddZeroPage(index) => {
                bus.read(self.regs.pc);
                self.abs = self.abs.wrapping_add(u16::from(self.index(index))) & 0x00FF;
            }
            MicroOp::DummyReadPcPointerAddX => {
                bus.read(self.regs.pc);
                self.tmp = self.tmp.wrapping_add(self.regs.x);
            }
            MicroOp::DummyReadPcStackInc => {
                bus.read(self.regs.pc);
                self.regs.s = self.regs.s.wrapping_add(1);
            }
            MicroOp::DummyReadPcStackDec => {
                bus.read(self.regs.pc);
                self.regs.s = self.regs.s.wrapping_sub(1);
            }
            MicroOp::DummyReadPcResetFlags => {
                bus.read(self.regs.pc);
                self.regs.s = self.regs.s.wrapping_sub(1);
                self.regs.p = Status::from_byte(I);
            }

            MicroOp::ReadPcToTmp => self.tmp = self.read_pc_inc(bus),
            MicroOp::ReadImmediateExecute => {
                self.tmp = self.read_pc_inc(bus);
                self.run_action();
            }
            MicroOp::ReadBranchOffset(condition) => {
                self.tmp = self.read_pc_inc(bus);
                // Branches poll here, not on their last cycle.
                self.poll_interrupts(bus);
                if !self.branch_taken(condition) {
                    self.seq = START;
                    self.pos = 0;
                }
            }
            MicroOp::BranchSetup => {
                bus.read(self.regs.pc);
                let pc = self.regs.pc;
                self.indexed = pc.wrapping_add(self.tmp as i8 as u16);
                if pc & 0xFF00 != self.indexed & 0xFF00 {
                    self.needs_fix = true;
                } else {
                    self.pos += 1;
                }
                self.regs.pc = (pc & 0xFF00) | (self.indexed & 0x00FF);
            }
            MicroOp::JumpFromTmp => {
                let high = bus.read(self.regs.pc);
                self.regs.pc = u16::from_le_bytes([self.tmp, high]);
            }
            MicroOp::ReadZeroPageAddress | MicroOp::ReadAddressLow => {
                self.abs = u16::from(self.read_pc_inc(bus));
            }
            MicroOp::ReadAddressHigh => {
                self.abs |= u16::from(self.read_pc_inc(bus)) << 8;
            }
            MicroOp::ReadAddressHighIndexed(index) => {
                let pc = self.regs.pc;
                self.index_high(bus, pc, index);
                self.regs.pc = pc.wrapping_add(1);
            }

            MicroOp::ReadPointerLow => {
                self.abs = u16::from(bus.read(u16::from(self.tmp)));
                self.tmp = self.tmp.wrapping_add(1);
            }
            MicroOp::ReadPointerHigh => {
                self.abs |= u16::from(bus.read(u16::from(self.tmp))) << 8;
            }
            MicroOp::ReadPointerHighIndexedY => {
                self.index_high(bus, u16::from(self.tmp), Index::Y);
            }

            MicroOp::ReadEffective => self.tmp = bus.read(self.abs),
            MicroOp::ReadEffectiveFixup => {
                self.tmp = bus.read(self.abs);
                self.fix_address();
            }
            MicroOp::ReadEffectiveExecute => {
                self.tmp = bus.read(self.abs);
                self.run_action();
            }
            MicroOp::ReadEffectiveExecuteFixup => {
                self.tmp = bus.read(self.abs);
                if !self.fix_address() {
                    // No page crossed: this was the last cycle.
                    self.pos += 1;
                    self.poll_interrupts(bus);
                    self.run_action();
                }
            }
            MicroOp::JumpIndirectHigh => {
                let low = self.tmp;
                // The pointer's low byte wraps without carrying into its page.
                self.abs = (self.abs & 0xFF00) | (self.abs.wrapping_add(1) & 0x00FF);
                let high = bus.read(self.abs);
                self.regs.pc = u16::from_le_bytes([low, high]);
            }

            MicroOp::WriteTmp => bus.write(self.abs, self.tmp),
            MicroOp::Store(source) => {
                let value = match source {
                    StoreSource::A => self.regs.a,
                    StoreSource::X => self.regs.x,
                    StoreSource::Y => self.regs.y,
                    StoreSource::AX => self.regs.a & self.regs.x,
                };
                bus.write(self.abs, value);
            }
            MicroOp::StoreUnstable(store) => self.store_unstable(bus, store),
            MicroOp::WriteTmpExecute => {
                bus.write(self.abs, self.tmp);
                self.run_action();
            }

            MicroOp::PullA => {
                let value = bus.read(self.regs.stack_addr());
                self.regs.set_a(value);
            }
            MicroOp::PullP => {
                let value = bus.read(self.regs.stack_addr());
                let keep_i = self.regs.p.bits() & I;
                self.regs.p = Status::from_byte((value & !I) | keep_i);
                self.interrupts.pending_i = Some(value & I != 0);
            }
            MicroOp::PullPInc => {
                self.regs.p = Status::from_byte(bus.read(self.regs.stack_addr()));
                self.regs.s = self.regs.s.wrapping_add(1);
            }
            MicroOp::PullPcLowInc => {
                let low = bus.read(self.regs.stack_addr());
                self.regs.pc = (self.regs.pc & 0xFF00) | u16::from(low);
                self.regs.s = self.regs.s.wrapping_add(1);
            }
            MicroOp::PullPcHigh => {
                let high = bus.read(self.regs.stack_addr());
                self.regs.pc = (self.regs.pc & 0x00FF) | (u16::from(high) << 8);
            }
            MicroOp::PushA => self.push(bus, self.regs.a),
            MicroOp::PushP => self.push(bus, self.regs.p.to_byte_brk()),
            MicroOp::PushPcHigh => self.push(bus, (self.regs.pc >> 8) as u8),
            MicroOp::PushPcLow => self.push(bus, self.regs.pc as u8),
            MicroOp::PushPNmi => {
                self.push(bus, self.regs.p.to_byte_nmi());
                self.regs.p.set(I);
            }
            MicroOp::PushPBreak => {
                self.push(bus, self.regs.p.to_byte_brk());
                self.regs.p.set(I);
            }

            MicroOp::ReadVectorLow(vector) => {
                let low = bus.read(vector.address());
                self.regs.pc = (self.regs.pc & 0xFF00) | u16::from(low);
            }
            MicroOp::ReadVectorHigh(vector) => {
                let high = bus.read(vector.address() + 1);
                self.regs.pc = (self.regs.pc & 0x00FF) | (u16::from(high) << 8);
            }
        }
    }

    /// SHA/SHX/SHY/TAS: the value is ANDed with the base page + 1, and on
    /// a page crossing that value also replaces the target's high byte.
    fn store_unstable<B: Bus>(&mut self, bus: &mut B, store: UnstableStore) {
        let high = ((self.abs >> 8) as u8).wrapping_add(1);
        let source = match store {
            UnstableStore::Sha => self.regs.a & self.regs.x,
            UnstableStore::Tas => {
                self.regs.s = self.regs.a & self.regs.x;
                self.regs.s
            }
            UnstableStore::Shy => self.regs.y,
            UnstableStore::Shx => self.regs.x,
        };
        let value = source & high;
        if self.needs_fix {
            self.abs = (u16::from(value) << 8) | (self.abs & 0x00FF);
            self.needs_fix = false;
        }
        bus.write(self.abs, value);
    }
}

const QUERY_PATHS: &[&str] = &[
    "pc",
    "a",
    "x",
    "y",
    "s",
    "p",
    "flags.c",
    "flags.z",
    "flags.i",
    "flags.d",
    "flags.v",
    "flags.n",
    "opcode",
    "odd_cycle",
    "jammed",
    "dma.active",
    "dma.oam",
    "dma.dmc",
];

impl Observable for Cpu {
    fn query(&self, path: &str) -> Option<Value> {
        let p = self.regs.p;
        let value = match path {
            "pc" => self.regs.pc.into(),
            "a" => self.regs.a.into(),
            "x" => self.regs.x.into(),
            "y" => self.regs.y.into(),
            "s" => self.regs.s.into(),
            "p" => p.bits().into(),
            "flags.c" => p.is_set(C).into(),
            "flags.z" => p.is_set(Z).into(),
            "flags.i" => p.is_set(I).into(),
            "flags.d" => p.is_set(D).into(),
            "flags.v" => p.is_set(V).into(),
            "flags.n" => p.is_set(N).into(),
            "opcode" => self.opcode.into(),
            "odd_cycle" => self.odd_cycle.into(),
            "jammed" => self.jammed.into(),
            "dma.active" => self.dma.is_active().into(),
            "dma.oam" => self.dma.oam_in_progress().into(),
            "dma.dmc" => self.dmc_dma_in_progress().into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_at(ram: &mut FlatRam, program: &[u8]) -> Cpu {
        ram.load(0x8000, program);
        Cpu::with_registers(Registers {
            pc: 0x8000,
            s: 0xFD,
            ..Registers::new()
        })
    }

    /// Step until the next instruction boundary; returns cycles taken.
    fn run_instruction(cpu: &mut Cpu, ram: &mut FlatRam) -> u32 {
        let mut cycles = 0;
        loop {
            cpu.step(ram).expect("step");
            cycles += 1;
            if cpu.at_instruction_boundary() {
                return cycles;
            }
        }
    }

    #[test]
    fn power_on_runs_reset_sequence() {
        let mut ram = FlatRam::new();
        ram.poke_word(0xFFFC, 0xC000);
        let mut cpu = Cpu::new();
        // Fetch (diverted), five reset cycles.
        for _ in 0..6 {
            cpu.step(&mut ram).expect("step");
        }
        assert!(cpu.at_instruction_boundary());
        assert_eq!(cpu.regs().pc, 0xC000);
        assert_eq!(cpu.regs().s, 0xFD);
        assert!(cpu.regs().p.is_set(I));
    }

    #[test]
    fn lda_immediate_then_sta_absolute() {
        let mut ram = FlatRam::new();
        let mut cpu = cpu_at(&mut ram, &[0xA9, 0x80, 0x8D, 0x34, 0x12]);
        cpu.step(&mut ram).expect("fetch");
        assert_eq!(run_instruction(&mut cpu, &mut ram), 1);
        assert_eq!(cpu.regs().a, 0x80);
        assert!(cpu.regs().p.is_set(N));
        run_instruction(&mut cpu, &mut ram);
        assert_eq!(ram.peek(0x1234), 0x80);
    }

    #[test]
    fn zero_page_index_wraps() {
        let mut ram = FlatRam::new();
        ram.poke(0x007F, 0x42);
        let mut cpu = cpu_at(&mut ram, &[0xB5, 0x80, 0xEA]);
        cpu.regs_mut().x = 0xFF;
        for _ in 0..5 {
            cpu.step(&mut ram).expect("step");
        }
        assert_eq!(cpu.regs().a, 0x42);
    }

    #[test]
    fn rmw_writes_old_value_first() {
        struct Log(FlatRam, Vec<(u16, u8)>);
        impl Bus for Log {
            fn read(&mut self, address: u16) -> u8 {
                self.0.read(address)
            }
            fn write(&mut self, address: u16, value: u8) {
                self.1.push((address, value));
                self.0.write(address, value);
            }
        }
        impl CpuBus for Log {}

        let mut ram = FlatRam::new();
        ram.poke(0x0010, 0x41);
        let mut cpu = cpu_at(&mut ram, &[0xE6, 0x10]);
        let mut bus = Log(ram, Vec::new());
        for _ in 0..6 {
            cpu.step(&mut bus).expect("step");
        }
        assert_eq!(bus.1, vec![(0x0010, 0x41), (0x0010, 0x42)]);
    }

    #[test]
    fn jsr_rts_round_trip() {
        let mut ram = FlatRam::new();
        ram.poke(0x9000, 0x60);
        let mut cpu = cpu_at(&mut ram, &[0x20, 0x00, 0x90, 0xEA]);
        cpu.step(&mut ram).expect("fetch");
        assert_eq!(run_instruction(&mut cpu, &mut ram), 5);
        assert_eq!(cpu.regs().pc, 0x9000);
        assert_eq!(ram.peek(0x01FD), 0x80);
        assert_eq!(ram.peek(0x01FC), 0x02);
        assert_eq!(run_instruction(&mut cpu, &mut ram), 6);
        assert_eq!(cpu.regs().pc, 0x8003);
        assert_eq!(cpu.regs().s, 0xFD);
    }

    #[test]
    fn kil_locks_up_until_soft_reset() {
        let mut ram = FlatRam::new();
        ram.poke_word(0xFFFC, 0x8000);
        let mut cpu = cpu_at(&mut ram, &[0x02]);
        for _ in 0..10 {
            cpu.step(&mut ram).expect("jammed is not an error");
        }
        assert!(cpu.is_jammed());
        assert_eq!(cpu.query("jammed"), Some(Value::Bool(true)));
        cpu.soft_reset();
        assert!(!cpu.is_jammed());
        for _ in 0..6 {
            cpu.step(&mut ram).expect("step");
        }
        assert_eq!(cpu.regs().pc, 0x8000);
    }

    #[test]
    fn overrun_halts_the_engine() {
        static BROKEN: [MicroOp; 1] = [MicroOp::DummyReadPc];
        let mut ram = FlatRam::new();
        let mut cpu = Cpu::new();
        cpu.seq = &BROKEN;
        cpu.step(&mut ram).expect("first op is valid");
        assert_eq!(
            cpu.step(&mut ram),
            Err(StepError::MicrocodeOverrun {
                opcode: 0,
                position: 1
            })
        );
        assert_eq!(cpu.step(&mut ram), Err(StepError::Halted));
    }

    #[test]
    fn unstable_store_remaps_page_on_crossing() {
        let mut ram = FlatRam::new();
        // SHY $12F0,X with X = $20: crosses into $13.
        let mut cpu = cpu_at(&mut ram, &[0x9C, 0xF0, 0x12]);
        cpu.regs_mut().x = 0x20;
        cpu.regs_mut().y = 0xFF;
        for _ in 0..6 {
            cpu.step(&mut ram).expect("step");
        }
        // Y & ($12 + 1) = $13, written to $1310.
        assert_eq!(ram.peek(0x1310), 0x13);
    }

    #[test]
    fn cli_takes_effect_after_next_instruction() {
        let mut ram = FlatRam::new();
        let mut cpu = cpu_at(&mut ram, &[0x58, 0xEA]);
        cpu.regs_mut().p.set(I);
        cpu.step(&mut ram).expect("fetch CLI");
        cpu.step(&mut ram).expect("CLI");
        assert!(cpu.regs().p.is_set(I), "still masked until the next fetch");
        cpu.step(&mut ram).expect("fetch NOP");
        assert!(!cpu.regs().p.is_set(I));
    }

    #[test]
    fn query_paths_resolve() {
        let cpu = Cpu::new();
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
        assert_eq!(cpu.query("p"), Some(Value::U8(0x20)));
        assert_eq!(cpu.query("bogus"), None);
    }
}
