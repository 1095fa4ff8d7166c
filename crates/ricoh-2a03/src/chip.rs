//! The whole chip: CPU, APU and the on-die register window.
//!
//! The 2A03 decodes $4000-$4017 itself. Audio registers go to the APU,
//! $4014 starts sprite DMA on write, and everything else (including $4014
//! and the controller ports at $4016/$4017 on read) goes out to the system
//! bus.

use emu_core::{Bus, FlatRam, IrqLine, IrqSource, Observable, Value};
use ricoh_apu_2a03::{Apu, AudioSink};

use crate::cpu::CpuBus;
use crate::{CoreConfig, Cpu, Registers, StepError};

/// Cartridge mapper interrupt.
pub const MAPPER_IRQ: IrqSource = IrqSource::new(2);
/// Interrupts from expansion hardware such as the disk system.
pub const EXPANSION_IRQ: IrqSource = IrqSource::new(3);

const OAM_DMA: u16 = 0x4014;
const APU_STATUS: u8 = 0x15;

/// Everything outside the chip: RAM, PPU, cartridge, controllers.
pub trait SystemBus: Bus {
    /// True when the PPU has an NMI edge pending. Reading it consumes it.
    fn poll_nmi(&mut self) -> bool {
        false
    }
}

impl SystemBus for FlatRam {}

/// The CPU's bus for one tick: the register window in front of the
/// system bus.
struct IoBus<'a, S> {
    bus: &'a mut S,
    apu: &'a mut Apu,
    irq: &'a mut IrqLine,
    oam_page: Option<u8>,
}

impl<S: SystemBus> Bus for IoBus<'_, S> {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x4000..=0x4013 | 0x4015 => {
                self.apu.read_register((address - 0x4000) as u8, self.irq)
            }
            _ => self.bus.read(address),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            OAM_DMA => self.oam_page = Some(value),
            0x4000..=0x4013 | 0x4015 | 0x4017 => {
                self.apu
                    .write_register((address - 0x4000) as u8, value, self.irq);
            }
            _ => self.bus.write(address, value),
        }
    }
}

impl<S: SystemBus> CpuBus for IoBus<'_, S> {
    fn poll_nmi(&mut self) -> bool {
        self.bus.poll_nmi()
    }

    fn irq_asserted(&self) -> bool {
        self.irq.is_asserted()
    }

    fn irq_serviced(&mut self) {
        self.irq.service();
    }

    fn dmc_byte(&mut self, value: u8) {
        self.apu.receive_dmc_byte(value, self.irq);
    }

    fn reset_taken(&mut self) {
        self.apu.write_register(APU_STATUS, 0, self.irq);
    }
}

/// Ricoh 2A03 (NTSC) / 2A07 (PAL).
pub struct Ricoh2A03 {
    cpu: Cpu,
    apu: Apu,
    irq: IrqLine,
}

impl Ricoh2A03 {
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        let cpu = if config.power_on_reset {
            Cpu::new()
        } else {
            Cpu::with_registers(Registers::new())
        };
        Self {
            cpu,
            apu: Apu::new(config.apu),
            irq: IrqLine::new(),
        }
    }

    /// Advance one CPU clock: a CPU (or DMA) cycle, then an APU cycle.
    pub fn tick<S: SystemBus>(&mut self, bus: &mut S) -> Result<(), StepError> {
        let mut io = IoBus {
            bus,
            apu: &mut self.apu,
            irq: &mut self.irq,
            oam_page: None,
        };
        self.cpu.step(&mut io)?;
        if let Some(page) = io.oam_page {
            self.cpu.request_oam_dma(u16::from(page) << 8);
        }
        let odd = self.cpu.odd_cycle();
        self.apu.tick(odd, self.cpu.dma_mut(), &mut self.irq);
        Ok(())
    }

    /// Latch a reset for the next instruction boundary.
    pub fn soft_reset(&mut self) {
        self.cpu.soft_reset();
    }

    pub fn request_oam_dma(&mut self, page: u16) {
        self.cpu.request_oam_dma(page);
    }

    pub fn request_dmc_dma(&mut self, address: u16) {
        self.cpu.request_dmc_dma(address);
    }

    #[must_use]
    pub fn dmc_dma_in_progress(&self) -> bool {
        self.cpu.dmc_dma_in_progress()
    }

    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    #[must_use]
    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    /// The shared IRQ line. Mappers assert [`MAPPER_IRQ`] here.
    #[must_use]
    pub fn irq(&self) -> &IrqLine {
        &self.irq
    }

    pub fn irq_mut(&mut self) -> &mut IrqLine {
        &mut self.irq
    }

    /// Audio output rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.apu.sample_rate()
    }

    /// Interleaved stereo samples written since the last flush.
    #[must_use]
    pub fn audio_buffer(&self) -> &[u8] {
        self.apu.output_bytes()
    }

    /// Filled length of [`audio_buffer`](Self::audio_buffer) in bytes.
    #[must_use]
    pub fn audio_len(&self) -> usize {
        self.apu.output_len()
    }

    pub fn flush_audio<A: AudioSink>(&mut self, sink: &mut A) -> bool {
        self.apu.flush(sink)
    }

    /// True while the host audio queue is behind.
    #[must_use]
    pub fn frame_skip(&self) -> bool {
        self.apu.frame_skip()
    }
}

const QUERY_PATHS: &[&str] = &[
    "cpu.pc",
    "cpu.a",
    "cpu.x",
    "cpu.y",
    "cpu.s",
    "cpu.p",
    "cpu.flags.c",
    "cpu.flags.z",
    "cpu.flags.i",
    "cpu.flags.d",
    "cpu.flags.v",
    "cpu.flags.n",
    "cpu.opcode",
    "cpu.odd_cycle",
    "cpu.jammed",
    "cpu.dma.active",
    "cpu.dma.oam",
    "cpu.dma.dmc",
    "apu.frame.mode",
    "apu.frame.step",
    "apu.frame.irq",
    "apu.pulse1.length",
    "apu.pulse2.length",
    "apu.triangle.length",
    "apu.triangle.linear",
    "apu.noise.length",
    "apu.noise.shift",
    "apu.dmc.level",
    "apu.dmc.address",
    "apu.dmc.remaining",
    "apu.filter.low_pass",
    "apu.filter.high_pass",
    "apu.buffer.samples",
    "apu.frame_skip",
    "irq",
];

impl Observable for Ricoh2A03 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("apu.") {
            self.apu.query(rest)
        } else if path == "irq" {
            Some(self.irq.bits().into())
        } else {
            None
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_resolves() {
        let chip = Ricoh2A03::new(CoreConfig::default());
        for path in chip.query_paths() {
            assert!(chip.query(path).is_some(), "{path}");
        }
        assert_eq!(chip.query("cpu.bogus"), None);
    }

    #[test]
    fn reset_silences_the_apu() {
        let mut ram = FlatRam::new();
        ram.poke_word(0xFFFC, 0x8000);
        let mut chip = Ricoh2A03::new(CoreConfig::default());
        chip.apu.write_register(0x15, 0x01, &mut chip.irq);
        chip.apu.write_register(0x03, 0x08, &mut chip.irq);
        assert_eq!(chip.apu.status(&chip.irq) & 0x01, 0x01);
        // The first tick fetches and diverts into the reset sequence.
        chip.tick(&mut ram).expect("tick");
        assert_eq!(chip.apu.status(&chip.irq) & 0x01, 0);
    }

    #[test]
    fn mapper_irq_reaches_the_cpu() {
        let mut ram = FlatRam::new();
        ram.poke_word(0xFFFE, 0x9000);
        // CLI; NOP; NOP
        ram.load(0x8000, &[0x58, 0xEA, 0xEA, 0xEA]);
        let mut chip = Ricoh2A03::new(CoreConfig {
            power_on_reset: false,
            ..CoreConfig::default()
        });
        chip.cpu_mut().regs_mut().pc = 0x8000;
        chip.cpu_mut().regs_mut().s = 0xFD;
        chip.cpu_mut().regs_mut().p.set(crate::flags::I);
        chip.irq_mut().assert(MAPPER_IRQ);
        let mut entered = false;
        for _ in 0..30 {
            chip.tick(&mut ram).expect("tick");
            if chip.cpu().regs().pc == 0x9000 {
                entered = true;
                break;
            }
        }
        assert!(entered, "IRQ vector taken once I cleared");
        assert!(chip.cpu().regs().p.is_set(crate::flags::I));
        assert_eq!(
            ram.peek(0x01FB) & crate::flags::B,
            crate::flags::B,
            "B set on IRQ push"
        );
    }
}
