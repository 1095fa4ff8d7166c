//! DMA arbitration between sprite (OAM) and sample (DMC) transfers.
//!
//! Both engines halt the CPU on a read cycle and then own the bus. OAM
//! DMA alternates get (even cycle) and put (odd cycle) for 256 bytes. DMC
//! DMA does one dummy cycle, then fetches its byte on an even cycle. When
//! both want the bus, DMC wins the cycle and OAM resumes where it left off.

use ricoh_apu_2a03::DmcDma;

use crate::cpu::CpuBus;

/// PPU OAM data port.
const OAM_DATA: u16 = 0x2004;

#[derive(Debug, Clone, Default)]
pub struct Dma {
    oam_requested: bool,
    dmc_requested: bool,
    /// The CPU is halted and the bus belongs to DMA.
    active: bool,
    /// An OAM byte has been read and is waiting for its put cycle.
    oam_ready: bool,
    dmc_dummy_read: bool,
    dmc_halted: bool,
    oam_halted: bool,
    /// The first DMC halt attempt landed on a write cycle.
    dmc_halt_attempted: bool,
    /// DMC took the bus on a retry; OAM sits out until the byte arrives.
    oam_paused: bool,
    oam_page: u16,
    oam_offset: u8,
    oam_value: u8,
    dmc_address: u16,
}

impl Dma {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a 256-byte copy from `page` (already shifted, e.g. $0200) to
    /// the PPU's OAM port.
    pub fn request_oam(&mut self, page: u16) {
        log::debug!("OAM DMA requested from ${page:04X}");
        self.oam_requested = true;
        self.oam_page = page & 0xFF00;
    }

    /// True while the CPU is halted for DMA.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn oam_in_progress(&self) -> bool {
        self.oam_requested
    }

    /// Next byte offset within the OAM source page.
    #[must_use]
    pub fn oam_offset(&self) -> u8 {
        self.oam_offset
    }

    /// Try to halt the CPU. Only a read cycle can be stolen; the CPU's
    /// read is repeated as the halt cycle.
    fn take_over<B: CpuBus>(&mut self, halt_address: Option<u16>, bus: &mut B) -> bool {
        let Some(address) = halt_address else {
            return false;
        };
        bus.read(address);
        self.active = true;
        self.oam_offset = 0;
        self.oam_ready = false;
        self.dmc_dummy_read = true;
        true
    }

    fn halt_read<B: CpuBus>(halt_address: Option<u16>, bus: &mut B) {
        if let Some(address) = halt_address {
            bus.read(address);
        }
    }

    /// Run one cycle of arbitration.
    ///
    /// `halt_address` is what the CPU would read this cycle, or `None` on a
    /// write cycle. Returns true if DMA owned the bus and the CPU must not
    /// run its micro-op.
    pub(crate) fn run<B: CpuBus>(
        &mut self,
        odd_cycle: bool,
        halt_address: Option<u16>,
        bus: &mut B,
    ) -> bool {
        if self.dmc_requested {
            if self.active && self.dmc_halted {
                if self.dmc_dummy_read {
                    self.dmc_dummy_read = false;
                    if !self.oam_requested || self.oam_paused {
                        Self::halt_read(halt_address, bus);
                        return true;
                    }
                } else if !odd_cycle {
                    let value = bus.read(self.dmc_address);
                    log::trace!("DMC DMA ${:04X} = ${value:02X}", self.dmc_address);
                    bus.dmc_byte(value);
                    self.dmc_requested = false;
                    if !self.oam_halted {
                        self.active = false;
                    }
                    self.dmc_halt_attempted = false;
                    self.dmc_halted = false;
                    return true;
                } else if !self.oam_requested || self.oam_paused {
                    Self::halt_read(halt_address, bus);
                    return true;
                }
            } else if odd_cycle || self.dmc_halt_attempted {
                if self.active || self.take_over(halt_address, bus) {
                    self.dmc_halted = true;
                    self.oam_paused = self.oam_requested && self.dmc_halt_attempted;
                } else {
                    self.dmc_halt_attempted = true;
                }
            }
        }

        if self.oam_requested {
            if self.active && self.oam_halted {
                if !odd_cycle {
                    self.oam_value = bus.read(self.oam_page | u16::from(self.oam_offset));
                    self.oam_ready = true;
                } else if self.oam_ready {
                    self.oam_ready = false;
                    bus.write(OAM_DATA, self.oam_value);
                    self.oam_offset = self.oam_offset.wrapping_add(1);
                    if self.oam_offset == 0 {
                        log::debug!("OAM DMA from ${:04X} done", self.oam_page);
                        self.oam_requested = false;
                        if !self.dmc_halted {
                            self.active = false;
                        }
                        self.oam_halted = false;
                    }
                } else {
                    // Alignment cycle.
                    Self::halt_read(halt_address, bus);
                }
                return true;
            } else if self.active || self.take_over(halt_address, bus) {
                self.oam_halted = true;
            }
        }

        self.active
    }
}

impl DmcDma for Dma {
    fn dmc_dma_in_progress(&self) -> bool {
        self.dmc_requested
    }

    fn request_dmc_dma(&mut self, address: u16) {
        self.dmc_requested = true;
        self.dmc_address = address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::{Bus, FlatRam};

    #[derive(Default)]
    struct Recorder {
        ram: FlatRam,
        reads: Vec<u16>,
        oam: Vec<u8>,
        dmc: Vec<u8>,
    }

    impl Bus for Recorder {
        fn read(&mut self, address: u16) -> u8 {
            self.reads.push(address);
            self.ram.read(address)
        }

        fn write(&mut self, address: u16, value: u8) {
            if address == OAM_DATA {
                self.oam.push(value);
            }
            self.ram.write(address, value);
        }
    }

    impl CpuBus for Recorder {
        fn dmc_byte(&mut self, value: u8) {
            self.dmc.push(value);
        }
    }

    /// Run until DMA releases the bus; returns the number of owned cycles.
    fn drain(dma: &mut Dma, bus: &mut Recorder, mut odd: bool, cpu_reads: bool) -> u32 {
        let halt = cpu_reads.then_some(0x8000);
        let mut cycles = 0;
        loop {
            odd = !odd;
            if !dma.run(odd, halt, bus) {
                return cycles;
            }
            cycles += 1;
            assert!(cycles < 1000, "DMA never finished");
        }
    }

    #[test]
    fn oam_dma_takes_513_or_514_cycles() {
        for (start_odd, expected) in [(false, 513), (true, 514)] {
            let mut dma = Dma::new();
            let mut bus = Recorder::default();
            for i in 0..=255u8 {
                bus.ram.poke(0x0200 | u16::from(i), i);
            }
            dma.request_oam(0x0200);
            // The first cycle's parity is the opposite of `start_odd`.
            let cycles = drain(&mut dma, &mut bus, start_odd, true);
            assert_eq!(cycles, expected, "start parity {start_odd}");
            assert_eq!(bus.oam, (0..=255).collect::<Vec<u8>>());
            assert!(!dma.is_active());
        }
    }

    #[test]
    fn oam_dma_waits_for_a_read_cycle() {
        let mut dma = Dma::new();
        let mut bus = Recorder::default();
        dma.request_oam(0x0300);
        assert!(!dma.run(true, None, &mut bus), "write cycles are not stolen");
        assert!(!dma.is_active());
        assert!(dma.run(false, Some(0x1234), &mut bus));
        assert_eq!(bus.reads, vec![0x1234]);
    }

    #[test]
    fn dmc_first_attempt_only_on_odd_cycle() {
        let mut dma = Dma::new();
        let mut bus = Recorder::default();
        bus.ram.poke(0xC000, 0x5A);
        dma.request_dmc_dma(0xC000);
        assert!(!dma.run(false, Some(0x8000), &mut bus));
        assert!(dma.dmc_dma_in_progress());
        // Halt (odd), dummy (even)... the byte lands on the next even cycle.
        let cycles = drain(&mut dma, &mut bus, false, true);
        assert_eq!(bus.dmc, vec![0x5A]);
        assert_eq!(cycles, 4);
        assert!(!dma.dmc_dma_in_progress());
    }

    #[test]
    fn dmc_retries_on_any_cycle_after_a_write() {
        let mut dma = Dma::new();
        let mut bus = Recorder::default();
        dma.request_dmc_dma(0xC000);
        assert!(!dma.run(true, None, &mut bus));
        assert!(dma.run(false, Some(0x8000), &mut bus), "retry on even cycle");
    }

    /// OAM transfer that gets a DMC request after `before` owned cycles.
    /// Returns the total cycles DMA held the bus.
    fn oam_with_dmc(start_odd: bool, before: u32) -> (u32, Recorder) {
        let mut dma = Dma::new();
        let mut bus = Recorder::default();
        for i in 0..=255u8 {
            bus.ram.poke(0x0700 | u16::from(i), i);
        }
        bus.ram.poke(0xC123, 0x99);
        dma.request_oam(0x0700);
        let mut odd = start_odd;
        for _ in 0..before {
            odd = !odd;
            assert!(dma.run(odd, Some(0x8000), &mut bus));
        }
        dma.request_dmc_dma(0xC123);
        let rest = drain(&mut dma, &mut bus, odd, true);
        assert!(!dma.is_active());
        (before + rest, bus)
    }

    #[test]
    fn dmc_pauses_oam_without_losing_position() {
        let mut dma = Dma::new();
        let mut bus = Recorder::default();
        for i in 0..=255u8 {
            bus.ram.poke(0x0700 | u16::from(i), i);
        }
        bus.ram.poke(0xC123, 0x99);
        dma.request_oam(0x0700);
        let mut odd = false;
        for _ in 0..101 {
            odd = !odd;
            assert!(dma.run(odd, Some(0x8000), &mut bus));
        }
        assert_eq!(dma.oam_offset(), 50);
        dma.request_dmc_dma(0xC123);
        let rest = drain(&mut dma, &mut bus, odd, true);
        assert_eq!(101 + rest, 513 + 2);
        assert_eq!(bus.dmc, vec![0x99]);
        assert_eq!(bus.oam, (0..=255).collect::<Vec<u8>>(), "OAM order intact");
        assert!(!dma.is_active());
    }

    #[test]
    fn dmc_cost_inside_oam_depends_on_the_remaining_pairs() {
        // (takeover parity, cycles before the request, total)
        let cases = [
            (false, 0, 513 + 2),
            (false, 100, 513 + 2),
            (false, 509, 513 + 1),
            (false, 510, 513 + 1),
            (false, 511, 513 + 3),
            (false, 512, 513 + 3),
            (true, 0, 514 + 2),
            (true, 101, 514 + 2),
            (true, 510, 514 + 1),
            (true, 512, 514 + 3),
            (true, 513, 514 + 3),
        ];
        for (start_odd, before, total) in cases {
            let (cycles, bus) = oam_with_dmc(start_odd, before);
            assert_eq!(cycles, total, "start parity {start_odd}, request after {before}");
            assert_eq!(bus.dmc, vec![0x99]);
            assert_eq!(bus.oam, (0..=255).collect::<Vec<u8>>());
        }
    }
}
