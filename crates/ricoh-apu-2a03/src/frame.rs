//! Frame sequencer ($4017).
//!
//! A down-counter walks positions 0-5 of a per-mode tick table. Four-step
//! mode clocks length/sweep at positions 1 and 4, envelopes at 0, 1, 2
//! and 4, and raises the frame IRQ flag at 3, 4 and 5 (the CPU line is
//! pulled at 4). Five-step mode clocks length/sweep at 0 and 3, envelopes
//! at 0, 2, 3 and 4, and never interrupts.

use emu_core::IrqLine;

use crate::Region;
use crate::apu::FRAME_IRQ;

/// Which frame clocks fire on this CPU cycle.
///
/// A half-frame clock always comes with a quarter-frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameClock {
    None,
    Quarter,
    Half,
}

#[derive(Debug, Clone)]
pub(crate) struct FrameSequencer {
    region: Region,
    pub(crate) five_step: bool,
    pub(crate) step: u8,
    pub(crate) counter: u16,
    irq_enabled: bool,
    /// Frame interrupt flag as read back through $4015 bit 6.
    pub(crate) irq_flag: bool,
    /// Mode written to $4017, waiting for the right cycle parity.
    pending_mode: Option<bool>,
}

impl FrameSequencer {
    pub(crate) fn new(region: Region) -> Self {
        Self {
            region,
            five_step: false,
            step: 5,
            counter: region.four_step_reload(),
            irq_enabled: true,
            irq_flag: false,
            pending_mode: None,
        }
    }

    /// $4017: bit 7 selects five-step mode, bit 6 inhibits the IRQ.
    pub(crate) fn write(&mut self, value: u8, irq: &mut IrqLine) {
        self.irq_enabled = value & 0x40 == 0;
        if !self.irq_enabled {
            self.acknowledge(irq);
        }
        self.pending_mode = Some(value & 0x80 != 0);
    }

    /// $4015 read side effect.
    pub(crate) fn acknowledge(&mut self, irq: &mut IrqLine) {
        self.irq_flag = false;
        irq.acknowledge(FRAME_IRQ);
    }

    /// Advance one CPU clock. `odd_cycle` is the CPU's parity flag for the
    /// cycle that just ran.
    pub(crate) fn tick(&mut self, odd_cycle: bool, irq: &mut IrqLine) -> FrameClock {
        if let (true, Some(five_step)) = (odd_cycle, self.pending_mode) {
            self.pending_mode = None;
            self.five_step = five_step;
            self.step = 5;
            self.counter = if five_step {
                1
            } else {
                self.region.four_step_reload()
            };
            log::trace!(
                "frame sequencer switched to {} mode",
                if five_step { "five-step" } else { "four-step" }
            );
        }

        if self.counter > 0 {
            self.counter -= 1;
            return FrameClock::None;
        }

        self.step = if self.step == 5 { 0 } else { self.step + 1 };
        let ticks = if self.five_step {
            self.region.five_step_ticks()
        } else {
            self.region.four_step_ticks()
        };
        self.counter = ticks[usize::from(self.step)] - 1;

        if self.five_step {
            match self.step {
                0 | 3 => FrameClock::Half,
                1 | 5 => FrameClock::None,
                _ => FrameClock::Quarter,
            }
        } else {
            match self.step {
                1 => FrameClock::Half,
                3 | 5 => {
                    if self.irq_enabled {
                        self.irq_flag = true;
                    }
                    FrameClock::None
                }
                4 => {
                    if self.irq_enabled {
                        self.irq_flag = true;
                        irq.assert(FRAME_IRQ);
                    }
                    FrameClock::Half
                }
                _ => FrameClock::Quarter,
            }
        }
    }
}
