//! Interrupt latches sampled by the execution engine.
//!
//! NMI and IRQ are polled on the last cycle of each instruction and
//! latched here. The latches are consumed at the next opcode fetch in
//! priority order: reset, then NMI, then IRQ.

use crate::flags::I;
use crate::microcode::Vector;
use crate::Status;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Interrupts {
    pub(crate) reset: bool,
    pub(crate) nmi: bool,
    pub(crate) irq: bool,
    /// I-flag change queued by CLI, SEI or PLP. Applied at the next fetch,
    /// so the instruction after it still sees the old mask.
    pub(crate) pending_i: Option<bool>,
}

impl Interrupts {
    /// Latches at power-on: a reset is pending.
    pub(crate) const fn power_on() -> Self {
        Self {
            reset: true,
            nmi: false,
            irq: false,
            pending_i: None,
        }
    }

    /// Sample the NMI edge and the IRQ level. The IRQ is only latched
    /// while I is clear; once latched it stays latched until taken.
    pub(crate) fn poll(&mut self, nmi: bool, irq_line: bool, p: Status) {
        self.nmi |= nmi;
        self.irq |= irq_line && !p.is_set(I);
    }

    /// Apply a queued I change.
    pub(crate) fn apply_pending_i(&mut self, p: &mut Status) {
        if let Some(disable) = self.pending_i.take() {
            p.set_if(I, disable);
        }
    }

    /// Highest-priority latched interrupt. Taking one drops the latches
    /// below it; a level-triggered IRQ that is still asserted is simply
    /// polled again later.
    pub(crate) fn take(&mut self) -> Option<Vector> {
        if self.reset {
            self.reset = false;
            self.nmi = false;
            self.irq = false;
            Some(Vector::Reset)
        } else if self.nmi {
            self.nmi = false;
            self.irq = false;
            Some(Vector::Nmi)
        } else if self.irq {
            self.irq = false;
            Some(Vector::Irq)
        } else {
            None
        }
    }
}
