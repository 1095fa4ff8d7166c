//! Wired-OR interrupt request line.
//!
//! Several devices can pull the CPU's IRQ input low at once. The line
//! stays asserted until every source has been acknowledged, so each
//! source owns one bit.

/// One device driving the shared IRQ line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrqSource(u8);

impl IrqSource {
    /// Source occupying bit `bit` (0-7) of the line.
    #[must_use]
    pub const fn new(bit: u8) -> Self {
        Self(1 << bit)
    }

    /// Bit mask of this source.
    #[must_use]
    pub const fn mask(self) -> u8 {
        self.0
    }
}

/// Level-triggered IRQ line aggregated from up to eight sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqLine {
    bits: u8,
    /// Sources whose request is dropped when the CPU services an IRQ.
    auto_ack: u8,
}

impl IrqLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: 0,
            auto_ack: 0,
        }
    }

    /// Pull the line on behalf of `source`.
    pub fn assert(&mut self, source: IrqSource) {
        self.bits |= source.mask();
    }

    /// Release `source`'s request.
    pub fn acknowledge(&mut self, source: IrqSource) {
        self.bits &= !source.mask();
    }

    /// Drive `source` to the given level.
    pub fn set(&mut self, source: IrqSource, asserted: bool) {
        if asserted {
            self.assert(source);
        } else {
            self.acknowledge(source);
        }
    }

    /// True if `source` is currently requesting.
    #[must_use]
    pub const fn is_asserted_by(&self, source: IrqSource) -> bool {
        self.bits & source.mask() != 0
    }

    /// True if any source is requesting.
    #[must_use]
    pub const fn is_asserted(&self) -> bool {
        self.bits != 0
    }

    /// Raw request bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Mark `source` as acknowledged by the CPU taking the interrupt.
    pub fn acknowledge_on_service(&mut self, source: IrqSource) {
        self.auto_ack |= source.mask();
    }

    /// Called when the CPU enters its IRQ sequence.
    pub fn service(&mut self) {
        self.bits &= !self.auto_ack;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: IrqSource = IrqSource::new(0);
    const MAPPER: IrqSource = IrqSource::new(2);

    #[test]
    fn line_stays_low_until_every_source_acknowledges() {
        let mut line = IrqLine::new();
        line.assert(FRAME);
        line.assert(MAPPER);
        line.acknowledge(FRAME);
        assert!(line.is_asserted());
        assert!(!line.is_asserted_by(FRAME));
        line.acknowledge(MAPPER);
        assert!(!line.is_asserted());
    }

    #[test]
    fn service_clears_only_auto_acknowledged_sources() {
        let mut line = IrqLine::new();
        line.acknowledge_on_service(MAPPER);
        line.assert(FRAME);
        line.assert(MAPPER);
        line.service();
        assert_eq!(line.bits(), FRAME.mask());
    }
}
