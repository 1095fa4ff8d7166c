//! Noise channel: 15-bit LFSR gated by an envelope.

use crate::units::{Envelope, LengthCounter};

#[derive(Debug, Clone)]
pub(crate) struct Noise {
    periods: &'static [u16; 16],
    /// Divider reload, one less than the table period.
    period: u16,
    timer: u16,
    pub(crate) shift: u16,
    /// Short mode: feedback from bit 6 instead of bit 1.
    short_mode: bool,
    pub(crate) envelope: Envelope,
    pub(crate) length: LengthCounter,
    output: u8,
}

impl Noise {
    pub(crate) fn new(periods: &'static [u16; 16]) -> Self {
        Self {
            periods,
            period: periods[0] - 1,
            timer: 0,
            shift: 1,
            short_mode: false,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
            output: 0,
        }
    }

    /// $400C.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.envelope.write(value);
        self.length.halt = value & 0x20 != 0;
    }

    /// $400E: mode and period index.
    pub(crate) fn write_period(&mut self, value: u8) {
        self.short_mode = value & 0x80 != 0;
        self.period = self.periods[usize::from(value & 0x0F)] - 1;
    }

    /// $400F.
    pub(crate) fn write_length(&mut self, value: u8, enabled: bool) {
        if enabled {
            self.length.load(value >> 3);
        }
        self.envelope.start = true;
    }

    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            self.shift_once();
        } else {
            self.timer -= 1;
        }
    }

    fn shift_once(&mut self) {
        let tap = if self.short_mode { 6 } else { 1 };
        let feedback = (self.shift ^ (self.shift >> tap)) & 1;
        self.shift = (self.shift >> 1) | (feedback << 14);
    }

    pub(crate) fn clock_half_frame(&mut self) {
        self.length.clock();
    }

    pub(crate) fn clock_quarter_frame(&mut self) {
        if self.length.is_active() {
            self.envelope.clock();
        }
    }

    /// Latch the level for this output cycle. Bit 0 set means silence.
    pub(crate) fn sample(&mut self, enabled: bool) -> u8 {
        if enabled && self.length.is_active() {
            if self.period > 0 {
                self.output = if self.shift & 1 == 0 {
                    self.envelope.output()
                } else {
                    0
                };
            }
        } else {
            self.output = 0;
        }
        self.output
    }

    pub(crate) fn output(&self) -> u8 {
        self.output
    }
}
