//! Triangle channel.

use crate::units::LengthCounter;

/// 32-step waveform: 15 down to 0, then 0 up to 15.
const SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10,
    11, 12, 13, 14, 15,
];

#[derive(Debug, Clone, Default)]
pub(crate) struct Triangle {
    step: usize,
    timer: u16,
    period: u16,
    pub(crate) length: LengthCounter,
    linear_reload: u8,
    linear_counter: u8,
    reload: bool,
    /// Control flag: halts the length counter and keeps `reload` set.
    control: bool,
    output: u8,
}

impl Triangle {
    /// $4008: control flag and linear counter reload value.
    pub(crate) fn write_linear(&mut self, value: u8) {
        self.linear_reload = value & 0x7F;
        self.control = value & 0x80 != 0;
        self.length.halt = self.control;
    }

    /// $400A.
    pub(crate) fn write_timer_low(&mut self, value: u8) {
        self.period = (self.period & 0xFF00) | u16::from(value);
    }

    /// $400B: length load and linear counter reload request.
    pub(crate) fn write_timer_high(&mut self, value: u8, enabled: bool) {
        if enabled {
            self.length.load(value >> 3);
        }
        self.period = (self.period & 0x00FF) | (u16::from(value & 0x07) << 8);
        self.reload = true;
    }

    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            self.step = (self.step + 1) & 31;
        } else {
            self.timer -= 1;
        }
    }

    pub(crate) fn clock_half_frame(&mut self) {
        self.length.clock();
    }

    /// Quarter-frame: linear counter.
    pub(crate) fn clock_quarter_frame(&mut self) {
        if self.reload {
            self.linear_counter = self.linear_reload;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control {
            self.reload = false;
        }
    }

    /// Latch the level for this output cycle.
    ///
    /// Ultrasonic periods (below 2) hold the previous level instead of
    /// producing a square-ish buzz.
    pub(crate) fn sample(&mut self, enabled: bool) -> u8 {
        if enabled && self.length.is_active() && self.linear_counter > 0 {
            if self.period >= 2 {
                self.output = SEQUENCE[self.step];
            }
        } else {
            self.output = 0;
        }
        self.output
    }

    pub(crate) fn output(&self) -> u8 {
        self.output
    }

    pub(crate) fn linear_counter(&self) -> u8 {
        self.linear_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Triangle {
        let mut tri = Triangle::default();
        tri.write_linear(0x10);
        tri.write_timer_low(0x40);
        tri.write_timer_high(0x08, true);
        tri.clock_quarter_frame();
        tri
    }

    #[test]
    fn reload_flag_clears_without_control() {
        let mut tri = started();
        assert_eq!(tri.linear_counter(), 0x10);
        tri.clock_quarter_frame();
        assert_eq!(tri.linear_counter(), 0x0F);
    }

    #[test]
    fn control_flag_keeps_reloading() {
        let mut tri = Triangle::default();
        tri.write_linear(0x85);
        tri.write_timer_high(0x08, true);
        for _ in 0..4 {
            tri.clock_quarter_frame();
            assert_eq!(tri.linear_counter(), 5);
        }
    }

    #[test]
    fn gated_by_linear_counter() {
        let mut tri = started();
        assert_eq!(tri.sample(true), 15);
        for _ in 0..0x10 {
            tri.clock_quarter_frame();
        }
        assert_eq!(tri.linear_counter(), 0);
        assert_eq!(tri.sample(true), 0);
    }

    #[test]
    fn ultrasonic_period_holds_level() {
        let mut tri = started();
        tri.step = 5;
        assert_eq!(tri.sample(true), 10);
        tri.write_timer_low(0x01);
        tri.step = 9;
        assert_eq!(tri.sample(true), 10);
    }
}
