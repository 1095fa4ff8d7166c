//! Pulse (square wave) channels.

use crate::units::{Envelope, LengthCounter, Sweep};

/// Duty waveforms: 12.5%, 25%, 50% and negated 25%.
const DUTY: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

/// Lowest timer period that still produces an audible square.
const MIN_PERIOD: u16 = 8;
/// Timer periods at or above this value are silenced.
const MAX_PERIOD: u16 = 0x7FF;

#[derive(Debug, Clone)]
pub(crate) struct Pulse {
    duty: usize,
    step: usize,
    timer: u16,
    /// 11-bit timer period.
    pub(crate) period: u16,
    pub(crate) envelope: Envelope,
    pub(crate) sweep: Sweep,
    pub(crate) length: LengthCounter,
    output: u8,
}

impl Pulse {
    /// `first` selects pulse 1's one's-complement sweep negate.
    pub(crate) fn new(first: bool) -> Self {
        Self {
            duty: 0,
            step: 0,
            timer: 0,
            period: 0,
            envelope: Envelope::default(),
            sweep: Sweep::new(first),
            length: LengthCounter::default(),
            output: 0,
        }
    }

    /// $4000 / $4004: duty, loop/halt, constant volume, volume.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.duty = usize::from(value >> 6);
        self.envelope.write(value);
        self.length.halt = value & 0x20 != 0;
        self.sweep.refresh(self.period);
    }

    /// $4001 / $4005. The sweep unit is clocked immediately.
    pub(crate) fn write_sweep(&mut self, value: u8) {
        self.sweep.write(value);
        self.sweep.refresh(self.period);
        self.sweep.clock(&mut self.period);
    }

    /// $4002 / $4006.
    pub(crate) fn write_timer_low(&mut self, value: u8) {
        self.period = (self.period & 0xFF00) | u16::from(value);
        self.sweep.refresh(self.period);
    }

    /// $4003 / $4007: restarts the sequencer and the envelope.
    pub(crate) fn write_timer_high(&mut self, value: u8, enabled: bool) {
        self.step = 0;
        if enabled {
            self.length.load(value >> 3);
        }
        self.period = (self.period & 0x00FF) | (u16::from(value & 0x07) << 8);
        self.sweep.refresh(self.period);
        self.envelope.start = true;
    }

    /// CPU-rate timer. The divider is reloaded with `2 * period + 1`.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = (self.period << 1) + 1;
            self.step = (self.step + 1) & 7;
        } else {
            self.timer -= 1;
        }
    }

    /// Half-frame: sweep and length, only while the channel is sounding.
    pub(crate) fn clock_half_frame(&mut self) {
        if self.length.is_active() {
            self.sweep.clock(&mut self.period);
            self.length.clock();
        }
    }

    pub(crate) fn clock_quarter_frame(&mut self) {
        if self.length.is_active() {
            self.envelope.clock();
        }
    }

    /// Latch the level for this output cycle.
    pub(crate) fn sample(&mut self, enabled: bool) -> u8 {
        let audible = enabled
            && self.length.is_active()
            && !self.sweep.mute
            && (MIN_PERIOD..MAX_PERIOD).contains(&self.period);
        self.output = if audible && DUTY[self.duty][self.step] != 0 {
            self.envelope.output()
        } else {
            0
        };
        self.output
    }

    pub(crate) fn output(&self) -> u8 {
        self.output
    }
}
