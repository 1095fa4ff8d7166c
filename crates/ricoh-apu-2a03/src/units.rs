//! Envelope, length counter and sweep units shared by the tone channels.

/// Length counter load values, indexed by bits 3-7 of the fourth register.
pub(crate) const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96,
    22, 192, 24, 72, 26, 16, 28, 32, 30,
];

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Decay envelope, clocked by the frame sequencer's quarter-frame signal.
#[derive(Debug, Clone, Default)]
pub(crate) struct Envelope {
    pub(crate) start: bool,
    divider: u8,
    decay: u8,
    /// Constant volume, or divider period when decaying (bits 0-3).
    volume: u8,
    constant: bool,
    looping: bool,
}

impl Envelope {
    /// Apply bits 0-5 of a channel's first register.
    pub(crate) fn write(&mut self, value: u8) {
        self.volume = value & 0x0F;
        self.constant = value & 0x10 != 0;
        self.looping = value & 0x20 != 0;
    }

    pub(crate) fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.divider = self.volume;
            self.decay = 15;
        } else if self.divider == 0 {
            self.divider = self.volume;
            if self.decay > 0 {
                self.decay -= 1;
            } else if self.looping {
                self.decay = 15;
            }
        } else {
            self.divider -= 1;
        }
    }

    /// Current level, 0-15.
    pub(crate) fn output(&self) -> u8 {
        if self.constant { self.volume } else { self.decay }
    }
}

// ---------------------------------------------------------------------------
// Length counter
// ---------------------------------------------------------------------------

/// Counts down on half-frame clocks; a channel is silent at zero.
#[derive(Debug, Clone, Default)]
pub(crate) struct LengthCounter {
    counter: u8,
    pub(crate) halt: bool,
}

impl LengthCounter {
    pub(crate) fn load(&mut self, index: u8) {
        self.counter = LENGTH_TABLE[usize::from(index & 0x1F)];
    }

    pub(crate) fn clear(&mut self) {
        self.counter = 0;
    }

    pub(crate) fn clock(&mut self) {
        if self.counter > 0 && !self.halt {
            self.counter -= 1;
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.counter > 0
    }

    pub(crate) fn value(&self) -> u8 {
        self.counter
    }
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// Periodic frequency adjuster attached to each pulse channel.
///
/// Pulse 1 negates with one's complement (subtracts one extra), pulse 2
/// with two's complement.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sweep {
    enabled: bool,
    shift: u8,
    period: u8,
    negate: bool,
    ones_complement: bool,
    start: bool,
    divider: u8,
    pub(crate) mute: bool,
}

impl Sweep {
    pub(crate) fn new(ones_complement: bool) -> Self {
        Self {
            ones_complement,
            ..Self::default()
        }
    }

    /// Apply a write to the sweep register and arm the reload.
    pub(crate) fn write(&mut self, value: u8) {
        self.enabled = value & 0x80 != 0;
        self.period = (value >> 4) & 0x07;
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
        self.start = true;
    }

    /// Clear the mute latch if the current period is playable.
    ///
    /// Register writes that move the period back into range must unmute
    /// without waiting for the next half-frame.
    pub(crate) fn refresh(&mut self, period: u16) {
        if period > 8 && period < 0x7FF {
            self.mute = false;
        }
    }

    /// Half-frame clock. May rewrite `period`.
    pub(crate) fn clock(&mut self, period: &mut u16) {
        if self.start {
            let previous = self.divider;
            self.divider = self.period;
            self.start = false;
            if previous == 0 {
                self.update(period);
            }
        } else if self.divider == 0 {
            self.update(period);
            self.divider = self.period;
        } else {
            self.divider -= 1;
        }
    }

    /// Compute the target period, latch mute, and write back when allowed.
    fn update(&mut self, period: &mut u16) {
        let mut target = *period;
        if self.shift > 0 {
            let change = target >> self.shift;
            if self.negate {
                target = target.wrapping_sub(change);
                if self.ones_complement {
                    target = target.wrapping_sub(1);
                }
            } else {
                target = target.wrapping_add(change);
            }
        }
        if target > 8 && target < 0x7FF {
            self.mute = false;
            if self.enabled && self.shift > 0 {
                *period = target;
            }
        } else {
            self.mute = true;
        }
    }
}
