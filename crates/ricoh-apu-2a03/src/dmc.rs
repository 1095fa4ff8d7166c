//! Delta modulation channel.
//!
//! The DMC plays 1-bit delta samples streamed from $8000-$FFFF. It never
//! touches the bus itself: when its one-byte buffer is empty it asks the
//! CPU's DMA arbitrator for the next byte, and the arbitrator hands the
//! byte back through [`Dmc::receive`].

#[derive(Debug, Clone)]
pub(crate) struct Dmc {
    periods: &'static [u16; 16],
    period: u16,
    timer: u16,
    pub(crate) irq_enabled: bool,
    looping: bool,
    /// 7-bit output level.
    pub(crate) level: u8,
    /// Sample start address ($4012).
    start_address: u16,
    /// Sample length in bytes ($4013).
    start_length: u16,
    pub(crate) address: u16,
    pub(crate) bytes_remaining: u16,
    /// Output unit: bits left in the shift register.
    bits_remaining: u8,
    shift: u8,
    /// Output unit silence flag, inverted.
    playing: bool,
    /// Byte delivered by DMA, waiting for the output unit.
    buffer: u8,
    /// Handshake with the DMA arbitrator: a byte is waiting in `buffer`.
    pub(crate) buffer_full: bool,
}

impl Dmc {
    pub(crate) fn new(periods: &'static [u16; 16]) -> Self {
        Self {
            periods,
            period: periods[0] - 1,
            timer: 0,
            irq_enabled: false,
            looping: false,
            level: 0,
            start_address: 0,
            start_length: 0,
            address: 0,
            bytes_remaining: 0,
            bits_remaining: 0,
            shift: 0,
            playing: false,
            buffer: 0,
            buffer_full: false,
        }
    }

    /// $4010: IRQ enable, loop, rate index.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.period = self.periods[usize::from(value & 0x0F)] - 1;
        self.looping = value & 0x40 != 0;
        self.irq_enabled = value & 0x80 != 0;
    }

    /// $4011: direct load of the output level.
    pub(crate) fn write_level(&mut self, value: u8) {
        self.level = value & 0x7F;
    }

    /// $4012: sample address = $C000 + value * 64.
    pub(crate) fn write_address(&mut self, value: u8) {
        self.start_address = 0xC000 + u16::from(value) * 64;
    }

    /// $4013: sample length = value * 16 + 1.
    pub(crate) fn write_length(&mut self, value: u8) {
        self.start_length = u16::from(value) * 16 + 1;
    }

    /// $4015 bit 4.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart();
        }
    }

    fn restart(&mut self) {
        self.address = self.start_address;
        self.bytes_remaining = self.start_length;
    }

    /// True when the reader should request another byte.
    pub(crate) fn wants_byte(&self) -> bool {
        !self.buffer_full && self.bytes_remaining > 0
    }

    /// Consume one byte of the sample and return the address to fetch.
    pub(crate) fn take_request(&mut self) -> u16 {
        self.bytes_remaining -= 1;
        self.address
    }

    /// Accept a byte from DMA. Returns true if the sample-end IRQ fires.
    pub(crate) fn receive(&mut self, value: u8) -> bool {
        self.buffer_full = true;
        self.buffer = value;
        self.address = self.address.wrapping_add(1) | 0x8000;
        if self.bytes_remaining == 0 {
            if self.looping {
                self.restart();
            } else if self.irq_enabled {
                return true;
            }
        }
        false
    }

    pub(crate) fn clock_timer(&mut self) {
        if self.timer != 0 {
            self.timer -= 1;
            return;
        }
        self.timer = self.period;
        if self.playing {
            if self.shift & 1 != 0 {
                if self.level <= 125 {
                    self.level += 2;
                }
            } else if self.level >= 2 {
                self.level -= 2;
            }
            self.shift >>= 1;
        }
        if self.bits_remaining == 0 {
            if self.buffer_full {
                self.shift = self.buffer;
                self.playing = true;
                self.buffer_full = false;
            } else {
                self.playing = false;
            }
            self.bits_remaining = 7;
        } else {
            self.bits_remaining -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Region;

    fn dmc() -> Dmc {
        Dmc::new(Region::Ntsc.dmc_periods())
    }

    #[test]
    fn register_formulas() {
        let mut dmc = dmc();
        dmc.write_address(0xFF);
        dmc.write_length(0xFF);
        dmc.set_enabled(true);
        assert_eq!(dmc.address, 0xFFC0);
        assert_eq!(dmc.bytes_remaining, 0xFF1);
    }

    #[test]
    fn address_wraps_into_upper_half() {
        let mut dmc = dmc();
        dmc.write_address(0xFF);
        dmc.write_length(0x01);
        dmc.set_enabled(true);
        dmc.address = 0xFFFF;
        let _ = dmc.take_request();
        dmc.receive(0);
        assert_eq!(dmc.address, 0x8000);
    }

    #[test]
    fn loop_restarts_instead_of_irq() {
        let mut dmc = dmc();
        dmc.write_control(0xC0);
        dmc.write_address(0x10);
        dmc.write_length(0x00);
        dmc.set_enabled(true);
        let addr = dmc.take_request();
        assert_eq!(addr, 0xC400);
        assert!(!dmc.receive(0x55));
        assert_eq!(dmc.bytes_remaining, 1);
        assert_eq!(dmc.address, 0xC400);
    }

    #[test]
    fn sample_end_raises_irq_when_enabled() {
        let mut dmc = dmc();
        dmc.write_control(0x80);
        dmc.write_length(0x00);
        dmc.set_enabled(true);
        let _ = dmc.take_request();
        assert!(dmc.receive(0x00));
        assert!(!dmc.wants_byte());
    }

    #[test]
    fn level_steps_by_two_and_clamps() {
        let mut dmc = dmc();
        dmc.write_control(0x0F);
        dmc.write_level(126);
        dmc.buffer = 0xFF;
        dmc.buffer_full = true;
        // First underflow loads the shift register.
        dmc.clock_timer();
        assert!(dmc.playing);
        for _ in 0..8 {
            dmc.timer = 0;
            dmc.clock_timer();
        }
        assert_eq!(dmc.level, 126, "126 + 2 would exceed 127");

        dmc.write_level(1);
        dmc.buffer = 0x00;
        dmc.buffer_full = true;
        for _ in 0..16 {
            dmc.timer = 0;
            dmc.clock_timer();
        }
        assert_eq!(dmc.level, 1, "1 - 2 would go below 0");
    }
}
