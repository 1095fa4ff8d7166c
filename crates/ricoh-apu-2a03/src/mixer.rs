//! Non-linear mixer, output filters and sample ring buffer.
//!
//! Everything is fixed point with 15 fractional bits. The lookup tables
//! follow the nesdev mixer approximation; the two one-pole filters model
//! the console's output stage.

use std::f64::consts::TAU;

use crate::ApuConfig;

/// Overall gain, indexed by the number of active expansion chips.
const AMPLIFICATION: [i32; 7] = [192, 128, 96, 77, 64, 55, 48];

/// Host audio output.
pub trait AudioSink {
    /// Take interleaved 16-bit stereo samples in native byte order.
    ///
    /// Returns the host's buffer fill level in frames of audio queued, or
    /// 0 if the data could not be accepted.
    fn submit(&mut self, samples: &[u8]) -> u32;
}

pub struct Mixer {
    pulse_table: [i32; 32],
    tnd_table: [i32; 204],
    low_pass: i32,
    high_pass: i32,
    last_low_pass: i32,
    last_high_pass: i32,
    buffer: Vec<i16>,
    cursor: usize,
    waiting_for_refill: bool,
    frame_skip: bool,
}

impl Mixer {
    #[must_use]
    pub fn new(config: &ApuConfig) -> Self {
        let sample_rate = config.region.sample_rate();
        let dt = 1.0 / f64::from(sample_rate);
        let rc = 1.0 / (TAU * config.low_pass_hz);
        let low_pass = (dt / (rc + dt) * 32768.0) as i32;
        let rc = 1.0 / (TAU * config.high_pass_hz);
        let high_pass = (rc / (rc + dt) * 32768.0) as i32;

        let mut pulse_table = [0; 32];
        for (i, entry) in pulse_table.iter_mut().enumerate() {
            *entry = (95.52 / (8128.0 / i as f64 + 100.0) * 32768.0) as i32;
        }
        let mut tnd_table = [0; 204];
        for (i, entry) in tnd_table.iter_mut().enumerate() {
            *entry = (163.67 / (24329.0 / i as f64 + 100.0) * 32768.0) as i32;
        }

        // A bit more than one 60 Hz frame of stereo samples.
        let capacity = (sample_rate / 30 * 2) as usize;
        log::debug!(
            "audio output: {sample_rate} Hz, 16-bit stereo, {capacity} sample ring"
        );

        Self {
            pulse_table,
            tnd_table,
            low_pass,
            high_pass,
            last_low_pass: 0,
            last_high_pass: 0,
            buffer: vec![0; capacity],
            cursor: 0,
            waiting_for_refill: false,
            frame_skip: false,
        }
    }

    /// Combine the five channel levels before gain and filtering.
    #[must_use]
    pub fn mix(&self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> i32 {
        let pulse = (usize::from(pulse1) + usize::from(pulse2)).min(31);
        let tnd = (3 * usize::from(triangle) + 2 * usize::from(noise) + usize::from(dmc)).min(203);
        self.pulse_table[pulse] + self.tnd_table[tnd]
    }

    #[must_use]
    pub fn pulse_table(&self) -> &[i32; 32] {
        &self.pulse_table
    }

    #[must_use]
    pub fn tnd_table(&self) -> &[i32; 204] {
        &self.tnd_table
    }

    /// Amplify, filter and store one output sample (both stereo slots).
    pub(crate) fn push(&mut self, input: i32, active_expansions: usize) {
        let gain = AMPLIFICATION[active_expansions.min(AMPLIFICATION.len() - 1)];
        let input = i64::from(input) * i64::from(gain);
        let last_low = i64::from(self.last_low_pass);

        let low = last_low + ((i64::from(self.low_pass) * ((input >> 6) - last_low)) >> 15);
        let mut high_in = i64::from(self.last_high_pass) + last_low - low;
        // Round negative values toward zero before the shift.
        high_in += (high_in >> 63) & 1;
        let high = (i64::from(self.high_pass) * high_in) >> 15;

        self.last_low_pass = low as i32;
        self.last_high_pass = high as i32;

        let sample = high.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16;
        if self.cursor + 2 > self.buffer.len() {
            log::warn!("audio ring buffer wrapped before the host flushed it");
            self.cursor = 0;
        }
        self.buffer[self.cursor] = sample;
        self.buffer[self.cursor + 1] = sample;
        self.cursor += 2;
    }

    /// Samples written since the last flush.
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.buffer[..self.cursor]
    }

    /// [`samples`](Self::samples) as raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.samples())
    }

    /// Filled length in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.cursor * size_of::<i16>()
    }

    /// Ring capacity in samples (both channels).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Hand the pending samples to the host and update frame skipping.
    ///
    /// Returns false if the host refused the data; the samples stay
    /// queued in that case.
    pub fn flush<S: AudioSink>(&mut self, sink: &mut S) -> bool {
        let level = sink.submit(self.bytes());
        if level == 0 {
            self.frame_skip = false;
            self.waiting_for_refill = false;
            return false;
        }
        if self.waiting_for_refill && level < 2 {
            self.waiting_for_refill = false;
            self.frame_skip = false;
        } else if !self.waiting_for_refill && level > 2 {
            self.frame_skip = true;
            self.waiting_for_refill = true;
        }
        self.cursor = 0;
        true
    }

    /// True while the host is behind and video work may be skipped.
    #[must_use]
    pub fn frame_skip(&self) -> bool {
        self.frame_skip
    }

    pub(crate) fn filter_state(&self) -> (i32, i32) {
        (self.last_low_pass, self.last_high_pass)
    }
}
