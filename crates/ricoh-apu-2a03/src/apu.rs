//! The APU proper: register file, per-clock stepping, status and mixing.

use emu_core::{IrqLine, IrqSource, Observable, Value};

use crate::dmc::Dmc;
use crate::expansion::{self, ExpansionAudio};
use crate::frame::{FrameClock, FrameSequencer};
use crate::mixer::{AudioSink, Mixer};
use crate::noise::Noise;
use crate::pulse::Pulse;
use crate::triangle::Triangle;
use crate::{ApuConfig, Region};

/// Frame sequencer interrupt ($4017 / $4015 bit 6).
pub const FRAME_IRQ: IrqSource = IrqSource::new(0);
/// DMC sample-end interrupt ($4010 / $4015 bit 7).
pub const DMC_IRQ: IrqSource = IrqSource::new(1);

const PULSE1_ENABLE: u8 = 0x01;
const PULSE2_ENABLE: u8 = 0x02;
const TRIANGLE_ENABLE: u8 = 0x04;
const NOISE_ENABLE: u8 = 0x08;
const DMC_ENABLE: u8 = 0x10;

/// Register offsets relative to $4000.
const STATUS: u8 = 0x15;
const FRAME_COUNTER: u8 = 0x17;

/// The DMC's view of the CPU's DMA arbitrator.
pub trait DmcDma {
    /// True while a DMC fetch is queued or running.
    fn dmc_dma_in_progress(&self) -> bool;

    /// Queue a DMC fetch from `address`. The byte comes back through
    /// [`Apu::receive_dmc_byte`].
    fn request_dmc_dma(&mut self, address: u16);
}

pub struct Apu {
    config: ApuConfig,
    /// Last value written to each register, $4000-$4017.
    registers: [u8; 0x18],
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame: FrameSequencer,
    mixer: Mixer,
    expansions: Vec<Box<dyn ExpansionAudio>>,
    /// CPU clocks since power-on; every eighth one produces a sample.
    clock: u64,
}

impl Apu {
    #[must_use]
    pub fn new(config: ApuConfig) -> Self {
        let region = config.region;
        Self {
            config,
            registers: [0; 0x18],
            pulse1: Pulse::new(true),
            pulse2: Pulse::new(false),
            triangle: Triangle::default(),
            noise: Noise::new(region.noise_periods()),
            dmc: Dmc::new(region.dmc_periods()),
            frame: FrameSequencer::new(region),
            mixer: Mixer::new(&config),
            expansions: Vec::new(),
            clock: 0,
        }
    }

    /// Return every channel and the frame sequencer to power-on state.
    ///
    /// Attached expansion chips and queued output samples are kept.
    pub fn reset(&mut self) {
        let region = self.config.region;
        self.registers = [0; 0x18];
        self.pulse1 = Pulse::new(true);
        self.pulse2 = Pulse::new(false);
        self.triangle = Triangle::default();
        self.noise = Noise::new(region.noise_periods());
        self.dmc = Dmc::new(region.dmc_periods());
        self.frame = FrameSequencer::new(region);
        self.clock = 0;
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.config.region
    }

    /// Output sample rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.config.region.sample_rate()
    }

    pub fn attach_expansion(&mut self, chip: Box<dyn ExpansionAudio>) {
        log::debug!("expansion audio attached: {:?}", chip.chip());
        self.expansions.push(chip);
    }

    #[must_use]
    pub fn expansion_count(&self) -> usize {
        self.expansions.len()
    }

    fn enabled(&self, channel: u8) -> bool {
        self.registers[usize::from(STATUS)] & channel != 0
    }

    /// CPU write to $4000 + `reg`. Offsets outside the register file are
    /// ignored.
    pub fn write_register(&mut self, reg: u8, value: u8, irq: &mut IrqLine) {
        let Some(slot) = self.registers.get_mut(usize::from(reg)) else {
            return;
        };
        *slot = value;

        match reg {
            0x00 => self.pulse1.write_control(value),
            0x01 => self.pulse1.write_sweep(value),
            0x02 => self.pulse1.write_timer_low(value),
            0x03 => {
                let enabled = self.enabled(PULSE1_ENABLE);
                self.pulse1.write_timer_high(value, enabled);
            }
            0x04 => self.pulse2.write_control(value),
            0x05 => self.pulse2.write_sweep(value),
            0x06 => self.pulse2.write_timer_low(value),
            0x07 => {
                let enabled = self.enabled(PULSE2_ENABLE);
                self.pulse2.write_timer_high(value, enabled);
            }
            0x08 => self.triangle.write_linear(value),
            0x0A => self.triangle.write_timer_low(value),
            0x0B => {
                let enabled = self.enabled(TRIANGLE_ENABLE);
                self.triangle.write_timer_high(value, enabled);
            }
            0x0C => self.noise.write_control(value),
            0x0E => self.noise.write_period(value),
            0x0F => {
                let enabled = self.enabled(NOISE_ENABLE);
                self.noise.write_length(value, enabled);
            }
            0x10 => {
                self.dmc.write_control(value);
                if !self.dmc.irq_enabled {
                    irq.acknowledge(DMC_IRQ);
                }
            }
            0x11 => self.dmc.write_level(value),
            0x12 => self.dmc.write_address(value),
            0x13 => self.dmc.write_length(value),
            STATUS => {
                if value & PULSE1_ENABLE == 0 {
                    self.pulse1.length.clear();
                }
                if value & PULSE2_ENABLE == 0 {
                    self.pulse2.length.clear();
                }
                if value & TRIANGLE_ENABLE == 0 {
                    self.triangle.length.clear();
                }
                if value & NOISE_ENABLE == 0 {
                    self.noise.length.clear();
                }
                self.dmc.set_enabled(value & DMC_ENABLE != 0);
                irq.acknowledge(DMC_IRQ);
            }
            FRAME_COUNTER => self.frame.write(value, irq),
            _ => {}
        }
    }

    /// CPU read of $4000 + `reg`.
    ///
    /// $4015 reports channel activity and interrupt flags and clears the
    /// frame interrupt. Every other register reads back its last write.
    pub fn read_register(&mut self, reg: u8, irq: &mut IrqLine) -> u8 {
        if reg == STATUS {
            let status = self.status(irq);
            self.frame.acknowledge(irq);
            return status;
        }
        self.registers.get(usize::from(reg)).copied().unwrap_or(0)
    }

    /// $4015 without the read side effect.
    #[must_use]
    pub fn status(&self, irq: &IrqLine) -> u8 {
        u8::from(self.pulse1.length.is_active())
            | u8::from(self.pulse2.length.is_active()) << 1
            | u8::from(self.triangle.length.is_active()) << 2
            | u8::from(self.noise.length.is_active()) << 3
            | u8::from(self.dmc.bytes_remaining > 0) << 4
            | u8::from(self.frame.irq_flag) << 6
            | u8::from(irq.is_asserted_by(DMC_IRQ)) << 7
    }

    /// Deliver a byte fetched by DMC DMA.
    pub fn receive_dmc_byte(&mut self, value: u8, irq: &mut IrqLine) {
        if self.dmc.receive(value) {
            irq.assert(DMC_IRQ);
        }
    }

    /// Advance one CPU clock.
    ///
    /// `odd_cycle` is the CPU's parity flag after the cycle it just ran.
    pub fn tick<D: DmcDma>(&mut self, odd_cycle: bool, dma: &mut D, irq: &mut IrqLine) {
        if self.clock & 7 == 0 {
            self.produce_sample();
        }
        self.clock += 1;

        self.pulse1.clock_timer();
        self.pulse2.clock_timer();
        self.triangle.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();

        if self.dmc.wants_byte() && !dma.dmc_dma_in_progress() {
            let address = self.dmc.take_request();
            dma.request_dmc_dma(address);
        }

        for chip in &mut self.expansions {
            chip.tick();
        }

        match self.frame.tick(odd_cycle, irq) {
            FrameClock::None => {}
            FrameClock::Quarter => self.clock_quarter_frame(),
            FrameClock::Half => {
                self.clock_half_frame();
                self.clock_quarter_frame();
            }
        }
    }

    fn produce_sample(&mut self) {
        let pulse1 = self.pulse1.sample(self.enabled(PULSE1_ENABLE));
        let pulse2 = self.pulse2.sample(self.enabled(PULSE2_ENABLE));
        let triangle = self.triangle.sample(self.enabled(TRIANGLE_ENABLE));
        let noise = self.noise.sample(self.enabled(NOISE_ENABLE));

        let mut input = self.mixer.mix(pulse1, pulse2, triangle, noise, self.dmc.level);
        for chip in &mut self.expansions {
            chip.clock();
            input = input.wrapping_add(expansion::contribution(
                chip.as_ref(),
                self.mixer.pulse_table(),
            ));
        }
        self.mixer.push(input, self.expansions.len());
    }

    /// Length counters and sweep units.
    fn clock_half_frame(&mut self) {
        self.pulse1.clock_half_frame();
        self.pulse2.clock_half_frame();
        self.triangle.clock_half_frame();
        self.noise.clock_half_frame();
    }

    /// Envelopes and the triangle's linear counter.
    fn clock_quarter_frame(&mut self) {
        self.pulse1.clock_quarter_frame();
        self.pulse2.clock_quarter_frame();
        self.triangle.clock_quarter_frame();
        self.noise.clock_quarter_frame();
    }

    /// The unfiltered mix of the channel levels latched at the last
    /// output cycle.
    #[must_use]
    pub fn current_mix(&self) -> i32 {
        self.mixer.mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.level,
        )
    }

    /// Samples (interleaved stereo) produced since the last flush.
    #[must_use]
    pub fn output(&self) -> &[i16] {
        self.mixer.samples()
    }

    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.mixer.bytes()
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        self.mixer.byte_len()
    }

    /// Send queued samples to the host. See [`Mixer::flush`].
    pub fn flush<S: AudioSink>(&mut self, sink: &mut S) -> bool {
        self.mixer.flush(sink)
    }

    #[must_use]
    pub fn frame_skip(&self) -> bool {
        self.mixer.frame_skip()
    }

    #[must_use]
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

const QUERY_PATHS: &[&str] = &[
    "frame.mode",
    "frame.step",
    "frame.irq",
    "pulse1.length",
    "pulse2.length",
    "triangle.length",
    "triangle.linear",
    "noise.length",
    "noise.shift",
    "dmc.level",
    "dmc.address",
    "dmc.remaining",
    "filter.low_pass",
    "filter.high_pass",
    "buffer.samples",
    "frame_skip",
];

impl Observable for Apu {
    fn query(&self, path: &str) -> Option<Value> {
        let value = match path {
            "frame.mode" => Value::Text(if self.frame.five_step {
                "five-step"
            } else {
                "four-step"
            }),
            "frame.step" => self.frame.step.into(),
            "frame.irq" => self.frame.irq_flag.into(),
            "pulse1.length" => self.pulse1.length.value().into(),
            "pulse2.length" => self.pulse2.length.value().into(),
            "triangle.length" => self.triangle.length.value().into(),
            "triangle.linear" => self.triangle.linear_counter().into(),
            "noise.length" => self.noise.length.value().into(),
            "noise.shift" => self.noise.shift.into(),
            "dmc.level" => self.dmc.level.into(),
            "dmc.address" => self.dmc.address.into(),
            "dmc.remaining" => self.dmc.bytes_remaining.into(),
            "filter.low_pass" => self.mixer.filter_state().0.into(),
            "filter.high_pass" => self.mixer.filter_state().1.into(),
            "buffer.samples" => u32::try_from(self.mixer.samples().len()).ok()?.into(),
            "frame_skip" => self.mixer.frame_skip().into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
