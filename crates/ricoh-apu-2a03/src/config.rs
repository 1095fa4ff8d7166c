//! Region timing and mixer configuration.

/// Console region. Selects CPU clock, period tables and frame timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Region {
    /// RP2A03: 1.789773 MHz CPU.
    #[default]
    Ntsc,
    /// RP2A07: 1.662607 MHz CPU.
    Pal,
}

const NOISE_PERIODS_NTSC: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

const NOISE_PERIODS_PAL: [u16; 16] = [
    4, 8, 14, 30, 60, 88, 118, 148, 188, 236, 354, 472, 708, 944, 1890, 3778,
];

const DMC_PERIODS_NTSC: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

const DMC_PERIODS_PAL: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

/// CPU clocks between frame sequencer positions 0-5, four-step mode.
const FOUR_STEP_NTSC: [u16; 6] = [7456, 7458, 7457, 1, 1, 7457];
const FOUR_STEP_PAL: [u16; 6] = [8314, 8312, 8313, 1, 1, 8313];

/// CPU clocks between frame sequencer positions 0-5, five-step mode.
const FIVE_STEP_NTSC: [u16; 6] = [1, 7457, 7456, 7458, 7458, 7452];
const FIVE_STEP_PAL: [u16; 6] = [1, 8313, 8314, 8312, 8314, 8312];

impl Region {
    /// CPU clock in Hz.
    #[must_use]
    pub const fn cpu_hz(self) -> u32 {
        match self {
            Region::Ntsc => 1_789_773,
            Region::Pal => 1_662_607,
        }
    }

    /// Output sample rate: one sample every 8 CPU clocks.
    #[must_use]
    pub const fn sample_rate(self) -> u32 {
        match self {
            Region::Ntsc => 223_721,
            Region::Pal => 207_825,
        }
    }

    pub(crate) const fn noise_periods(self) -> &'static [u16; 16] {
        match self {
            Region::Ntsc => &NOISE_PERIODS_NTSC,
            Region::Pal => &NOISE_PERIODS_PAL,
        }
    }

    pub(crate) const fn dmc_periods(self) -> &'static [u16; 16] {
        match self {
            Region::Ntsc => &DMC_PERIODS_NTSC,
            Region::Pal => &DMC_PERIODS_PAL,
        }
    }

    pub(crate) const fn four_step_ticks(self) -> &'static [u16; 6] {
        match self {
            Region::Ntsc => &FOUR_STEP_NTSC,
            Region::Pal => &FOUR_STEP_PAL,
        }
    }

    pub(crate) const fn five_step_ticks(self) -> &'static [u16; 6] {
        match self {
            Region::Ntsc => &FIVE_STEP_NTSC,
            Region::Pal => &FIVE_STEP_PAL,
        }
    }

    /// Divider value loaded at power-on and when four-step mode is selected.
    pub(crate) const fn four_step_reload(self) -> u16 {
        match self {
            Region::Ntsc => 7459,
            Region::Pal => 8315,
        }
    }
}

/// APU construction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ApuConfig {
    pub region: Region,
    /// One-pole low-pass cutoff applied before the high-pass.
    pub low_pass_hz: f64,
    /// One-pole high-pass cutoff that removes the DC offset.
    pub high_pass_hz: f64,
}

impl Default for ApuConfig {
    fn default() -> Self {
        Self {
            region: Region::Ntsc,
            low_pass_hz: 22_000.0,
            high_pass_hz: 40.0,
        }
    }
}

impl ApuConfig {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }
}
