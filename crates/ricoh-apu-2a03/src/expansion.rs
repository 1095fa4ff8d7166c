//! Cartridge expansion audio inputs.
//!
//! Expansion chips live on the cartridge and mix into the console's audio
//! path. The APU only needs two things from each: a call that produces
//! one sample per output cycle and the resulting level.

/// Expansion sound chips with a known mixing scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionChip {
    /// Konami VRC6: two pulses and a sawtooth.
    Vrc6,
    /// Famicom Disk System wavetable.
    Fds,
    /// Nintendo MMC5: two pulses (reported via the APU pulse table) plus PCM.
    Mmc5,
    /// Konami VRC7 FM synthesis.
    Vrc7,
    /// Namco 163 wavetable.
    Namco163,
    /// Sunsoft 5B (YM2149 derivative).
    Sunsoft5B,
}

/// A sound generator attached to the expansion audio pins.
pub trait ExpansionAudio {
    fn chip(&self) -> ExpansionChip;

    /// Produce one sample. Called once per output cycle (every 8 CPU
    /// clocks) just before [`output`](Self::output) is read.
    fn clock(&mut self) {}

    /// Per-CPU-clock upkeep for chips with their own timers.
    fn tick(&mut self) {}

    /// Current output level in the chip's native units.
    fn output(&self) -> i32;

    /// Raw 8-bit PCM level; only the MMC5 uses it.
    fn pcm_output(&self) -> i32 {
        0
    }
}

/// Scale a chip's output into the mixer's fixed-point domain.
pub(crate) fn contribution(chip: &dyn ExpansionAudio, pulse_table: &[i32; 32]) -> i32 {
    let out = chip.output();
    match chip.chip() {
        ExpansionChip::Vrc6 => out.wrapping_mul(262),
        ExpansionChip::Fds => out.wrapping_mul(202),
        ExpansionChip::Mmc5 => {
            pulse_table[out.clamp(0, 31) as usize].wrapping_add(chip.pcm_output() << 6)
        }
        ExpansionChip::Vrc7 => out >> 7,
        ExpansionChip::Namco163 => out.wrapping_mul(26),
        ExpansionChip::Sunsoft5B => out,
    }
}
