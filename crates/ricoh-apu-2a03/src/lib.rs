//! Ricoh 2A03 audio processing unit.
//!
//! Two pulse channels, a triangle, a noise generator and the delta
//! modulation channel, driven one CPU clock at a time by [`Apu::tick`].
//! The frame sequencer raises its interrupt on a shared [`emu_core::IrqLine`];
//! DMC sample fetches go through the CPU's DMA arbitrator via [`DmcDma`].
//!
//! Every eighth clock the channel levels are mixed through the non-linear
//! lookup tables, filtered, and appended to a stereo ring buffer that the
//! host drains with [`Apu::flush`].

mod apu;
mod config;
mod dmc;
mod expansion;
mod frame;
mod mixer;
mod noise;
mod pulse;
mod triangle;
mod units;

pub use apu::{Apu, DMC_IRQ, DmcDma, FRAME_IRQ};
pub use config::{ApuConfig, Region};
pub use expansion::{ExpansionAudio, ExpansionChip};
pub use mixer::{AudioSink, Mixer};
