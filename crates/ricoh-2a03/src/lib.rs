//! Ricoh 2A03: the NES CPU die.
//!
//! A 6502 core without decimal mode, driven one clock at a time through a
//! table of per-cycle micro-ops, with the sprite/sample DMA arbitrator and
//! the on-die APU from [`ricoh_apu_2a03`].
//!
//! [`Ricoh2A03`] is the usual entry point: the host calls
//! [`Ricoh2A03::tick`] once per CPU clock with its [`SystemBus`]. [`Cpu`]
//! can also be driven on its own through any [`CpuBus`].

mod alu;
mod chip;
mod config;
mod cpu;
mod dma;
mod error;
pub mod flags;
mod interrupt;
mod microcode;
mod registers;

pub use chip::{EXPANSION_IRQ, MAPPER_IRQ, Ricoh2A03, SystemBus};
pub use config::CoreConfig;
pub use cpu::{Cpu, CpuBus};
pub use dma::Dma;
pub use error::StepError;
pub use flags::Status;
pub use registers::Registers;
pub use ricoh_apu_2a03::{Apu, ApuConfig, AudioSink, Region};
