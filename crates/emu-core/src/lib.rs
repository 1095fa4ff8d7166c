//! Core traits and types shared by the 2A03 chip crates.
//!
//! Every component advances one CPU clock per call. Nothing here owns
//! time: the host decides when to step, and components talk to memory
//! only through [`Bus`].

mod bus;
mod irq;
mod observable;

pub use bus::{Bus, FlatRam};
pub use irq::{IrqLine, IrqSource};
pub use observable::{Observable, Value};
