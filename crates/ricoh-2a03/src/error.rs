use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// The micro-op cursor ran past the end of its sequence. Only a
    /// corrupted microcode table can cause this.
    #[error("microcode overrun: opcode ${opcode:02X}, cursor {position}")]
    MicrocodeOverrun { opcode: u8, position: usize },

    /// A previous step failed; the engine no longer runs.
    #[error("CPU halted after a fatal microcode error")]
    Halted,
}
