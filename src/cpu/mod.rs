//! 6502 CPU emulation for the NES.
//!
//! Table-driven decode over all 256 opcodes: documented set, stable undocumented opcodes,
//! and explicit traps for the rest. Memory goes through the `Bus` trait.

pub mod cpu;
pub mod flags;
pub mod opcodes;
