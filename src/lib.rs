//! Nestor: an NES (Nintendo Entertainment System) emulator core written in Rust.
//!
//! Implements the NES chipset as documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide): Ricoh 2A03 CPU core,
//! 2C02 PPU, NROM cartridges, and controller I/O. Audio is not emulated.
//!
//! ## Modules (NESdev references)
//!
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU,
//!   controllers, cartridge; 3 PPU cycles per CPU cycle
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [Mapper](https://www.nesdev.org/wiki/Mapper) NROM (0)
//! - **console** – master clock: frame budget, NMI and DMA hand-off, frame presentation
//! - **controller** – [Controller reading](https://www.nesdev.org/wiki/Controller_reading): $4016 latch, shift-out
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU) / 2A03: table-driven decode, undocumented opcodes, [NMI](https://www.nesdev.org/wiki/NMI)
//! - **ppu** – [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers), OAM, nametables, 256×240

pub mod bus;
pub mod cartridge;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod ppu;

pub use console::{Console, Display, NesError};
pub use controller::{Button, InputSource};
