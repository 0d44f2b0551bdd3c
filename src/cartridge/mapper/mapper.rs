//! Mapper trait: PRG/CHR memory access for one cartridge layout.

use crate::cartridge::cartridge::{CartridgeError, Header};

/// Trait for NES cartridge mappers. The CPU bus uses it for $4020–$FFFF and the PPU bus for
/// pattern tables at $0000–$1FFF.
pub trait Mapper {
    /// Copy PRG/CHR out of a raw iNES image, sized by the parsed header.
    fn load_rom(&mut self, header: &Header, data: &[u8]) -> Result<(), CartridgeError>;
    /// Read from PRG space ($4020–$FFFF) or CHR ($0000–$1FFF).
    fn read(&self, addr: u16) -> u8;
    /// Write to CHR RAM (PRG ROM is read-only).
    fn write(&mut self, addr: u16, data: u8);
    /// Current pattern-table bytes, CHR RAM writes included.
    fn chr(&self) -> &[u8];
}
