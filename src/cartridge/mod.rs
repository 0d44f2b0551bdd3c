//! NES cartridge loading and mapper support.
//!
//! - **cartridge**: Parses iNES (.nes) headers, holds the header and the mapper.
//! - **mapper**: NROM (0); fixed PRG/CHR layout.

pub mod cartridge;
pub mod mapper;
