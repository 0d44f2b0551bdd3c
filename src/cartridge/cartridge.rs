//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) header: magic "NES\x1A", PRG size in
//! 16 KiB units (byte 4), CHR size in 8 KiB units (byte 5), flags 6–7 for trainer and mapper
//! number. PRG and CHR data follow the header (and the optional 512-byte trainer). Bank counts
//! always come from the header, never from the total file size.

use std::fs;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::cartridge::mapper::mapper::Mapper;
use crate::cartridge::mapper::mapper0::Mapper0;

pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_BANK_LEN: usize = 16 * 1024;
pub const CHR_BANK_LEN: usize = 8 * 1024;

const MAGIC: &[u8; 4] = b"NES\x1A";

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM image: {0}")]
    Io(#[from] std::io::Error),
    #[error("not an iNES image (bad header magic)")]
    BadMagic,
    #[error("ROM image truncated: header declares {expected} bytes, image has {found}")]
    Truncated { expected: usize, found: usize },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    #[error("mapper {mapper} cannot lay out {banks} PRG bank(s)")]
    UnsupportedPrgBanks { mapper: u8, banks: u8 },
}

/// Decoded iNES header fields the emulator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// PRG ROM size in 16 KiB banks.
    pub prg_banks: u8,
    /// CHR ROM size in 8 KiB banks; 0 means the board carries CHR RAM.
    pub chr_banks: u8,
    pub mapper: u8,
    pub has_trainer: bool,
}

impl Header {
    /// Parse the 16-byte header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated {
                expected: HEADER_LEN,
                found: data.len(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(CartridgeError::BadMagic);
        }

        Ok(Self {
            prg_banks: data[4],
            chr_banks: data[5],
            // Mapper number: low nibble from byte 6, high nibble from byte 7.
            mapper: (data[6] >> 4) | (data[7] & 0xF0),
            has_trainer: data[6] & 0x04 != 0,
        })
    }

    /// Offset of the first PRG byte in the image.
    pub fn prg_offset(&self) -> usize {
        HEADER_LEN + if self.has_trainer { TRAINER_LEN } else { 0 }
    }

    pub fn prg_len(&self) -> usize {
        self.prg_banks as usize * PRG_BANK_LEN
    }

    pub fn chr_offset(&self) -> usize {
        self.prg_offset() + self.prg_len()
    }

    pub fn chr_len(&self) -> usize {
        self.chr_banks as usize * CHR_BANK_LEN
    }

    /// Total image length the header promises.
    pub fn image_len(&self) -> usize {
        self.chr_offset() + self.chr_len()
    }
}

/// Cartridge: the parsed header and the mapper that owns PRG/CHR storage.
/// CPU reads PRG via the bus at $4020–$FFFF; the PPU bus reads and writes CHR through it.
pub struct Cartridge {
    pub header: Header,
    pub mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Load a cartridge from an iNES file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Build a cartridge from a raw iNES image.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(data)?;
        if data.len() < header.image_len() {
            return Err(CartridgeError::Truncated {
                expected: header.image_len(),
                found: data.len(),
            });
        }

        let mut mapper: Box<dyn Mapper> = match header.mapper {
            0 => Box::new(Mapper0::default()),
            id => return Err(CartridgeError::UnsupportedMapper(id)),
        };
        mapper.load_rom(&header, data)?;

        info!(
            "loaded cartridge: mapper {}, {} PRG bank(s), {} CHR bank(s){}",
            header.mapper,
            header.prg_banks,
            header.chr_banks,
            if header.chr_banks == 0 { " (CHR RAM)" } else { "" }
        );

        Ok(Self { header, mapper })
    }

    /// Read: PRG space ($4020–$FFFF) or CHR ($0000–$1FFF) depending on addr.
    pub fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    /// Write: CHR RAM (if present); PRG ROM is read-only.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.mapper.write(addr, data);
    }

    /// Pattern data for the PPU bus.
    pub fn chr(&self) -> &[u8] {
        self.mapper.chr()
    }

    pub fn has_chr_ram(&self) -> bool {
        self.header.chr_banks == 0
    }
}

/// Build an in-memory iNES image for tests: `prg_banks` × 16 KiB PRG filled by `prg`,
/// `chr_banks` × 8 KiB CHR filled by `chr`.
#[cfg(test)]
pub(crate) fn test_image(
    prg_banks: u8,
    chr_banks: u8,
    prg: impl Fn(usize) -> u8,
    chr: impl Fn(usize) -> u8,
) -> Vec<u8> {
    let mut image = Vec::new();
    image.extend_from_slice(MAGIC);
    image.push(prg_banks);
    image.push(chr_banks);
    image.extend_from_slice(&[0u8; 10]);
    image.extend((0..prg_banks as usize * PRG_BANK_LEN).map(prg));
    image.extend((0..chr_banks as usize * CHR_BANK_LEN).map(chr));
    image
}
