//! Mapper 0 (NROM): no bank switching, 16/32 KiB PRG, 8 KiB CHR.

use log::{debug, warn};

use crate::cartridge::cartridge::{CHR_BANK_LEN, CartridgeError, Header, PRG_BANK_LEN};
use crate::cartridge::mapper::mapper::Mapper;

/// NROM mapper: fixed PRG and CHR. With one PRG bank, $C000–$FFFF mirrors $8000–$BFFF;
/// with two, the second bank appears there.
#[derive(Default)]
pub struct Mapper0 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    prg_banks: u8,
    chr_ram: bool,
}

impl Mapper0 {
    fn prg_offset(&self, addr: u16) -> usize {
        let offset = (addr - 0x8000) as usize;
        if self.prg_banks == 1 {
            offset % PRG_BANK_LEN
        } else {
            offset
        }
    }
}

impl Mapper for Mapper0 {
    fn load_rom(&mut self, header: &Header, data: &[u8]) -> Result<(), CartridgeError> {
        if !matches!(header.prg_banks, 1 | 2) {
            return Err(CartridgeError::UnsupportedPrgBanks {
                mapper: 0,
                banks: header.prg_banks,
            });
        }

        let prg_start = header.prg_offset();
        let chr_start = header.chr_offset();
        self.prg_rom = data[prg_start..prg_start + header.prg_len()].to_vec();
        self.prg_banks = header.prg_banks;

        self.chr_ram = header.chr_banks == 0;
        self.chr = if self.chr_ram {
            vec![0; CHR_BANK_LEN]
        } else {
            // NROM boards carry exactly one CHR bank; extra banks are unreachable.
            data[chr_start..chr_start + CHR_BANK_LEN].to_vec()
        };

        Ok(())
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            // CHR ROM/RAM: $0000-$1FFF
            0x0000..=0x1FFF => self.chr[addr as usize],
            // PRG ROM: $8000-$FFFF, second half mirrors the first for a single bank
            0x8000..=0xFFFF => self.prg_rom[self.prg_offset(addr)],
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => {
                if self.chr_ram {
                    self.chr[addr as usize] = data;
                } else {
                    warn!("ignored write ${data:02X} to CHR ROM at ${addr:04X}");
                }
            }
            0x8000..=0xFFFF => debug!("ignored write ${data:02X} to PRG ROM at ${addr:04X}"),
            _ => {}
        }
    }

    fn chr(&self) -> &[u8] {
        &self.chr
    }
}
