//! PPU address space: pattern tables on the cartridge, nametables and palette in VRAM,
//! plus the separate 256-byte OAM store.
//!
//! See [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map). $0000–$1FFF goes to the
//! cartridge's mapper. The four nametables are backed by distinct storage (no mirroring modes);
//! $3000–$3EFF mirrors $2000–$2EFF and the palette at $3F00–$3F1F repeats through $3FFF.

use crate::cartridge::cartridge::Cartridge;

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;
pub const PALETTE_BASE: u16 = 0x3F00;

const NAMETABLE_LEN: usize = 0x1000;

pub struct PpuBus {
    nametables: Box<[u8; NAMETABLE_LEN]>,
    /// Palette RAM $3F00-$3F1F.
    palette: [u8; 32],
    oam: [u8; OAM_LEN],
}

impl Default for PpuBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PpuBus {
    pub fn new() -> Self {
        Self {
            nametables: Box::new([0; NAMETABLE_LEN]),
            palette: [0; 32],
            oam: [0; OAM_LEN],
        }
    }

    pub fn read(&self, cart: &Cartridge, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.read(addr),
            0x2000..=0x3EFF => self.nametables[(addr as usize - 0x2000) % NAMETABLE_LEN],
            _ => self.palette[Self::palette_index(addr)],
        }
    }

    pub fn write(&mut self, cart: &mut Cartridge, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            // CHR RAM only; the mapper drops writes to CHR ROM
            0x0000..=0x1FFF => cart.write(addr, data),
            0x2000..=0x3EFF => self.nametables[(addr as usize - 0x2000) % NAMETABLE_LEN] = data,
            // Upper 2 bits of palette entries do not exist on real hardware
            _ => self.palette[Self::palette_index(addr)] = data & 0x3F,
        }
    }

    pub fn read_oam(&self, addr: u8) -> u8 {
        self.oam[addr as usize]
    }

    pub fn write_oam(&mut self, addr: u8, data: u8) {
        self.oam[addr as usize] = data;
    }

    /// Resolve palette address $3F00–$3FFF to a 32-byte index.
    /// $3F10, $3F14, $3F18, $3F1C mirror $3F00, $3F04, $3F08, $3F0C.
    fn palette_index(addr: u16) -> usize {
        let i = (addr & 0x1F) as usize;
        if i >= 16 && i % 4 == 0 { i - 16 } else { i }
    }
}
