//! Memory bus and address decoding for the NES.
//!
//! Maps CPU addresses to RAM, PPU registers, controllers, and cartridge. See
//! [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map).

use log::debug;

use crate::{
    cartridge::cartridge::Cartridge,
    controller::{Controller, InputSource},
    ppu::{bus::OAM_LEN, ppu::PPU},
};

pub const RAM_LEN: usize = 0x800;

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);
}

/// Main NES bus: RAM, PPU, controllers, and cartridge.
pub struct CpuBus {
    pub ram: [u8; RAM_LEN],
    pub cart: Cartridge,
    pub ppu: PPU,
    pub controllers: [Controller; 2],
    /// Set by an OAM DMA write; the console turns it into a CPU stall.
    dma_pending: bool,
}

impl CpuBus {
    /// Create a new bus with the given cartridge and PPU.
    pub fn new(cart: Cartridge, ppu: PPU) -> Self {
        Self {
            ram: [0; RAM_LEN],
            cart,
            ppu,
            controllers: [Controller::new(), Controller::new()],
            dma_pending: false,
        }
    }

    /// Advance the PPU three dots per CPU cycle.
    pub fn tick(&mut self, cycles: u32) {
        for _ in 0..cycles * 3 {
            self.ppu.tick(&self.cart);
        }
    }

    /// True once per OAM DMA write to $4014.
    pub fn take_oam_dma(&mut self) -> bool {
        std::mem::take(&mut self.dma_pending)
    }

    /// Refresh both controllers from the input source.
    pub fn poll_input(&mut self, input: &dyn InputSource) {
        for (port, controller) in self.controllers.iter_mut().enumerate() {
            controller.poll(input, port);
        }
    }

    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        let mut data = [0u8; OAM_LEN];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.read(base | i as u16);
        }
        self.ppu.write_oam_dma(&data);
        self.dma_pending = true;
    }
}

impl Bus for CpuBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram[addr as usize % RAM_LEN],
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => self.ppu.read_register(&self.cart, addr & 7),
            0x4016 => self.controllers[0].read(),
            0x4017 => self.controllers[1].read(),
            // APU and I/O, including OAMDMA: unmapped
            0x4000..=0x401F => 0,
            // Cartridge space
            0x4020..=0xFFFF => self.cart.read(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % RAM_LEN] = data,
            0x2000..=0x3FFF => self.ppu.write_register(&mut self.cart, addr & 7, data),
            0x4014 => self.oam_dma(data),
            // Strobe is shared by both ports
            0x4016 => self.controllers.iter_mut().for_each(|c| c.write(data)),
            0x4000..=0x401F => debug!("ignored write ${data:02X} to I/O ${addr:04X}"),
            0x4020..=0xFFFF => self.cart.write(addr, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cartridge::cartridge::test_image,
        controller::{Button, IDLE},
        ppu::bus::PpuBus,
    };

    fn bus() -> CpuBus {
        let image = test_image(1, 1, |i| (i & 0xFF) as u8, |_| 0);
        let cart = Cartridge::from_bytes(&image).unwrap();
        CpuBus::new(cart, PPU::new(PpuBus::new()))
    }

    struct StartOnly;

    impl InputSource for StartOnly {
        fn is_pressed(&self, port: usize, button: Button) -> bool {
            port == 1 && button == Button::Start
        }
    }

    #[test]
    fn ram_is_mirrored_every_2k() {
        let mut bus = bus();
        bus.write(0x0123, 0x5A);
        assert_eq!(bus.read(0x0923), 0x5A);
        assert_eq!(bus.read(0x1123), 0x5A);
        bus.write(0x1FFF, 0x77);
        assert_eq!(bus.read(0x07FF), 0x77);
    }

    #[test]
    fn ppu_registers_mirror_every_8_bytes() {
        let mut bus = bus();
        bus.write(0x3FFE, 0x21); // $2006
        bus.write(0x2006, 0x08);
        assert_eq!(bus.ppu.vram_addr(), 0x2108);
    }

    #[test]
    fn ppudata_writes_below_0x2000_reach_chr_ram() {
        let image = test_image(1, 0, |_| 0, |_| 0);
        let cart = Cartridge::from_bytes(&image).unwrap();
        let mut bus = CpuBus::new(cart, PPU::new(PpuBus::new()));

        bus.write(0x2006, 0x00);
        bus.write(0x2006, 0x10);
        bus.write(0x2007, 0x77);
        assert_eq!(bus.cart.chr()[0x0010], 0x77);
    }

    #[test]
    fn unmapped_io_reads_zero() {
        let mut bus = bus();
        bus.write(0x4000, 0xFF);
        assert_eq!(bus.read(0x4000), 0);
        assert_eq!(bus.read(0x4014), 0);
        assert_eq!(bus.read(0x401F), 0);
    }

    #[test]
    fn cartridge_space_reaches_prg() {
        let mut bus = bus();
        assert_eq!(bus.read(0x8042), 0x42);
        assert_eq!(bus.read(0xC042), 0x42);
        assert_eq!(bus.read(0x5000), 0);
    }

    #[test]
    fn oam_dma_copies_page_and_flags_stall() {
        let mut bus = bus();
        for i in 0..256u16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus.write(0x4014, 0x02);
        assert!(bus.take_oam_dma());
        assert!(!bus.take_oam_dma());
        assert_eq!(bus.ppu.bus.read_oam(0x00), 0x00);
        assert_eq!(bus.ppu.bus.read_oam(0x80), 0x80);
        assert_eq!(bus.ppu.bus.read_oam(0xFF), 0xFF);
    }

    #[test]
    fn controllers_serialise_through_4016_and_4017() {
        let mut bus = bus();
        bus.poll_input(&StartOnly);
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);

        let port0: Vec<u8> = (0..8).map(|_| bus.read(0x4016)).collect();
        assert!(port0.iter().all(|&b| b == IDLE));

        let port1: Vec<u8> = (0..8).map(|_| bus.read(0x4017) & 1).collect();
        assert_eq!(port1, vec![0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(bus.read(0x4017), IDLE);
    }

    #[test]
    fn tick_runs_three_ppu_dots_per_cycle() {
        let mut bus = bus();
        bus.tick(10);
        assert_eq!((bus.ppu.scanline, bus.ppu.dot), (0, 30));
    }
}
