//! NES PPU (Picture Processing Unit) implementation.
//!
//! Drives the (scanline, dot) counters, exposes the eight memory-mapped registers at
//! $2000–$2007, renders background and sprites one visible scanline at a time into the
//! 256×240 framebuffer, and raises the NMI line at vblank.

use log::debug;

use crate::{
    cartridge::cartridge::Cartridge,
    ppu::bus::{OAM_LEN, PALETTE_BASE, PpuBus},
};

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 240;

/// Pattern-table debug view: both tables stacked vertically, 16×16 tiles each.
pub const CHR_VIEW_WIDTH: usize = 128;
pub const CHR_VIEW_HEIGHT: usize = 256;

const DOTS_PER_SCANLINE: u16 = 341;
const VBLANK_SCANLINE: u16 = 241;
const PRE_RENDER_SCANLINE: u16 = 261;
/// Dot at which a visible scanline is drawn in one pass.
const RENDER_DOT: u16 = 257;

// PPUCTRL bits
const CTRL_NAMETABLE: u8 = 0x03;
const CTRL_INCREMENT_32: u8 = 0x04;
const CTRL_SPRITE_TABLE: u8 = 0x08;
const CTRL_BG_TABLE: u8 = 0x10;
const CTRL_NMI_ENABLE: u8 = 0x80;

// PPUMASK bits
const MASK_SHOW_BG: u8 = 0x08;
const MASK_SHOW_SPRITES: u8 = 0x10;

// PPUSTATUS bits
const STATUS_SPRITE_ZERO_HIT: u8 = 0x40;
const STATUS_VBLANK: u8 = 0x80;

// Sprite attribute bits
const ATTR_PALETTE: u8 = 0x03;
const ATTR_BEHIND_BG: u8 = 0x20;
const ATTR_FLIP_H: u8 = 0x40;
const ATTR_FLIP_V: u8 = 0x80;

/// NES 2C02-style 64-color palette (0xRRGGBB). Index 0 = backdrop.
pub const NES_PALETTE_RGB: [u32; 64] = [
    0x545454, 0x001E74, 0x081090, 0x300088, 0x440064, 0x5C0030, 0x540400, 0x3C1800, 0x202A00,
    0x083A00, 0x004000, 0x003C00, 0x00302C, 0x000000, 0x000000, 0x000000, 0x989698, 0x084CC4,
    0x3032EC, 0x5C1EE4, 0x8814B0, 0xA01464, 0x982220, 0x783C00, 0x545A00, 0x287200, 0x087C00,
    0x007628, 0x006678, 0x000000, 0x000000, 0x000000, 0xECEEEC, 0x3C7EEC, 0x5C5CEC, 0x8844EC,
    0xB02CEC, 0xE028B0, 0xD83C50, 0xC45400, 0xAC7000, 0x808800, 0x409C30, 0x20A458, 0x209A88,
    0x404040, 0x000000, 0x000000, 0xECEEEC, 0xA8BCEC, 0xBCACEC, 0xD4A0EC, 0xEC94EC, 0xEC90D4,
    0xEC9CB4, 0xE4B090, 0xDCC878, 0xD4DC78, 0xB8EC98, 0xA8ECBC, 0xA0E4E4, 0xA0A0A0, 0x000000,
    0x000000,
];

const CHR_VIEW_SHADES: [u32; 4] = [0x000000, 0x555555, 0xAAAAAA, 0xFFFFFF];

/// PPU state: register file, internal latches, timing counters and framebuffer.
pub struct PPU {
    pub bus: PpuBus,
    pub scanline: u16,
    pub dot: u16,
    ctrl: u8,
    mask: u8,
    vblank: bool,
    sprite_zero_hit: bool,
    /// OAM address for $2003/$2004 (byte index 0..255, wraps).
    oam_addr: u8,
    /// Current VRAM address set through $2006 (14 bits used).
    vram_addr: u16,
    /// Write toggle shared by $2005 and $2006; false = next write is the first.
    toggle: bool,
    scroll_x: u8,
    scroll_y: u8,
    /// PPUDATA read-ahead buffer for non-palette addresses.
    read_buffer: u8,
    nmi: bool,
    frame_complete: bool,
    /// 256×240 framebuffer (0xRRGGBB per pixel). Row-major, left-to-right, top-to-bottom.
    framebuffer: Vec<u32>,
}

impl PPU {
    /// Create a PPU in its power-up state over the given bus.
    pub fn new(bus: PpuBus) -> Self {
        Self {
            bus,
            scanline: 0,
            dot: 0,
            ctrl: 0,
            mask: 0,
            vblank: false,
            sprite_zero_hit: false,
            oam_addr: 0,
            vram_addr: 0,
            toggle: false,
            scroll_x: 0,
            scroll_y: 0,
            read_buffer: 0,
            nmi: false,
            frame_complete: false,
            framebuffer: vec![0; WIDTH * HEIGHT],
        }
    }

    /// Return the counters, registers and latches to their power-up state. VRAM, OAM and the
    /// framebuffer keep their contents.
    pub fn reset(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.ctrl = 0;
        self.mask = 0;
        self.vblank = false;
        self.sprite_zero_hit = false;
        self.toggle = false;
        self.scroll_x = 0;
        self.scroll_y = 0;
        self.read_buffer = 0;
        self.nmi = false;
        self.frame_complete = false;
    }

    /// Advance one dot. Past dot 340 the scanline advances; visible scanlines render at a
    /// fixed dot; 241/1 enters vblank; 261/1 leaves it and starts the next frame.
    pub fn tick(&mut self, cart: &Cartridge) {
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
        }

        match (self.scanline, self.dot) {
            (0..=239, RENDER_DOT) => self.render_scanline(cart, self.scanline as usize),
            (VBLANK_SCANLINE, 1) => {
                self.vblank = true;
                if self.ctrl & CTRL_NMI_ENABLE != 0 {
                    self.nmi = true;
                }
            }
            (PRE_RENDER_SCANLINE, 1) => {
                self.vblank = false;
                self.sprite_zero_hit = false;
                self.scanline = 0;
                self.frame_complete = true;
            }
            _ => {}
        }
    }

    /// Consume the NMI line. True once per raised interrupt.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Consume the frame-complete flag raised at the start of each new frame.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub fn frame(&self) -> &[u32] {
        &self.framebuffer
    }

    pub fn vblank(&self) -> bool {
        self.vblank
    }

    pub fn vram_addr(&self) -> u16 {
        self.vram_addr
    }

    /// Read register `reg` ($2000 + reg & 7). Write-only registers read 0.
    pub fn read_register(&mut self, cart: &Cartridge, reg: u16) -> u8 {
        match reg & 7 {
            // PPUSTATUS: clears vblank and the write toggle
            2 => {
                let mut status = 0;
                if self.vblank {
                    status |= STATUS_VBLANK;
                }
                if self.sprite_zero_hit {
                    status |= STATUS_SPRITE_ZERO_HIT;
                }
                self.vblank = false;
                self.toggle = false;
                status
            }
            // OAMDATA: attribute bytes have no bits 2-4
            4 => {
                let data = self.bus.read_oam(self.oam_addr);
                if self.oam_addr & 3 == 2 {
                    data & 0xE3
                } else {
                    data
                }
            }
            // PPUDATA: buffered except for palette
            7 => {
                let addr = self.vram_addr & 0x3FFF;
                let data = if addr < PALETTE_BASE {
                    std::mem::replace(&mut self.read_buffer, self.bus.read(cart, addr))
                } else {
                    // Buffer picks up the nametable byte underneath the palette
                    self.read_buffer = self.bus.read(cart, addr - 0x1000);
                    self.bus.read(cart, addr)
                };
                self.increment_vram_addr();
                data
            }
            _ => 0,
        }
    }

    /// Write register `reg` ($2000 + reg & 7).
    pub fn write_register(&mut self, cart: &mut Cartridge, reg: u16, data: u8) {
        match reg & 7 {
            0 => {
                let nmi_rising = self.ctrl & CTRL_NMI_ENABLE == 0 && data & CTRL_NMI_ENABLE != 0;
                self.ctrl = data;
                if nmi_rising && self.vblank {
                    self.nmi = true;
                }
            }
            1 => self.mask = data,
            2 => debug!("ignored write ${data:02X} to PPUSTATUS"),
            3 => self.oam_addr = data,
            4 => {
                self.bus.write_oam(self.oam_addr, data);
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if self.toggle {
                    self.scroll_y = data;
                } else {
                    self.scroll_x = data;
                }
                self.toggle = !self.toggle;
            }
            6 => {
                self.vram_addr = if self.toggle {
                    (self.vram_addr & 0xFF00) | data as u16
                } else {
                    (self.vram_addr & 0x00FF) | (((data & 0x3F) as u16) << 8)
                };
                self.toggle = !self.toggle;
            }
            _ => {
                self.bus.write(cart, self.vram_addr, data);
                self.increment_vram_addr();
            }
        }
    }

    /// OAM DMA ($4014): copy a 256-byte CPU page into OAM starting at OAMADDR.
    pub fn write_oam_dma(&mut self, page: &[u8; OAM_LEN]) {
        for &byte in page {
            self.bus.write_oam(self.oam_addr, byte);
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }
    }

    fn increment_vram_addr(&mut self) {
        let step = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.vram_addr = self.vram_addr.wrapping_add(step) & 0x3FFF;
    }

    /// Colour of palette entry `index` (0..32) as 0xRRGGBB.
    fn palette_rgb(&self, cart: &Cartridge, index: u16) -> u32 {
        let color = self.bus.read(cart, PALETTE_BASE + index);
        NES_PALETTE_RGB[(color & 0x3F) as usize]
    }

    /// 2-bit colour index of pixel (`col`, `row`) of the tile at `tile_addr`.
    fn pattern_pixel(&self, cart: &Cartridge, tile_addr: u16, col: u16, row: u16) -> u8 {
        let lo = self.bus.read(cart, tile_addr + row);
        let hi = self.bus.read(cart, tile_addr + row + 8);
        let bit = 7 - col;
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    /// Render one visible scanline into the framebuffer (background + sprites).
    fn render_scanline(&mut self, cart: &Cartridge, y: usize) {
        // Background colour indices (0 = transparent) for sprite priority.
        let mut bg = [0u8; WIDTH];
        let backdrop = self.palette_rgb(cart, 0);

        if self.mask & MASK_SHOW_BG != 0 {
            let bg_table = if self.ctrl & CTRL_BG_TABLE != 0 { 0x1000 } else { 0x0000 };
            let base_nt = (self.ctrl & CTRL_NAMETABLE) as usize;
            // Scroll across the 2×2 nametable arrangement: 512×480 pixels.
            let origin_x = (base_nt & 1) * WIDTH + self.scroll_x as usize;
            let origin_y = (base_nt >> 1) * HEIGHT + self.scroll_y as usize;
            let total_y = (origin_y + y) % (HEIGHT * 2);
            let nt_row = total_y / HEIGHT;
            let row = (total_y % HEIGHT) / 8;
            let fine_y = (total_y % 8) as u16;

            for (x, bg_px) in bg.iter_mut().enumerate() {
                let total_x = (origin_x + x) % (WIDTH * 2);
                let nt = nt_row * 2 + total_x / WIDTH;
                let col = (total_x % WIDTH) / 8;
                let nt_base = 0x2000 + (nt as u16) * 0x400;

                let tile = self.bus.read(cart, nt_base + (row * 32 + col) as u16) as u16;
                let attr_addr = nt_base + 0x3C0 + ((row / 4) * 8 + col / 4) as u16;
                let attr = self.bus.read(cart, attr_addr);
                let shift = ((row & 2) << 1) | (col & 2);
                let palette = ((attr >> shift) & 3) as u16;

                let fine_x = (total_x % 8) as u16;
                let color = self.pattern_pixel(cart, bg_table + tile * 16, fine_x, fine_y);
                *bg_px = color;
                self.framebuffer[y * WIDTH + x] = if color == 0 {
                    backdrop
                } else {
                    self.palette_rgb(cart, palette * 4 + color as u16)
                };
            }
        } else {
            self.framebuffer[y * WIDTH..(y + 1) * WIDTH].fill(backdrop);
        }

        if self.mask & MASK_SHOW_SPRITES != 0 {
            self.render_sprites(cart, y, &bg);
        }
    }

    /// Draw every 8×8 sprite covering scanline `y`. Higher OAM indices are drawn first so that
    /// lower indices end up on top.
    fn render_sprites(&mut self, cart: &Cartridge, y: usize, bg: &[u8; WIDTH]) {
        let sprite_table = if self.ctrl & CTRL_SPRITE_TABLE != 0 { 0x1000 } else { 0x0000 };

        for i in (0..64u8).rev() {
            let base = i * 4;
            let sprite_y = self.bus.read_oam(base) as usize;
            if y < sprite_y || y >= sprite_y + 8 {
                continue;
            }
            let tile = self.bus.read_oam(base + 1) as u16;
            let attr = self.bus.read_oam(base + 2);
            let sprite_x = self.bus.read_oam(base + 3) as usize;

            let mut row = (y - sprite_y) as u16;
            if attr & ATTR_FLIP_V != 0 {
                row = 7 - row;
            }
            let palette = (attr & ATTR_PALETTE) as u16 + 4;
            let tile_addr = sprite_table + tile * 16;

            for px in 0..8u16 {
                let x = sprite_x + px as usize;
                if x >= WIDTH {
                    break;
                }
                let col = if attr & ATTR_FLIP_H != 0 { 7 - px } else { px };
                let color = self.pattern_pixel(cart, tile_addr, col, row);
                if color == 0 {
                    continue;
                }
                if i == 0 && x < 255 {
                    self.sprite_zero_hit = true;
                }
                if attr & ATTR_BEHIND_BG != 0 && bg[x] != 0 {
                    continue;
                }
                let rgb = self.palette_rgb(cart, palette * 4 + color as u16);
                self.framebuffer[y * WIDTH + x] = rgb;
            }
        }
    }

    /// Render both pattern tables as a 128×256 grayscale image: table $0000 on top,
    /// $1000 below, 16 tiles per row.
    pub fn pattern_tables(&self, cart: &Cartridge) -> Vec<u32> {
        let mut view = vec![0; CHR_VIEW_WIDTH * CHR_VIEW_HEIGHT];
        for (i, pixel) in view.iter_mut().enumerate() {
            let (x, y) = (i % CHR_VIEW_WIDTH, i / CHR_VIEW_WIDTH);
            let tile_addr = ((y / 8) * 0x100 + (x / 8) * 0x10) as u16;
            let color = self.pattern_pixel(cart, tile_addr, (x % 8) as u16, (y % 8) as u16);
            *pixel = CHR_VIEW_SHADES[color as usize];
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::cartridge::test_image;

    /// PPU over a cartridge with 8 KiB of CHR RAM.
    fn ppu() -> (PPU, Cartridge) {
        let image = test_image(1, 0, |_| 0, |_| 0);
        (PPU::new(PpuBus::new()), Cartridge::from_bytes(&image).unwrap())
    }

    /// Tick until the counters reach (`scanline`, `dot`).
    fn run_to(ppu: &mut PPU, cart: &Cartridge, scanline: u16, dot: u16) {
        while !(ppu.scanline == scanline && ppu.dot == dot) {
            ppu.tick(cart);
        }
    }

    #[test]
    fn address_register_takes_high_then_low_byte() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 6, 0x23);
        ppu.write_register(&mut cart, 6, 0x05);
        assert_eq!(ppu.vram_addr(), 0x2305);

        ppu.write_register(&mut cart, 6, 0x3F);
        assert_eq!(ppu.vram_addr(), 0x3F05);
    }

    #[test]
    fn status_read_resets_write_toggle() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 6, 0x21);
        ppu.read_register(&cart, 2);
        ppu.write_register(&mut cart, 6, 0x24);
        ppu.write_register(&mut cart, 6, 0x00);
        assert_eq!(ppu.vram_addr(), 0x2400);
    }

    #[test]
    fn vblank_raises_nmi_when_enabled() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 0, CTRL_NMI_ENABLE);
        run_to(&mut ppu, &cart, VBLANK_SCANLINE, 0);
        assert!(!ppu.take_nmi());
        ppu.tick(&cart);
        assert!(ppu.vblank());
        assert!(ppu.take_nmi());
        assert!(!ppu.take_nmi());
    }

    #[test]
    fn vblank_without_nmi_enable_stays_quiet() {
        let (mut ppu, mut cart) = ppu();
        run_to(&mut ppu, &cart, VBLANK_SCANLINE, 1);
        assert!(ppu.vblank());
        assert!(!ppu.take_nmi());

        // Enabling NMI during vblank raises it immediately
        ppu.write_register(&mut cart, 0, CTRL_NMI_ENABLE);
        assert!(ppu.take_nmi());
    }

    #[test]
    fn pre_render_line_ends_frame() {
        let (mut ppu, cart) = ppu();
        run_to(&mut ppu, &cart, PRE_RENDER_SCANLINE, 0);
        assert!(ppu.vblank());
        ppu.tick(&cart);
        assert_eq!((ppu.scanline, ppu.dot), (0, 1));
        assert!(!ppu.vblank());
        assert!(ppu.take_frame_complete());
    }

    #[test]
    fn status_read_clears_vblank() {
        let (mut ppu, cart) = ppu();
        run_to(&mut ppu, &cart, VBLANK_SCANLINE, 1);
        assert_eq!(ppu.read_register(&cart, 2) & STATUS_VBLANK, STATUS_VBLANK);
        assert_eq!(ppu.read_register(&cart, 2) & STATUS_VBLANK, 0);
    }

    #[test]
    fn reset_clears_timing_and_pending_lines() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 0, CTRL_NMI_ENABLE);
        ppu.write_register(&mut cart, 6, 0x21);
        run_to(&mut ppu, &cart, VBLANK_SCANLINE, 1);
        ppu.bus.write_oam(0, 0x42);

        ppu.reset();
        assert_eq!((ppu.scanline, ppu.dot), (0, 0));
        assert!(!ppu.vblank());
        assert!(!ppu.take_nmi());
        assert!(!ppu.take_frame_complete());
        assert_eq!(ppu.read_register(&cart, 2), 0);
        assert_eq!(ppu.bus.read_oam(0), 0x42);

        // NMI stays off until PPUCTRL enables it again
        run_to(&mut ppu, &cart, VBLANK_SCANLINE, 1);
        assert!(!ppu.take_nmi());
    }

    #[test]
    fn oam_data_round_trips_with_attribute_mask() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 3, 0x10);
        ppu.write_register(&mut cart, 4, 0xFF);
        ppu.write_register(&mut cart, 3, 0x10);
        assert_eq!(ppu.read_register(&cart, 4), 0xFF);

        ppu.write_register(&mut cart, 3, 0x12);
        ppu.write_register(&mut cart, 4, 0xFF);
        ppu.write_register(&mut cart, 3, 0x12);
        assert_eq!(ppu.read_register(&cart, 4), 0xE3);
    }

    #[test]
    fn data_reads_are_buffered_except_palette() {
        let (mut ppu, mut cart) = ppu();
        ppu.bus.write(&mut cart, 0x2000, 0xAA);
        ppu.bus.write(&mut cart, 0x2001, 0xBB);
        ppu.bus.write(&mut cart, 0x3F01, 0x21);

        ppu.write_register(&mut cart, 6, 0x20);
        ppu.write_register(&mut cart, 6, 0x00);
        assert_eq!(ppu.read_register(&cart, 7), 0x00);
        assert_eq!(ppu.read_register(&cart, 7), 0xAA);
        assert_eq!(ppu.read_register(&cart, 7), 0xBB);

        ppu.write_register(&mut cart, 6, 0x3F);
        ppu.write_register(&mut cart, 6, 0x01);
        assert_eq!(ppu.read_register(&cart, 7), 0x21);
    }

    #[test]
    fn data_writes_increment_by_32_when_selected() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 0, CTRL_INCREMENT_32);
        ppu.write_register(&mut cart, 6, 0x20);
        ppu.write_register(&mut cart, 6, 0x00);
        ppu.write_register(&mut cart, 7, 0x01);
        ppu.write_register(&mut cart, 7, 0x02);
        assert_eq!(ppu.vram_addr(), 0x2040);
        assert_eq!(ppu.bus.read(&cart, 0x2000), 0x01);
        assert_eq!(ppu.bus.read(&cart, 0x2020), 0x02);
    }

    #[test]
    fn data_writes_below_0x2000_reach_cartridge_chr_ram() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 6, 0x00);
        ppu.write_register(&mut cart, 6, 0x10);
        ppu.write_register(&mut cart, 7, 0x77);
        assert_eq!(cart.chr()[0x0010], 0x77);
        assert_eq!(cart.read(0x0010), 0x77);

        // Buffered read back through the mapper
        ppu.write_register(&mut cart, 6, 0x00);
        ppu.write_register(&mut cart, 6, 0x10);
        ppu.read_register(&cart, 7);
        assert_eq!(ppu.read_register(&cart, 7), 0x77);
    }

    #[test]
    fn oam_dma_starts_at_oam_addr_and_wraps() {
        let (mut ppu, mut cart) = ppu();
        ppu.write_register(&mut cart, 3, 0xFE);
        let page: [u8; OAM_LEN] = std::array::from_fn(|i| i as u8);
        ppu.write_oam_dma(&page);
        assert_eq!(ppu.bus.read_oam(0xFE), 0x00);
        assert_eq!(ppu.bus.read_oam(0x00), 0x02);
    }

    /// Tile 1 is a solid block of colour 1; tile 2 has only its left column set.
    fn draw_fixture(ppu: &mut PPU, cart: &mut Cartridge) {
        for row in 0..8 {
            ppu.bus.write(cart, 0x0010 + row, 0xFF);
            ppu.bus.write(cart, 0x0020 + row, 0x80);
        }
        ppu.bus.write(cart, 0x3F00, 0x0F);
        ppu.bus.write(cart, 0x3F01, 0x30);
        ppu.bus.write(cart, 0x3F05, 0x16);
        ppu.bus.write(cart, 0x3F11, 0x1A);
    }

    #[test]
    fn renders_background_through_attribute_palette() {
        let (mut ppu, mut cart) = ppu();
        draw_fixture(&mut ppu, &mut cart);
        ppu.bus.write(&mut cart, 0x2000, 1); // tile (0,0)
        ppu.bus.write(&mut cart, 0x2002, 1); // tile (2,0), second attribute quadrant
        ppu.bus.write(&mut cart, 0x23C0, 0b0000_0100);
        ppu.write_register(&mut cart, 1, MASK_SHOW_BG);

        run_to(&mut ppu, &cart, 0, RENDER_DOT);
        let frame = ppu.frame();
        assert_eq!(frame[0], NES_PALETTE_RGB[0x30]);
        assert_eq!(frame[8], NES_PALETTE_RGB[0x0F]);
        assert_eq!(frame[16], NES_PALETTE_RGB[0x16]);
    }

    #[test]
    fn background_honours_horizontal_scroll() {
        let (mut ppu, mut cart) = ppu();
        draw_fixture(&mut ppu, &mut cart);
        ppu.bus.write(&mut cart, 0x2400, 1); // first tile of the right-hand nametable
        ppu.write_register(&mut cart, 5, 0xFC);
        ppu.write_register(&mut cart, 5, 0x00);
        ppu.write_register(&mut cart, 1, MASK_SHOW_BG);

        run_to(&mut ppu, &cart, 0, RENDER_DOT);
        assert_eq!(ppu.frame()[3], NES_PALETTE_RGB[0x0F]);
        assert_eq!(ppu.frame()[4], NES_PALETTE_RGB[0x30]);
    }

    #[test]
    fn sprite_zero_opaque_pixel_sets_hit() {
        let (mut ppu, mut cart) = ppu();
        draw_fixture(&mut ppu, &mut cart);
        ppu.write_oam_dma(&{
            let mut oam = [0xFF; OAM_LEN];
            oam[..4].copy_from_slice(&[0, 2, 0, 10]);
            oam
        });
        ppu.write_register(&mut cart, 1, MASK_SHOW_SPRITES);

        run_to(&mut ppu, &cart, 0, RENDER_DOT);
        assert_eq!(ppu.frame()[10], NES_PALETTE_RGB[0x1A]);
        assert_eq!(ppu.frame()[11], NES_PALETTE_RGB[0x0F]);
        assert_eq!(
            ppu.read_register(&cart, 2) & STATUS_SPRITE_ZERO_HIT,
            STATUS_SPRITE_ZERO_HIT
        );
    }

    #[test]
    fn sprite_behind_opaque_background_is_hidden() {
        let (mut ppu, mut cart) = ppu();
        draw_fixture(&mut ppu, &mut cart);
        ppu.bus.write(&mut cart, 0x2000, 1);
        ppu.write_oam_dma(&{
            let mut oam = [0xFF; OAM_LEN];
            oam[..4].copy_from_slice(&[0, 1, ATTR_BEHIND_BG | ATTR_FLIP_H, 0]);
            oam
        });
        ppu.write_register(&mut cart, 1, MASK_SHOW_BG | MASK_SHOW_SPRITES);

        run_to(&mut ppu, &cart, 0, RENDER_DOT);
        assert_eq!(ppu.frame()[0], NES_PALETTE_RGB[0x30]);
    }

    #[test]
    fn pattern_view_lays_out_sixteen_tiles_per_row() {
        let (ppu, mut cart) = ppu();
        cart.write(0x0010, 0x80); // tile 1, row 0, leftmost pixel: colour 1
        cart.write(0x1008, 0x80); // table 1, tile 0, high plane: colour 2
        let view = ppu.pattern_tables(&cart);
        assert_eq!(view[8], CHR_VIEW_SHADES[1]);
        assert_eq!(view[128 * 128], CHR_VIEW_SHADES[2]);
        assert_eq!(view[0], CHR_VIEW_SHADES[0]);
    }
}
