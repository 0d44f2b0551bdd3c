//! Console orchestration: owns the CPU (which owns the bus, PPU and cartridge) and paces
//! them against each other.
//!
//! One CPU cycle is three PPU dots. A frame is a fixed budget of CPU cycles; cycles run past
//! the budget are carried into the next frame so the emulated clock never drifts.

use std::path::Path;

use log::info;
use thiserror::Error;

use crate::{
    bus::CpuBus,
    cartridge::cartridge::{Cartridge, CartridgeError},
    controller::InputSource,
    cpu::cpu::{CPU, CpuError},
    ppu::{
        bus::PpuBus,
        ppu::{PPU, WIDTH},
    },
};

/// NTSC 2A03 clock.
pub const CPU_CLOCK_HZ: u32 = 1_789_773;
pub const FRAMES_PER_SECOND: u32 = 60;
pub const CYCLES_PER_FRAME: u32 = CPU_CLOCK_HZ / FRAMES_PER_SECOND;

/// OAM DMA halts the CPU for 513 cycles, 514 when it starts on an odd cycle.
const OAM_DMA_CYCLES: u32 = 513;

/// Pixel sink for finished frames.
pub trait Display {
    fn draw_pixel(&mut self, x: usize, y: usize, rgb: u32);
    fn present(&mut self);
}

#[derive(Debug, Error)]
pub enum NesError {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error(transparent)]
    Cpu(#[from] CpuError),
}

pub struct Console {
    pub cpu: CPU<CpuBus>,
    /// Cycles already run toward the next frame's budget.
    overshoot: u32,
    frames: u64,
}

impl Console {
    /// Wire PPU bus, PPU, CPU bus and CPU around `cart`, then reset the CPU.
    pub fn new(cart: Cartridge) -> Self {
        let ppu = PPU::new(PpuBus::new());
        let mut cpu = CPU::new(CpuBus::new(cart, ppu));
        cpu.reset();
        info!("console reset, PC=${:04X}", cpu.pc);

        Self {
            cpu,
            overshoot: 0,
            frames: 0,
        }
    }

    /// Load an iNES file and build a console around it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NesError> {
        Ok(Self::new(Cartridge::load(path)?))
    }

    /// Reset the CPU and PPU. RAM, VRAM, OAM and the cartridge keep their contents.
    pub fn reset(&mut self) {
        self.cpu.bus.ppu.reset();
        self.cpu.reset();
        self.overshoot = 0;
        info!("console reset, PC=${:04X}", self.cpu.pc);
    }

    /// Frames presented since power-on.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frame(&self) -> &[u32] {
        self.cpu.bus.ppu.frame()
    }

    pub fn pattern_tables(&self) -> Vec<u32> {
        self.cpu.bus.ppu.pattern_tables(&self.cpu.bus.cart)
    }

    /// Run one CPU step and the matching PPU dots. Hands a finished frame to `display`.
    pub fn step(&mut self, display: &mut dyn Display) -> Result<u32, NesError> {
        let cycles = self.cpu.step()?;
        self.cpu.bus.tick(cycles);

        if self.cpu.bus.take_oam_dma() {
            let odd = (self.cpu.cycles() & 1) as u32;
            self.cpu.stall_for_dma(OAM_DMA_CYCLES + odd);
        }
        // Sampled by the CPU at its next instruction boundary
        if self.cpu.bus.ppu.take_nmi() {
            self.cpu.trigger_nmi();
        }
        if self.cpu.bus.ppu.take_frame_complete() {
            self.present(display);
        }

        Ok(cycles)
    }

    /// Step until this frame's cycle budget is spent.
    pub fn run_frame(&mut self, display: &mut dyn Display) -> Result<(), NesError> {
        let mut elapsed = self.overshoot;
        while elapsed < CYCLES_PER_FRAME {
            elapsed += self.step(display)?;
        }
        self.overshoot = elapsed - CYCLES_PER_FRAME;
        Ok(())
    }

    /// Refresh both controllers. Call between frames only.
    pub fn poll_input(&mut self, input: &dyn InputSource) {
        self.cpu.bus.poll_input(input);
    }

    /// One 60 Hz tick: run a frame, then poll input.
    pub fn update(
        &mut self,
        display: &mut dyn Display,
        input: &dyn InputSource,
    ) -> Result<(), NesError> {
        self.run_frame(display)?;
        self.poll_input(input);
        Ok(())
    }

    fn present(&mut self, display: &mut dyn Display) {
        for (i, &rgb) in self.cpu.bus.ppu.frame().iter().enumerate() {
            display.draw_pixel(i % WIDTH, i / WIDTH, rgb);
        }
        display.present();
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::Bus,
        cartridge::cartridge::test_image,
        controller::{Button, IDLE},
        ppu::ppu::HEIGHT,
    };

    #[derive(Default)]
    struct CountingDisplay {
        pixels: usize,
        presents: usize,
    }

    impl Display for CountingDisplay {
        fn draw_pixel(&mut self, x: usize, y: usize, _rgb: u32) {
            assert!(x < WIDTH && y < HEIGHT);
            self.pixels += 1;
        }

        fn present(&mut self) {
            self.presents += 1;
        }
    }

    struct AHeld;

    impl InputSource for AHeld {
        fn is_pressed(&self, port: usize, button: Button) -> bool {
            port == 0 && button == Button::A
        }
    }

    /// Console over a single-bank cartridge: `main` at $8000, `nmi` handler at $9000.
    fn console(main: &[u8], nmi: &[u8]) -> Console {
        let mut prg = vec![0xEA; 0x4000];
        prg[..main.len()].copy_from_slice(main);
        prg[0x1000..0x1000 + nmi.len()].copy_from_slice(nmi);
        prg[0x3FFA..].copy_from_slice(&[0x00, 0x90, 0x00, 0x80, 0x00, 0x80]);
        let image = test_image(1, 1, |i| prg[i], |_| 0);
        Console::new(Cartridge::from_bytes(&image).unwrap())
    }

    /// Enable vblank NMI, then spin. The handler counts frames in $00.
    fn nmi_counter() -> Console {
        console(
            &[
                0xA9, 0x80, // LDA #$80
                0x8D, 0x00, 0x20, // STA $2000
                0x4C, 0x05, 0x80, // JMP $8005
            ],
            &[
                0xE6, 0x00, // INC $00
                0x40, // RTI
            ],
        )
    }

    #[test]
    fn powers_on_at_reset_vector() {
        let console = nmi_counter();
        assert_eq!(console.cpu.pc, 0x8000);
        assert_eq!(console.cpu.cycles(), 7);
    }

    #[test]
    fn frame_budget_matches_clock() {
        assert_eq!(CYCLES_PER_FRAME, 29_829);
    }

    #[test]
    fn run_frame_spends_budget_and_carries_overshoot() {
        let mut console = nmi_counter();
        let mut display = CountingDisplay::default();

        console.run_frame(&mut display).unwrap();
        let run = console.cpu.cycles() - 7;
        assert!(run >= CYCLES_PER_FRAME as u64);
        assert_eq!(console.overshoot as u64, run - CYCLES_PER_FRAME as u64);
        assert!(console.overshoot < 8);

        console.run_frame(&mut display).unwrap();
        let run = console.cpu.cycles() - 7;
        assert_eq!(console.overshoot as u64, run - 2 * CYCLES_PER_FRAME as u64);
    }

    #[test]
    fn frames_are_flushed_to_display() {
        let mut console = nmi_counter();
        let mut display = CountingDisplay::default();
        console.run_frame(&mut display).unwrap();

        assert_eq!(display.presents, 1);
        assert_eq!(display.pixels, WIDTH * HEIGHT);
        assert_eq!(console.frames(), 1);
    }

    #[test]
    fn vblank_nmi_reaches_handler_once_per_frame() {
        let mut console = nmi_counter();
        let mut display = CountingDisplay::default();
        for _ in 0..3 {
            console.run_frame(&mut display).unwrap();
        }
        assert_eq!(console.cpu.bus.ram[0], 3);
    }

    #[test]
    fn oam_dma_stalls_the_cpu() {
        let mut console = console(
            &[
                0xA9, 0x02, // LDA #$02
                0x8D, 0x14, 0x40, // STA $4014
            ],
            &[],
        );
        let mut display = CountingDisplay::default();
        assert_eq!(console.step(&mut display).unwrap(), 2);
        assert_eq!(console.step(&mut display).unwrap(), 4);
        // DMA starts at cycle 13 (odd)
        assert_eq!(console.step(&mut display).unwrap(), 2 + 514);
    }

    #[test]
    fn jammed_cpu_surfaces_as_error() {
        let mut console = console(&[0x02], &[]);
        let mut display = CountingDisplay::default();
        assert!(matches!(
            console.run_frame(&mut display),
            Err(NesError::Cpu(CpuError::Jammed { opcode: 0x02, .. }))
        ));
    }

    #[test]
    fn update_polls_input_after_the_frame() {
        let mut console = nmi_counter();
        let mut display = CountingDisplay::default();
        console.update(&mut display, &AHeld).unwrap();

        console.cpu.bus.write(0x4016, 1);
        console.cpu.bus.write(0x4016, 0);
        assert_eq!(console.cpu.bus.read(0x4016), IDLE | 1);
        assert_eq!(console.cpu.bus.read(0x4017), IDLE);
    }

    #[test]
    fn reset_restarts_from_vector() {
        let mut console = nmi_counter();
        let mut display = CountingDisplay::default();
        console.run_frame(&mut display).unwrap();
        console.reset();
        assert_eq!(console.cpu.pc, 0x8000);
        assert_eq!(console.cpu.cycles(), 7);
    }

    #[test]
    fn reset_restarts_ppu_timing() {
        let mut console = nmi_counter();
        let mut display = CountingDisplay::default();
        // Stop inside vblank with an NMI on its way to the CPU
        while !console.cpu.bus.ppu.vblank() {
            console.step(&mut display).unwrap();
        }
        console.reset();

        let ppu = &mut console.cpu.bus.ppu;
        assert_eq!((ppu.scanline, ppu.dot), (0, 0));
        assert!(!ppu.vblank());
        assert!(!ppu.take_nmi());
        assert!(!ppu.take_frame_complete());

        // The game re-enables NMI and counts frames from zero again
        console.cpu.bus.ram[0] = 0;
        for _ in 0..2 {
            console.run_frame(&mut display).unwrap();
        }
        assert_eq!(console.cpu.bus.ram[0], 2);
    }
}
