//! NES emulator entry point.
//!
//! Loads a cartridge and runs the console in a window, headless for a fixed number of
//! frames, or shows the cartridge's pattern tables.
//! Usage: nestor [--scale 1|2|4] [--frames N] [--trace] [--chr] path/to/game.nes

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ansi_term::Colour::{Green, Red};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info};
use minifb::{Key, Scale, Window, WindowOptions};
use nestor::{
    Button, Console, Display, InputSource,
    ppu::ppu::{CHR_VIEW_HEIGHT, CHR_VIEW_WIDTH, HEIGHT, WIDTH},
};

/// NES runs at ~60.0988 Hz (NTSC). Target one frame per 16.67 ms for ~60 fps.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

#[derive(Parser)]
#[command(version, about = "NES emulator")]
struct Args {
    /// Path to an iNES (.nes) ROM image
    rom: PathBuf,

    /// Window scale factor
    #[arg(long, value_enum, default_value = "2")]
    scale: WindowScale,

    /// Run this many frames without a window, then print a summary
    #[arg(long)]
    frames: Option<u64>,

    /// Log every CPU instruction (trace level for nestor::cpu)
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Show the cartridge's pattern tables instead of running it
    #[arg(long, default_value_t = false)]
    chr: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum WindowScale {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
}

impl From<WindowScale> for Scale {
    fn from(scale: WindowScale) -> Self {
        match scale {
            WindowScale::X1 => Scale::X1,
            WindowScale::X2 => Scale::X2,
            WindowScale::X4 => Scale::X4,
        }
    }
}

/// minifb window as the console's display sink.
struct Screen {
    window: Window,
    buffer: Vec<u32>,
}

impl Screen {
    fn open(title: &str, width: usize, height: usize, scale: WindowScale) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                scale: scale.into(),
                ..WindowOptions::default()
            },
        )
        .context("failed to create window")?;

        Ok(Self {
            window,
            buffer: vec![0; width * height],
        })
    }

    fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }
}

impl Display for Screen {
    fn draw_pixel(&mut self, x: usize, y: usize, rgb: u32) {
        self.buffer[y * WIDTH + x] = rgb;
    }

    fn present(&mut self) {
        if let Err(err) = self.window.update_with_buffer(&self.buffer, WIDTH, HEIGHT) {
            error!("failed to update window: {err}");
        }
    }
}

/// Keys held when the last frame was presented; player 1 only.
#[derive(Default)]
struct Keyboard(Vec<Key>);

impl Keyboard {
    fn keys_for(button: Button) -> &'static [Key] {
        match button {
            Button::A => &[Key::J, Key::Z],
            Button::B => &[Key::K, Key::X],
            Button::Select => &[Key::RightShift],
            Button::Start => &[Key::Enter],
            Button::Up => &[Key::W, Key::Up],
            Button::Down => &[Key::S, Key::Down],
            Button::Left => &[Key::A, Key::Left],
            Button::Right => &[Key::D, Key::Right],
        }
    }
}

impl InputSource for Keyboard {
    fn is_pressed(&self, port: usize, button: Button) -> bool {
        port == 0 && Self::keys_for(button).iter().any(|k| self.0.contains(k))
    }
}

/// Display that drops pixels; used for headless runs.
struct Headless;

impl Display for Headless {
    fn draw_pixel(&mut self, _x: usize, _y: usize, _rgb: u32) {}
    fn present(&mut self) {}
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.trace {
        logger.filter_module("nestor::cpu", LevelFilter::Trace);
    }
    logger.init();

    if let Err(err) = run(&args) {
        eprintln!("{} {err:#}", Red.bold().paint("ERROR"));
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut console = Console::load(&args.rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;

    if args.chr {
        return show_pattern_tables(&console, args.scale);
    }
    if let Some(frames) = args.frames {
        return run_headless(&mut console, frames);
    }

    let mut screen = Screen::open("Nestor", WIDTH, HEIGHT, args.scale)?;
    let mut keyboard = Keyboard::default();
    info!("running {}", args.rom.display());

    while screen.is_running() {
        let frame_start = Instant::now();

        console.update(&mut screen, &keyboard)?;
        keyboard = Keyboard(screen.window.get_keys());

        // Pace to ~60 fps so we don't burn CPU (emulation is far faster than real NES)
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    Ok(())
}

fn run_headless(console: &mut Console, frames: u64) -> Result<()> {
    let start = Instant::now();
    for _ in 0..frames {
        console.run_frame(&mut Headless)?;
    }

    println!(
        "{} {} frame(s) presented, {} CPU cycles, PC=${:04X}, {:.2?} elapsed",
        Green.bold().paint("DONE"),
        console.frames(),
        console.cpu.cycles(),
        console.cpu.pc,
        start.elapsed()
    );
    Ok(())
}

fn show_pattern_tables(console: &Console, scale: WindowScale) -> Result<()> {
    let view = console.pattern_tables();
    let mut screen = Screen::open("Nestor - pattern tables", CHR_VIEW_WIDTH, CHR_VIEW_HEIGHT, scale)?;

    while screen.is_running() {
        screen
            .window
            .update_with_buffer(&view, CHR_VIEW_WIDTH, CHR_VIEW_HEIGHT)
            .context("failed to update window")?;
        std::thread::sleep(FRAME_DURATION);
    }
    Ok(())
}
