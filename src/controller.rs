//! NES controller input handling.
//!
//! Implements the standard NES controller serial protocol: write $01 to $4016 to latch the
//! current state and enable polling; then read $4016 (port 0) or $4017 (port 1) repeatedly to
//! get one bit per read (A, B, Select, Start, Up, Down, Left, Right).

/// Idle marker returned once the eight buttons have been shifted out, or before any latch.
pub const IDLE: u8 = 0x40;

/// Controller buttons in the order they are shifted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];
}

/// Source of per-button pressed state, polled once between frames.
pub trait InputSource {
    fn is_pressed(&self, port: usize, button: Button) -> bool;
}

/// Represents a single NES controller connected to $4016 or $4017.
#[derive(Default)]
pub struct Controller {
    /// Current button states: bit 0 = A, 1 = B, 2 = Select, 3 = Start, 4 = Up, 5 = Down, 6 = Left, 7 = Right.
    pub state: u8,
    /// Latched copy of `state`, shifted out LSB-first.
    shift: u8,
    /// Next button to report; `None` when polling is disabled or exhausted.
    index: Option<u8>,
}

impl Controller {
    /// Create a new controller with no buttons pressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh `state` from an input source.
    pub fn poll(&mut self, input: &dyn InputSource, port: usize) {
        self.state = Button::ALL
            .iter()
            .enumerate()
            .filter(|(_, button)| input.is_pressed(port, **button))
            .fold(0, |state, (bit, _)| state | (1 << bit));
    }

    /// Read one button state. Returns the next bit OR'd with the idle marker, or the bare
    /// marker once all eight have been read.
    pub fn read(&mut self) -> u8 {
        match self.index {
            Some(i) => {
                let bit = (self.shift >> i) & 1;
                self.index = if i < 7 { Some(i + 1) } else { None };
                bit | IDLE
            }
            None => IDLE,
        }
    }

    /// Write to $4016. When bit 0 is 1, latch current button state and restart polling.
    pub fn write(&mut self, data: u8) {
        if data & 1 != 0 {
            self.shift = self.state;
            self.index = Some(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Held(&'static [Button]);

    impl InputSource for Held {
        fn is_pressed(&self, port: usize, button: Button) -> bool {
            port == 0 && self.0.contains(&button)
        }
    }

    #[test]
    fn shifts_out_buttons_in_order() {
        let mut pad = Controller::new();
        pad.poll(&Held(&[Button::A, Button::Start, Button::Right]), 0);
        pad.write(1);
        pad.write(0);

        let bits: Vec<u8> = (0..8).map(|_| pad.read() & 1).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn reads_idle_marker_when_exhausted_or_unlatched() {
        let mut pad = Controller::new();
        pad.poll(&Held(&[Button::A]), 0);
        assert_eq!(pad.read(), IDLE);

        pad.write(1);
        assert_eq!(pad.read(), IDLE | 1);
        for _ in 0..7 {
            pad.read();
        }
        assert_eq!(pad.read(), IDLE);
    }

    #[test]
    fn second_port_reads_its_own_state() {
        let mut pad = Controller::new();
        pad.poll(&Held(&[Button::A]), 1);
        assert_eq!(pad.state, 0);
    }
}
