//! Per-side countdown clocks and the soft move timer used in untimed games.

use crate::rules::Color;

/// Remaining seconds for each side. Never negative: decrements saturate at
/// zero, and reaching zero is reported to the caller so it can resolve the
/// timeout before anything else happens.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChessClock {
    white_remaining: u32,
    black_remaining: u32,
    increment: u32,
}

impl ChessClock {
    pub fn new(initial_seconds: u32, increment_seconds: u32) -> Self {
        Self {
            white_remaining: initial_seconds,
            black_remaining: initial_seconds,
            increment: increment_seconds,
        }
    }

    pub fn remaining(&self, side: Color) -> u32 {
        match side {
            Color::White => self.white_remaining,
            Color::Black => self.black_remaining,
        }
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    pub fn set_remaining(&mut self, side: Color, seconds: u32) {
        *self.remaining_mut(side) = seconds;
    }

    /// Takes one second off `side`. Returns true once that side is out of
    /// time.
    pub fn tick(&mut self, side: Color) -> bool {
        let remaining = self.remaining_mut(side);
        *remaining = remaining.saturating_sub(1);
        *remaining == 0
    }

    /// Credits the increment to the side that just moved.
    pub fn add_increment(&mut self, side: Color) {
        let increment = self.increment;
        let remaining = self.remaining_mut(side);
        *remaining = remaining.saturating_add(increment);
    }

    fn remaining_mut(&mut self, side: Color) -> &mut u32 {
        match side {
            Color::White => &mut self.white_remaining,
            Color::Black => &mut self.black_remaining,
        }
    }
}

/// Informational per-move countdown. Resets on every move and has no effect
/// on the game when it runs out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveTimer {
    interval: u32,
    remaining: u32,
}

impl MoveTimer {
    pub fn new(interval_seconds: u32) -> Self {
        Self {
            interval: interval_seconds,
            remaining: interval_seconds,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reset(&mut self) {
        self.remaining = self.interval;
    }

    /// Returns true on the tick that empties the timer.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// `mm:ss`, as shown next to each player.
pub fn format_seconds(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
