use std::time::Duration;

use crate::game::time_control::{TimeControl, UNTIMED_MOVE_INTERVAL};
use crate::rules::{Color, STARTING_POSITION_FEN};

pub const DEFAULT_DIFFICULTY: u16 = 1200;
pub const MIN_DIFFICULTY: u16 = 800;
pub const MAX_DIFFICULTY: u16 = 2400;

/// Everything needed to start a session against the computer.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub player_side: Color,
    /// Opponent rating label, 800-2400.
    pub difficulty: u16,
    pub time_control: TimeControl,
    /// Overrides the time control's increment when set.
    pub increment_seconds: Option<u32>,
    /// Pause before the opponent replies.
    pub thinking_delay: Duration,
    pub tick_interval: Duration,
    pub move_timer_interval: Duration,
    pub starting_position: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_side: Color::White,
            difficulty: DEFAULT_DIFFICULTY,
            time_control: TimeControl::default(),
            increment_seconds: None,
            thinking_delay: Duration::from_secs(1),
            tick_interval: Duration::from_secs(1),
            move_timer_interval: UNTIMED_MOVE_INTERVAL,
            starting_position: STARTING_POSITION_FEN.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn increment_seconds(&self) -> u32 {
        self.increment_seconds
            .unwrap_or_else(|| self.time_control.increment_seconds())
    }

    pub fn clamped_difficulty(&self) -> u16 {
        self.difficulty.max(MIN_DIFFICULTY).min(MAX_DIFFICULTY)
    }
}
