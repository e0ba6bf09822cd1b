//! Player statistics and the computer difficulty they drive.

use std::collections::HashSet;
use std::fmt;

use log::{debug, info};

use crate::game::config::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::game::session::{Session, SessionId};
use crate::game::status::GameResult;

/// Rating change applied to the computer after each finished game.
pub const DIFFICULTY_STEP: u16 = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum DifficultyLabel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl DifficultyLabel {
    pub fn for_rating(rating: u16) -> Self {
        match rating {
            0..=999 => DifficultyLabel::Beginner,
            1000..=1399 => DifficultyLabel::Intermediate,
            1400..=1799 => DifficultyLabel::Advanced,
            1800..=2199 => DifficultyLabel::Expert,
            _ => DifficultyLabel::Master,
        }
    }
}

impl fmt::Display for DifficultyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DifficultyLabel::Beginner => "Beginner",
            DifficultyLabel::Intermediate => "Intermediate",
            DifficultyLabel::Advanced => "Advanced",
            DifficultyLabel::Expert => "Expert",
            DifficultyLabel::Master => "Master",
        };
        write!(f, "{}", label)
    }
}

/// Win/loss/draw counts and the rating the computer plays at next.
///
/// Each finished session is counted once, however many times it is
/// reported.
#[derive(Clone, Debug)]
pub struct PlayerProfile {
    games_played: u32,
    wins: u32,
    losses: u32,
    draws: u32,
    difficulty: u16,
    recorded: HashSet<SessionId>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl PlayerProfile {
    pub fn new(difficulty: u16) -> Self {
        Self {
            games_played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            difficulty: clamp_difficulty(difficulty),
            recorded: HashSet::new(),
        }
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Percentage of games won, 0 before the first game.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        f64::from(self.wins) * 100.0 / f64::from(self.games_played)
    }

    pub fn difficulty(&self) -> u16 {
        self.difficulty
    }

    pub fn difficulty_label(&self) -> DifficultyLabel {
        DifficultyLabel::for_rating(self.difficulty)
    }

    /// Counts a finished session. Returns false if the session is still
    /// running or was already counted.
    pub fn record_session(&mut self, session: &Session) -> bool {
        match session.result() {
            Some(result) => self.record_game(session.id(), result),
            None => false,
        }
    }

    pub fn record_game(&mut self, id: SessionId, result: GameResult) -> bool {
        if !self.recorded.insert(id) {
            debug!("session {} already counted", id);
            return false;
        }

        self.games_played += 1;
        let difficulty = match result {
            GameResult::Win => {
                self.wins += 1;
                self.difficulty.saturating_add(DIFFICULTY_STEP)
            }
            GameResult::Loss => {
                self.losses += 1;
                self.difficulty.saturating_sub(DIFFICULTY_STEP)
            }
            GameResult::Draw => {
                self.draws += 1;
                self.difficulty
            }
        };
        self.difficulty = clamp_difficulty(difficulty);

        info!(
            "recorded {} for session {}; computer now plays at {} ({})",
            result,
            id,
            self.difficulty,
            self.difficulty_label()
        );
        true
    }
}

fn clamp_difficulty(difficulty: u16) -> u16 {
    difficulty.max(MIN_DIFFICULTY).min(MAX_DIFFICULTY)
}
