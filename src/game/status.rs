use std::fmt;

use crate::rules::Color;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum GameStatus {
    InProgress,
    Checkmate,
    Stalemate,
    Draw,
    Resigned,
    Timeout,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            GameStatus::InProgress => "in progress",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw => "draw",
            GameStatus::Resigned => "resigned",
            GameStatus::Timeout => "timeout",
        };
        write!(f, "{}", status)
    }
}

/// A game result from one side's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self {
            GameResult::Win => "win",
            GameResult::Loss => "loss",
            GameResult::Draw => "draw",
        };
        write!(f, "{}", result)
    }
}

/// How a game ended. Stored once and never replaced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Outcome {
    pub status: GameStatus,
    /// `None` for drawn games.
    pub winner: Option<Color>,
}

impl Outcome {
    pub fn decisive(status: GameStatus, winner: Color) -> Self {
        Self {
            status,
            winner: Some(winner),
        }
    }

    pub fn drawn(status: GameStatus) -> Self {
        Self {
            status,
            winner: None,
        }
    }

    pub fn result_for(&self, side: Color) -> GameResult {
        match self.winner {
            Some(winner) if winner == side => GameResult::Win,
            Some(_) => GameResult::Loss,
            None => GameResult::Draw,
        }
    }

    /// PGN result token.
    pub fn to_pgn(&self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}
