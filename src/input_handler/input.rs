//! Terminal command parsing.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::rules::CandidateMove;

static GOTO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:goto|view) (\d{1,4})$").expect("GOTO_RE regex should be valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("io error: {error:?}")]
    IOError { error: String },
    #[error("invalid input: {input:?}")]
    InvalidInput { input: String },
}

/// One line typed by the player during a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    Move(CandidateMove),
    /// Show the position one move earlier.
    Undo,
    /// Show the position one move later.
    Redo,
    /// Show the position after this many moves.
    Goto(usize),
    Live,
    Resign,
    Pgn,
    /// Start another game once the current one is over.
    NewGame,
    Help,
    Quit,
}

impl FromStr for PlayerCommand {
    type Err = InputError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim().to_lowercase();

        let command = match trimmed.as_str() {
            "u" | "undo" | "back" => PlayerCommand::Undo,
            "r" | "redo" | "forward" => PlayerCommand::Redo,
            "l" | "live" => PlayerCommand::Live,
            "resign" => PlayerCommand::Resign,
            "pgn" => PlayerCommand::Pgn,
            "n" | "new" => PlayerCommand::NewGame,
            "h" | "help" | "?" => PlayerCommand::Help,
            "q" | "quit" | "exit" => PlayerCommand::Quit,
            other => {
                if let Some(caps) = GOTO_RE.captures(other) {
                    let ply = caps[1].parse().map_err(|_| InputError::InvalidInput {
                        input: input.to_string(),
                    })?;
                    return Ok(PlayerCommand::Goto(ply));
                }
                let candidate = other.parse().map_err(|_| InputError::InvalidInput {
                    input: input.to_string(),
                })?;
                PlayerCommand::Move(candidate)
            }
        };

        Ok(command)
    }
}

/// Answer to "resign and leave?".
pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

pub const HELP_TEXT: &str = "\
moves:    e2e4, e7e8q (promotion piece optional, queen by default)
history:  undo | redo | goto <n> | live
game:     resign | pgn | new | quit";

/// Collects raw bytes from a non-blocking reader into complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished line, without its terminator, once a newline
    /// arrives. Blank lines are skipped.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\n' | b'\r' => {
                let line = String::from_utf8_lossy(&self.pending).trim().to_string();
                self.pending.clear();
                if line.is_empty() {
                    None
                } else {
                    Some(line)
                }
            }
            // backspace / delete
            0x08 | 0x7f => {
                self.pending.pop();
                None
            }
            _ => {
                self.pending.push(byte);
                None
            }
        }
    }
}
