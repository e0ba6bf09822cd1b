//! The rules seam. The session core never inspects a board itself: it asks a
//! [`RulesOracle`] whether a move is legal, what the resulting position is,
//! and whether the game is over.

pub mod color;
pub mod error;
pub mod piece;
pub mod square;
pub mod standard;

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

pub use color::Color;
pub use error::RulesError;
pub use piece::PieceKind;
pub use square::Square;
pub use standard::StandardRules;

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

static COORDINATE_MOVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^([a-h][1-8])([a-h][1-8])([nbrq])?$")
        .expect("COORDINATE_MOVE_RE regex should be valid")
});

/// A proposed move as it arrives from a board widget or the terminal:
/// just squares and an optional promotion hint.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct CandidateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl fmt::Display for CandidateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.to_char())?;
        }
        Ok(())
    }
}

/// Parses coordinate notation such as `e2e4` or `e7e8q`.
impl FromStr for CandidateMove {
    type Err = RulesError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase();
        let invalid = || RulesError::InvalidMove {
            input: input.to_string(),
        };
        let caps = COORDINATE_MOVE_RE.captures(&normalized).ok_or_else(invalid)?;
        let from = caps[1].parse::<Square>()?;
        let to = caps[2].parse::<Square>()?;
        let promotion = match caps.get(3) {
            Some(m) => Some(
                m.as_str()
                    .chars()
                    .next()
                    .and_then(PieceKind::from_char)
                    .ok_or_else(invalid)?,
            ),
            None => None,
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

/// What the oracle reports back after it accepted and played a move.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    pub side: Color,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
}

impl AppliedMove {
    pub fn candidate(&self) -> CandidateMove {
        CandidateMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

/// A chess rules engine holding one live position.
///
/// Implementations own their position outright. Callers exchange positions
/// only as FEN snapshots through [`RulesOracle::load_position`] and
/// [`RulesOracle::serialize`].
pub trait RulesOracle {
    fn load_position(&mut self, snapshot: &str) -> Result<(), RulesError>;

    /// Plays `candidate` if it is legal. Returns `None` for illegal or
    /// unplayable input, leaving the position untouched.
    fn apply_move(&mut self, candidate: &CandidateMove) -> Option<AppliedMove>;

    fn legal_moves(&self) -> Vec<CandidateMove>;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    /// Draws other than stalemate: insufficient material, fifty-move rule,
    /// threefold repetition.
    fn is_draw(&self) -> bool;

    fn turn_to_move(&self) -> Color;

    fn serialize(&self) -> String;

    /// Square of the side-to-move's king when it is in check.
    fn king_in_check(&self) -> Option<Square>;

    fn reset(&mut self) {
        // the standard starting position is always loadable
        let _ = self.load_position(STARTING_POSITION_FEN);
    }

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_draw()
    }
}

/// Side to move read straight from a FEN snapshot, without consulting an
/// oracle.
pub fn side_to_move(snapshot: &str) -> Option<Color> {
    snapshot
        .split_whitespace()
        .nth(1)
        .and_then(|field| field.chars().next())
        .and_then(Color::from_fen)
}
