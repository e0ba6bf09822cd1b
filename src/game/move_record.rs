use std::fmt;
use std::time::Duration;

use crate::rules::{AppliedMove, CandidateMove, Color, PieceKind, Square};

/// One half-move as it was played. Immutable once appended to a session's
/// move log.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub side: Color,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
    /// Session time at which the move was applied.
    pub applied_at: Duration,
}

impl MoveRecord {
    pub fn from_applied(applied: AppliedMove, applied_at: Duration) -> Self {
        Self {
            from: applied.from,
            to: applied.to,
            side: applied.side,
            piece: applied.piece,
            captured: applied.captured,
            promotion: applied.promotion,
            san: applied.san,
            applied_at,
        }
    }

    /// The move in the form the rules oracle accepts, for replays.
    pub fn candidate(&self) -> CandidateMove {
        CandidateMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san)
    }
}
