//! Common types re-exported for convenience.

pub use crate::game::{
    Cursor, GameResult, GameStatus, Orchestrator, SessionConfig, SessionError, SessionEvent,
    Submission, TimeControl,
};
pub use crate::rules::{CandidateMove, Color, PieceKind, RulesOracle, Square, StandardRules};
