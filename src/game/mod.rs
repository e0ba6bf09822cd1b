pub mod clock;
pub mod config;
pub mod display;
pub mod executor;
pub mod move_record;
pub mod opponent;
pub mod orchestrator;
pub mod pgn;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod time_control;

pub use clock::{ChessClock, MoveTimer};
pub use config::SessionConfig;
pub use executor::Submission;
pub use move_record::MoveRecord;
pub use opponent::{
    GreedyMaterialSelector, Opponent, OpponentStrategy, RandomMoveSelector, StrategyKind,
};
pub use orchestrator::{LeaveDecision, Orchestrator, SessionEvent};
pub use scheduler::{Scheduler, TimerKind};
pub use session::{CapturedPieces, Cursor, PositionView, Session, SessionError, SessionId};
pub use status::{GameResult, GameStatus, Outcome};
pub use time_control::TimeControl;

#[cfg(test)]
mod tests;
