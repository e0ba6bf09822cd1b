//! The session record and the only operations allowed to change it.

use std::convert::TryFrom;
use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::game::clock::{ChessClock, MoveTimer};
use crate::game::config::SessionConfig;
use crate::game::move_record::MoveRecord;
use crate::game::status::{GameResult, GameStatus, Outcome};
use crate::game::time_control::TimeControl;
use crate::rules::{side_to_move, Color, PieceKind, RulesError, RulesOracle, Square};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("the game is over ({status})")]
    GameOver { status: GameStatus },
    #[error("move history is being viewed; return to the live position first")]
    NotLive,
    #[error("it is {turn}'s turn")]
    NotYourTurn { turn: Color },
    #[error("no position at ply {requested} (game has {len} plies)")]
    InvalidCursor { requested: usize, len: usize },
    #[error("already at the starting position")]
    AtStart,
    #[error("already at the live position")]
    AtLive,
    #[error("the session has been closed")]
    Closed,
    #[error("rules error: {error}")]
    Rules { error: RulesError },
}

impl From<RulesError> for SessionError {
    fn from(error: RulesError) -> Self {
        SessionError::Rules { error }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Which position the board shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cursor {
    /// The true end of the game. Moves are only accepted here.
    Live,
    /// The position after the first `n` moves of the log. `Ply(0)` is the
    /// starting position.
    Ply(usize),
}

/// Pieces taken by each side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    pub by_white: Vec<PieceKind>,
    pub by_black: Vec<PieceKind>,
}

impl CapturedPieces {
    pub fn from_moves(moves: &[MoveRecord]) -> Self {
        let mut captured = Self::default();
        for record in moves {
            if let Some(piece) = record.captured {
                match record.side {
                    Color::White => captured.by_white.push(piece),
                    Color::Black => captured.by_black.push(piece),
                }
            }
        }
        captured
    }

    pub fn taken_by(&self, side: Color) -> &[PieceKind] {
        match side {
            Color::White => &self.by_white,
            Color::Black => &self.by_black,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_white.is_empty() && self.by_black.is_empty()
    }
}

/// Everything a board widget needs to draw one position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionView {
    pub snapshot: String,
    pub captured: CapturedPieces,
    pub last_move: Option<(Square, Square)>,
    pub king_in_check: Option<Square>,
    /// Set when the history could not be replayed and the view fell back to
    /// the starting position.
    pub degraded: bool,
}

/// Result of asking the oracle whether its position ends the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TerminationCheck {
    pub status: GameStatus,
    pub winner: Option<Color>,
    /// From the perspective side's point of view, when the game ended.
    pub result: Option<GameResult>,
}

impl TerminationCheck {
    pub fn ended(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.ended() {
            Some(Outcome {
                status: self.status,
                winner: self.winner,
            })
        } else {
            None
        }
    }
}

/// Checks the oracle's current position for checkmate, stalemate and other
/// draws, in that order.
pub fn evaluate_termination<O: RulesOracle>(oracle: &O, perspective: Color) -> TerminationCheck {
    let outcome = if oracle.is_checkmate() {
        // the side to move has no escape
        Some(Outcome::decisive(
            GameStatus::Checkmate,
            oracle.turn_to_move().opposite(),
        ))
    } else if oracle.is_stalemate() {
        Some(Outcome::drawn(GameStatus::Stalemate))
    } else if oracle.is_draw() {
        Some(Outcome::drawn(GameStatus::Draw))
    } else {
        None
    };

    match outcome {
        Some(outcome) => TerminationCheck {
            status: outcome.status,
            winner: outcome.winner,
            result: Some(outcome.result_for(perspective)),
        },
        None => TerminationCheck {
            status: GameStatus::InProgress,
            winner: None,
            result: None,
        },
    }
}

/// One game against the computer.
///
/// The side to move, the status and the live board view are derived on
/// read. The only stored state is the position snapshot, the move log, the
/// outcome, the clocks and the navigation cursor.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    player_side: Color,
    difficulty: u16,
    time_control: TimeControl,
    initial_snapshot: String,
    snapshot: String,
    move_log: Vec<MoveRecord>,
    outcome: Option<Outcome>,
    clock: ChessClock,
    move_timer: MoveTimer,
    cursor: Cursor,
    history_view: Option<PositionView>,
}

impl Session {
    /// A fresh session at `initial_snapshot`, which must already have been
    /// accepted by a rules oracle.
    pub fn new(id: SessionId, config: &SessionConfig, initial_snapshot: String) -> Self {
        let time_control = config.time_control;
        let move_timer_seconds =
            u32::try_from(config.move_timer_interval.as_secs()).unwrap_or(u32::MAX);
        info!(
            "starting session {} as {} ({}, difficulty {})",
            id,
            config.player_side,
            time_control,
            config.clamped_difficulty()
        );
        Self {
            id,
            player_side: config.player_side,
            difficulty: config.clamped_difficulty(),
            time_control,
            snapshot: initial_snapshot.clone(),
            initial_snapshot,
            move_log: Vec::new(),
            outcome: None,
            clock: ChessClock::new(time_control.initial_seconds(), config.increment_seconds()),
            move_timer: MoveTimer::new(move_timer_seconds),
            cursor: Cursor::Live,
            history_view: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player_side(&self) -> Color {
        self.player_side
    }

    pub fn opponent_side(&self) -> Color {
        self.player_side.opposite()
    }

    pub fn difficulty(&self) -> u16 {
        self.difficulty
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    pub fn initial_snapshot(&self) -> &str {
        &self.initial_snapshot
    }

    /// The live position, whatever the cursor shows.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.move_log
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.move_log.last()
    }

    /// Side to move in the live position.
    pub fn turn(&self) -> Color {
        side_to_move(&self.snapshot).unwrap_or(Color::White)
    }

    pub fn is_players_turn(&self) -> bool {
        self.turn() == self.player_side
    }

    pub fn status(&self) -> GameStatus {
        self.outcome
            .map_or(GameStatus::InProgress, |outcome| outcome.status)
    }

    pub fn is_in_progress(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The result from the player's point of view, once the game is over.
    pub fn result(&self) -> Option<GameResult> {
        self.outcome
            .map(|outcome| outcome.result_for(self.player_side))
    }

    pub fn clock(&self) -> &ChessClock {
        &self.clock
    }

    pub fn move_timer(&self) -> &MoveTimer {
        &self.move_timer
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_live(&self) -> bool {
        self.cursor == Cursor::Live
    }

    /// The replayed position while the cursor is off the live position.
    pub fn history_view(&self) -> Option<&PositionView> {
        self.history_view.as_ref()
    }

    /// Number of moves behind the cursor.
    pub fn cursor_ply(&self) -> usize {
        match self.cursor {
            Cursor::Live => self.move_log.len(),
            Cursor::Ply(ply) => ply,
        }
    }

    pub fn captured_pieces(&self) -> CapturedPieces {
        CapturedPieces::from_moves(&self.move_log)
    }

    /// Appends a move played from the live position.
    pub fn record_move(&mut self, record: MoveRecord, snapshot: String) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if !self.is_live() {
            warn!("rejected {} while viewing history", record.san);
            return Err(SessionError::NotLive);
        }

        debug!("ply {}: {} -> {}", self.move_log.len() + 1, record.san, snapshot);
        self.move_log.push(record);
        self.snapshot = snapshot;
        Ok(())
    }

    /// Credits the increment to the side that just moved and restarts the
    /// soft move timer.
    pub fn complete_ply(&mut self, mover: Color) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.clock.add_increment(mover);
        self.move_timer.reset();
        Ok(())
    }

    /// Ends the game. Only the first call has any effect; returns whether
    /// this call was it.
    pub fn conclude(&mut self, outcome: Outcome) -> bool {
        if let Some(existing) = self.outcome {
            debug!(
                "ignoring {} for session {}, already ended by {}",
                outcome.status, self.id, existing.status
            );
            return false;
        }
        info!(
            "session {} ended: {} (player {})",
            self.id,
            outcome.status,
            outcome.result_for(self.player_side)
        );
        self.outcome = Some(outcome);
        true
    }

    /// Returns the result for the resigning side, which is always a loss.
    pub fn resign(&mut self, side: Color) -> Result<GameResult, SessionError> {
        self.ensure_in_progress()?;
        let outcome = Outcome::decisive(GameStatus::Resigned, side.opposite());
        self.conclude(outcome);
        Ok(outcome.result_for(side))
    }

    /// One second off the side to move. Returns the outcome if that flagged
    /// them.
    pub fn tick_clock(&mut self) -> Result<Option<Outcome>, SessionError> {
        self.ensure_in_progress()?;
        if !self.time_control.is_timed() {
            return Ok(None);
        }

        let side = self.turn();
        if !self.clock.tick(side) {
            return Ok(None);
        }

        let outcome = Outcome::decisive(GameStatus::Timeout, side.opposite());
        self.conclude(outcome);
        Ok(Some(outcome))
    }

    /// Returns true on the tick that empties the soft move timer.
    pub fn tick_move_timer(&mut self) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        Ok(self.move_timer.tick())
    }

    pub fn set_remaining(&mut self, side: Color, seconds: u32) {
        self.clock.set_remaining(side, seconds);
    }

    /// Moves the cursor, replaying the history on `scratch` to rebuild the
    /// position shown there. `scratch` must not be the oracle tracking the
    /// live game.
    ///
    /// A log that cannot be replayed leaves the view on the starting
    /// position, flagged as degraded.
    pub fn navigate_to<O: RulesOracle>(
        &mut self,
        target: Cursor,
        scratch: &mut O,
    ) -> Result<(), SessionError> {
        self.ensure_in_progress()?;

        let ply = match target {
            Cursor::Live => self.move_log.len(),
            Cursor::Ply(ply) => ply,
        };
        if ply > self.move_log.len() {
            return Err(SessionError::InvalidCursor {
                requested: ply,
                len: self.move_log.len(),
            });
        }

        if ply == self.move_log.len() {
            self.cursor = Cursor::Live;
            self.history_view = None;
            return Ok(());
        }

        self.cursor = Cursor::Ply(ply);
        self.history_view = Some(self.replay(ply, scratch));
        Ok(())
    }

    /// The cursor one move earlier than the current one.
    pub fn previous_cursor(&self) -> Option<Cursor> {
        self.cursor_ply().checked_sub(1).map(Cursor::Ply)
    }

    /// The cursor one move later, `None` when already live.
    pub fn next_cursor(&self) -> Option<Cursor> {
        match self.cursor {
            Cursor::Live => None,
            Cursor::Ply(ply) if ply + 1 >= self.move_log.len() => Some(Cursor::Live),
            Cursor::Ply(ply) => Some(Cursor::Ply(ply + 1)),
        }
    }

    fn replay<O: RulesOracle>(&self, ply: usize, scratch: &mut O) -> PositionView {
        let moves = &self.move_log[..ply];

        let replayed = scratch.load_position(&self.initial_snapshot).is_ok()
            && moves
                .iter()
                .all(|record| scratch.apply_move(&record.candidate()).is_some());

        if replayed {
            return PositionView {
                snapshot: scratch.serialize(),
                captured: CapturedPieces::from_moves(moves),
                last_move: moves.last().map(|record| (record.from, record.to)),
                king_in_check: scratch.king_in_check(),
                degraded: false,
            };
        }

        warn!(
            "could not replay {} moves of session {}; showing the starting position",
            ply, self.id
        );
        if scratch.load_position(&self.initial_snapshot).is_err() {
            scratch.reset();
        }
        PositionView {
            snapshot: self.initial_snapshot.clone(),
            captured: CapturedPieces::default(),
            last_move: None,
            king_in_check: None,
            degraded: true,
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.outcome {
            Some(outcome) => Err(SessionError::GameOver {
                status: outcome.status,
            }),
            None => Ok(()),
        }
    }
}
