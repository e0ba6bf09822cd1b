//! Turn-taking between the player and the computer.
//!
//! The orchestrator owns the session, the live rules oracle and a scratch
//! oracle for history replays. Time only moves when [`Orchestrator::advance`]
//! is called; every timer it arms carries the generation it was armed under
//! and is discarded on firing if that generation has moved on.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, info, warn};

use crate::game::config::SessionConfig;
use crate::game::executor::{self, Submission};
use crate::game::move_record::MoveRecord;
use crate::game::opponent::{OpponentStrategy, RandomMoveSelector};
use crate::game::scheduler::{Scheduler, Timer, TimerId, TimerKind};
use crate::game::session::{
    evaluate_termination, CapturedPieces, Cursor, PositionView, Session, SessionError, SessionId,
};
use crate::game::status::{GameResult, Outcome};
use crate::rules::{CandidateMove, Color, RulesOracle, Square, StandardRules};

/// Things a front end may want to react to, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Started {
        id: SessionId,
    },
    MoveApplied {
        record: MoveRecord,
        by_opponent: bool,
    },
    Navigated {
        cursor: Cursor,
    },
    /// The soft move timer of an untimed game ran out. Informational.
    MoveTimerExpired,
    /// The only event that warrants a dialog.
    GameEnded {
        outcome: Outcome,
        result: GameResult,
    },
}

/// Whether leaving the game screen needs the player to confirm first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LeaveDecision {
    Immediate,
    /// The game is still running; confirming resigns it.
    NeedsConfirmation,
}

pub struct Orchestrator<S = RandomMoveSelector, O = StandardRules>
where
    S: OpponentStrategy,
    O: RulesOracle + Clone,
{
    config: SessionConfig,
    session: Session,
    oracle: O,
    scratch: O,
    opponent: S,
    scheduler: Scheduler,
    /// Bumped on session start and teardown. Guards the clock timers.
    session_generation: u64,
    /// Bumped on every applied move and navigation. Guards opponent moves.
    position_generation: u64,
    opponent_timer: Option<TimerId>,
    clock_timer: Option<TimerId>,
    move_timer: Option<TimerId>,
    events: VecDeque<SessionEvent>,
    closed: bool,
}

impl Orchestrator<RandomMoveSelector, StandardRules> {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_parts(config, StandardRules::new(), RandomMoveSelector::new())
    }
}

impl<S, O> Orchestrator<S, O>
where
    S: OpponentStrategy,
    O: RulesOracle + Clone,
{
    /// Builds an orchestrator and starts its first session.
    pub fn with_parts(config: SessionConfig, oracle: O, opponent: S) -> Result<Self, SessionError> {
        let mut oracle = oracle;
        oracle.load_position(&config.starting_position)?;
        let session = Session::new(SessionId::generate(), &config, oracle.serialize());
        let scratch = oracle.clone();

        let mut orchestrator = Self {
            config,
            session,
            oracle,
            scratch,
            opponent,
            scheduler: Scheduler::new(),
            session_generation: 0,
            position_generation: 0,
            opponent_timer: None,
            clock_timer: None,
            move_timer: None,
            events: VecDeque::new(),
            closed: false,
        };
        orchestrator.begin();
        Ok(orchestrator)
    }

    /// Throws the current session away and starts a new one. Nothing from the
    /// old session, including its pending timers, survives.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        self.oracle.load_position(&config.starting_position)?;
        self.cancel_timers();
        self.session = Session::new(SessionId::generate(), &config, self.oracle.serialize());
        self.config = config;
        self.closed = false;
        self.events.clear();
        self.begin();
        Ok(())
    }

    fn begin(&mut self) {
        self.session_generation += 1;
        self.position_generation += 1;
        self.events.push_back(SessionEvent::Started {
            id: self.session.id(),
        });

        // a starting position may already be decided
        let check = evaluate_termination(&self.oracle, self.session.player_side());
        if let Some(outcome) = check.outcome() {
            self.session.conclude(outcome);
            self.finish(outcome);
            return;
        }

        if self.session.time_control().is_timed() {
            self.clock_timer = Some(self.arm_tick(TimerKind::ClockTick));
        } else {
            self.move_timer = Some(self.arm_tick(TimerKind::MoveTimerTick));
        }
        self.schedule_opponent_if_due();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn opponent_move_pending(&self) -> bool {
        self.opponent_timer
            .map_or(false, |id| self.scheduler.is_pending(id))
    }

    /// Clock values a test or debug tool wants to force.
    pub fn set_remaining(&mut self, side: Color, seconds: u32) {
        self.session.set_remaining(side, seconds);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    /// The player's move from the board widget or terminal.
    ///
    /// Out-of-turn moves, moves while history is shown and moves after the
    /// game ended are refused with an error. An illegal move is not an
    /// error: it comes back as [`Submission::Rejected`] and changes nothing.
    pub fn submit_player_move(
        &mut self,
        candidate: CandidateMove,
    ) -> Result<Submission, SessionError> {
        self.ensure_open()?;
        if let Some(outcome) = self.session.outcome() {
            return Err(SessionError::GameOver {
                status: outcome.status,
            });
        }
        if !self.session.is_live() {
            return Err(SessionError::NotLive);
        }
        let turn = self.session.turn();
        if turn != self.session.player_side() {
            return Err(SessionError::NotYourTurn { turn });
        }

        let submission = executor::submit(
            &mut self.oracle,
            self.session.snapshot(),
            &candidate,
            self.scheduler.now(),
        );
        match &submission {
            Submission::Accepted { record, snapshot } => {
                self.apply_ply(record.clone(), snapshot.clone(), false)?;
            }
            Submission::Rejected => debug!("ignoring illegal move {}", candidate),
        }
        Ok(submission)
    }

    /// Resigns on the player's behalf.
    pub fn resign(&mut self) -> Result<GameResult, SessionError> {
        self.ensure_open()?;
        let result = self.session.resign(self.session.player_side())?;
        if let Some(outcome) = self.session.outcome() {
            self.finish(outcome);
        }
        Ok(result)
    }

    pub fn navigate_to(&mut self, target: Cursor) -> Result<(), SessionError> {
        self.ensure_open()?;
        let len = self.session.moves().len();
        let target = match target {
            Cursor::Ply(ply) if ply == len => Cursor::Live,
            other => other,
        };
        if target == self.session.cursor() && self.session.is_in_progress() {
            return Ok(());
        }
        self.session.navigate_to(target, &mut self.scratch)?;

        // any reply already queued was chosen for a position no longer shown
        self.position_generation += 1;
        if let Some(id) = self.opponent_timer.take() {
            self.scheduler.cancel(id);
        }

        let cursor = self.session.cursor();
        debug!("navigated to {:?}", cursor);
        self.events.push_back(SessionEvent::Navigated { cursor });
        self.schedule_opponent_if_due();
        Ok(())
    }

    /// Steps one move back through the history.
    pub fn undo(&mut self) -> Result<(), SessionError> {
        let target = self
            .session
            .previous_cursor()
            .ok_or(SessionError::AtStart)?;
        self.navigate_to(target)
    }

    /// Steps one move forward, back towards the live position.
    pub fn redo(&mut self) -> Result<(), SessionError> {
        let target = self.session.next_cursor().ok_or(SessionError::AtLive)?;
        self.navigate_to(target)
    }

    pub fn return_to_live(&mut self) -> Result<(), SessionError> {
        self.navigate_to(Cursor::Live)
    }

    /// Moves time forward by `elapsed`, firing every timer that falls due on
    /// the way in order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.fire(timer);
        }
        self.scheduler.advance_to(until);
    }

    pub fn request_leave(&self) -> LeaveDecision {
        if self.session.is_in_progress() && !self.closed {
            LeaveDecision::NeedsConfirmation
        } else {
            LeaveDecision::Immediate
        }
    }

    /// Leaves the game screen. A running game is resigned first, before this
    /// returns. Returns the player's result when this call ended the game.
    pub fn confirm_leave(&mut self) -> Result<Option<GameResult>, SessionError> {
        let result = if self.session.is_in_progress() && !self.closed {
            Some(self.resign()?)
        } else {
            None
        };
        self.teardown();
        Ok(result)
    }

    /// Cancels everything pending. The session stays readable.
    pub fn teardown(&mut self) {
        if self.closed {
            return;
        }
        info!("tearing down session {}", self.session.id());
        self.cancel_timers();
        self.session_generation += 1;
        self.position_generation += 1;
        self.closed = true;
    }

    /// The position the board should show, following the cursor.
    pub fn view(&self) -> PositionView {
        match self.session.history_view() {
            Some(view) => view.clone(),
            None => PositionView {
                snapshot: self.session.snapshot().to_string(),
                captured: self.session.captured_pieces(),
                last_move: self
                    .session
                    .last_move()
                    .map(|record| (record.from, record.to)),
                king_in_check: self.oracle.king_in_check(),
                degraded: false,
            },
        }
    }

    pub fn current_snapshot(&self) -> String {
        self.view().snapshot
    }

    pub fn last_move_squares(&self) -> Option<(Square, Square)> {
        self.view().last_move
    }

    pub fn king_in_check_square(&self) -> Option<Square> {
        self.view().king_in_check
    }

    pub fn captured_pieces(&self) -> CapturedPieces {
        self.view().captured
    }

    /// Legal moves for the player in the live position, for move hints.
    pub fn legal_moves(&self) -> Vec<CandidateMove> {
        if self.session.is_in_progress() && self.session.is_live() && self.session.is_players_turn() {
            self.oracle.legal_moves()
        } else {
            Vec::new()
        }
    }

    fn apply_ply(
        &mut self,
        record: MoveRecord,
        snapshot: String,
        by_opponent: bool,
    ) -> Result<(), SessionError> {
        let mover = record.side;
        self.session.record_move(record.clone(), snapshot)?;
        self.position_generation += 1;
        self.events.push_back(SessionEvent::MoveApplied {
            record,
            by_opponent,
        });

        let check = evaluate_termination(&self.oracle, self.session.player_side());
        if let Some(outcome) = check.outcome() {
            self.session.conclude(outcome);
            self.finish(outcome);
            return Ok(());
        }

        self.session.complete_ply(mover)?;
        self.schedule_opponent_if_due();
        Ok(())
    }

    fn schedule_opponent_if_due(&mut self) {
        if self.closed
            || !self.session.is_in_progress()
            || !self.session.is_live()
            || self.session.is_players_turn()
            || self.opponent_move_pending()
        {
            return;
        }
        let id = self.scheduler.schedule(
            TimerKind::OpponentMove,
            self.config.thinking_delay,
            self.position_generation,
        );
        self.opponent_timer = Some(id);
    }

    fn fire(&mut self, timer: Timer) {
        let current = match timer.kind {
            TimerKind::OpponentMove => self.position_generation,
            TimerKind::ClockTick | TimerKind::MoveTimerTick => self.session_generation,
        };
        if timer.generation != current {
            debug!(
                "discarding stale {:?} from generation {} (now {})",
                timer.kind, timer.generation, current
            );
            return;
        }

        match timer.kind {
            TimerKind::OpponentMove => {
                self.opponent_timer = None;
                self.play_opponent_move();
            }
            TimerKind::ClockTick => {
                self.clock_timer = None;
                self.on_clock_tick();
            }
            TimerKind::MoveTimerTick => {
                self.move_timer = None;
                self.on_move_timer_tick();
            }
        }
    }

    fn play_opponent_move(&mut self) {
        // the player may have rewound, or the flag may have fallen
        if self.closed
            || !self.session.is_in_progress()
            || !self.session.is_live()
            || self.session.is_players_turn()
        {
            debug!("opponent move no longer wanted");
            return;
        }

        let candidate = match self
            .opponent
            .select(&self.oracle, self.session.difficulty())
        {
            Some(candidate) => candidate,
            None => {
                debug!("opponent has no legal move");
                let check = evaluate_termination(&self.oracle, self.session.player_side());
                if let Some(outcome) = check.outcome() {
                    self.session.conclude(outcome);
                    self.finish(outcome);
                }
                return;
            }
        };

        let submission = executor::submit(
            &mut self.oracle,
            self.session.snapshot(),
            &candidate,
            self.scheduler.now(),
        );
        match submission {
            Submission::Accepted { record, snapshot } => {
                if let Err(error) = self.apply_ply(record, snapshot, true) {
                    warn!("opponent move not recorded: {}", error);
                }
            }
            Submission::Rejected => warn!("opponent chose an illegal move {}", candidate),
        }
    }

    fn on_clock_tick(&mut self) {
        // the computer cannot move while history is shown, so its clock waits
        if !self.session.is_live() && !self.session.is_players_turn() {
            self.clock_timer = Some(self.arm_tick(TimerKind::ClockTick));
            return;
        }
        match self.session.tick_clock() {
            Ok(Some(outcome)) => self.finish(outcome),
            Ok(None) => {
                self.clock_timer = Some(self.arm_tick(TimerKind::ClockTick));
            }
            Err(error) => debug!("clock stopped: {}", error),
        }
    }

    fn on_move_timer_tick(&mut self) {
        match self.session.tick_move_timer() {
            Ok(expired) => {
                if expired {
                    self.events.push_back(SessionEvent::MoveTimerExpired);
                }
                self.move_timer = Some(self.arm_tick(TimerKind::MoveTimerTick));
            }
            Err(error) => debug!("move timer stopped: {}", error),
        }
    }

    fn arm_tick(&mut self, kind: TimerKind) -> TimerId {
        self.scheduler
            .schedule(kind, self.config.tick_interval, self.session_generation)
    }

    /// Called once the session holds its outcome. Stops every timer and tells
    /// the front end.
    fn finish(&mut self, outcome: Outcome) {
        self.cancel_timers();
        let result = outcome.result_for(self.session.player_side());
        self.events.push_back(SessionEvent::GameEnded { outcome, result });
    }

    fn cancel_timers(&mut self) {
        self.scheduler.cancel_all();
        self.opponent_timer = None;
        self.clock_timer = None;
        self.move_timer = None;
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }
}
