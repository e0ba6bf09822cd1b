//! Scenario tests for a full session driven through the orchestrator.
//!
//! Time is moved with `Orchestrator::advance`, so nothing here sleeps. The
//! computer side is either a seeded random selector or a scripted opponent
//! that replays a fixed list of replies.
//!
//! Test coverage:
//! - Move and reply loop (player move, thinking delay, opponent reply)
//! - Game endings (checkmate, timeout, resignation) and their perspective
//! - History navigation (replay, idempotence, stale opponent replies, redo)
//! - Clock behaviour (clamping, untimed move timer, timeout vs. reply race)
//! - Session lifecycle (restart, leave confirmation, teardown)

use super::*;
use crate::rules::{CandidateMove, Color, RulesOracle, StandardRules, STARTING_POSITION_FEN};
use std::collections::VecDeque;
use std::time::Duration;

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Plays the given replies in order, then the first legal move.
struct ScriptedOpponent {
    replies: VecDeque<CandidateMove>,
}

impl ScriptedOpponent {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|reply| reply.parse().unwrap()).collect(),
        }
    }
}

impl OpponentStrategy for ScriptedOpponent {
    fn select<O: RulesOracle + Clone>(
        &mut self,
        oracle: &O,
        _difficulty: u16,
    ) -> Option<CandidateMove> {
        self.replies
            .pop_front()
            .or_else(|| oracle.legal_moves().first().copied())
    }
}

fn scripted(config: SessionConfig, replies: &[&str]) -> Orchestrator<ScriptedOpponent> {
    Orchestrator::with_parts(config, StandardRules::new(), ScriptedOpponent::new(replies)).unwrap()
}

fn blitz_as(side: Color) -> SessionConfig {
    SessionConfig {
        player_side: side,
        time_control: TimeControl::Blitz,
        ..SessionConfig::default()
    }
}

fn play(orchestrator: &mut Orchestrator<ScriptedOpponent>, candidate: &str) {
    let submission = orchestrator
        .submit_player_move(candidate.parse().unwrap())
        .unwrap();
    assert!(submission.is_accepted(), "{} was rejected", candidate);
}

fn replay_from_start(moves: &[MoveRecord]) -> String {
    let mut oracle = StandardRules::new();
    for record in moves {
        oracle.apply_move(&record.candidate()).unwrap();
    }
    oracle.serialize()
}

#[test]
fn test_player_move_then_opponent_reply() {
    let mut orchestrator = Orchestrator::with_parts(
        blitz_as(Color::White),
        StandardRules::new(),
        RandomMoveSelector::with_seed(5),
    )
    .unwrap();

    let submission = orchestrator
        .submit_player_move("e2e4".parse().unwrap())
        .unwrap();
    assert!(submission.is_accepted());
    assert_eq!(orchestrator.session().moves().len(), 1);
    assert_eq!(orchestrator.session().turn(), Color::Black);
    assert_eq!(orchestrator.session().status(), GameStatus::InProgress);
    assert!(orchestrator.opponent_move_pending());

    orchestrator.advance(Duration::from_millis(999));
    assert_eq!(orchestrator.session().moves().len(), 1);

    orchestrator.advance(Duration::from_millis(1));
    assert_eq!(orchestrator.session().moves().len(), 2);
    assert_eq!(orchestrator.session().turn(), Color::White);
    assert_eq!(orchestrator.session().moves()[1].side, Color::Black);
    assert!(!orchestrator.opponent_move_pending());

    // the second that elapsed was black's
    assert_eq!(orchestrator.session().clock().remaining(Color::White), 300);
    assert_eq!(orchestrator.session().clock().remaining(Color::Black), 299);
}

#[test]
fn test_events_report_both_moves() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.advance(ONE_SECOND);

    let events = orchestrator.drain_events();
    assert!(matches!(events[0], SessionEvent::Started { .. }));
    let moves: Vec<(String, bool)> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::MoveApplied {
                record,
                by_opponent,
            } => Some((record.san.clone(), *by_opponent)),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        vec![("e4".to_string(), false), ("e5".to_string(), true)]
    );
    assert!(orchestrator.drain_events().is_empty());
}

#[test]
fn test_fools_mate_is_a_loss_for_the_mated_player() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5", "d8h4"]);
    play(&mut orchestrator, "f2f3");
    orchestrator.advance(ONE_SECOND);
    play(&mut orchestrator, "g2g4");
    orchestrator.advance(ONE_SECOND);

    let session = orchestrator.session();
    assert_eq!(session.moves().len(), 4);
    assert_eq!(session.moves()[3].san, "Qh4#");
    assert_eq!(session.status(), GameStatus::Checkmate);
    assert_eq!(session.result(), Some(GameResult::Loss));
    assert!(orchestrator.scheduler().pending().is_empty());
    assert_eq!(
        orchestrator.king_in_check_square().map(|square| square.to_string()),
        Some("e1".to_string())
    );

    let ended: Vec<SessionEvent> = orchestrator
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, SessionEvent::GameEnded { .. }))
        .collect();
    assert_eq!(ended.len(), 1);
}

#[test]
fn test_player_delivers_mate_as_black() {
    let mut orchestrator = scripted(blitz_as(Color::Black), &["f2f3", "g2g4"]);
    orchestrator.advance(ONE_SECOND);
    play(&mut orchestrator, "e7e5");
    orchestrator.advance(ONE_SECOND);
    play(&mut orchestrator, "d8h4");

    assert_eq!(orchestrator.session().status(), GameStatus::Checkmate);
    assert_eq!(orchestrator.session().result(), Some(GameResult::Win));
    assert!(!orchestrator.opponent_move_pending());
}

#[test]
fn test_clock_runs_out_with_no_move() {
    let mut orchestrator = scripted(blitz_as(Color::White), &[]);
    orchestrator.advance(Duration::from_secs(299));
    assert_eq!(orchestrator.session().clock().remaining(Color::White), 1);
    assert_eq!(orchestrator.session().status(), GameStatus::InProgress);

    orchestrator.advance(ONE_SECOND);
    let session = orchestrator.session();
    assert_eq!(session.status(), GameStatus::Timeout);
    assert_eq!(session.result(), Some(GameResult::Loss));
    assert_eq!(session.outcome().unwrap().winner, Some(Color::Black));
    assert_eq!(session.clock().remaining(Color::White), 0);
    assert_eq!(session.clock().remaining(Color::Black), 300);
    assert!(orchestrator.scheduler().pending().is_empty());

    orchestrator.advance(Duration::from_secs(10));
    assert_eq!(orchestrator.session().clock().remaining(Color::White), 0);
}

#[test]
fn test_timeout_beats_a_reply_due_at_the_same_moment() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.set_remaining(Color::Black, 1);

    orchestrator.advance(ONE_SECOND);
    let session = orchestrator.session();
    assert_eq!(session.status(), GameStatus::Timeout);
    assert_eq!(session.result(), Some(GameResult::Win));
    assert_eq!(session.moves().len(), 1);

    let ended = orchestrator
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, SessionEvent::GameEnded { .. }))
        .count();
    assert_eq!(ended, 1);
}

#[test]
fn test_resign_ends_the_game_immediately() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.advance(ONE_SECOND);

    assert_eq!(orchestrator.resign(), Ok(GameResult::Loss));
    assert_eq!(orchestrator.session().status(), GameStatus::Resigned);
    assert!(orchestrator.scheduler().pending().is_empty());

    assert_eq!(
        orchestrator.submit_player_move("g1f3".parse().unwrap()),
        Err(SessionError::GameOver {
            status: GameStatus::Resigned
        })
    );
    assert!(orchestrator.resign().is_err());
    orchestrator.advance(Duration::from_secs(5));
    assert_eq!(orchestrator.session().moves().len(), 2);
    assert_eq!(orchestrator.session().status(), GameStatus::Resigned);
}

#[test]
fn test_navigation_replays_and_blocks_moves() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5", "b8c6"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.advance(ONE_SECOND);
    play(&mut orchestrator, "g1f3");
    orchestrator.advance(ONE_SECOND);
    play(&mut orchestrator, "f1c4");
    assert_eq!(orchestrator.session().moves().len(), 5);
    assert!(orchestrator.opponent_move_pending());

    orchestrator.navigate_to(Cursor::Ply(2)).unwrap();
    let expected = replay_from_start(&orchestrator.session().moves()[..2]);
    assert_eq!(orchestrator.current_snapshot(), expected);
    assert_eq!(
        orchestrator
            .last_move_squares()
            .map(|(from, to)| format!("{}{}", from, to)),
        Some("e7e5".to_string())
    );

    // same cursor, same position
    orchestrator.navigate_to(Cursor::Ply(2)).unwrap();
    assert_eq!(orchestrator.current_snapshot(), expected);

    assert_eq!(
        orchestrator.submit_player_move("d2d4".parse().unwrap()),
        Err(SessionError::NotLive)
    );

    // the reply queued before navigating must not land
    assert_eq!(orchestrator.scheduler().pending_of(TimerKind::OpponentMove), 0);
    orchestrator.advance(Duration::from_secs(5));
    assert_eq!(orchestrator.session().moves().len(), 5);
    assert_eq!(orchestrator.session().status(), GameStatus::InProgress);

    orchestrator.return_to_live().unwrap();
    assert_eq!(orchestrator.current_snapshot(), orchestrator.session().snapshot());
    orchestrator.advance(ONE_SECOND);
    assert_eq!(orchestrator.session().moves().len(), 6);
}

#[test]
fn test_computer_clock_waits_while_history_is_shown() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.undo().unwrap();

    orchestrator.advance(Duration::from_secs(300));
    assert_eq!(orchestrator.session().status(), GameStatus::InProgress);
    assert_eq!(orchestrator.session().moves().len(), 1);
    assert_eq!(orchestrator.session().clock().remaining(Color::Black), 300);

    orchestrator.return_to_live().unwrap();
    orchestrator.advance(ONE_SECOND);
    assert_eq!(orchestrator.session().moves().len(), 2);
    assert_eq!(orchestrator.session().clock().remaining(Color::Black), 299);

    // the player's own clock keeps running while they look back
    orchestrator.undo().unwrap();
    orchestrator.advance(Duration::from_secs(5));
    assert_eq!(orchestrator.session().clock().remaining(Color::White), 295);
}

#[test]
fn test_returning_to_live_while_live_keeps_the_pending_reply() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.drain_events();

    orchestrator.advance(Duration::from_millis(900));
    orchestrator.return_to_live().unwrap();
    assert!(orchestrator.opponent_move_pending());
    assert!(orchestrator.drain_events().is_empty());

    orchestrator.advance(Duration::from_millis(100));
    assert_eq!(orchestrator.session().moves().len(), 2);
    assert_eq!(orchestrator.session().moves()[1].san, "e5");
}

#[test]
fn test_every_prefix_replays_to_the_recorded_position() {
    let mut orchestrator = Orchestrator::with_parts(
        blitz_as(Color::White),
        StandardRules::new(),
        RandomMoveSelector::with_seed(17),
    )
    .unwrap();
    let mut snapshots = vec![orchestrator.session().snapshot().to_string()];

    for _ in 0..6 {
        if !orchestrator.session().is_in_progress() {
            break;
        }
        let choice = orchestrator.legal_moves()[0];
        orchestrator.submit_player_move(choice).unwrap();
        snapshots.push(orchestrator.session().snapshot().to_string());
        orchestrator.advance(ONE_SECOND);
        if orchestrator.session().moves().len() == snapshots.len() {
            snapshots.push(orchestrator.session().snapshot().to_string());
        }
    }

    let moves = orchestrator.session().moves().to_vec();
    for (ply, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(&replay_from_start(&moves[..ply]), snapshot);
    }
}

#[test]
fn test_undo_and_redo_walk_the_cursor() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    orchestrator.advance(ONE_SECOND);

    orchestrator.undo().unwrap();
    assert_eq!(orchestrator.session().cursor(), Cursor::Ply(1));
    orchestrator.undo().unwrap();
    assert_eq!(orchestrator.session().cursor(), Cursor::Ply(0));
    assert_eq!(orchestrator.current_snapshot(), STARTING_POSITION_FEN);
    assert_eq!(orchestrator.last_move_squares(), None);
    assert_eq!(orchestrator.undo(), Err(SessionError::AtStart));

    orchestrator.redo().unwrap();
    assert_eq!(orchestrator.session().cursor(), Cursor::Ply(1));
    orchestrator.redo().unwrap();
    assert_eq!(orchestrator.session().cursor(), Cursor::Live);
    assert_eq!(orchestrator.redo(), Err(SessionError::AtLive));
    assert_eq!(orchestrator.session().moves().len(), 2);
}

#[test]
fn test_rejected_moves_change_nothing() {
    let mut orchestrator = scripted(blitz_as(Color::White), &[]);
    let before = orchestrator.session().snapshot().to_string();

    let submission = orchestrator
        .submit_player_move("e2e5".parse().unwrap())
        .unwrap();
    assert_eq!(submission, Submission::Rejected);
    assert_eq!(orchestrator.session().snapshot(), before);
    assert!(orchestrator.session().moves().is_empty());
    assert!(!orchestrator.opponent_move_pending());

    play(&mut orchestrator, "e2e4");
    assert_eq!(
        orchestrator.submit_player_move("d2d4".parse().unwrap()),
        Err(SessionError::NotYourTurn { turn: Color::Black })
    );
    assert_eq!(orchestrator.session().moves().len(), 1);
    assert!(orchestrator.legal_moves().is_empty());
}

#[test]
fn test_computer_opens_when_player_is_black() {
    let mut orchestrator = scripted(blitz_as(Color::Black), &["d2d4"]);
    assert!(orchestrator.opponent_move_pending());
    orchestrator.advance(ONE_SECOND);
    assert_eq!(orchestrator.session().moves().len(), 1);
    assert_eq!(orchestrator.session().turn(), Color::Black);
    assert!(orchestrator.session().is_players_turn());
}

#[test]
fn test_untimed_game_only_runs_the_move_timer() {
    let config = SessionConfig {
        time_control: TimeControl::Untimed,
        ..SessionConfig::default()
    };
    let mut orchestrator = scripted(config, &["e7e5"]);
    assert_eq!(orchestrator.scheduler().pending_of(TimerKind::ClockTick), 0);
    assert_eq!(orchestrator.scheduler().pending_of(TimerKind::MoveTimerTick), 1);

    orchestrator.advance(Duration::from_secs(30));
    assert_eq!(orchestrator.session().status(), GameStatus::InProgress);
    assert!(orchestrator
        .drain_events()
        .contains(&SessionEvent::MoveTimerExpired));

    play(&mut orchestrator, "e2e4");
    assert_eq!(orchestrator.session().move_timer().remaining(), 30);
    orchestrator.advance(Duration::from_secs(600));
    assert_eq!(orchestrator.session().status(), GameStatus::InProgress);
    assert_eq!(orchestrator.session().moves().len(), 2);
}

#[test]
fn test_leaving_a_running_game_resigns_it() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5"]);
    play(&mut orchestrator, "e2e4");
    assert_eq!(orchestrator.request_leave(), LeaveDecision::NeedsConfirmation);

    assert_eq!(orchestrator.confirm_leave(), Ok(Some(GameResult::Loss)));
    assert!(orchestrator.is_closed());
    assert_eq!(orchestrator.session().status(), GameStatus::Resigned);
    assert!(orchestrator.scheduler().pending().is_empty());
    assert_eq!(orchestrator.request_leave(), LeaveDecision::Immediate);
    assert_eq!(
        orchestrator.submit_player_move("d2d4".parse().unwrap()),
        Err(SessionError::Closed)
    );
}

#[test]
fn test_leaving_a_finished_game_needs_no_confirmation() {
    let mut orchestrator = scripted(blitz_as(Color::White), &[]);
    orchestrator.resign().unwrap();
    assert_eq!(orchestrator.request_leave(), LeaveDecision::Immediate);
    assert_eq!(orchestrator.confirm_leave(), Ok(None));
}

#[test]
fn test_start_session_replaces_everything() {
    let mut orchestrator = scripted(blitz_as(Color::White), &["e7e5", "d7d5"]);
    play(&mut orchestrator, "e2e4");
    let old_id = orchestrator.session().id();

    orchestrator
        .start_session(SessionConfig {
            player_side: Color::White,
            time_control: TimeControl::Rapid,
            ..SessionConfig::default()
        })
        .unwrap();
    assert_ne!(orchestrator.session().id(), old_id);
    assert!(orchestrator.session().moves().is_empty());
    assert_eq!(orchestrator.session().clock().remaining(Color::White), 600);
    assert!(!orchestrator.opponent_move_pending());

    // the old session's reply must not land on the new board
    orchestrator.advance(Duration::from_secs(3));
    assert!(orchestrator.session().moves().is_empty());
    assert_eq!(orchestrator.session().clock().remaining(Color::White), 597);
}

#[test]
fn test_starting_from_a_finished_position() {
    let config = SessionConfig {
        starting_position: "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
            .to_string(),
        ..SessionConfig::default()
    };
    let orchestrator = scripted(config, &[]);
    assert_eq!(orchestrator.session().status(), GameStatus::Checkmate);
    assert!(orchestrator.scheduler().pending().is_empty());
}

#[test]
fn test_invalid_starting_position_is_refused() {
    let config = SessionConfig {
        starting_position: "not a position".to_string(),
        ..SessionConfig::default()
    };
    let result = Orchestrator::with_parts(config, StandardRules::new(), ScriptedOpponent::new(&[]));
    assert!(matches!(result, Err(SessionError::Rules { .. })));
}
