//! Submits candidate moves to the rules oracle and turns its answer into a
//! [`MoveRecord`].

use std::time::Duration;

use log::{debug, warn};

use crate::game::move_record::MoveRecord;
use crate::rules::{CandidateMove, RulesOracle};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Submission {
    Accepted {
        record: MoveRecord,
        /// Position after the move, serialized straight away.
        snapshot: String,
    },
    Rejected,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

/// Plays `candidate` from `snapshot`. Never fails: anything the oracle will
/// not play, including a snapshot it cannot load, comes back as
/// [`Submission::Rejected`].
///
/// The oracle is only reloaded when it is not already sitting on
/// `snapshot`, so an oracle kept in step with the live game keeps its
/// repetition history.
pub fn submit<O: RulesOracle>(
    oracle: &mut O,
    snapshot: &str,
    candidate: &CandidateMove,
    applied_at: Duration,
) -> Submission {
    if oracle.serialize() != snapshot {
        if let Err(error) = oracle.load_position(snapshot) {
            warn!("cannot submit {}: {}", candidate, error);
            return Submission::Rejected;
        }
    }

    match oracle.apply_move(candidate) {
        Some(applied) => {
            let record = MoveRecord::from_applied(applied, applied_at);
            debug!("{} played {} ({})", record.side, record.san, candidate);
            Submission::Accepted {
                record,
                snapshot: oracle.serialize(),
            }
        }
        None => Submission::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Color, PieceKind, StandardRules, STARTING_POSITION_FEN};

    #[test]
    fn test_accepts_legal_move() {
        let mut oracle = StandardRules::new();
        let submission = submit(
            &mut oracle,
            STARTING_POSITION_FEN,
            &"g1f3".parse().unwrap(),
            Duration::from_secs(3),
        );
        match submission {
            Submission::Accepted { record, snapshot } => {
                assert_eq!(record.piece, PieceKind::Knight);
                assert_eq!(record.side, Color::White);
                assert_eq!(record.san, "Nf3");
                assert_eq!(record.applied_at, Duration::from_secs(3));
                assert_eq!(snapshot, oracle.serialize());
            }
            Submission::Rejected => panic!("Nf3 should be legal"),
        }
    }

    #[test]
    fn test_rejects_illegal_move() {
        let mut oracle = StandardRules::new();
        let submission = submit(
            &mut oracle,
            STARTING_POSITION_FEN,
            &"g1g3".parse().unwrap(),
            Duration::ZERO,
        );
        assert_eq!(submission, Submission::Rejected);
        assert_eq!(oracle.serialize(), STARTING_POSITION_FEN);
    }

    #[test]
    fn test_rejects_unloadable_snapshot() {
        let mut oracle = StandardRules::new();
        let submission = submit(
            &mut oracle,
            "definitely not fen",
            &"e2e4".parse().unwrap(),
            Duration::ZERO,
        );
        assert!(!submission.is_accepted());
    }

    #[test]
    fn test_loads_snapshot_when_out_of_step() {
        let mut oracle = StandardRules::new();
        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let submission = submit(&mut oracle, after_e4, &"e7e5".parse().unwrap(), Duration::ZERO);
        assert!(submission.is_accepted());
        assert_eq!(oracle.turn_to_move(), Color::White);
    }
}
