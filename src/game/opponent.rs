//! Move selection for the computer side.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::game::config::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::rules::{CandidateMove, RulesOracle};

/// Picks the computer's reply from the position the oracle currently holds.
///
/// Implementations must leave `oracle` untouched; they only read from it (or
/// from a clone of it). `None` means there is nothing to play, which only
/// happens when the game should already have ended.
pub trait OpponentStrategy {
    fn select<O: RulesOracle + Clone>(&mut self, oracle: &O, difficulty: u16)
        -> Option<CandidateMove>;
}

/// Uniformly random legal move. Difficulty is ignored.
pub struct RandomMoveSelector {
    rng: StdRng,
}

impl Default for RandomMoveSelector {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomMoveSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl OpponentStrategy for RandomMoveSelector {
    fn select<O: RulesOracle + Clone>(
        &mut self,
        oracle: &O,
        _difficulty: u16,
    ) -> Option<CandidateMove> {
        oracle.legal_moves().choose(&mut self.rng).copied()
    }
}

/// Takes the most valuable piece on offer, breaking ties at random. Lower
/// difficulties play a random move instead some of the time: half of all
/// moves at the bottom of the range, never at the top.
pub struct GreedyMaterialSelector {
    rng: StdRng,
}

impl Default for GreedyMaterialSelector {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl GreedyMaterialSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_move_chance(difficulty: u16) -> f64 {
        let clamped = difficulty.max(MIN_DIFFICULTY).min(MAX_DIFFICULTY);
        let span = f64::from(MAX_DIFFICULTY - MIN_DIFFICULTY);
        0.5 * f64::from(MAX_DIFFICULTY - clamped) / span
    }
}

impl OpponentStrategy for GreedyMaterialSelector {
    fn select<O: RulesOracle + Clone>(
        &mut self,
        oracle: &O,
        difficulty: u16,
    ) -> Option<CandidateMove> {
        let candidates = oracle.legal_moves();
        if candidates.is_empty() {
            return None;
        }

        if self.rng.gen_bool(Self::random_move_chance(difficulty)) {
            return candidates.choose(&mut self.rng).copied();
        }

        let material_gains: Vec<i16> = candidates
            .iter()
            .map(|candidate| {
                let mut scratch = oracle.clone();
                scratch
                    .apply_move(candidate)
                    .and_then(|applied| applied.captured)
                    .map_or(0, |captured| captured.material_value())
            })
            .collect();

        let best_gain = material_gains.iter().copied().max().unwrap_or(0);
        let best_moves: Vec<CandidateMove> = candidates
            .iter()
            .zip(material_gains.iter())
            .filter(|(_, gain)| **gain == best_gain)
            .map(|(candidate, _)| *candidate)
            .collect();

        best_moves.choose(&mut self.rng).copied()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StrategyKind {
    Random,
    Greedy,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Random => write!(f, "random"),
            StrategyKind::Greedy => write!(f, "greedy"),
        }
    }
}

// used for parsing cli args
impl FromStr for StrategyKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(StrategyKind::Random),
            "greedy" => Ok(StrategyKind::Greedy),
            _ => Err("invalid strategy; options are: random, greedy"),
        }
    }
}

/// A strategy picked at runtime.
pub enum Opponent {
    Random(RandomMoveSelector),
    Greedy(GreedyMaterialSelector),
}

impl Opponent {
    pub fn new(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Random => Opponent::Random(RandomMoveSelector::new()),
            StrategyKind::Greedy => Opponent::Greedy(GreedyMaterialSelector::new()),
        }
    }

    pub fn with_seed(kind: StrategyKind, seed: u64) -> Self {
        match kind {
            StrategyKind::Random => Opponent::Random(RandomMoveSelector::with_seed(seed)),
            StrategyKind::Greedy => Opponent::Greedy(GreedyMaterialSelector::with_seed(seed)),
        }
    }
}

impl OpponentStrategy for Opponent {
    fn select<O: RulesOracle + Clone>(
        &mut self,
        oracle: &O,
        difficulty: u16,
    ) -> Option<CandidateMove> {
        match self {
            Opponent::Random(selector) => selector.select(oracle, difficulty),
            Opponent::Greedy(selector) => selector.select(oracle, difficulty),
        }
    }
}
