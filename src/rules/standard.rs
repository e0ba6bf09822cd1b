//! [`RulesOracle`] backed by `shakmaty`.

use log::debug;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position, Role};

use crate::rules::{
    AppliedMove, CandidateMove, Color, PieceKind, RulesError, RulesOracle, Square,
};

/// Standard chess. Besides the position itself, keeps the repetition keys of
/// every position reached since the last load so threefold repetition can be
/// detected.
#[derive(Clone, Debug)]
pub struct StandardRules {
    position: Chess,
    seen_positions: Vec<String>,
}

impl Default for StandardRules {
    fn default() -> Self {
        let position = Chess::default();
        let seen_positions = vec![repetition_key(&position)];
        Self {
            position,
            seen_positions,
        }
    }
}

impl StandardRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(snapshot: &str) -> Result<Self, RulesError> {
        let mut rules = Self::default();
        rules.load_position(snapshot)?;
        Ok(rules)
    }

    fn find_legal_move(&self, candidate: &CandidateMove) -> Option<Move> {
        let legal_moves = self.position.legal_moves();
        let mut matching = legal_moves.iter().filter(|m| {
            let uci = to_candidate(m);
            uci.map_or(false, |c| c.from == candidate.from && c.to == candidate.to)
        });

        match candidate.promotion {
            Some(promotion) => matching
                .find(|m| m.promotion().map(to_piece_kind) == Some(promotion))
                .cloned(),
            // without a hint, under-promotions lose to the queen
            None => {
                let options: Vec<&Move> = matching.collect();
                options
                    .iter()
                    .find(|m| matches!(m.promotion(), None | Some(Role::Queen)))
                    .map(|m| (*m).clone())
            }
        }
    }

    fn repetition_count(&self) -> usize {
        match self.seen_positions.last() {
            Some(current) => self
                .seen_positions
                .iter()
                .filter(|key| *key == current)
                .count(),
            None => 0,
        }
    }
}

impl RulesOracle for StandardRules {
    fn load_position(&mut self, snapshot: &str) -> Result<(), RulesError> {
        let invalid = || RulesError::InvalidSnapshot {
            snapshot: snapshot.to_string(),
        };
        let fen: Fen = snapshot.trim().parse().map_err(|_| invalid())?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|_| invalid())?;

        self.seen_positions = vec![repetition_key(&position)];
        self.position = position;
        Ok(())
    }

    fn apply_move(&mut self, candidate: &CandidateMove) -> Option<AppliedMove> {
        let chess_move = match self.find_legal_move(candidate) {
            Some(m) => m,
            None => {
                debug!("rejected illegal move {}", candidate);
                return None;
            }
        };
        // castling is reported king-two-squares, whatever shakmaty stores
        let normalized = to_candidate(&chess_move)?;

        let side = to_color(self.position.turn());
        let san = San::from_move(&self.position, &chess_move);
        self.position.play_unchecked(&chess_move);

        let suffix = if self.position.is_checkmate() {
            "#"
        } else if self.position.is_check() {
            "+"
        } else {
            ""
        };
        self.seen_positions.push(repetition_key(&self.position));

        Some(AppliedMove {
            from: normalized.from,
            to: normalized.to,
            side,
            piece: to_piece_kind(chess_move.role()),
            captured: chess_move.capture().map(to_piece_kind),
            promotion: chess_move.promotion().map(to_piece_kind),
            san: format!("{}{}", san, suffix),
        })
    }

    fn legal_moves(&self) -> Vec<CandidateMove> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(to_candidate)
            .collect()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || self.repetition_count() >= 3
    }

    fn turn_to_move(&self) -> Color {
        to_color(self.position.turn())
    }

    fn serialize(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn king_in_check(&self) -> Option<Square> {
        if !self.position.is_check() {
            return None;
        }
        let turn = self.position.turn();
        self.position
            .board()
            .king_of(turn)
            .and_then(|sq| Square::from_algebraic(&sq.to_string()))
    }
}

/// Placement, side to move, castling rights and en passant square. Clocks
/// are left out so that repeated positions compare equal.
fn repetition_key(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal)
        .to_string()
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_candidate(chess_move: &Move) -> Option<CandidateMove> {
    match UciMove::from_move(chess_move, CastlingMode::Standard) {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => Some(CandidateMove {
            from: Square::from_algebraic(&from.to_string())?,
            to: Square::from_algebraic(&to.to_string())?,
            promotion: promotion.map(to_piece_kind),
        }),
        _ => None,
    }
}

fn to_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn to_piece_kind(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}
