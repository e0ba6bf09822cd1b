use std::fmt::Write;

use termion::{clear, cursor};

use crate::game::clock::format_seconds;
use crate::game::session::{Cursor, PositionView, Session};
use crate::rules::{Color, PieceKind, Square};

pub struct GameDisplay {
    buffer: String,
}

impl Default for GameDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl GameDisplay {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(2048),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        let _ = write!(self.buffer, "{}{}", cursor::Goto(1, 1), clear::All);
    }

    /// Draws `view` (which may be a historical position) with the live
    /// session's clocks and status around it, then prints the frame.
    pub fn render_game_state(&mut self, session: &Session, view: &PositionView) {
        self.clear();
        self.write_frame(session, view);
        print!("{}", self.buffer);
    }

    pub fn write_frame(&mut self, session: &Session, view: &PositionView) {
        let board = placement(&view.snapshot);
        let highlighted: Vec<Square> = view
            .last_move
            .map(|(from, to)| vec![from, to])
            .unwrap_or_default();

        self.write_player_line(session, view, session.opponent_side());

        // Board header
        self.buffer.push_str("    a   b   c   d   e   f   g   h\n");
        self.buffer
            .push_str("  ┌───┬───┬───┬───┬───┬───┬───┬───┐\n");

        for rank in (0..8u8).rev() {
            let _ = write!(self.buffer, "{} │", rank + 1);
            for file in 0..8u8 {
                let square = match Square::from_rank_file(rank, file) {
                    Some(square) => square,
                    None => continue,
                };
                let piece_str = match board[square.index() as usize] {
                    Some((piece, color)) => piece.to_unicode_piece_char(color).to_string(),
                    None => if (rank + file) % 2 == 0 { " " } else { "·" }.to_string(),
                };
                if view.king_in_check == Some(square) {
                    let _ = write!(self.buffer, "!{} │", piece_str);
                } else if highlighted.contains(&square) {
                    let _ = write!(self.buffer, "[{}]│", piece_str);
                } else {
                    let _ = write!(self.buffer, " {} │", piece_str);
                }
            }
            let _ = writeln!(self.buffer, " {}", rank + 1);

            if rank > 0 {
                self.buffer
                    .push_str("  ├───┼───┼───┼───┼───┼───┼───┼───┤\n");
            } else {
                self.buffer
                    .push_str("  └───┴───┴───┴───┴───┴───┴───┴───┘\n");
            }
        }

        // Board footer
        self.buffer
            .push_str("    a   b   c   d   e   f   g   h\n");

        self.write_player_line(session, view, session.player_side());
        self.buffer.push('\n');

        // Game info
        match session.cursor() {
            Cursor::Live => {
                let _ = writeln!(self.buffer, "Turn: {}", session.turn());
            }
            Cursor::Ply(ply) => {
                let _ = writeln!(
                    self.buffer,
                    "Viewing move {} of {} (type `live` to return)",
                    ply,
                    session.moves().len()
                );
            }
        }
        if let Some(last) = session.last_move() {
            let _ = writeln!(self.buffer, "Last move: {}", last.san);
        }
        if view.degraded {
            self.buffer
                .push_str("History could not be replayed; showing the starting position\n");
        }
        if let Some(outcome) = session.outcome() {
            let _ = writeln!(
                self.buffer,
                "Game over: {} ({})",
                outcome.status,
                outcome.result_for(session.player_side())
            );
        }
    }

    fn write_player_line(&mut self, session: &Session, view: &PositionView, side: Color) {
        let name = if side == session.player_side() {
            "You".to_string()
        } else {
            format!("Computer ({})", session.difficulty())
        };
        let time = if session.time_control().is_timed() {
            format_seconds(session.clock().remaining(side))
        } else if side == session.turn() {
            format_seconds(session.move_timer().remaining())
        } else {
            "--:--".to_string()
        };
        let captured: String = view
            .captured
            .taken_by(side)
            .iter()
            .map(|piece| piece.to_unicode_piece_char(side.opposite()))
            .collect();
        let _ = writeln!(self.buffer, "  {} [{}] {}", name, time, captured);
    }

    pub fn buffer(self) -> String {
        self.buffer
    }
}

/// Pieces by square index, read from the placement field of a snapshot.
fn placement(snapshot: &str) -> [Option<(PieceKind, Color)>; 64] {
    let mut board = [None; 64];
    let field = snapshot.split_whitespace().next().unwrap_or("");

    for (row, rank_text) in field.split('/').take(8).enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            if file > 7 {
                break;
            }
            if let (Some(piece), Some(square)) =
                (PieceKind::from_char(c), Square::from_rank_file(rank, file))
            {
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                board[square.index() as usize] = Some((piece, color));
            }
            file += 1;
        }
    }

    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::SessionConfig;
    use crate::game::session::{CapturedPieces, SessionId};
    use crate::rules::STARTING_POSITION_FEN;

    #[test]
    fn test_placement_reads_fen() {
        let board = placement(STARTING_POSITION_FEN);
        let e1: Square = "e1".parse().unwrap();
        let d8: Square = "d8".parse().unwrap();
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(board[e1.index() as usize], Some((PieceKind::King, Color::White)));
        assert_eq!(board[d8.index() as usize], Some((PieceKind::Queen, Color::Black)));
        assert_eq!(board[e4.index() as usize], None);
    }

    #[test]
    fn test_frame_shows_clocks_and_highlights() {
        let session = Session::new(
            SessionId::from_raw(4),
            &SessionConfig::default(),
            STARTING_POSITION_FEN.to_string(),
        );
        let view = PositionView {
            snapshot: STARTING_POSITION_FEN.to_string(),
            captured: CapturedPieces::default(),
            last_move: Some(("e2".parse().unwrap(), "e4".parse().unwrap())),
            king_in_check: None,
            degraded: false,
        };
        let mut display = GameDisplay::new();
        display.write_frame(&session, &view);
        let frame = display.buffer();

        assert!(frame.contains("You [05:00]"));
        assert!(frame.contains("Computer (1200) [05:00]"));
        assert!(frame.contains("Turn: white"));
        assert!(frame.contains("[♙]"));
    }
}
