//! Portable game notation export of a session's move log.

use std::fmt::Write;

use crate::game::session::Session;
use crate::rules::{Color, STARTING_POSITION_FEN};

const COMPUTER_NAME: &str = "Computer";
const PLAYER_NAME: &str = "Player";

/// Renders the session as PGN: the seven tag roster, the time control, a
/// `SetUp`/`FEN` pair when the game did not start from the standard
/// position, and numbered SAN movetext ending in the result token.
pub fn export(session: &Session) -> String {
    let result = session.outcome().map_or("*", |outcome| outcome.to_pgn());
    let computer = format!("{} ({})", COMPUTER_NAME, session.difficulty());
    let (white, black) = match session.player_side() {
        Color::White => (PLAYER_NAME.to_string(), computer),
        Color::Black => (computer, PLAYER_NAME.to_string()),
    };

    let mut pgn = String::with_capacity(512);
    write_tag(&mut pgn, "Event", "Casual game");
    write_tag(&mut pgn, "Site", "?");
    write_tag(&mut pgn, "Date", "????.??.??");
    write_tag(&mut pgn, "Round", "-");
    write_tag(&mut pgn, "White", &white);
    write_tag(&mut pgn, "Black", &black);
    write_tag(&mut pgn, "Result", result);
    write_tag(&mut pgn, "TimeControl", &session.time_control().to_pgn());
    if let Some(outcome) = session.outcome() {
        write_tag(&mut pgn, "Termination", &outcome.status.to_string());
    }
    if session.initial_snapshot() != STARTING_POSITION_FEN {
        write_tag(&mut pgn, "SetUp", "1");
        write_tag(&mut pgn, "FEN", session.initial_snapshot());
    }
    pgn.push('\n');

    let movetext = movetext(session);
    if movetext.is_empty() {
        pgn.push_str(result);
    } else {
        let _ = write!(pgn, "{} {}", movetext, result);
    }
    pgn.push('\n');
    pgn
}

fn write_tag(pgn: &mut String, name: &str, value: &str) {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    let _ = writeln!(pgn, "[{} \"{}\"]", name, escaped);
}

/// Numbered SAN, e.g. `1. e4 e5 2. Nf3`. A game starting with black to move
/// opens with `N...`.
fn movetext(session: &Session) -> String {
    let mut move_number = fullmove_number(session.initial_snapshot());
    let mut tokens: Vec<String> = Vec::with_capacity(session.moves().len() * 3 / 2);

    for (index, record) in session.moves().iter().enumerate() {
        match record.side {
            Color::White => tokens.push(format!("{}.", move_number)),
            Color::Black if index == 0 => tokens.push(format!("{}...", move_number)),
            Color::Black => {}
        }
        tokens.push(record.san.clone());
        if record.side == Color::Black {
            move_number += 1;
        }
    }

    tokens.join(" ")
}

fn fullmove_number(snapshot: &str) -> u32 {
    // a snapshot without a readable move number counts from one
    snapshot
        .split_whitespace()
        .nth(5)
        .and_then(|field| field.parse().ok())
        .filter(|number| *number > 0)
        .unwrap_or(1)
}
