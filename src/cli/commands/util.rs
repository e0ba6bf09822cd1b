//! Shared utilities for CLI commands.

use std::time::Duration;

use chess_session::game::{SessionConfig, SessionError, TimeControl};
use chess_session::input_handler::InputError;
use chess_session::profile::PlayerProfile;
use chess_session::rules::{Color, StandardRules};
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Builds a session config from command-line values, checking the starting
/// position up front so a bad `--fen` fails before the screen is cleared.
pub(crate) fn create_config(
    player_side: Color,
    difficulty: u16,
    time_control: TimeControl,
    starting_position: &str,
    thinking_ms: u64,
) -> Result<SessionConfig, CliError> {
    StandardRules::from_fen(starting_position).map_err(SessionError::from)?;
    Ok(SessionConfig {
        player_side,
        difficulty,
        time_control,
        thinking_delay: Duration::from_millis(thinking_ms),
        starting_position: starting_position.to_string(),
        ..SessionConfig::default()
    })
}

pub(crate) fn profile_summary(profile: &PlayerProfile) -> String {
    format!(
        "Games: {}  W/L/D: {}/{}/{}  Win rate: {:.0}%  Computer: {} ({})",
        profile.games_played(),
        profile.wins(),
        profile.losses(),
        profile.draws(),
        profile.win_rate(),
        profile.difficulty(),
        profile.difficulty_label()
    )
}
