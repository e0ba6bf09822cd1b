//! Watch command - a random mover plays the computer.

use std::thread;
use std::time::Duration;

use chess_session::game::display::GameDisplay;
use chess_session::game::pgn;
use chess_session::game::{Opponent, Orchestrator, StrategyKind, TimeControl};
use chess_session::profile::PlayerProfile;
use chess_session::rules::{Color, StandardRules, STARTING_POSITION_FEN};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use structopt::StructOpt;

use super::util::{create_config, profile_summary, CliError};
use super::Command;

#[derive(StructOpt)]
pub struct WatchArgs {
    #[structopt(short, long, default_value = "1200")]
    pub difficulty: u16,
    #[structopt(short, long = "time-control", default_value = "blitz")]
    pub time_control: TimeControl,
    #[structopt(short, long, default_value = "random")]
    pub strategy: StrategyKind,
    #[structopt(long = "fen", default_value = STARTING_POSITION_FEN)]
    pub starting_position: String,
    #[structopt(
        long = "delay",
        default_value = "250",
        help = "Delay between moves in milliseconds"
    )]
    pub delay_ms: u64,
    #[structopt(long, help = "Seed both sides for a reproducible game")]
    pub seed: Option<u64>,
}

impl Command for WatchArgs {
    fn execute(self) {
        if let Err(error) = run(self) {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    }
}

fn run(args: WatchArgs) -> Result<(), CliError> {
    let config = create_config(
        Color::White,
        args.difficulty,
        args.time_control,
        &args.starting_position,
        1000,
    )?;
    let (opponent, mut rng) = match args.seed {
        Some(seed) => (
            Opponent::with_seed(args.strategy, seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (Opponent::new(args.strategy), StdRng::from_entropy()),
    };
    let thinking_delay = config.thinking_delay;
    let mut orchestrator = Orchestrator::with_parts(config, StandardRules::new(), opponent)?;
    let mut display = GameDisplay::new();
    let delay = Duration::from_millis(args.delay_ms);

    while orchestrator.session().is_in_progress() {
        if let Some(choice) = orchestrator.legal_moves().choose(&mut rng).copied() {
            orchestrator.submit_player_move(choice)?;
        }
        // the computer's reply, or a tick of the clock if nothing was due
        orchestrator.advance(thinking_delay);

        display.render_game_state(orchestrator.session(), &orchestrator.view());
        thread::sleep(delay);
    }

    let mut profile = PlayerProfile::new(orchestrator.session().difficulty());
    profile.record_session(orchestrator.session());
    info!("watched game finished: {:?}", orchestrator.session().outcome());

    println!("\n{}", pgn::export(orchestrator.session()));
    println!("{}", profile_summary(&profile));
    orchestrator.teardown();
    Ok(())
}
