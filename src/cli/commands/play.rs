//! Play command - play a game against the computer.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use chess_session::game::display::GameDisplay;
use chess_session::game::pgn;
use chess_session::game::{
    Cursor, GameResult, LeaveDecision, Opponent, Orchestrator, SessionConfig, SessionEvent,
    StrategyKind, Submission, TimeControl,
};
use chess_session::input_handler::{
    parse_confirmation, InputError, LineBuffer, PlayerCommand, HELP_TEXT,
};
use chess_session::profile::PlayerProfile;
use chess_session::rules::{Color, StandardRules, STARTING_POSITION_FEN};
use log::debug;
use structopt::StructOpt;

use super::util::{create_config, profile_summary, CliError};
use super::Command;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(StructOpt)]
pub struct PlayArgs {
    #[structopt(short = "c", long = "color", default_value = "random")]
    pub color: Color,
    #[structopt(short, long, default_value = "1200", help = "Computer rating, 800-2400")]
    pub difficulty: u16,
    #[structopt(short, long = "time-control", default_value = "blitz")]
    pub time_control: TimeControl,
    #[structopt(short, long, default_value = "random")]
    pub strategy: StrategyKind,
    #[structopt(long = "fen", default_value = STARTING_POSITION_FEN)]
    pub starting_position: String,
    #[structopt(
        long = "thinking-ms",
        default_value = "1000",
        help = "How long the computer pauses before replying, in milliseconds"
    )]
    pub thinking_ms: u64,
}

impl Command for PlayArgs {
    fn execute(self) {
        if let Err(error) = run(self) {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    }
}

struct PlayScreen {
    orchestrator: Orchestrator<Opponent>,
    config: SessionConfig,
    profile: PlayerProfile,
    display: GameDisplay,
    message: Option<String>,
    confirming_leave: bool,
}

enum Flow {
    Continue,
    Leave,
}

fn run(args: PlayArgs) -> Result<(), CliError> {
    let config = create_config(
        args.color,
        args.difficulty,
        args.time_control,
        &args.starting_position,
        args.thinking_ms,
    )?;
    let orchestrator =
        Orchestrator::with_parts(config.clone(), StandardRules::new(), Opponent::new(args.strategy))?;

    let mut screen = PlayScreen {
        orchestrator,
        profile: PlayerProfile::new(config.difficulty),
        config,
        display: GameDisplay::new(),
        message: Some(HELP_TEXT.to_string()),
        confirming_leave: false,
    };

    let mut stdin = termion::async_stdin().bytes();
    let mut lines = LineBuffer::new();
    let mut last_tick = Instant::now();
    let mut shown_second = None;
    let mut dirty = true;

    loop {
        let now = Instant::now();
        screen.orchestrator.advance(now - last_tick);
        last_tick = now;
        dirty |= screen.handle_events();

        while let Some(Ok(byte)) = stdin.next() {
            if let Some(line) = lines.push(byte) {
                dirty = true;
                if let Flow::Leave = screen.handle_line(&line)? {
                    println!("{}", profile_summary(&screen.profile));
                    return Ok(());
                }
                dirty |= screen.handle_events();
            }
        }

        let second = screen.orchestrator.now().as_secs();
        if dirty || shown_second != Some(second) {
            screen.render()?;
            shown_second = Some(second);
            dirty = false;
        }

        thread::sleep(POLL_INTERVAL);
    }
}

impl PlayScreen {
    /// Returns true if anything happened that should be drawn.
    fn handle_events(&mut self) -> bool {
        let events = self.orchestrator.drain_events();
        for event in &events {
            match event {
                SessionEvent::GameEnded { outcome, result } => {
                    self.profile.record_session(self.orchestrator.session());
                    self.message = Some(format!(
                        "Game over by {}: you {}. Type `new` to play again or `quit` to leave.\n{}",
                        outcome.status,
                        match result {
                            GameResult::Win => "win",
                            GameResult::Loss => "lose",
                            GameResult::Draw => "draw",
                        },
                        profile_summary(&self.profile)
                    ));
                }
                SessionEvent::MoveTimerExpired => debug!("move timer expired"),
                SessionEvent::MoveApplied { record, by_opponent } => {
                    debug!("{} {}", if *by_opponent { "computer" } else { "player" }, record);
                }
                SessionEvent::Started { .. } | SessionEvent::Navigated { .. } => {}
            }
        }
        !events.is_empty()
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow, CliError> {
        if self.confirming_leave {
            self.confirming_leave = false;
            if parse_confirmation(line) {
                self.orchestrator.confirm_leave()?;
                self.handle_events();
                return Ok(Flow::Leave);
            }
            self.message = Some("Carry on.".to_string());
            return Ok(Flow::Continue);
        }

        let command = match line.parse::<PlayerCommand>() {
            Ok(command) => command,
            Err(error) => {
                self.message = Some(error.to_string());
                return Ok(Flow::Continue);
            }
        };

        self.message = None;
        let outcome = match command {
            PlayerCommand::Move(candidate) => match self.orchestrator.submit_player_move(candidate) {
                Ok(Submission::Accepted { .. }) => Ok(()),
                Ok(Submission::Rejected) => {
                    self.message = Some(format!("Illegal move: {}", candidate));
                    Ok(())
                }
                Err(error) => Err(error),
            },
            PlayerCommand::Undo => self.orchestrator.undo(),
            PlayerCommand::Redo => self.orchestrator.redo(),
            PlayerCommand::Goto(ply) => self.orchestrator.navigate_to(Cursor::Ply(ply)),
            PlayerCommand::Live => self.orchestrator.return_to_live(),
            PlayerCommand::Resign => self.orchestrator.resign().map(|_| ()),
            PlayerCommand::Pgn => {
                self.message = Some(pgn::export(self.orchestrator.session()));
                Ok(())
            }
            PlayerCommand::NewGame => {
                if self.orchestrator.session().is_in_progress() {
                    self.message = Some("Finish or resign this game first.".to_string());
                    Ok(())
                } else {
                    self.config.difficulty = self.profile.difficulty();
                    self.orchestrator.start_session(self.config.clone())
                }
            }
            PlayerCommand::Help => {
                self.message = Some(HELP_TEXT.to_string());
                Ok(())
            }
            PlayerCommand::Quit => match self.orchestrator.request_leave() {
                LeaveDecision::Immediate => {
                    self.orchestrator.teardown();
                    return Ok(Flow::Leave);
                }
                LeaveDecision::NeedsConfirmation => {
                    self.confirming_leave = true;
                    self.message = Some("The game is still running. Resign and leave? (y/n)".to_string());
                    Ok(())
                }
            },
        };

        if let Err(error) = outcome {
            self.message = Some(error.to_string());
        }
        Ok(Flow::Continue)
    }

    fn render(&mut self) -> Result<(), CliError> {
        let view = self.orchestrator.view();
        self.display
            .render_game_state(self.orchestrator.session(), &view);
        if let Some(message) = &self.message {
            println!("\n{}", message);
        }
        print!("\n> ");
        io::stdout().flush().map_err(|error| InputError::IOError {
            error: error.to_string(),
        })?;
        Ok(())
    }
}
