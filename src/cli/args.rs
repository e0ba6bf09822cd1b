//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{play::PlayArgs, watch::WatchArgs};

#[derive(StructOpt)]
#[structopt(
    name = "chess-session",
    about = "Play chess against the computer in your terminal ♛"
)]
pub enum Chess {
    #[structopt(
        name = "play",
        about = "Play a game against the computer. Your color is chosen at random unless you specify it with `--color`. Clocks follow `--time-control` (default: blitz). Type `help` during the game for the list of commands."
    )]
    Play(PlayArgs),
    #[structopt(
        name = "watch",
        about = "Watch a random mover play the computer, then print the game as PGN. The computer's strategy is chosen with `--strategy` (default: random)."
    )]
    Watch(WatchArgs),
}

impl crate::cli::commands::Command for Chess {
    fn execute(self) {
        macro_rules! execute_command {
            ($($variant:ident($cmd:ident)),+ $(,)?) => {
                match self {
                    $(Self::$variant($cmd) => $cmd.execute(),)+
                }
            };
        }

        execute_command! {
            Play(cmd),
            Watch(cmd),
        }
    }
}
