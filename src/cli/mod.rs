//! Command-line interface for playing sessions in the terminal.
//! This module is not part of the public library API.

pub mod args;
pub mod commands;

pub use args::Chess;
