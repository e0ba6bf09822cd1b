pub mod game;
pub mod input_handler;
pub mod prelude;
pub mod profile;
pub mod rules;
