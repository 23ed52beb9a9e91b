mod bootstrap;
mod config;
mod loop_runner;
mod tank_game;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
