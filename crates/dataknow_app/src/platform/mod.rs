mod app;
mod autopilot;
mod cli;
mod config;
mod effects;
mod intake;
mod logging;
mod render;

pub use app::run_app;
pub use cli::Cli;
