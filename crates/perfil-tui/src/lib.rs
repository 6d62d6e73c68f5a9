// Command-line surface and terminal dashboard for the athlete evaluation
// engine.

pub mod app;
pub mod cli;
pub mod tui;
