// Shared infrastructure for the perfil workspace: configuration and logging.

pub mod config;
pub mod logging;
