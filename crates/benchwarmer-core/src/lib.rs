// Library root: re-exports all modules so the CLI, integration tests and
// external consumers can access the engine's public API.

pub mod config;
pub mod error;
pub mod export;
pub mod league;
pub mod lineup;
pub mod season;
pub mod source;
