//! agsw: save and switch sign-in identities of the Antigravity desktop app.

pub mod app;
pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

#[cfg(test)]
mod tests;

pub use app::{App, apply_overrides, confirmed, prepare_config};
pub use cli::Cli;
pub use commands::Commands;
