//! agsw - Antigravity identity switcher
//!
//! # Examples
//!
//! ```bash
//! # Save whoever is signed in right now
//! agsw add --name work
//!
//! # Show saved identities and switch to the second one
//! agsw list
//! agsw switch 2
//!
//! # Follow the application's state
//! agsw status --watch
//! ```

use ag_cli::{App, Cli, Commands, confirmed, logging, prepare_config};
use ag_config::Config;
use ag_switch::SwitchError;

use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load()
        .map_err(SwitchError::from)
        .and_then(|config| prepare_config(config, &cli.command))
    {
        Ok(config) => config,
        Err(e) => return report(e),
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = match config.logs_dir() {
        Ok(logs_dir) => match logging::setup_logging(&logs_dir, &config.logging, cli.verbose) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: file logging disabled: {e}");
                None
            }
        },
        Err(e) => return report(SwitchError::from(e)),
    };
    config.log_summary();

    let app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => return report(e),
    };

    let result = match cli.command {
        Commands::List => app.list().await,
        Commands::Add { name, email } => app.add(name, email).await,
        Commands::Switch { selector } => app.switch(&selector).await,
        Commands::Delete { selector, yes } => {
            if !yes && !ask_delete(&app, &selector) {
                println!("Aborted.");
                return ExitCode::SUCCESS;
            }
            app.delete(&selector).await
        }
        Commands::Start => app.start().await,
        Commands::Stop { .. } => app.stop().await,
        Commands::Status { watch: false } => app.status().await,
        Commands::Status { watch: true } => app
            .watch(|text| print!("{text}"))
            .await
            .map(|()| String::new()),
        Commands::Prune => app.prune().await,
    };

    match result {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

/// Prompts on stdin. Unresolvable selectors fall through so `delete` reports them.
fn ask_delete(app: &App, selector: &str) -> bool {
    let Ok(record) = app.lookup(selector) else {
        return true;
    };

    print!(
        "Delete {} <{}>? [y/N] ",
        record.display_name, record.email
    );
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => confirmed(&answer),
        Err(_) => false,
    }
}

fn report(e: SwitchError) -> ExitCode {
    error!("{e}");
    eprintln!("Error: {e}");
    eprintln!("Hint: {}", e.recovery_hint());
    ExitCode::FAILURE
}
