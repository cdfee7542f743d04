use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "agsw")]
#[command(about = "Save and switch Antigravity sign-in identities")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Echo log output on the console, not just warnings
    #[arg(long, short, global = true)]
    pub verbose: bool,
}
