use clap::Subcommand;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List saved identities, most recently used first
    List,

    /// Save the identity currently signed in to the application
    Add {
        /// Display name (defaults to the email's local part)
        #[arg(long)]
        name: Option<String>,

        /// Email to record when it cannot be read from the application
        #[arg(long)]
        email: Option<String>,
    },

    /// Switch the application to a saved identity
    Switch {
        /// Index from `list` or identity id
        selector: String,
    },

    /// Delete a saved identity and its snapshot
    Delete {
        /// Index from `list` or identity id
        selector: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Start the application
    Start,

    /// Stop the application
    Stop {
        /// Never escalate to a forced kill
        #[arg(long)]
        no_force: bool,
    },

    /// Show whether the application is running and who is signed in
    Status {
        /// Keep reporting changes until Ctrl-C
        #[arg(long, short)]
        watch: bool,
    },

    /// Remove identities whose snapshot is gone and unreferenced snapshots
    Prune,
}
