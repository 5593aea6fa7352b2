use clap::Subcommand;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new user
    Add {
        username: String,

        /// Password for the new user (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Grant administrator rights
        #[arg(long)]
        admin: bool,

        /// Skip interactive prompts (requires --password)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Show a user record
    Show {
        username: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a user's admin or disabled flags
    Update {
        username: String,

        #[arg(long)]
        admin: Option<bool>,

        #[arg(long)]
        disabled: Option<bool>,
    },

    /// Set a user's password
    Passwd {
        username: String,

        /// New password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts (requires --password)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Delete a user and their password
    Delete {
        username: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}
