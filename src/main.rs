use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use depreg::cli::{
    UserCommands, load_config, run_login, run_user_add, run_user_delete, run_user_list,
    run_user_passwd, run_user_show, run_user_update,
};
use depreg::registry::Registry;
use depreg::server::{AppState, create_router};

#[derive(Parser)]
#[command(name = "depreg")]
#[command(about = "A private dependency registry", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, global = true, env = "DEPREG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to (overrides the configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the configuration)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Exchange a username and password for a token
    Login {
        username: String,

        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts (requires --password)
        #[arg(long)]
        non_interactive: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("depreg=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let registry = Registry::open(&config)?;
            let state = Arc::new(
                AppState::new(registry.gate).with_upload_limit(config.max_upload_bytes),
            );
            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                password,
                admin,
                non_interactive,
            } => run_user_add(&config, username, password, admin, non_interactive)?,
            UserCommands::Show { username, json } => run_user_show(&config, username, json)?,
            UserCommands::List { json } => run_user_list(&config, json)?,
            UserCommands::Update {
                username,
                admin,
                disabled,
            } => run_user_update(&config, username, admin, disabled)?,
            UserCommands::Passwd {
                username,
                password,
                non_interactive,
            } => run_user_passwd(&config, username, password, non_interactive)?,
            UserCommands::Delete { username, yes } => run_user_delete(&config, username, yes)?,
        },
        Commands::Login {
            username,
            password,
            non_interactive,
        } => run_login(&config, username, password, non_interactive)?,
    }

    Ok(())
}
