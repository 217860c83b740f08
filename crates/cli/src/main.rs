//! Solstis CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP gateway
//! - `chat`    — Talk to the assistant from the terminal
//! - `kits`    — List the kit catalog
//! - `prompt`  — Print the composed instructions for a kit
//! - `config`  — Show or generate configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "solstis",
    about = "Solstis — kit-aware first-aid assistant backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $SOLSTIS_CONFIG or ~/.solstis/config.toml)
    #[arg(short, long, global = true, env = "SOLSTIS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the assistant in the terminal
    Chat {
        /// Conversation key
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Kit to set up before chatting
        #[arg(short, long)]
        kit: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List the kits in the catalog
    Kits,

    /// Print the instruction text composed for a kit
    Prompt {
        /// Kit id (the configured default kit when omitted)
        kit: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Print a default config file instead
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Chat { user, kit, message } => {
            commands::chat::run(config_path, &user, kit.as_deref(), message).await?
        }
        Commands::Kits => commands::kits::run(config_path)?,
        Commands::Prompt { kit } => commands::prompt::run(config_path, kit.as_deref())?,
        Commands::Config { default } => commands::config_cmd::run(config_path, default)?,
    }

    Ok(())
}
