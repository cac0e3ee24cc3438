use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

mod cli;
mod config;
mod models;

use cli::commands::ConnectionArgs;
use cli::commands::query::{QueryCommands, ResourceKind};

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(about = "Query SAP Business One through the Service Layer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log every request sent to the Service Layer
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, print the session and log out again
    Login,
    /// Query items (Items resource)
    Items {
        #[command(subcommand)]
        action: QueryCommands,
    },
    /// Query business partners (BusinessPartners resource)
    Partners {
        #[command(subcommand)]
        action: QueryCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Login => cli::commands::login::handle_login_command(&cli.connection, &cancel).await,
        Commands::Items { action } => {
            cli::commands::query::handler::handle_query_command(
                ResourceKind::Items,
                action,
                &cli.connection,
                &cancel,
            )
            .await
        }
        Commands::Partners { action } => {
            cli::commands::query::handler::handle_query_command(
                ResourceKind::Partners,
                action,
                &cli.connection,
                &cancel,
            )
            .await
        }
    }
}
