//! Tualmi CLI - Database migrations and cart management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! tualmi-cli migrate
//!
//! # Print the stored cart document
//! tualmi-cli cart show
//!
//! # Delete the stored cart document
//! tualmi-cli cart clear
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tualmi-cli")]
#[command(author, version, about = "Tualmi CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect or reset the stored cart document
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the stored cart as JSON
    Show,
    /// Delete the stored cart document
    Clear,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await,
            CartAction::Clear => commands::cart::clear().await,
        },
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
