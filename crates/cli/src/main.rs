//! stores.deals CLI - schema migrations and admin accounts.
//!
//! # Usage
//!
//! ```bash
//! # Create the relational tables
//! deals-cli migrate relational
//!
//! # Create the managed key-value table
//! deals-cli migrate kv
//!
//! # Run every migration whose database URL is configured
//! deals-cli migrate all
//!
//! # Create an admin account in the configured storage backend
//! deals-cli admin create -u root -p 'long-password' -r super_admin
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "deals-cli")]
#[command(author, version, about = "stores.deals CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Migrate the relational database (`DEALS_DATABASE_URL`)
    Relational,
    /// Migrate the managed key-value database (`DEALS_KV_URL`)
    Kv,
    /// Migrate every configured database
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (hashed before it is stored)
        #[arg(short, long)]
        password: String,

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Relational => commands::migrate::relational().await?,
            MigrateTarget::Kv => commands::migrate::kv().await?,
            MigrateTarget::All => commands::migrate::all().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                password,
                role,
            } => {
                commands::admin::create_admin(&username, &password, &role).await?;
            }
        },
    }
    Ok(())
}
