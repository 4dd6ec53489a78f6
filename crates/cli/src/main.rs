//! Shopfront CLI - configuration checks and data inspection.
//!
//! # Usage
//!
//! ```bash
//! # Validate the environment configuration
//! shopfront config check
//!
//! # List the product catalog
//! shopfront products list
//!
//! # List a customer's cart
//! shopfront cart list -e jane@example.com -p secret1
//!
//! # List every user profile (admins only)
//! shopfront admin users -e owner@example.com -p secret1
//!
//! # Deactivate or delete a profile (admins only)
//! shopfront admin deactivate <USER_ID> -e owner@example.com -p secret1
//! shopfront admin delete-user <USER_ID> -e owner@example.com -p secret1
//! ```
//!
//! # Commands
//!
//! - `config check` - Validate backend, catalog and server settings
//! - `products list` - List products from the configured catalog source
//! - `cart list` - Sign in and list that account's cart
//! - `admin users` - Sign in as an admin and list user profiles
//! - `admin activate` / `admin deactivate` - Set a profile's active flag
//! - `admin delete-user` - Delete a profile row

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use shopfront_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect a customer's cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Admin panel data
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the environment configuration
    Check,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List every product
    List,
}

#[derive(Args)]
struct Credentials {
    /// Account email address
    #[arg(short, long)]
    email: String,

    /// Account password
    #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum CartAction {
    /// Sign in and list the cart
    List {
        #[command(flatten)]
        credentials: Credentials,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Sign in as an admin and list user profiles
    Users {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Mark a user profile active
    Activate {
        /// Profile id (UUID)
        user_id: UserId,

        #[command(flatten)]
        credentials: Credentials,
    },
    /// Mark a user profile inactive
    Deactivate {
        /// Profile id (UUID)
        user_id: UserId,

        #[command(flatten)]
        credentials: Credentials,
    },
    /// Delete a user profile row (the auth account is kept)
    DeleteUser {
        /// Profile id (UUID)
        user_id: UserId,

        #[command(flatten)]
        credentials: Credentials,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Config {
            action: ConfigAction::Check,
        } => commands::config::check(),
        Commands::Products {
            action: ProductsAction::List,
        } => commands::products::list().await,
        Commands::Cart {
            action: CartAction::List { credentials },
        } => commands::cart::list(&credentials.email, credentials.password.into()).await,
        Commands::Admin { action } => match action {
            AdminAction::Users { credentials } => {
                commands::admin::users(&credentials.email, credentials.password.into()).await
            }
            AdminAction::Activate {
                user_id,
                credentials,
            } => {
                commands::admin::set_active(
                    &credentials.email,
                    credentials.password.into(),
                    user_id,
                    true,
                )
                .await
            }
            AdminAction::Deactivate {
                user_id,
                credentials,
            } => {
                commands::admin::set_active(
                    &credentials.email,
                    credentials.password.into(),
                    user_id,
                    false,
                )
                .await
            }
            AdminAction::DeleteUser {
                user_id,
                credentials,
            } => {
                commands::admin::delete_user(&credentials.email, credentials.password.into(), user_id)
                    .await
            }
        },
    }
}
