//! Atelier CLI - database setup and a terminal front end for carts and wishlists.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! atelier migrate
//!
//! # Load the catalog from a YAML file
//! atelier seed catalog.yaml --clear
//!
//! # Shop against the running storefront
//! atelier cart add 7 --size Large
//! atelier wishlist list
//!
//! # Or offline, against the state directory
//! atelier --mode local --catalog catalog.yaml cart summary
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert artists and artworks from a catalog file
//! - `cart` - List, add, remove, update and summarize cart lines
//! - `wishlist` - List, add and remove saved artworks

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod catalog_file;
mod commands;

use commands::basket::{BasketOptions, CartAction, Mode, WishlistAction};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    /// Where cart and wishlist lines are kept
    #[arg(long, global = true, value_enum, env = "ATELIER_MODE", default_value = "remote")]
    mode: Mode,

    /// Storefront base URL
    #[arg(
        long,
        global = true,
        env = "ATELIER_API_URL",
        default_value = "http://127.0.0.1:8787"
    )]
    api_url: String,

    /// Directory holding the session token and local lines
    #[arg(long, global = true, env = "ATELIER_STATE_DIR", default_value = ".atelier")]
    state_dir: PathBuf,

    /// Tax rate applied by `cart summary`
    #[arg(long, global = true, env = "ATELIER_TAX_RATE", default_value = "0.08")]
    tax_rate: Decimal,

    /// Catalog file used for snapshots in local mode (defaults to the API)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the catalog file
        file: PathBuf,

        /// Delete the existing catalog first
        #[arg(long)]
        clear: bool,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

impl Cli {
    fn basket_options(&self) -> BasketOptions {
        BasketOptions {
            mode: self.mode,
            api_url: self.api_url.clone(),
            state_dir: self.state_dir.clone(),
            catalog: self.catalog.clone(),
            tax_rate: self.tax_rate,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.basket_options();

    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file, clear } => commands::seed::catalog(&file, clear).await?,
        Commands::Cart { action } => commands::basket::cart(&options, action).await?,
        Commands::Wishlist { action } => commands::basket::wishlist(&options, action).await?,
    }
    Ok(())
}
