//! Cart and wishlist commands.
//!
//! # Usage
//!
//! ```bash
//! # Against a running storefront (the session token is kept in the state dir)
//! atelier cart add 7 --size Medium --quantity 2
//! atelier cart list
//!
//! # Entirely offline, snapshots taken from a catalog file
//! atelier --mode local --catalog catalog.yaml wishlist add 7
//! ```
//!
//! # Environment Variables
//!
//! - `ATELIER_API_URL` - Storefront base URL (default `http://127.0.0.1:8787`)
//! - `ATELIER_STATE_DIR` - Directory for the session token and local lines
//!   (default `.atelier`)
//! - `ATELIER_TAX_RATE` - Tax rate for `cart summary` (default `0.08`)

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;

use atelier_client::{
    CatalogSource, Cart, CartSync, FileStore, HttpCatalog, KeyValueStore, LocalGateway,
    RemoteGateway, SessionIdentity, StaticCatalog, Wishlist, WishlistSync,
};
use atelier_core::{ArtworkId, CartLine, CartLineId, WishlistLine, WishlistLineId};

use crate::catalog_file::CatalogFile;

/// Where lines are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Through the storefront API
    Remote,
    /// In the state directory, without a server
    Local,
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// List cart lines
    List,
    /// Add an artwork, merging with an existing line of the same size
    Add {
        artwork_id: i32,

        #[arg(short, long)]
        size: Option<String>,

        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { line_id: i32 },
    /// Replace a line's quantity
    Update {
        line_id: i32,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show item count, subtotal, tax and total
    Summary,
}

#[derive(Debug, Subcommand)]
pub enum WishlistAction {
    /// List saved artworks
    List,
    /// Save an artwork
    Add { artwork_id: i32 },
    /// Remove a line
    Remove { line_id: i32 },
}

/// Settings shared by the cart and wishlist commands.
#[derive(Debug, Clone)]
pub struct BasketOptions {
    pub mode: Mode,
    pub api_url: String,
    pub state_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub tax_rate: Decimal,
}

/// Gateways for one invocation, chosen by mode.
enum Gateways {
    Remote(RemoteGateway),
    Local(LocalGateway),
}

impl BasketOptions {
    async fn gateways(&self) -> Result<Gateways, Box<dyn std::error::Error>> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&self.state_dir)?);

        Ok(match self.mode {
            Mode::Remote => Gateways::Remote(RemoteGateway::new(
                &self.api_url,
                SessionIdentity::load(store),
            )?),
            Mode::Local => {
                let catalog: Arc<dyn CatalogSource> = match &self.catalog {
                    Some(path) => {
                        let file = CatalogFile::load(path).await?;
                        Arc::new(file.artworks(Utc::now()).iter().collect::<StaticCatalog>())
                    }
                    None => Arc::new(HttpCatalog::new(&self.api_url)?),
                };
                Gateways::Local(LocalGateway::open(store, catalog))
            }
        })
    }
}

/// Run a cart command.
///
/// # Errors
///
/// Returns an error if the gateway cannot be set up or the operation fails.
pub async fn cart(
    options: &BasketOptions,
    action: CartAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match options.gateways().await? {
        Gateways::Remote(g) => run_cart(Cart::new(g).with_tax_rate(options.tax_rate), action).await,
        Gateways::Local(g) => run_cart(Cart::new(g).with_tax_rate(options.tax_rate), action).await,
    }
}

/// Run a wishlist command.
///
/// # Errors
///
/// Returns an error if the gateway cannot be set up or the operation fails.
pub async fn wishlist(
    options: &BasketOptions,
    action: WishlistAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match options.gateways().await? {
        Gateways::Remote(g) => run_wishlist(Wishlist::new(g), action).await,
        Gateways::Local(g) => run_wishlist(Wishlist::new(g), action).await,
    }
}

async fn run_cart<G: CartSync>(
    cart: Cart<G>,
    action: CartAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CartAction::List => {}
        CartAction::Add {
            artwork_id,
            size,
            quantity,
        } => {
            cart.add(ArtworkId::new(artwork_id), size.as_deref(), quantity)
                .await?;
        }
        CartAction::Remove { line_id } => cart.remove(CartLineId::new(line_id)).await?,
        CartAction::Update { line_id, quantity } => {
            cart.update_quantity(CartLineId::new(line_id), quantity)
                .await?;
        }
        CartAction::Summary => {
            cart.refresh().await?;
            let summary = cart.summary().await;
            print_lines(&[
                format!("Items:    {}", summary.item_count),
                format!("Subtotal: {}", summary.subtotal),
                format!("Tax:      {}", summary.tax),
                format!("Total:    {}", summary.total),
            ]);
            return Ok(());
        }
    }

    let lines = cart.refresh().await?;
    print_lines(&cart_table(&lines));
    Ok(())
}

async fn run_wishlist<G: WishlistSync>(
    wishlist: Wishlist<G>,
    action: WishlistAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WishlistAction::List => {}
        WishlistAction::Add { artwork_id } => {
            // Load first so an already-saved artwork is recognized locally
            wishlist.refresh().await?;
            if wishlist.add(ArtworkId::new(artwork_id)).await? {
                tracing::info!(artwork_id, "Already saved");
            }
        }
        WishlistAction::Remove { line_id } => {
            wishlist.remove(WishlistLineId::new(line_id)).await?;
        }
    }

    let lines = wishlist.refresh().await?;
    print_lines(&wishlist_table(&lines));
    Ok(())
}

fn cart_table(lines: &[CartLine]) -> Vec<String> {
    if lines.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    lines
        .iter()
        .map(|line| {
            format!(
                "#{:<5} {:<32} {:<10} x{:<4} {:>10}",
                line.id,
                line.title,
                line.size_option.as_deref().unwrap_or("-"),
                line.quantity.get(),
                line.line_total(),
            )
        })
        .collect()
}

fn wishlist_table(lines: &[WishlistLine]) -> Vec<String> {
    if lines.is_empty() {
        return vec!["Wishlist is empty".to_string()];
    }

    lines
        .iter()
        .map(|line| {
            format!(
                "#{:<5} {:<32} {:<20} {:>10}",
                line.id,
                line.title,
                line.artist_name.as_deref().unwrap_or("-"),
                line.price,
            )
        })
        .collect()
}

#[allow(clippy::print_stdout)]
fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
