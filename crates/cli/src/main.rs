//! Shopfront CLI - browse the catalog, manage the cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shopfront products
//! shopfront products --id 3
//!
//! # Manage the cart
//! shopfront cart add 3
//! shopfront cart set 3 2
//! shopfront cart show
//!
//! # Check out interactively
//! shopfront checkout
//!
//! # Create the orders table
//! shopfront migrate
//! ```
//!
//! # Commands
//!
//! - `products` - List or show catalog products
//! - `cart` - Show and change the cart
//! - `checkout` - Two-step checkout on stdin
//! - `migrate` - Run database migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use shopfront::config::ShopfrontConfig;
use shopfront::error::AppError;
use shopfront::telemetry;
use shopfront_core::ProductId;

mod commands;
mod terminal;

use commands::cart::CartCommand;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront command-line storefront")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products, or show one
    Products {
        /// Product ID to show
        #[arg(long)]
        id: Option<ProductId>,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the current cart
    Checkout,
    /// Run database migrations
    Migrate,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product in the cart (0 removes it)
    Set {
        /// Product ID
        id: ProductId,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Remove every product from the cart
    Clear,
}

impl From<CartAction> for CartCommand {
    fn from(action: CartAction) -> Self {
        match action {
            CartAction::Show => Self::Show,
            CartAction::Add { id } => Self::Add(id),
            CartAction::Set { id, quantity } => Self::Set(id, quantity),
            CartAction::Remove { id } => Self::Remove(id),
            CartAction::Clear => Self::Clear,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ShopfrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Telemetry needs the configuration, so report this one directly
            terminal::print_line(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };

    // Initialize Sentry and tracing (guard must outlive every command)
    let telemetry_guard = match telemetry::init(&config.telemetry) {
        Ok(guard) => Some(guard),
        Err(e) => {
            terminal::print_line(&format!("Failed to initialize logging: {e}"));
            None
        }
    };

    if let Err(e) = run(cli, &config).await {
        e.report();
        terminal::print_line(&e.user_message());
        // Flush pending Sentry events before exiting
        drop(telemetry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ShopfrontConfig) -> Result<(), AppError> {
    match cli.command {
        Commands::Products { id } => commands::products::run(config, id).await,
        Commands::Cart { action } => commands::cart::run(config, action.into(), cli.yes).await,
        Commands::Checkout => commands::checkout::run(config).await,
        Commands::Migrate => commands::migrate::run(config).await,
    }
}
