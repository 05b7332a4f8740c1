//! Souq CLI - storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! souq search tea
//! souq search --collection Grill
//!
//! # Manage the cart
//! souq cart add --uuid kb-1 --title Kebab --price 4000
//! souq cart show
//!
//! # Place an order
//! souq checkout --name "Zainab Ali" --phone 07701234567 --lat 33.31 --lng 44.42
//!
//! # Show the confirmation for the last order
//! souq orders confirm
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the cart
//! - `favorites` - Show and edit favorites
//! - `search` - Search the catalog
//! - `checkout` - Place an order for the current cart
//! - `orders` - Order history and confirmation
//!
//! Configuration is read from the environment (see `souq_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use souq_storefront::{Storefront, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::ItemArgs;
use commands::checkout::CheckoutArgs;

#[derive(Parser)]
#[command(name = "souq")]
#[command(author, version, about = "Souq storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show and edit favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Search the catalog
    Search {
        /// Keyword to search for
        keyword: Option<String>,

        /// Browse a collection instead ("All" for every collection)
        #[arg(short, long, conflicts_with = "keyword")]
        collection: Option<String>,

        /// Result page
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add an item (re-adding bumps the quantity)
    Add {
        #[command(flatten)]
        item: ItemArgs,

        /// Initial quantity for a new line
        #[arg(short, long)]
        quantity: Option<u32>,

        /// Notes for a new line
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Increase a line's quantity by one
    Inc { uuid: String },
    /// Decrease a line's quantity by one (removes it at one)
    Dec { uuid: String },
    /// Remove a line
    Remove { uuid: String },
    /// Replace a line's notes
    Notes { uuid: String, notes: String },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites
    List,
    /// Save an item
    Add {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Save an item, or remove it if already saved
    Toggle {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Remove an item
    Remove { uuid: String },
    /// Remove every favorite
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders placed from this client
    List,
    /// Show the confirmation for the last checkout (once)
    Confirm,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration before tracing so Sentry can be initialized first
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "souq_storefront=info,souq_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storefront = Storefront::open(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add {
                item,
                quantity,
                notes,
            } => commands::cart::add(&storefront, item, quantity, notes)?,
            CartAction::Inc { uuid } => commands::cart::increment(&storefront, &uuid),
            CartAction::Dec { uuid } => commands::cart::decrement(&storefront, &uuid),
            CartAction::Remove { uuid } => commands::cart::remove(&storefront, &uuid),
            CartAction::Notes { uuid, notes } => {
                commands::cart::notes(&storefront, &uuid, &notes);
            }
            CartAction::Clear => commands::cart::clear(&storefront),
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&storefront),
            FavoritesAction::Add { item } => commands::favorites::add(&storefront, item)?,
            FavoritesAction::Toggle { item } => commands::favorites::toggle(&storefront, item)?,
            FavoritesAction::Remove { uuid } => commands::favorites::remove(&storefront, &uuid),
            FavoritesAction::Clear => commands::favorites::clear(&storefront),
        },
        Commands::Search {
            keyword,
            collection,
            page,
        } => {
            commands::catalog::search(
                &storefront,
                keyword.as_deref(),
                collection.as_deref(),
                page,
            )
            .await?;
        }
        Commands::Checkout(args) => commands::checkout::run(&storefront, args).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&storefront),
            OrdersAction::Confirm => commands::orders::confirm(&storefront),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_cart_add() {
        let cli = Cli::try_parse_from([
            "souq", "cart", "add", "--uuid", "kb-1", "--title", "Kebab", "--price", "4000",
            "--quantity", "2",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add {
                    quantity: Some(2),
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_checkout_requires_both_coordinates() {
        let cli = Cli::try_parse_from(["souq", "checkout", "--lat", "33.3"]);
        assert!(cli.is_err());
    }
}
