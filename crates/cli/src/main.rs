//! `ShopEasy` CLI - browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally by category or on sale only
//! shopeasy products --category vestidos --on-sale
//!
//! # Show one product
//! shopeasy product 42
//!
//! # Log in with SHOPEASY_USERNAME / SHOPEASY_PASSWORD and show the profile
//! shopeasy whoami
//!
//! # Interactive cart session (add/inc/dec/rm ID, show, quit)
//! shopeasy cart
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopeasy_core::ProductId;
use shopeasy_storefront::config::StorefrontConfig;
use shopeasy_storefront::error::AppError;
use shopeasy_storefront::state::Storefront;

mod commands;

#[derive(Parser)]
#[command(name = "shopeasy")]
#[command(author, version, about = "ShopEasy storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only products on sale
        #[arg(long)]
        on_sale: bool,
    },
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
    /// Log in with the configured credentials and show the account
    Whoami,
    /// Start an interactive cart session
    Cart,
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

    tracing::info!("Sentry initialized");
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopeasy_storefront=info,shopeasy_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let code = match run(cli, config).await {
        Ok(()) => 0,
        Err(e) => {
            e.report();
            1
        }
    };

    // Flush pending Sentry events; `exit` skips destructors
    drop(sentry_guard);
    std::process::exit(code);
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let store = Storefront::new(config)?;

    match cli.command {
        Commands::Products { category, on_sale } => {
            commands::catalog::products(&store, category, on_sale).await?;
        }
        Commands::Product { id } => commands::catalog::product(&store, id).await?,
        Commands::Categories => commands::catalog::categories(&store).await?,
        Commands::Whoami => commands::account::whoami(&store).await?,
        Commands::Cart => commands::cart::session(&store).await?,
    }
    Ok(())
}
