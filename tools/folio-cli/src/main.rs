//! Folio CLI - Command line tool for the Folio bookstore core.
//!
//! Commands:
//! - `folio catalog` - Search and inspect books
//! - `folio cart` - Manage a shopper's cart
//! - `folio wishlist` - Manage saved books
//! - `folio address` - Manage the address book
//! - `folio checkout` - Quote and place orders
//! - `folio orders` - List and progress orders
//! - `folio reviews` - Read and write book reviews
//! - `folio session` - Anonymous cache and sign-in merge
//! - `folio config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    AddressArgs, CartArgs, CatalogArgs, CheckoutArgs, ConfigArgs, OrdersArgs, ReviewsArgs,
    SessionArgs, WishlistArgs,
};

/// Folio CLI - Drive the bookstore core from a shell
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Shopper to act as (overrides `store.owner`)
    #[arg(short, long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and inspect the catalog
    Catalog(CatalogArgs),

    /// Manage the cart
    Cart(CartArgs),

    /// Manage the wishlist
    Wishlist(WishlistArgs),

    /// Manage saved addresses
    Address(AddressArgs),

    /// Preview and place an order
    Checkout(CheckoutArgs),

    /// List and progress orders
    Orders(OrdersArgs),

    /// Read and write reviews
    Reviews(ReviewsArgs),

    /// Work with the anonymous cache and sign in
    Session(SessionArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, cli.owner, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Wishlist(args) => commands::wishlist::run(args, &ctx).await,
        Commands::Address(args) => commands::address::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Reviews(args) => commands::reviews::run(args, &ctx).await,
        Commands::Session(args) => commands::session::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
