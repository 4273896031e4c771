//! CLI command implementations.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod reviews;
pub mod session;
pub mod wishlist;

use clap::{Args, Subcommand};
use folio_commerce::checkout::{OrderStatus, PaymentMethod};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Search by title or author. No query lists everything.
    Search {
        /// Free-text query.
        #[arg(default_value = "")]
        query: String,
    },
    /// Show one book with its rating.
    Show {
        /// Book ID.
        book: String,
    },
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the priced cart.
    Show,
    /// Add copies of a book.
    Add {
        /// Book ID.
        book: String,
        /// Copies to add.
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set a line's quantity.
    Set {
        /// Book ID.
        book: String,
        /// New quantity.
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Book ID.
        book: String,
    },
    /// Empty the cart.
    Clear,
}

/// Arguments for the wishlist command.
#[derive(Args)]
pub struct WishlistArgs {
    #[command(subcommand)]
    pub command: Option<WishlistCommand>,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// Show saved books.
    Show,
    /// Save a book.
    Add {
        /// Book ID.
        book: String,
    },
    /// Remove a saved book.
    Remove {
        /// Book ID.
        book: String,
    },
    /// Move a saved book into the cart.
    Move {
        /// Book ID.
        book: String,
    },
    /// Remove every saved book.
    Clear,
}

/// Postal fields shared by `address add` and `address update`.
#[derive(Args)]
pub struct AddressFields {
    /// Recipient name.
    #[arg(long)]
    pub name: Option<String>,
    /// Street and house number.
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    /// PIN / ZIP code.
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

/// Arguments for the address command.
#[derive(Args)]
pub struct AddressArgs {
    #[command(subcommand)]
    pub command: Option<AddressCommand>,
}

#[derive(Subcommand)]
pub enum AddressCommand {
    /// List addresses, default first.
    List,
    /// Add an address.
    Add {
        #[command(flatten)]
        fields: AddressFields,
        /// Make it the default.
        #[arg(long)]
        default: bool,
    },
    /// Change fields of an address.
    Update {
        /// Address ID.
        id: String,
        #[command(flatten)]
        fields: AddressFields,
        /// Set or clear the default flag.
        #[arg(long)]
        default: Option<bool>,
    },
    /// Delete an address.
    Remove {
        /// Address ID.
        id: String,
    },
    /// Make an address the default.
    Default {
        /// Address ID.
        id: String,
    },
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    #[command(subcommand)]
    pub command: CheckoutCommand,
}

#[derive(Subcommand)]
pub enum CheckoutCommand {
    /// Show what the cart would cost.
    Preview {
        /// card, upi, netbanking or cod.
        #[arg(short, long, default_value = "card")]
        method: PaymentMethod,
    },
    /// Place an order for the cart.
    Place {
        /// card, upi, netbanking or cod.
        #[arg(short, long, default_value = "card")]
        method: PaymentMethod,
        /// Ship to this address instead of the default.
        #[arg(short, long)]
        address: Option<String>,
    },
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,

    /// Show only the last N orders.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List orders, newest first.
    List,
    /// Show one order.
    Show {
        /// Order ID.
        id: String,
    },
    /// Move an order forward in fulfillment.
    Advance {
        /// Order ID.
        id: String,
        /// Target status. Defaults to the next one.
        status: Option<OrderStatus>,
    },
    /// Cancel an order.
    Cancel {
        /// Order ID.
        id: String,
    },
}

/// Arguments for the reviews command.
#[derive(Args)]
pub struct ReviewsArgs {
    #[command(subcommand)]
    pub command: ReviewsCommand,
}

#[derive(Subcommand)]
pub enum ReviewsCommand {
    /// List a book's reviews, newest first.
    List {
        /// Book ID.
        book: String,
    },
    /// Review a book.
    Add {
        /// Book ID.
        book: String,
        /// Stars, 1 to 5.
        rating: u8,
        /// Review text.
        #[arg(default_value = "")]
        comment: String,
    },
    /// Edit one of your reviews.
    Update {
        /// Review ID.
        id: String,
        /// Stars, 1 to 5.
        rating: u8,
        /// Review text.
        #[arg(default_value = "")]
        comment: String,
    },
    /// Delete one of your reviews.
    Remove {
        /// Review ID.
        id: String,
    },
    /// Average rating for a book.
    Summary {
        /// Book ID.
        book: String,
    },
}

/// Arguments for the session command.
#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: Option<SessionCommand>,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the signed-out cache.
    Show,
    /// Add a book to the signed-out cart.
    Add {
        /// Book ID.
        book: String,
        /// Copies to add.
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Save a book to the signed-out wishlist.
    Save {
        /// Book ID.
        book: String,
    },
    /// Sign in as the shopper and merge the cache into their account.
    Login,
    /// Discard the signed-out cache.
    Reset,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file and sample catalog.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration.
    Validate,
}
