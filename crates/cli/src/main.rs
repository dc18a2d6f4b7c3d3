//! EV Market CLI - browse listings, manage favorites and pay from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in local storage)
//! evm login -e buyer@example.com -p '...'
//!
//! # Search listings
//! evm products search --brand Tesla --min-price 500000000
//!
//! # Toggle a favorite
//! evm favorite toggle 42
//!
//! # Pay a deposit and handle the provider redirect
//! evm pay deposit --order 7 --amount 5000000
//! evm payment-return 'https://shop.example/payment/return?vnp_ResponseCode=00&...'
//! ```
//!
//! # Environment Variables
//!
//! See [`ev_market_client::config`]; `RUST_LOG` overrides the log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Command results are the program's output
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use ev_market_client::{ApiClient, ClientConfig, FileStorage, Storage};
use ev_market_core::{NotificationId, OrderId, PaymentId, PaymentType, ProductId, UserId};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "evm")]
#[command(author, version, about = "EV Market marketplace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "EV_MARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Browse and search listings
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage favorites
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// Place an order for a listing
    Order {
        /// Listing to buy
        product_id: ProductId,

        /// Agreed total in VND
        #[arg(long)]
        amount: Decimal,
    },
    /// Start or check a payment
    Pay {
        #[command(subcommand)]
        action: PayAction,
    },
    /// Process a payment provider redirect URL
    PaymentReturn {
        url: String,
    },
    /// Show payment/refund signals published by other windows
    Signals {
        /// Only signals with a higher id
        #[arg(long, default_value_t = 0)]
        after: u64,
    },
    /// Read and manage notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },
    /// Resolve a seller's display name
    Seller {
        id: UserId,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all listings
    List {
        /// Only `vehicle` or `battery` listings
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one listing
    Show { id: ProductId },
    /// Advanced search, falling back to local filtering
    Search(commands::products::SearchArgs),
    /// Listings of the signed-in seller
    Mine,
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// Add or remove a listing from favorites
    Toggle { product_id: ProductId },
    /// List favorites
    List,
}

#[derive(Subcommand)]
enum PayAction {
    /// Deposit on an order
    Deposit {
        #[arg(long)]
        order: OrderId,
        #[arg(long)]
        amount: Decimal,
    },
    /// Final payment on an order
    Final {
        #[arg(long)]
        order: OrderId,
        #[arg(long)]
        amount: Decimal,
    },
    /// Verification fee for one of your listings
    Verify {
        #[arg(long)]
        product: ProductId,
        #[arg(long)]
        amount: Decimal,
    },
    /// Show a payment's state
    Status { id: PaymentId },
}

#[derive(Subcommand)]
enum NotificationsAction {
    /// List notifications, newest first
    List,
    /// Count unread notifications
    Unread,
    /// Mark a notification as read
    Read { id: NotificationId },
    /// Delete a notification
    Delete { id: NotificationId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        tracing::info!("Sentry error tracking initialized");
    }

    Some(guard)
}

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

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ev_market_client=info,ev_market_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.storage_path.clone()));
    let client = ApiClient::new(&config, storage.clone())?;
    let ctx = Context {
        client,
        config,
        storage,
    };

    match dispatch(&ctx, cli.command).await {
        Err(CliError::Api(e)) if ctx.client.clear_session_if_unauthorized(&e) => {
            Err(CliError::SessionExpired.into())
        }
        other => other.map_err(Into::into),
    }
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login { email, password } => commands::auth::login(ctx, email, password).await,
        Commands::Logout => commands::auth::logout(ctx),
        Commands::Whoami => commands::auth::whoami(ctx),
        Commands::Products { action } => match action {
            ProductsAction::List { category } => {
                commands::products::list(ctx, category.as_deref()).await
            }
            ProductsAction::Show { id } => commands::products::show(ctx, id).await,
            ProductsAction::Search(args) => commands::products::search(ctx, args).await,
            ProductsAction::Mine => commands::products::mine(ctx).await,
        },
        Commands::Favorite { action } => match action {
            FavoriteAction::Toggle { product_id } => {
                commands::favorites::toggle(ctx, product_id).await
            }
            FavoriteAction::List => commands::favorites::list(ctx).await,
        },
        Commands::Order { product_id, amount } => {
            commands::payments::order(ctx, product_id, amount).await
        }
        Commands::Pay { action } => match action {
            PayAction::Deposit { order, amount } => {
                commands::payments::pay_order(ctx, order, amount, PaymentType::Deposit).await
            }
            PayAction::Final { order, amount } => {
                commands::payments::pay_order(ctx, order, amount, PaymentType::FinalPayment).await
            }
            PayAction::Verify { product, amount } => {
                commands::payments::verify(ctx, product, amount).await
            }
            PayAction::Status { id } => commands::payments::status(ctx, id).await,
        },
        Commands::PaymentReturn { url } => commands::payments::handle_return(ctx, &url),
        Commands::Signals { after } => commands::payments::signals(ctx, after),
        Commands::Notifications { action } => match action {
            NotificationsAction::List => commands::notifications::list(ctx).await,
            NotificationsAction::Unread => commands::notifications::unread(ctx).await,
            NotificationsAction::Read { id } => commands::notifications::read(ctx, id).await,
            NotificationsAction::Delete { id } => commands::notifications::delete(ctx, id).await,
        },
        Commands::Seller { id } => commands::products::seller(ctx, id).await,
    }
}
