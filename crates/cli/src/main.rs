//! Trinket Store CLI - terminal front end over the Trinket Store client.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as an administrator
//! ts-cli login -e admin@trinket.store -p secret
//!
//! # Browse the catalog and fill the cart
//! ts-cli catalog
//! ts-cli cart add 3 --quantity 2
//!
//! # Pay with PIX and wait for the payment to land
//! ts-cli checkout
//! ts-cli orders watch 42
//! ```
//!
//! The session and the carts are kept under `TRINKET_DATA_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trinket_store_client::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(author, version, about = "Trinket Store command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as an administrator
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (falls back to `TRINKET_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and switch back to the guest cart
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Customer sign-in through the identity provider
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
    /// List products (admin)
    Products {
        /// Name contains
        #[arg(short, long, default_value = "")]
        search: String,

        /// Exact category, or `all`
        #[arg(short, long, default_value = "all")]
        category: String,

        /// `active`, `inactive` or `all`
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Price history of a product (admin)
    Prices { product_id: i64 },
    /// List stock records (admin)
    Inventory {
        /// Only records with stock
        #[arg(long)]
        in_stock: bool,

        /// Only records at or below this quantity
        #[arg(long)]
        low_stock: Option<u32>,
    },
    /// Orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// List users (admin)
    Users {
        /// Name or email contains
        #[arg(short, long, default_value = "")]
        search: String,

        /// `admin`, `customer` or `all`
        #[arg(short, long, default_value = "all")]
        role: String,

        #[arg(long, value_enum, default_value_t = EmailFilter::All)]
        email: EmailFilter,

        #[arg(long, value_enum, default_value_t = RecencyFilter::All)]
        created: RecencyFilter,
    },
    /// Show the storefront catalog
    Catalog {
        /// Ignore the cached catalog
        #[arg(long)]
        refresh: bool,
    },
    /// Manage the cart of the signed-in user (or the guest cart)
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Pay for the cart with PIX
    Checkout {
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum IdentityAction {
    /// Print the Google sign-in URL
    OauthUrl {
        #[arg(long, default_value = "http://localhost:3000/auth/callback")]
        redirect_to: String,
    },
    /// Adopt an access token returned by the sign-in flow
    SignIn {
        #[arg(long)]
        access_token: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List all orders (admin)
    List {
        /// Status, or `all`
        #[arg(short, long, default_value = "all")]
        status: String,

        #[arg(short, long)]
        user: Option<i64>,
    },
    /// Show one order and its lines (admin)
    Show { order_id: i64 },
    /// Change an order's status (admin)
    SetStatus { order_id: i64, status: String },
    /// The signed-in customer's orders, newest first
    Mine,
    /// Cancel one of your pending orders
    Cancel { order_id: i64 },
    /// Follow a pending order until it is paid or canceled
    Watch { order_id: i64 },
}

#[derive(Subcommand)]
enum CartAction {
    Show,
    /// Add a catalog product
    Add {
        product_id: i64,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set the quantity of a line
    Update { product_id: i64, quantity: i64 },
    Remove { product_id: i64 },
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmailFilter {
    All,
    With,
    Without,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecencyFilter {
    All,
    #[value(name = "7d")]
    Last7Days,
    #[value(name = "30d")]
    Last30Days,
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trinket_store_client=info,trinket_store_cli=info".into());

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
    let context = commands::open(config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&context, email, password).await?;
        }
        Commands::Logout => commands::account::logout(&context).await?,
        Commands::Whoami => commands::account::whoami(&context).await,
        Commands::Identity { action } => match action {
            IdentityAction::OauthUrl { redirect_to } => {
                commands::account::oauth_url(&context, &redirect_to)?;
            }
            IdentityAction::SignIn { access_token } => {
                commands::account::identity_sign_in(&context, &access_token).await?;
            }
        },
        Commands::Products {
            search,
            category,
            status,
        } => commands::admin::products(&context, search, &category, &status).await?,
        Commands::Prices { product_id } => commands::admin::prices(&context, product_id).await?,
        Commands::Inventory {
            in_stock,
            low_stock,
        } => commands::admin::inventory(&context, in_stock, low_stock).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { status, user } => {
                commands::admin::orders(&context, &status, user).await?;
            }
            OrdersAction::Show { order_id } => {
                commands::admin::order(&context, order_id).await?;
            }
            OrdersAction::SetStatus { order_id, status } => {
                commands::admin::set_order_status(&context, order_id, &status).await?;
            }
            OrdersAction::Mine => commands::shop::my_orders(&context).await?,
            OrdersAction::Cancel { order_id } => {
                commands::shop::cancel_order(&context, order_id).await?;
            }
            OrdersAction::Watch { order_id } => {
                commands::shop::watch_order(&context, order_id).await?;
            }
        },
        Commands::Users {
            search,
            role,
            email,
            created,
        } => {
            let email = match email {
                EmailFilter::All => trinket_store_client::admin::EmailStatus::All,
                EmailFilter::With => trinket_store_client::admin::EmailStatus::With,
                EmailFilter::Without => trinket_store_client::admin::EmailStatus::Without,
            };
            let created = match created {
                RecencyFilter::All => trinket_store_client::admin::Recency::All,
                RecencyFilter::Last7Days => trinket_store_client::admin::Recency::Last7Days,
                RecencyFilter::Last30Days => trinket_store_client::admin::Recency::Last30Days,
            };
            commands::admin::users(&context, search, &role, email, created).await?;
        }
        Commands::Catalog { refresh } => commands::shop::catalog(&context, refresh).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::shop::show_cart(&context),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::shop::add_to_cart(&context, product_id, quantity).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::shop::update_cart(&context, product_id, quantity)?,
            CartAction::Remove { product_id } => {
                commands::shop::remove_from_cart(&context, product_id);
            }
            CartAction::Clear => commands::shop::clear_cart(&context),
        },
        Commands::Checkout { description } => {
            commands::shop::checkout(&context, description).await?;
        }
    }
    Ok(())
}
