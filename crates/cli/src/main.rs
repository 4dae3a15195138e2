//! CRM CLI - Database migrations, seeding and address lookups.
//!
//! # Usage
//!
//! ```bash
//! # Create the document table
//! crm-cli migrate
//!
//! # Load customers from YAML, completing zip codes and localities
//! crm-cli seed data/customers.yaml --fill-address
//!
//! # Zip code to address, address to zip code
//! crm-cli address lookup 100-0005
//! crm-cli address reverse 東京都 千代田区 丸の内1-9-1
//!
//! # Inspect stored customers
//! crm-cli customers list --page 2 --page-size 20
//! crm-cli customers search yamada
//! ```
//!
//! Configuration comes from the same environment variables as `crm-server`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use crm_server::config::CrmConfig;
use crm_server::telemetry::{self, LogOutput};

mod commands;

#[derive(Parser)]
#[command(name = "crm-cli")]
#[command(author, version, about = "CRM CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create customers from a YAML file
    Seed {
        /// Path to a YAML list of customers
        file: String,

        /// Complete missing zip codes or localities through the address
        /// services
        #[arg(long)]
        fill_address: bool,
    },
    /// Look up addresses and zip codes
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Inspect stored customers
    Customers {
        #[command(subcommand)]
        action: CustomersAction,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// Zip code to candidate addresses
    Lookup {
        /// Zip code, with or without hyphen
        zip_code: String,
    },
    /// Address to zip code
    Reverse {
        prefecture: String,
        city: String,
        address1: Option<String>,
    },
}

#[derive(Subcommand)]
enum CustomersAction {
    /// One page of customers
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 10)]
        page_size: i64,
    },
    /// Customers whose name, email or phone match
    Search {
        query: String,
    },
}

#[tokio::main]
async fn main() {
    // Commands load their own configuration and report its errors
    let config = CrmConfig::from_env().ok();
    let _sentry_guard = config.as_ref().and_then(telemetry::init_sentry);
    telemetry::init_tracing(
        config.as_ref().is_some_and(|c| c.log_json),
        "crm_cli=info,crm_server=info",
        LogOutput::Stderr,
    );

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, fill_address } => {
            commands::seed::customers(&file, fill_address).await?;
        }
        Commands::Address { action } => match action {
            AddressAction::Lookup { zip_code } => commands::address::lookup(&zip_code).await?,
            AddressAction::Reverse {
                prefecture,
                city,
                address1,
            } => commands::address::reverse(&prefecture, &city, address1.as_deref()).await?,
        },
        Commands::Customers { action } => match action {
            CustomersAction::List { page, page_size } => {
                commands::customers::list(page, page_size).await?;
            }
            CustomersAction::Search { query } => commands::customers::search(&query).await?,
        },
    }
    Ok(())
}
