//! Subcommand implementations.

pub mod address;
pub mod customers;
pub mod migrate;
pub mod seed;

use crm_server::address::AddressGateway;
use crm_server::config::{ConfigError, CrmConfig};
use crm_server::db::{self, CustomerRepository};
use crm_server::services::CustomerService;

/// Load configuration, insisting on a database URL.
///
/// Commands that write must not silently land in the in-memory store.
pub fn config_with_database() -> Result<CrmConfig, ConfigError> {
    let config = CrmConfig::from_env()?;
    if config.store.database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("CRM_DATABASE_URL".to_string()));
    }
    Ok(config)
}

/// Build a customer service over the configured store.
pub async fn customer_service(
    config: &CrmConfig,
) -> Result<CustomerService, Box<dyn std::error::Error>> {
    let store = db::connect(&config.store).await?;
    let repository = CustomerRepository::new(
        store,
        config.store.collection.clone(),
        config.store.list_limit,
    );
    let gateway = AddressGateway::new(&config.address)?;
    Ok(CustomerService::new(repository, gateway))
}

/// Print a value as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
