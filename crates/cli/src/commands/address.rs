//! Ad-hoc address lookups against the configured services.

use crm_server::address::AddressGateway;
use crm_server::config::CrmConfig;

use super::print_json;

/// Print the candidate addresses for a zip code.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the lookup fails or no
/// address matches.
pub async fn lookup(zip_code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = CrmConfig::from_env()?;
    let gateway = AddressGateway::new(&config.address)?;

    let candidates = gateway.lookup_address(zip_code).await?;
    if candidates.is_empty() {
        return Err(format!("No address found for zip code {zip_code}").into());
    }

    print_json(&candidates)?;
    Ok(())
}

/// Print the zip code for an address.
///
/// # Errors
///
/// Returns an error if configuration is invalid, no geocoding key is set, the
/// lookup fails or no zip code is found.
pub async fn reverse(
    prefecture: &str,
    city: &str,
    address1: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = CrmConfig::from_env()?;
    let gateway = AddressGateway::new(&config.address)?;

    let postal_code = gateway
        .lookup_postal_code(prefecture, city, address1)
        .await?
        .ok_or("Zip code not found for the given address")?;

    print_json(&postal_code)?;
    Ok(())
}
