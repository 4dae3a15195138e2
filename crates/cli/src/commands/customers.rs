//! Read-only customer queries.

use crm_server::config::CrmConfig;

use super::{customer_service, print_json};

/// Print one page of customers with the collection total.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the page parameters are
/// below 1 or the store cannot be read.
pub async fn list(page: i64, page_size: i64) -> Result<(), Box<dyn std::error::Error>> {
    let config = CrmConfig::from_env()?;
    let service = customer_service(&config).await?;

    let page = service.list_paginated(page, page_size).await?;
    print_json(&page)?;
    Ok(())
}

/// Print every customer matching `query`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the store cannot be read.
pub async fn search(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = CrmConfig::from_env()?;
    let service = customer_service(&config).await?;

    let customers = service.search(Some(query)).await?;
    print_json(&customers)?;
    Ok(())
}
