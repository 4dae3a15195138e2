//! Seed customers from a YAML file.
//!
//! The file is a list of customer records using the same field names as the
//! API:
//!
//! ```yaml
//! - name: 山田 太郎
//!   email: taro.yamada@example.com
//!   zipCode: "100-0005"
//!   status: active
//! ```

use std::path::Path;

use tracing::{info, warn};

use crm_core::CustomerInput;
use crm_server::services::CustomerService;

use super::{config_with_database, customer_service};

/// Create every customer listed in `file_path`.
///
/// With `fill_address`, records that have a zip code but no prefecture get
/// prefecture, city and town filled in when the zip code resolves to exactly
/// one address. Records with a prefecture but no zip code get the zip code
/// from the geocoder.
///
/// # Errors
///
/// Returns an error if no database is configured, the file cannot be read or
/// parsed, or a write fails.
pub async fn customers(file_path: &str, fill_address: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading customers from file");

    // Parse before connecting so a bad file fails fast
    let content = tokio::fs::read_to_string(path).await?;
    let inputs: Vec<CustomerInput> = serde_yaml::from_str(&content)?;
    info!(customers = inputs.len(), "Parsed seed file");

    let config = config_with_database()?;
    let service = customer_service(&config).await?;

    let mut created = 0_usize;
    for mut input in inputs {
        if fill_address {
            complete_address(&service, &mut input).await;
        }
        let customer = service.create(input).await?;
        info!(customer_id = %customer.id, name = %customer.name, "Seeded customer");
        created += 1;
    }

    info!(created, "Seeding complete");
    Ok(())
}

async fn complete_address(service: &CustomerService, input: &mut CustomerInput) {
    let has_prefecture = input.prefecture.as_deref().is_some_and(|p| !p.is_empty());
    let has_zip_code = input.zip_code.as_deref().is_some_and(|z| !z.is_empty());

    match (has_zip_code, has_prefecture) {
        (true, false) => fill_locality(service, input).await,
        (false, true) => fill_zip_code(service, input).await,
        _ => {}
    }
}

async fn fill_locality(service: &CustomerService, input: &mut CustomerInput) {
    let zip_code = input.zip_code.clone().unwrap_or_default();

    let mut candidates = service.gateway().resolve_address(&zip_code).await;
    if candidates.len() != 1 {
        warn!(
            zip_code = %zip_code,
            candidates = candidates.len(),
            "Zip code did not resolve to a single address, leaving it blank"
        );
        return;
    }

    if let Some(candidate) = candidates.pop() {
        input.prefecture = Some(candidate.prefecture);
        input.city = Some(candidate.city);
        if input.address1.as_deref().is_none_or(str::is_empty) {
            input.address1 = Some(candidate.address1);
        }
    }
}

async fn fill_zip_code(service: &CustomerService, input: &mut CustomerInput) {
    let prefecture = input.prefecture.clone().unwrap_or_default();
    let city = input.city.clone().unwrap_or_default();

    input.zip_code = service
        .gateway()
        .resolve_postal_code(&prefecture, &city, input.address1.as_deref())
        .await;
}
