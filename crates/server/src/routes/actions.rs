//! Named API actions and their dispatch.
//!
//! Every route, REST or RPC, is translated into an [`ApiAction`] and run
//! through [`dispatch`], so both surfaces share the same semantics and the
//! same error envelope.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::post,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument};

use crm_core::{AddressCandidate, Customer, CustomerInput, Page};

use super::envelope::Envelope;
use crate::{error::AppError, state::AppState};

pub const CUSTOMER_NOT_FOUND: &str = "Customer not found";
pub const ADDRESS_NOT_FOUND: &str = "Address not found or invalid zip code";
pub const ZIP_CODE_NOT_FOUND: &str = "Zip code not found for the given address";

/// Build the RPC router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/rpc", post(rpc))
}

const fn default_page() -> i64 {
    1
}

const fn default_page_size() -> i64 {
    10
}

/// Paginated listing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Accepted for compatibility; listing is always ordered by ID.
    pub sort_field: Option<String>,
    /// Accepted for compatibility; listing is always ordered by ID.
    pub sort_order: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort_field: None,
            sort_order: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdParams {
    pub id: String,
}

/// Update parameters: the target ID plus the customer fields to merge.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateParams {
    pub id: String,
    #[serde(flatten)]
    pub input: CustomerInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipCodeParams {
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressParams {
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub address1: Option<String>,
}

/// An API action with its parameters.
#[derive(Debug, Clone)]
pub enum ApiAction {
    /// First page of ten customers, without pagination metadata.
    GetCustomers,
    GetCustomersPaginated(ListParams),
    SearchCustomers(SearchParams),
    GetCustomerById(IdParams),
    CreateCustomer(CustomerInput),
    UpdateCustomer(UpdateParams),
    GetAddressByZipCode(ZipCodeParams),
    GetZipCodeByAddress(AddressParams),
}

impl ApiAction {
    /// Parse a named action. Absent `params` count as `{}`.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an unknown action or malformed parameters.
    pub fn parse(action: &str, params: Value) -> Result<Self, AppError> {
        let params = if params.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            params
        };

        Ok(match action {
            "getCustomers" => Self::GetCustomers,
            "getCustomersPaginated" => Self::GetCustomersPaginated(decode_params(params)?),
            "searchCustomers" => Self::SearchCustomers(decode_params(params)?),
            "getCustomerById" => Self::GetCustomerById(decode_params(params)?),
            "createCustomer" => Self::CreateCustomer(decode_params(params)?),
            "updateCustomer" => Self::UpdateCustomer(decode_params(params)?),
            "getAddressByZipCode" => Self::GetAddressByZipCode(decode_params(params)?),
            "getZipCodeByAddress" => Self::GetZipCodeByAddress(decode_params(params)?),
            other => return Err(AppError::BadRequest(format!("Unknown action: {other}"))),
        })
    }

    /// Action name as used on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetCustomers => "getCustomers",
            Self::GetCustomersPaginated(_) => "getCustomersPaginated",
            Self::SearchCustomers(_) => "searchCustomers",
            Self::GetCustomerById(_) => "getCustomerById",
            Self::CreateCustomer(_) => "createCustomer",
            Self::UpdateCustomer(_) => "updateCustomer",
            Self::GetAddressByZipCode(_) => "getAddressByZipCode",
            Self::GetZipCodeByAddress(_) => "getZipCodeByAddress",
        }
    }
}

fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, AppError> {
    serde_json::from_value(params).map_err(|e| AppError::BadRequest(format!("Invalid params: {e}")))
}

/// Data of the paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerList {
    pub customers: Vec<Customer>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
}

impl From<Page<Customer>> for CustomerList {
    fn from(page: Page<Customer>) -> Self {
        Self {
            customers: page.data,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

/// Successful result of an action.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ActionOutput {
    Customers(Vec<Customer>),
    CustomerList(CustomerList),
    Customer(Customer),
    Addresses(Vec<AddressCandidate>),
    PostalCode(String),
}

/// Success envelope of an action.
pub type ApiResponse = Json<Envelope<ActionOutput>>;

/// Run an action against the customer service.
///
/// # Errors
///
/// Returns `AppError` for not-found records, empty address lookups, invalid
/// parameters and service failures.
#[instrument(skip(state, action), fields(action = action.name()))]
pub async fn dispatch(state: &AppState, action: ApiAction) -> Result<ApiResponse, AppError> {
    let customers = state.customers();

    let output = match action {
        ApiAction::GetCustomers => ActionOutput::Customers(customers.list_first_page().await?),
        ApiAction::GetCustomersPaginated(params) => {
            if params.sort_field.is_some() || params.sort_order.is_some() {
                debug!(
                    sort_field = ?params.sort_field,
                    sort_order = ?params.sort_order,
                    "Sorting is not supported, ignoring"
                );
            }
            let page = customers
                .list_paginated(params.page, params.page_size)
                .await?;
            ActionOutput::CustomerList(page.into())
        }
        ApiAction::SearchCustomers(params) => {
            ActionOutput::Customers(customers.search(params.query.as_deref()).await?)
        }
        ApiAction::GetCustomerById(params) => {
            let customer = customers
                .get_by_id(&params.id)
                .await?
                .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;
            ActionOutput::Customer(customer)
        }
        ApiAction::CreateCustomer(input) => ActionOutput::Customer(customers.create(input).await?),
        ApiAction::UpdateCustomer(params) => {
            ActionOutput::Customer(customers.update(&params.id, params.input).await?)
        }
        ApiAction::GetAddressByZipCode(params) => {
            let candidates = customers
                .resolve_address(params.zip_code.as_deref())
                .await
                .map_err(|e| AppError::lookup(ADDRESS_NOT_FOUND, Some(e)))?;
            if candidates.is_empty() {
                return Err(AppError::lookup(ADDRESS_NOT_FOUND, None));
            }
            ActionOutput::Addresses(candidates)
        }
        ApiAction::GetZipCodeByAddress(params) => {
            let postal_code = customers
                .resolve_postal_code(
                    params.prefecture.as_deref(),
                    params.city.as_deref(),
                    params.address1.as_deref(),
                )
                .await
                .map_err(|e| AppError::lookup(ZIP_CODE_NOT_FOUND, Some(e)))?
                .ok_or_else(|| AppError::lookup(ZIP_CODE_NOT_FOUND, None))?;
            ActionOutput::PostalCode(postal_code)
        }
    };

    Ok(Json(Envelope::success(output)))
}

/// Body of `POST /api/rpc`.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub action: String,
    #[serde(default)]
    pub params: Value,
}

/// Run any named action.
///
/// The body is parsed by hand so that malformed JSON also gets an error
/// envelope instead of axum's plain-text rejection.
async fn rpc(State(state): State<AppState>, body: Bytes) -> Result<ApiResponse, AppError> {
    let request: RpcRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;
    let action = ApiAction::parse(&request.action, request.params)?;
    dispatch(&state, action).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_defaults_list_params() {
        let action = ApiAction::parse("getCustomersPaginated", Value::Null).unwrap();
        let ApiAction::GetCustomersPaginated(params) = action else {
            panic!("wrong action");
        };
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn test_parse_update_flattens_fields() {
        let action = ApiAction::parse(
            "updateCustomer",
            json!({ "id": "c-1", "status": "active", "zipCode": "1000005" }),
        )
        .unwrap();
        let ApiAction::UpdateCustomer(params) = action else {
            panic!("wrong action");
        };
        assert_eq!(params.id, "c-1");
        assert_eq!(params.input.status.as_deref(), Some("active"));
        assert_eq!(params.input.zip_code.as_deref(), Some("1000005"));
        assert_eq!(params.input.name, None);
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = ApiAction::parse("deleteCustomer", json!({ "id": "c-1" })).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_missing_required_param() {
        let err = ApiAction::parse("getCustomerById", json!({})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_customer_list_shape() {
        let list = CustomerList {
            customers: Vec::new(),
            total: 3,
            page: 2,
            page_size: 5,
        };
        let value = serde_json::to_value(ActionOutput::CustomerList(list)).unwrap();
        assert_eq!(
            value,
            json!({ "customers": [], "total": 3, "page": 2, "pageSize": 5 })
        );
    }
}
