//! Customer REST handlers.
//!
//! Thin wrappers that turn path, query and body into an [`ApiAction`] and
//! hand it to [`dispatch`].

use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};

use crm_core::CustomerInput;

use super::actions::{
    ApiAction, ApiResponse, IdParams, ListParams, SearchParams, UpdateParams, dispatch,
};
use crate::{error::AppError, state::AppState};

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/search", get(search))
        .route("/api/customers/{id}", get(show).put(update))
}

/// Extract a query string, reporting failures as an error envelope.
pub(super) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn customer_input(body: &[u8]) -> Result<CustomerInput, AppError> {
    if body.is_empty() {
        return Ok(CustomerInput::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid customer: {e}")))
}

/// `GET /api/customers?page=&pageSize=`
async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let params = query_params(query)?;
    dispatch(&state, ApiAction::GetCustomersPaginated(params)).await
}

/// `GET /api/customers/search?query=`
async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let params = query_params(query)?;
    dispatch(&state, ApiAction::SearchCustomers(params)).await
}

/// `GET /api/customers/{id}`
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    dispatch(&state, ApiAction::GetCustomerById(IdParams { id })).await
}

/// `POST /api/customers`
async fn create(State(state): State<AppState>, body: Bytes) -> Result<ApiResponse, AppError> {
    let input = customer_input(&body)?;
    dispatch(&state, ApiAction::CreateCustomer(input)).await
}

/// `PUT /api/customers/{id}`
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse, AppError> {
    let input = customer_input(&body)?;
    dispatch(&state, ApiAction::UpdateCustomer(UpdateParams { id, input })).await
}
