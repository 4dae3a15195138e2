//! Address lookup REST handlers.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};

use super::actions::{AddressParams, ApiAction, ApiResponse, ZipCodeParams, dispatch};
use super::customers::query_params;
use crate::{error::AppError, state::AppState};

/// Build the address router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/address/by-zip", get(by_zip_code))
        .route("/api/address/zip-code", get(zip_code))
}

/// `GET /api/address/by-zip?zipCode=`
async fn by_zip_code(
    State(state): State<AppState>,
    query: Result<Query<ZipCodeParams>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let params = query_params(query)?;
    dispatch(&state, ApiAction::GetAddressByZipCode(params)).await
}

/// `GET /api/address/zip-code?prefecture=&city=&address1=`
async fn zip_code(
    State(state): State<AppState>,
    query: Result<Query<AddressParams>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let params = query_params(query)?;
    dispatch(&state, ApiAction::GetZipCodeByAddress(params)).await
}
