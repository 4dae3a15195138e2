//! Unified error handling for the API boundary.
//!
//! Every failure leaves the server as an error envelope
//! (`{"status": "error", "message": ...}`), never as a bare status or a
//! plain-text body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::envelope::Envelope;
use crate::services::{ErrorKind, ServiceError};

/// Application-level error type for API handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// An address lookup failed or found nothing.
    ///
    /// The client sees `message` whatever the cause; `cause` decides the
    /// status code and is logged.
    #[error("{message}")]
    Lookup {
        message: &'static str,
        cause: Option<ServiceError>,
    },

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// Lookup error for `message`, caused by `cause` (or by an empty result
    /// when `None`).
    #[must_use]
    pub const fn lookup(message: &'static str, cause: Option<ServiceError>) -> Self {
        Self::Lookup { message, cause }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(err) | Self::Lookup { cause: Some(err), .. } => kind_status(err.kind()),
            Self::Lookup { cause: None, .. } | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Service(ServiceError::Storage(_)))
    }

    /// Message shown to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Service(ServiceError::Storage(_)) => "Internal server error".to_string(),
            Self::Service(ServiceError::IntegrationFailure(_)) => {
                "External service error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

const fn kind_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::IntegrationFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Misconfigured => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Lookup {
            cause: Some(cause), ..
        } = &self
        {
            tracing::warn!(kind = %cause.kind(), error = %cause, "Address lookup failed");
        }

        let status = self.status_code();
        (status, Json(Envelope::<()>::error(self.public_message()))).into_response()
    }
}
