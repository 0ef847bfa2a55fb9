use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;
use tracing::error;

/// Every way a ticket lookup can end without a ticket status.
#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    Unauthorized,
    InvalidJsonBody,
    MissingTicketId,
    /// No HubSpot private app token configured.
    MissingToken,
    /// HubSpot answered with a non-success status; mirrored to the caller.
    Upstream { status: StatusCode, body: Value },
    /// Anything else. Logged, never shown to the caller.
    Internal(anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidJsonBody | ApiError::MissingTicketId => StatusCode::BAD_REQUEST,
            ApiError::MissingToken | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { status, .. } => *status,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::InvalidJsonBody => "Invalid JSON body",
            ApiError::MissingTicketId => "ticket_id is required",
            ApiError::MissingToken => "Missing HUBSPOT_PRIVATE_APP_TOKEN env var",
            ApiError::Upstream { .. } => "HubSpot API error",
            ApiError::Internal(_) => "Server error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Upstream { status, .. } => write!(f, "{} ({})", self.message(), status),
            ApiError::Internal(e) => write!(f, "{}: {:#}", self.message(), e),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        let body = match self {
            ApiError::Upstream { body, .. } => json!({
                "error": message,
                "hubspot": body,
            }),
            ApiError::Internal(e) => {
                error!("Middleware error: {:#}", e);
                json!({ "error": message })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
