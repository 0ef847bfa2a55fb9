use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    routing::any,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::hubspot::HubSpotClient;
use crate::models::ticket_request::{extract_ticket_id, parse_body};
use crate::models::ticket_status::TicketStatus;
use crate::models::ticketsystem::{SearchOutcome, TicketSystem};

pub const TICKET_STATUS_PATH: &str = "/api/ticket-status";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared, read-only state for every request.
pub struct AppState {
    pub inbound_api_key: Option<String>,
    /// `None` when no upstream credential is configured.
    pub ticket_system: Option<Arc<dyn TicketSystem>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            inbound_api_key: config.inbound_api_key.clone(),
            ticket_system: HubSpotClient::from_config(&config.hubspot)
                .map(|client| Arc::new(client) as Arc<dyn TicketSystem>),
        }
    }
}

/// Every method is routed to the handler so that non-POST requests get the
/// JSON 405 instead of axum's empty one.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(TICKET_STATUS_PATH, any(ticket_status))
        .with_state(state)
}

#[tracing::instrument(
    skip_all,
    fields(request_id = %uuid::Uuid::new_v4(), ticket_id = tracing::field::Empty)
)]
pub async fn ticket_status(
    method: Method,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<TicketStatus>), ApiError> {
    if method != Method::POST {
        warn!(%method, "rejecting request with unsupported method");
        return Err(ApiError::MethodNotAllowed);
    }

    if let Some(expected) = &state.inbound_api_key {
        let incoming = headers.get(API_KEY_HEADER).map(|v| v.as_bytes());
        if incoming != Some(expected.as_bytes()) {
            warn!("rejecting request with missing or wrong {}", API_KEY_HEADER);
            return Err(ApiError::Unauthorized);
        }
    }

    let payload = parse_body(&body).map_err(|e| {
        warn!(error = %e, "request body is not valid JSON");
        ApiError::InvalidJsonBody
    })?;

    let Some(ticket_id) = extract_ticket_id(&payload) else {
        let body = Value::Object(payload);
        warn!(%body, "ticket_id missing from request body");
        return Err(ApiError::MissingTicketId);
    };
    tracing::Span::current().record("ticket_id", ticket_id.as_str());

    let Some(ticket_system) = &state.ticket_system else {
        error!("no HubSpot private app token configured");
        return Err(ApiError::MissingToken);
    };

    info!("looking up ticket in {}", ticket_system.name());

    match ticket_system.search_ticket(&ticket_id).await? {
        SearchOutcome::Found(properties) => Ok((
            StatusCode::OK,
            Json(TicketStatus::from_properties(&properties)),
        )),
        SearchOutcome::NotFound => {
            info!("no matching ticket");
            Ok((StatusCode::NOT_FOUND, Json(TicketStatus::not_found())))
        }
        SearchOutcome::Rejected { status, body } => Err(ApiError::Upstream { status, body }),
    }
}
