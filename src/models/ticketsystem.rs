use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{Map, Value};

/// Raw property bag of a matched ticket, as returned by the upstream system.
pub type TicketProperties = Map<String, Value>;

/// Result of a single ticket search that reached the upstream system.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(TicketProperties),
    NotFound,
    /// The upstream answered with a non-success status.
    Rejected { status: StatusCode, body: Value },
}

/// Trait defining the behavior of a ticket system
#[async_trait]
pub trait TicketSystem: Send + Sync {
    /// Get the name of the ticket system
    fn name(&self) -> &'static str;

    /// Look up a single ticket by its `ticket_id` property.
    ///
    /// Transport failures and unreadable responses are returned as `Err`;
    /// upstream rejections are an ordinary [`SearchOutcome::Rejected`].
    async fn search_ticket(&self, ticket_id: &str) -> anyhow::Result<SearchOutcome>;
}
