use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info};

use super::ticketsystem::{SearchOutcome, TicketProperties, TicketSystem};
use crate::config::HubSpotConfig;

const TICKET_SEARCH_PATH: &str = "/crm/v3/objects/tickets/search";

/// Ticket properties requested from HubSpot and promoted into the response.
pub const TICKET_PROPERTIES: [&str; 4] = [
    "ticket_id",
    "customer_ticket_stage",
    "customer_ticket_description",
    "customer_ticket_outlook",
];

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketSearchRequest {
    filter_groups: Vec<FilterGroup>,
    properties: Vec<String>,
    limit: u32,
}

#[derive(Debug, Serialize, PartialEq)]
struct FilterGroup {
    filters: Vec<Filter>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Filter {
    property_name: String,
    operator: FilterOperator,
    value: String,
}

#[derive(Debug, Serialize, PartialEq)]
enum FilterOperator {
    #[serde(rename = "EQ")]
    Eq,
}

impl TicketSearchRequest {
    pub fn by_ticket_id(ticket_id: &str) -> Self {
        Self {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: "ticket_id".to_string(),
                    operator: FilterOperator::Eq,
                    value: ticket_id.to_string(),
                }],
            }],
            properties: TICKET_PROPERTIES.iter().map(|p| p.to_string()).collect(),
            limit: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketSearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Option<Vec<TicketSearchResult>>,
}

#[derive(Debug, Deserialize)]
pub struct TicketSearchResult {
    pub properties: TicketProperties,
}

impl TicketSearchResponse {
    pub fn into_outcome(self) -> Result<SearchOutcome> {
        match self.total {
            None | Some(0) => Ok(SearchOutcome::NotFound),
            Some(total) => {
                let first = self.results.unwrap_or_default().into_iter().next().with_context(|| {
                    format!("HubSpot reported {total} matches but returned no results")
                })?;
                Ok(SearchOutcome::Found(first.properties))
            }
        }
    }
}

/// Best-effort decoding of an upstream error body.
pub fn parse_error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// Client for HubSpot's CRM ticket search.
///
/// No request timeout is configured; a hanging upstream holds the request.
#[derive(Debug, Clone)]
pub struct HubSpotClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl HubSpotClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// `None` when no private app token is configured.
    pub fn from_config(config: &HubSpotConfig) -> Option<Self> {
        config
            .token
            .as_ref()
            .map(|token| Self::new(config.endpoint.clone(), token.clone()))
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.endpoint, TICKET_SEARCH_PATH)
    }
}

#[async_trait]
impl TicketSystem for HubSpotClient {
    fn name(&self) -> &'static str {
        "HubSpot"
    }

    async fn search_ticket(&self, ticket_id: &str) -> Result<SearchOutcome> {
        let url = self.search_url();
        let request = TicketSearchRequest::by_ticket_id(ticket_id);

        info!("HubSpot Request URL: {}", url);
        debug!("HubSpot Request: {}", serde_json::to_string(&request)?);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .context("failed to send request to HubSpot API")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read HubSpot response body")?;

        if !status.is_success() {
            error!(%status, "HubSpot error: {}", text);
            return Ok(SearchOutcome::Rejected {
                status,
                body: parse_error_body(&text),
            });
        }

        debug!("HubSpot Response: {}", text);

        let resp: TicketSearchResponse = {
            let mut deserializer = serde_json::Deserializer::from_str(&text);
            serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|e| anyhow::anyhow!("Failed to parse HubSpot response: {}", e))?
        };

        info!(total = ?resp.total, "HubSpot search finished");
        resp.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_payload_has_fixed_shape() {
        let payload = serde_json::to_value(TicketSearchRequest::by_ticket_id("123")).unwrap();
        assert_eq!(
            payload,
            json!({
                "filterGroups": [{
                    "filters": [{
                        "propertyName": "ticket_id",
                        "operator": "EQ",
                        "value": "123"
                    }]
                }],
                "properties": [
                    "ticket_id",
                    "customer_ticket_stage",
                    "customer_ticket_description",
                    "customer_ticket_outlook"
                ],
                "limit": 1
            })
        );
    }

    #[test]
    fn zero_or_missing_total_is_not_found() {
        let resp: TicketSearchResponse = serde_json::from_value(json!({ "total": 0, "results": [] })).unwrap();
        assert_eq!(resp.into_outcome().unwrap(), SearchOutcome::NotFound);

        let resp: TicketSearchResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(resp.into_outcome().unwrap(), SearchOutcome::NotFound);

        let resp: TicketSearchResponse =
            serde_json::from_value(json!({ "total": 0, "results": null })).unwrap();
        assert_eq!(resp.into_outcome().unwrap(), SearchOutcome::NotFound);
    }

    #[test]
    fn first_result_wins() {
        let resp: TicketSearchResponse = serde_json::from_value(json!({
            "total": 2,
            "results": [
                { "id": "1", "properties": { "ticket_id": "a" } },
                { "id": "2", "properties": { "ticket_id": "b" } }
            ]
        }))
        .unwrap();

        match resp.into_outcome().unwrap() {
            SearchOutcome::Found(properties) => assert_eq!(properties["ticket_id"], "a"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn positive_total_without_results_is_an_error() {
        let resp: TicketSearchResponse = serde_json::from_value(json!({ "total": 1, "results": [] })).unwrap();
        assert!(resp.into_outcome().is_err());

        let resp: TicketSearchResponse =
            serde_json::from_value(json!({ "total": 1, "results": null })).unwrap();
        assert!(resp.into_outcome().is_err());
    }

    #[test]
    fn error_body_falls_back_to_raw_text() {
        assert_eq!(
            parse_error_body(r#"{"message":"bad token"}"#),
            json!({ "message": "bad token" })
        );
        assert_eq!(parse_error_body("Bad Gateway"), json!({ "raw": "Bad Gateway" }));
        assert_eq!(parse_error_body(""), json!({ "raw": "" }));
    }

    #[test]
    fn client_requires_a_token() {
        let mut config = HubSpotConfig::default();
        assert!(HubSpotClient::from_config(&config).is_none());

        config.token = Some("pat".to_string());
        let client = HubSpotClient::from_config(&config).unwrap();
        assert_eq!(
            client.search_url(),
            "https://api.hubapi.com/crm/v3/objects/tickets/search"
        );
    }
}
