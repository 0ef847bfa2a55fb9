use serde::Serialize;
use serde_json::Value;

use super::ticketsystem::TicketProperties;

/// Flattened lookup result returned to callers.
///
/// Property values are passed through untouched. A property missing upstream
/// is left out of the JSON; an explicit `null` is kept.
#[derive(Debug, Serialize, PartialEq)]
pub struct TicketStatus {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_ticket_stage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_ticket_description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_ticket_outlook: Option<Value>,
}

impl TicketStatus {
    pub fn not_found() -> Self {
        Self {
            found: false,
            ticket_id: None,
            customer_ticket_stage: None,
            customer_ticket_description: None,
            customer_ticket_outlook: None,
        }
    }

    pub fn from_properties(properties: &TicketProperties) -> Self {
        Self {
            found: true,
            ticket_id: properties.get("ticket_id").cloned(),
            customer_ticket_stage: properties.get("customer_ticket_stage").cloned(),
            customer_ticket_description: properties.get("customer_ticket_description").cloned(),
            customer_ticket_outlook: properties.get("customer_ticket_outlook").cloned(),
        }
    }
}
