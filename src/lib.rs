//! Ticket status lookup service.
//!
//! Exposes a single `POST /api/ticket-status` endpoint that finds a ticket in
//! HubSpot by its `ticket_id` property and returns a flattened status.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

pub use handlers::{AppState, router};
