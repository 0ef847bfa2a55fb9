pub mod hubspot;
pub mod ticket_request;
pub mod ticket_status;
pub mod ticketsystem;
