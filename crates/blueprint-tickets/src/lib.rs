//! Ticket ingestion for the Blueprint LSP.
//!
//! Requirements track implementation progress through sibling
//! `<basename>.tickets.json` files. This crate parses and validates those
//! files leniently (one bad ticket never discards its siblings), records
//! each ticket's byte span for navigation, and maintains the workspace-wide
//! requirement → tickets map.
//!
//! Status derivation from tickets lives in `blueprint-analysis`; this crate
//! only stores what the files say.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod parse;
mod store;
mod ticket;

pub use parse::{SUPPORTED_VERSION, parse_ticket_file, scan_ticket_object_spans};
pub use store::{DEFAULT_TICKETS_PATH, TicketStore, is_ticket_file, ticket_file_for};
pub use ticket::{
    IssueSeverity, Ticket, TicketFile, TicketImplementation, TicketIssue, TicketStatus,
};
