//! Document and server state management.

mod config;
mod document;
mod server_state;

pub use config::{ServerConfig, TraceLevel};
pub use document::DocumentState;
pub use server_state::ServerState;
