//! Server configuration management.
//!
//! Runtime configuration recognized by the core. Editor-side options
//! (hover delay, gutter rendering, highlight colors) are consumed by the
//! client and never reach the server.

use blueprint_tickets::DEFAULT_TICKETS_PATH;

/// Verbosity of stderr trace logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceLevel {
    /// No tracing
    #[default]
    Off,
    /// One line per message
    Messages,
    /// Messages plus payload sizes and timings
    Verbose,
}

impl TraceLevel {
    /// Parses the LSP `trace` value; unknown strings mean `Off`.
    pub fn parse(s: &str) -> Self {
        match s {
            "messages" => TraceLevel::Messages,
            "verbose" => TraceLevel::Verbose,
            _ => TraceLevel::Off,
        }
    }
}

/// Server configuration.
///
/// Updated dynamically via `workspace/didChangeConfiguration`; unknown
/// fields are ignored.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Workspace-relative directory holding `.tickets.json` files.
    pub tickets_path: String,
    /// Trace verbosity for stderr logging.
    pub trace: TraceLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { tickets_path: DEFAULT_TICKETS_PATH.to_string(), trace: TraceLevel::Off }
    }
}

impl ServerConfig {
    /// Applies a settings payload.
    ///
    /// Accepts both a bare settings object and one nested under a
    /// `blueprint` key, which is how clients commonly scope their section.
    pub fn update_from_value(&mut self, settings: &serde_json::Value) {
        let scoped = settings.get("blueprint").unwrap_or(settings);

        if let Some(path) = scoped.get("ticketsPath").and_then(|v| v.as_str()) {
            if !path.is_empty() {
                self.tickets_path = path.to_string();
            }
        }
        if let Some(trace) = scoped
            .get("trace")
            .and_then(|t| t.get("server"))
            .and_then(|v| v.as_str())
            .or_else(|| scoped.get("trace.server").and_then(|v| v.as_str()))
        {
            self.trace = TraceLevel::parse(trace);
        }
    }
}
