//! Lenient ticket file parsing and validation.
//!
//! Ticket files are small hand-edited JSON documents; a single bad ticket
//! must not take down the rest of the file. Parsing therefore walks the
//! JSON value manually, records a [`TicketIssue`] with a dotted JSON path
//! for every violation, and keeps every ticket that validates.

use crate::{IssueSeverity, Ticket, TicketFile, TicketImplementation, TicketIssue, TicketStatus};
use blueprint_position_tracking::{ByteSpan, LineIndex, SourceLocation};
use serde_json::Value;
use std::collections::HashMap;

/// The format version this server understands.
pub const SUPPORTED_VERSION: &str = "1.0";

/// Parses and validates one ticket file.
///
/// A JSON parse failure yields an empty ticket list plus one file-level
/// issue; everything else degrades per element.
pub fn parse_ticket_file(path: &str, text: &str) -> TicketFile {
    let mut file = TicketFile { path: path.to_string(), ..Default::default() };

    let root: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            file.issues.push(TicketIssue::error("", format!("invalid JSON: {err}")));
            return file;
        }
    };
    let Some(object) = root.as_object() else {
        file.issues.push(TicketIssue::error("", "ticket file must be a JSON object"));
        return file;
    };

    match object.get("version") {
        Some(Value::String(version)) => {
            file.version = version.clone();
            if version != SUPPORTED_VERSION {
                file.issues.push(TicketIssue::warning(
                    "version",
                    format!("unknown version {version:?}; expected {SUPPORTED_VERSION:?}"),
                ));
            }
        }
        Some(_) => file.issues.push(TicketIssue::error("version", "version must be a string")),
        None => file.issues.push(TicketIssue::error("version", "missing required field")),
    }

    match object.get("source") {
        Some(Value::String(source)) => file.source = source.clone(),
        Some(_) => file.issues.push(TicketIssue::error("source", "source must be a string")),
        None => file.issues.push(TicketIssue::error("source", "missing required field")),
    }

    let spans = scan_ticket_object_spans(text);
    let line_index = LineIndex::new(text);
    let whole_file = line_index.locate(text, ByteSpan::new(0, text.len()));

    match object.get("tickets") {
        Some(Value::Array(entries)) => {
            // The span scanner only sees `{…}` objects, so non-object array
            // entries must not consume a span slot.
            let mut span_cursor = 0;
            for (i, entry) in entries.iter().enumerate() {
                let mut location = whole_file;
                if entry.is_object() {
                    if let Some(&span) = spans.get(span_cursor) {
                        location = line_index.locate(text, span);
                    }
                    span_cursor += 1;
                }
                if let Some(mut ticket) = validate_ticket(entry, i, &mut file.issues) {
                    ticket.location = location;
                    file.tickets.push(ticket);
                }
            }
        }
        Some(_) => file.issues.push(TicketIssue::error("tickets", "tickets must be an array")),
        None => file.issues.push(TicketIssue::error("tickets", "missing required field")),
    }

    check_duplicate_ids(&file.tickets, &mut file.issues);
    file
}

fn validate_ticket(entry: &Value, index: usize, issues: &mut Vec<TicketIssue>) -> Option<Ticket> {
    let base = format!("tickets[{index}]");
    let Some(object) = entry.as_object() else {
        issues.push(TicketIssue::error(base, "ticket must be an object"));
        return None;
    };

    let mut valid = true;
    let mut required_string = |field: &str| -> String {
        match object.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                issues.push(TicketIssue::error(
                    format!("{base}.{field}"),
                    format!("{field} must be a string"),
                ));
                valid = false;
                String::new()
            }
            None => {
                issues.push(TicketIssue::error(
                    format!("{base}.{field}"),
                    "missing required field",
                ));
                valid = false;
                String::new()
            }
        }
    };

    let id = required_string("id");
    let reference = required_string("ref");
    let description = required_string("description");
    let status_text = required_string("status");

    let status = match TicketStatus::parse(&status_text) {
        Some(status) => status,
        None => {
            if !status_text.is_empty() {
                issues.push(TicketIssue::error(
                    format!("{base}.status"),
                    format!(
                        "unknown status {status_text:?}; expected one of pending, in-progress, complete, obsolete"
                    ),
                ));
            }
            valid = false;
            TicketStatus::Pending
        }
    };

    let mut constraints_satisfied = Vec::new();
    match object.get("constraints_satisfied") {
        Some(Value::Array(items)) => {
            for (j, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => constraints_satisfied.push(s.clone()),
                    _ => issues.push(TicketIssue::error(
                        format!("{base}.constraints_satisfied[{j}]"),
                        "constraint name must be a string",
                    )),
                }
            }
        }
        Some(_) => {
            issues.push(TicketIssue::error(
                format!("{base}.constraints_satisfied"),
                "constraints_satisfied must be an array",
            ));
            valid = false;
        }
        None => {
            issues.push(TicketIssue::error(
                format!("{base}.constraints_satisfied"),
                "missing required field",
            ));
            valid = false;
        }
    }

    let implementation = match object.get("implementation") {
        None | Some(Value::Null) => None,
        Some(Value::Object(_)) => {
            match serde_json::from_value::<TicketImplementation>(
                object.get("implementation").cloned().unwrap_or(Value::Null),
            ) {
                Ok(implementation) => Some(implementation),
                Err(err) => {
                    issues.push(TicketIssue::error(
                        format!("{base}.implementation"),
                        format!("invalid implementation record: {err}"),
                    ));
                    None
                }
            }
        }
        Some(_) => {
            issues.push(TicketIssue::error(
                format!("{base}.implementation"),
                "implementation must be an object",
            ));
            None
        }
    };

    if !valid {
        return None;
    }
    Some(Ticket {
        id,
        reference,
        description,
        status,
        constraints_satisfied,
        implementation,
        location: SourceLocation::default(),
    })
}

fn check_duplicate_ids(tickets: &[Ticket], issues: &mut Vec<TicketIssue>) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, ticket) in tickets.iter().enumerate() {
        match first_seen.get(ticket.id.as_str()) {
            Some(&first) => issues.push(TicketIssue::error(
                format!("tickets[{i}].id"),
                format!("duplicate ticket id {:?} (first declared in tickets[{first}])", ticket.id),
            )),
            None => {
                first_seen.insert(ticket.id.as_str(), i);
            }
        }
    }
}

/// Locates the `{ … }` byte span of each element of the top-level `tickets`
/// array, in order, with string-aware brace matching.
///
/// Used to attach navigable locations to tickets (find-references jumps
/// into ticket files). Returns an empty vector when the array cannot be
/// found textually.
pub fn scan_ticket_object_spans(text: &str) -> Vec<ByteSpan> {
    let bytes = text.as_bytes();
    let Some(key) = text.find("\"tickets\"") else { return Vec::new() };
    let mut pos = key + "\"tickets\"".len();
    while pos < bytes.len() && bytes[pos] != b'[' {
        pos += 1;
    }
    if pos >= bytes.len() {
        return Vec::new();
    }
    pos += 1;

    let mut spans = Vec::new();
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                let start = pos;
                match skip_object(bytes, pos) {
                    Some(end) => {
                        spans.push(ByteSpan::new(start, end));
                        pos = end;
                    }
                    None => break,
                }
            }
            b']' => break,
            _ => pos += 1,
        }
    }
    spans
}

/// Returns the offset one past the matching `}` for the `{` at `start`.
fn skip_object(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = start;
    let mut in_string = false;
    while pos < bytes.len() {
        let b = bytes[pos];
        if in_string {
            match b {
                b'\\' => pos += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(pos + 1);
                    }
                }
                _ => {}
            }
        }
        pos += 1;
    }
    None
}
