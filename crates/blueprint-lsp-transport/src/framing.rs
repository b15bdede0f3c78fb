//! Message framing for the LSP Base Protocol.

use blueprint_lsp_protocol::{JsonRpcRequest, JsonRpcResponse};
use std::io::{self, BufRead, Write};

/// Reads the next well-formed LSP message.
///
/// Malformed frames (bad headers, invalid JSON) are reported to stderr and
/// skipped; the server never tears down over one bad frame. Returns
/// `Ok(None)` only at end of input.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<JsonRpcRequest>> {
    loop {
        let mut content_length: Option<usize> = None;

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(None); // EOF
            }
            let line = line.trim_end();
            if line.is_empty() {
                break; // end of headers
            }
            if let Some((key, value)) = line.split_once(": ") {
                if key.eq_ignore_ascii_case("Content-Length") {
                    content_length = value.parse().ok();
                }
            }
        }

        let Some(length) = content_length else {
            eprintln!("[blueprint-lsp] frame without Content-Length header");
            continue;
        };

        let mut content = vec![0u8; length];
        let mut read = 0;
        while read < length {
            let n = reader.read(&mut content[read..])?;
            if n == 0 {
                return Ok(None); // unexpected EOF mid-frame
            }
            read += n;
        }

        match serde_json::from_slice(&content) {
            Ok(request) => return Ok(Some(request)),
            Err(err) => {
                let preview: String =
                    String::from_utf8_lossy(&content).chars().take(100).collect();
                eprintln!("[blueprint-lsp] malformed frame ({err}): {preview}");
            }
        }
    }
}

/// Writes one framed response.
pub fn write_message<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let content = serde_json::to_string(response)?;
    write!(writer, "Content-Length: {}\r\n\r\n{content}", content.len())?;
    writer.flush()
}

/// Writes one framed server-to-client notification.
pub fn write_notification<W: Write>(
    writer: &mut W,
    method: &str,
    params: serde_json::Value,
) -> io::Result<()> {
    let notification = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    });
    let content = serde_json::to_string(&notification)?;
    write!(writer, "Content-Length: {}\r\n\r\n{content}", content.len())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::BufReader;

    fn frame(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{body}", body.len()).into_bytes()
    }

    #[test]
    fn test_read_round_trip() {
        let body = r#"{"jsonrpc":"2.0","id":1,"method":"shutdown","params":null}"#;
        let data = frame(body);
        let mut reader = BufReader::new(data.as_slice());
        let request = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(request.method, "shutdown");
        assert_eq!(request.id, Some(json!(1)));
    }

    #[test]
    fn test_eof_returns_none() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_malformed_json_is_recoverable() {
        let data = frame("{ not json");
        let mut reader = BufReader::new(data.as_slice());
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_write_message_frames() {
        let mut out = Vec::new();
        let response = JsonRpcResponse::null(Some(json!(7)));
        write_message(&mut out, &response).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Content-Length: "));
        assert!(text.contains("\r\n\r\n{"));
    }

    #[test]
    fn test_header_case_insensitive() {
        let body = r#"{"jsonrpc":"2.0","method":"initialized"}"#;
        let data = format!("content-length: {}\r\n\r\n{body}", body.len());
        let mut reader = BufReader::new(data.as_bytes());
        let request = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(request.method, "initialized");
    }
}
