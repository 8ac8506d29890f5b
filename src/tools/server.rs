//! Line-oriented tool server over stdin/stdout.
//!
//! Requests are handled one at a time in arrival order. A bad line gets an
//! error response and the loop carries on; only I/O failure on the streams
//! ends it.
//!
//! CHANGELOG:
//! - 01/30/2026 - Initial implementation

use anyhow::Result;
use std::io::{BufRead, Write};
use std::time::Instant;

use crate::tools::dispatch::ToolService;
use crate::tools::protocol::{self, Request, Response, INVALID_JSON, PROTOCOL_VERSION, UNSUPPORTED_VERSION};

pub struct ToolServer {
    service: ToolService,
}

impl ToolServer {
    pub fn new(service: ToolService) -> Self {
        Self { service }
    }

    /// Serve stdin/stdout until stdin closes.
    pub fn serve_stdio(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve requests from `reader`, writing one response line per request.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        tracing::info!("tool server ready");
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line);
            writer.write_all(response.to_ndjson_line()?.as_bytes())?;
            writer.flush()?;
        }
        tracing::info!("stdin closed; shutting down");
        Ok(())
    }

    fn handle_line(&self, line: &str) -> Response {
        let start = Instant::now();
        let elapsed_ms = || start.elapsed().as_secs_f64() * 1000.0;

        let request = match Request::from_ndjson_line(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed request");
                return Response::error(String::new(), INVALID_JSON, format!("{:#}", e), elapsed_ms());
            }
        };

        if request.v != PROTOCOL_VERSION {
            return Response::error(
                request.id,
                UNSUPPORTED_VERSION,
                format!("unsupported protocol version {}", request.v),
                elapsed_ms(),
            );
        }

        match self.service.dispatch(&request.method, &request.params) {
            Ok(result) => protocol::Response::success(request.id, result, elapsed_ms()),
            Err(e) => {
                tracing::debug!(method = %request.method, code = e.code, "request failed");
                protocol::Response::error(request.id, e.code, e.message, elapsed_ms())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{seeded, service, ALICE};
    use serde_json::Value;

    fn run(fx: &crate::db::fixtures::Fixture, input: &str) -> Vec<Value> {
        let server = ToolServer::new(ToolService::new(service(fx)));
        let mut out = Vec::new();
        server.serve(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_one_response_per_request_in_order() {
        let fx = seeded();
        let input = format!(
            "{}\n\n{}\n",
            r#"{"id":"1","v":1,"method":"health","params":{}}"#,
            serde_json::json!({"id": "2", "method": "get_chat", "params": {"chat_jid": ALICE}})
        );
        let responses = run(&fx, &input);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], "1");
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[1]["id"], "2");
        assert_eq!(responses[1]["result"]["name"], "Alice");
    }

    #[test]
    fn test_malformed_line_does_not_stop_server() {
        let fx = seeded();
        let input = "this is not json\n{\"id\":\"9\",\"method\":\"health\"}\n";
        let responses = run(&fx, input);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["ok"], false);
        assert_eq!(responses[0]["error"]["code"], "INVALID_JSON");
        assert_eq!(responses[1]["ok"], true);
    }

    #[test]
    fn test_error_codes_reach_the_wire() {
        let fx = seeded();
        let input = concat!(
            r#"{"id":"a","method":"fly"}"#,
            "\n",
            r#"{"id":"b","v":2,"method":"health"}"#,
            "\n",
            r#"{"id":"c","method":"get_message_context","params":{"message_id":"missing"}}"#,
            "\n",
        );
        let responses = run(&fx, input);
        assert_eq!(responses[0]["error"]["code"], "UNKNOWN_METHOD");
        assert_eq!(responses[1]["error"]["code"], "UNSUPPORTED_VERSION");
        assert_eq!(responses[2]["error"]["code"], "NOT_FOUND");
    }
}
