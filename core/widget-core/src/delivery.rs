//! Socket delivery of intents to the relay.
//!
//! One connection per intent, one newline-terminated JSON line, then the
//! connection is dropped. No response is read and nothing is retried: the
//! widget's activation may be cut short at any moment, and a missed intent
//! is an accepted inconsistency until the next publish.

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use habit_widget_protocol::{DeliveryRequest, MAX_REQUEST_BYTES, PROTOCOL_VERSION};

use crate::dispatch::BackgroundDelivery;
use crate::error::{Result, WidgetError};

const WRITE_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct SocketDelivery {
    socket_path: PathBuf,
}

impl SocketDelivery {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    fn io_error(&self, context: &str, source: std::io::Error) -> WidgetError {
        WidgetError::Io {
            context: format!("{}: {}", context, self.socket_path.display()),
            source,
        }
    }
}

impl BackgroundDelivery for SocketDelivery {
    fn submit(&self, url: &str, app_group: &str) -> Result<()> {
        let request = build_request(url, app_group);
        request
            .validate()
            .map_err(|err| WidgetError::InvalidDelivery {
                code: err.code,
                message: err.message,
            })?;

        let mut line = serde_json::to_vec(&request).map_err(|source| WidgetError::Json {
            context: "serialize delivery request".to_string(),
            source,
        })?;
        line.push(b'\n');
        if line.len() > MAX_REQUEST_BYTES {
            return Err(WidgetError::InvalidDelivery {
                code: "request_too_large".to_string(),
                message: "delivery request exceeded maximum size".to_string(),
            });
        }

        let mut stream = UnixStream::connect(&self.socket_path)
            .map_err(|source| self.io_error("connect to relay socket", source))?;
        let _ = stream.set_write_timeout(Some(Duration::from_millis(WRITE_TIMEOUT_MS)));
        stream
            .write_all(&line)
            .map_err(|source| self.io_error("write delivery request", source))?;
        stream.flush().ok();

        tracing::debug!(request_id = %request.request_id, "Delivery request written");
        Ok(())
    }
}

fn build_request(url: &str, app_group: &str) -> DeliveryRequest {
    DeliveryRequest {
        protocol_version: PROTOCOL_VERSION,
        request_id: format!("dlv-{}", ulid::Ulid::new()),
        sent_at: Utc::now().to_rfc3339(),
        app_group: app_group.to_string(),
        url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_widget_protocol::{parse_delivery, Intent};
    use std::io::{BufRead, BufReader};
    use std::os::unix::net::UnixListener;
    use tempfile::TempDir;

    #[test]
    fn test_submit_writes_one_request_line() {
        let temp = TempDir::new().unwrap();
        let socket = temp.path().join("relay.sock");
        let listener = UnixListener::bind(&socket).unwrap();

        let delivery = SocketDelivery::new(&socket);
        delivery
            .submit("habitWidget://complete?id=habit-1", "group.test")
            .unwrap();

        let (stream, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).unwrap();

        let request = parse_delivery(line.trim_end().as_bytes()).unwrap();
        assert_eq!(request.app_group, "group.test");
        assert!(request.request_id.starts_with("dlv-"));
        assert_eq!(request.intent().unwrap(), Intent::complete("habit-1"));
    }

    #[test]
    fn test_submit_without_listener_fails_fast() {
        let temp = TempDir::new().unwrap();
        let delivery = SocketDelivery::new(temp.path().join("missing.sock"));

        let result = delivery.submit("habitWidget://complete?id=habit-1", "group.test");

        assert!(matches!(result, Err(WidgetError::Io { .. })));
    }

    #[test]
    fn test_submit_rejects_empty_app_group() {
        let temp = TempDir::new().unwrap();
        let delivery = SocketDelivery::new(temp.path().join("relay.sock"));

        let result = delivery.submit("habitWidget://complete?id=habit-1", "");

        assert!(matches!(
            result,
            Err(WidgetError::InvalidDelivery { ref code, .. }) if code == "invalid_app_group"
        ));
    }
}
