//! Socket listener for widget deliveries.
//!
//! Each connection carries one newline-terminated [`DeliveryRequest`]. The
//! relay never writes a response: the widget has already returned by the
//! time the line is read, and its next refresh reads the published snapshot.

use std::io::Read;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use habit_widget_protocol::{parse_delivery, DeliveryRequest, ErrorInfo, MAX_REQUEST_BYTES};
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};
use crate::relay::MutationRelay;

const READ_TIMEOUT_SECS: u64 = 2;
const READ_CHUNK_SIZE: usize = 4096;

pub fn bind(socket_path: &Path) -> Result<UnixListener> {
    if let Some(parent) = socket_path.parent() {
        fs_err::create_dir_all(parent).map_err(|e| RelayError::Io {
            context: format!("creating socket directory {}", parent.display()),
            source: e,
        })?;
    }
    if socket_path.exists() {
        fs_err::remove_file(socket_path).map_err(|e| RelayError::Io {
            context: "removing stale socket".to_string(),
            source: e,
        })?;
    }
    UnixListener::bind(socket_path).map_err(|e| RelayError::Io {
        context: format!("binding {}", socket_path.display()),
        source: e,
    })
}

/// Accepts connections until the listener fails. Deliveries are handled on
/// their own threads; the relay's lock serializes the mutations.
pub fn serve(listener: UnixListener, relay: Arc<MutationRelay>, app_group: String) {
    let app_group = Arc::new(app_group);
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let relay = Arc::clone(&relay);
                let app_group = Arc::clone(&app_group);
                thread::spawn(move || handle_connection(stream, &relay, &app_group));
            }
            Err(err) => {
                warn!(error = %err, "Failed to accept relay connection");
            }
        }
    }
}

fn handle_connection(mut stream: UnixStream, relay: &MutationRelay, app_group: &str) {
    let request = match read_request(&mut stream) {
        Ok(request) => request,
        Err(err) => {
            warn!(code = %err.code, message = %err.message, "Dropped delivery");
            return;
        }
    };

    if let Err(err) = handle_delivery(&request, relay, app_group) {
        warn!(request_id = %request.request_id, error = %err, "Delivery not applied");
    }
}

fn handle_delivery(request: &DeliveryRequest, relay: &MutationRelay, app_group: &str) -> Result<()> {
    if request.app_group != app_group {
        return Err(ErrorInfo::new(
            "app_group_mismatch",
            format!("expected {}, got {}", app_group, request.app_group),
        )
        .into());
    }

    let intent = request.intent()?;
    debug!(request_id = %request.request_id, url = %request.url, "Delivery received");
    let outcome = relay.apply(&intent)?;
    info!(request_id = %request.request_id, outcome = ?outcome, "Delivery applied");
    Ok(())
}

fn read_request(stream: &mut UnixStream) -> std::result::Result<DeliveryRequest, ErrorInfo> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(READ_TIMEOUT_SECS)));

    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if buffer.len() > MAX_REQUEST_BYTES {
                    return Err(ErrorInfo::new(
                        "request_too_large",
                        "request exceeded maximum size",
                    ));
                }
                if chunk[..n].contains(&b'\n') {
                    break;
                }
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                return Err(ErrorInfo::new("read_timeout", "request timed out"));
            }
            Err(err) => {
                return Err(ErrorInfo::new(
                    "read_error",
                    format!("failed to read request: {}", err),
                ));
            }
        }
    }

    let line = match buffer.iter().position(|b| *b == b'\n') {
        Some(index) => &buffer[..index],
        None => buffer.as_slice(),
    };

    if line.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ErrorInfo::new("empty_request", "request body was empty"));
    }

    parse_delivery(line)
}
