//! Shared helpers for protocol integration tests.

#![allow(dead_code)]

use portaria_core::{Side, SiteId, TagId};
use portaria_protocol::AuthorizationRequest;

pub fn tag(hex: &str) -> TagId {
    TagId::new(hex).unwrap()
}

pub fn site() -> SiteId {
    SiteId::new("corredor").unwrap()
}

pub fn unlock_request(hex: &str, side: Side) -> AuthorizationRequest {
    AuthorizationRequest::Unlock {
        tag_id: tag(hex),
        site_id: site(),
        side,
    }
}

/// HTTP/1.1 success response with `Content-Length`.
pub fn ok_response(status: i64) -> Vec<u8> {
    let body = format!("{{\"status\":{status}}}");
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}

/// Split raw request bytes into head and body at the blank line.
pub fn split_request(raw: &[u8]) -> (String, String) {
    let text = String::from_utf8(raw.to_vec()).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    (head.to_string(), body.to_string())
}
