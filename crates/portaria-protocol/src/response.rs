//! Response parsing.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. status line: `HTTP/1.0` or `HTTP/1.1` followed by a 2xx code
//! 2. header/body boundary (`\r\n\r\n`)
//! 3. JSON body with an integer `status` field
//!
//! These functions operate on complete buffers. [`AuthorizationCodec`]
//! applies the same rules incrementally.
//!
//! [`AuthorizationCodec`]: crate::AuthorizationCodec

use crate::AuthorizationStatus;
use portaria_core::{Error, Result, constants::MAX_STATUS_LINE_LENGTH};
use serde::Deserialize;

const CRLF: &[u8] = b"\r\n";
const HEAD_BOUNDARY: &[u8] = b"\r\n\r\n";

/// Parsed response head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHead {
    pub status_code: u16,
    /// Declared body length, if the server sent `Content-Length`.
    pub content_length: Option<usize>,
    /// Offset of the first body byte in the response buffer.
    pub body_offset: usize,
}

#[derive(Deserialize)]
struct StatusBody {
    status: serde_json::Number,
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

pub(crate) fn find_head_boundary(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_BOUNDARY.len())
        .position(|w| w == HEAD_BOUNDARY)
}

/// Validate a status line (without its CRLF) and return the status code.
///
/// # Errors
///
/// Returns `Error::BadStatusLine` unless the line is an HTTP/1.x line with
/// a 2xx code.
///
/// # Examples
///
/// ```
/// use portaria_protocol::parse_status_line;
///
/// assert_eq!(parse_status_line("HTTP/1.1 200 OK").unwrap(), 200);
/// assert!(parse_status_line("HTTP/1.1 404 Not Found").is_err());
/// ```
pub fn parse_status_line(line: &str) -> Result<u16> {
    let bad = || Error::BadStatusLine(line.chars().take(64).collect());

    if line.len() > MAX_STATUS_LINE_LENGTH {
        return Err(bad());
    }

    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
        return Err(bad());
    }

    let code = parts
        .next()
        .filter(|code| code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(bad)?;

    if !(200..300).contains(&code) {
        return Err(bad());
    }

    Ok(code)
}

/// Parse the head of a complete response buffer.
///
/// # Errors
///
/// `Error::BadStatusLine` if the status line is missing or not a success,
/// `Error::MalformedResponse` if the boundary is missing or a header is
/// unreadable.
pub fn parse_head(buf: &[u8]) -> Result<ResponseHead> {
    let line_end = find_crlf(buf).unwrap_or(buf.len());
    let line = std::str::from_utf8(&buf[..line_end])
        .map_err(|_| Error::BadStatusLine("status line is not UTF-8".to_string()))?;
    if line.is_empty() {
        return Err(Error::BadStatusLine("missing status line".to_string()));
    }
    let status_code = parse_status_line(line)?;

    let boundary = find_head_boundary(buf).ok_or_else(|| {
        Error::MalformedResponse("missing header/body boundary".to_string())
    })?;

    let mut content_length = None;
    if boundary > line_end {
        let headers = &buf[line_end + CRLF.len()..boundary];
        for raw in headers.split(|&b| b == b'\n') {
            let header = std::str::from_utf8(raw)
                .map_err(|_| Error::MalformedResponse("header is not UTF-8".to_string()))?
                .trim_end_matches('\r');
            let Some((name, value)) = header.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("content-length") {
                let length = value.trim().parse::<usize>().map_err(|_| {
                    Error::MalformedResponse(format!("invalid Content-Length: {}", value.trim()))
                })?;
                content_length = Some(length);
            }
        }
    }

    Ok(ResponseHead {
        status_code,
        content_length,
        body_offset: boundary + HEAD_BOUNDARY.len(),
    })
}

/// Extract the outcome from a response body.
///
/// Integers outside the status table map to `Unknown`.
///
/// # Errors
///
/// Returns `Error::MalformedBody` if the body is not a JSON object with an
/// integer `status` field.
///
/// # Examples
///
/// ```
/// use portaria_protocol::{AuthorizationStatus, parse_status_body};
///
/// assert_eq!(
///     parse_status_body(br#"{"status": 0}"#).unwrap(),
///     AuthorizationStatus::Authorized
/// );
/// assert!(parse_status_body(br#"{"result": 0}"#).is_err());
/// ```
pub fn parse_status_body(body: &[u8]) -> Result<AuthorizationStatus> {
    let parsed: StatusBody =
        serde_json::from_slice(body).map_err(|e| Error::MalformedBody(e.to_string()))?;

    if let Some(code) = parsed.status.as_i64() {
        Ok(AuthorizationStatus::from_code(code))
    } else if parsed.status.is_u64() {
        Ok(AuthorizationStatus::Unknown)
    } else {
        Err(Error::MalformedBody(format!(
            "status is not an integer: {}",
            parsed.status
        )))
    }
}

/// Parse a complete response buffer.
///
/// Without `Content-Length` the body is everything after the boundary.
///
/// # Errors
///
/// See [`parse_head`] and [`parse_status_body`]. A body shorter than its
/// declared length is a `Error::MalformedResponse`.
pub fn parse_response(buf: &[u8]) -> Result<AuthorizationStatus> {
    let head = parse_head(buf)?;
    let body = &buf[head.body_offset..];

    let body = match head.content_length {
        Some(length) if body.len() < length => {
            return Err(Error::MalformedResponse(format!(
                "truncated body: {} of {} bytes",
                body.len(),
                length
            )));
        }
        Some(length) => &body[..length],
        None => body,
    };

    parse_status_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HTTP/1.1 200 OK", 200)]
    #[case("HTTP/1.0 200 OK", 200)]
    #[case("HTTP/1.1 201 Created", 201)]
    #[case("HTTP/1.1 204", 204)]
    fn test_success_status_lines(#[case] line: &str, #[case] code: u16) {
        assert_eq!(parse_status_line(line).unwrap(), code);
    }

    #[rstest]
    #[case("")]
    #[case("HTTP/1.1 500 Internal Server Error")]
    #[case("HTTP/1.1 404 Not Found")]
    #[case("HTTP/1.1 301 Moved Permanently")]
    #[case("HTTP/2 200 OK")]
    #[case("ICY 200 OK")]
    #[case("HTTP/1.1 2000 OK")]
    #[case("HTTP/1.1 OK")]
    #[case("{\"status\":0}")]
    fn test_rejected_status_lines(#[case] line: &str) {
        assert!(matches!(
            parse_status_line(line),
            Err(Error::BadStatusLine(_))
        ));
    }

    #[test]
    fn test_overlong_status_line() {
        let line = format!("HTTP/1.1 200 {}", "K".repeat(MAX_STATUS_LINE_LENGTH));
        assert!(matches!(
            parse_status_line(&line),
            Err(Error::BadStatusLine(_))
        ));
    }

    #[test]
    fn test_parse_head_reads_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nServer: x\r\ncontent-length: 12\r\n\r\n{\"status\":4}";
        let head = parse_head(raw).unwrap();

        assert_eq!(head.status_code, 200);
        assert_eq!(head.content_length, Some(12));
        assert_eq!(&raw[head.body_offset..], b"{\"status\":4}");
    }

    #[test]
    fn test_parse_head_without_headers() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\n{\"status\":0}";
        let head = parse_head(raw).unwrap();

        assert_eq!(head.content_length, None);
        assert_eq!(&raw[head.body_offset..], b"{\"status\":0}");
    }

    #[test]
    fn test_bad_status_line_wins_over_missing_boundary() {
        let raw = b"HTTP/1.1 503 Service Unavailable\r\n";
        assert!(matches!(parse_head(raw), Err(Error::BadStatusLine(_))));
    }

    #[test]
    fn test_missing_boundary() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n{\"status\":0}";
        assert!(matches!(parse_head(raw), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_invalid_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: lots\r\n\r\n{}";
        assert!(matches!(parse_head(raw), Err(Error::MalformedResponse(_))));
    }

    #[rstest]
    #[case(br#"{"status":0}"#, AuthorizationStatus::Authorized)]
    #[case(br#"{"status": 4, "message": "password"}"#, AuthorizationStatus::PasswordRequired)]
    #[case(br#" {"status":9} "#, AuthorizationStatus::DoorOpenTimeout)]
    #[case(br#"{"status":-7}"#, AuthorizationStatus::Unknown)]
    #[case(br#"{"status":18446744073709551615}"#, AuthorizationStatus::Unknown)]
    fn test_status_bodies(#[case] body: &[u8], #[case] expected: AuthorizationStatus) {
        assert_eq!(parse_status_body(body).unwrap(), expected);
    }

    #[rstest]
    #[case(b"")]
    #[case(b"ok")]
    #[case(br#"{"status":"0"}"#)]
    #[case(br#"{"status":1.5}"#)]
    #[case(br#"{"status":null}"#)]
    #[case(br#"{"code":0}"#)]
    #[case(br#"[0]"#)]
    #[case(b"c\r\n{\"status\":0}\r\n0\r\n\r\n")]
    fn test_malformed_bodies(#[case] body: &[u8]) {
        assert!(matches!(
            parse_status_body(body),
            Err(Error::MalformedBody(_))
        ));
    }

    #[test]
    fn test_parse_response_honours_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\n\r\n{\"status\":6}trailing";
        assert_eq!(
            parse_response(raw).unwrap(),
            AuthorizationStatus::VisitorAuthorized
        );
    }

    #[test]
    fn test_parse_response_truncated_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 40\r\n\r\n{\"status\":6}";
        assert!(matches!(
            parse_response(raw),
            Err(Error::MalformedResponse(_))
        ));
    }
}
