//! Tokio codec for authorization round trips.
//!
//! `AuthorizationCodec` encodes an [`AuthorizationRequest`] as one
//! HTTP/1.1 POST and decodes the server's reply into an
//! [`AuthorizationStatus`]. It is meant for a `Framed` stream that carries
//! exactly one exchange and is then closed.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use futures::{SinkExt, StreamExt};
//! use portaria_core::{Side, SiteId, TagId};
//! use portaria_protocol::{AuthorizationCodec, AuthorizationRequest};
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//!
//! # async fn example() -> portaria_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:8000").await?;
//! let mut framed = Framed::new(stream, AuthorizationCodec::new("127.0.0.1:8000"));
//!
//! framed
//!     .send(AuthorizationRequest::Unlock {
//!         tag_id: TagId::new("AB12CD34")?,
//!         site_id: SiteId::new("corredor")?,
//!         side: Side::Entering,
//!     })
//!     .await?;
//!
//! if let Some(status) = framed.next().await {
//!     println!("server answered: {}", status?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Framing
//!
//! - The status line is checked as soon as its CRLF arrives, so a non-2xx
//!   reply fails without waiting for the body.
//! - With `Content-Length` the frame ends at the declared length.
//! - Without it the body runs to end of stream ([`Decoder::decode_eof`]).
//! - Responses larger than the configured maximum (default 16 KiB) are
//!   rejected with `Error::FrameTooLarge`.

use bytes::BytesMut;
use std::fmt::Write as _;
use tokio_util::codec::{Decoder, Encoder};

use crate::response::{find_crlf, find_head_boundary};
use crate::{
    AuthorizationRequest, AuthorizationStatus, parse_head, parse_response, parse_status_body,
    parse_status_line,
};
use portaria_core::{
    Error, Result, VERSION,
    constants::{MAX_RESPONSE_SIZE, MAX_STATUS_LINE_LENGTH},
};

/// Codec for one request/response exchange with the authorization server.
#[derive(Debug, Clone)]
pub struct AuthorizationCodec {
    /// Value of the `Host` header.
    host: String,

    /// Maximum accepted response size (head and body).
    max_response_size: usize,
}

impl AuthorizationCodec {
    /// Create a codec with the default response size limit.
    ///
    /// # Example
    ///
    /// ```
    /// use portaria_protocol::AuthorizationCodec;
    ///
    /// let codec = AuthorizationCodec::new("192.168.88.64:8000");
    /// assert_eq!(codec.host(), "192.168.88.64:8000");
    /// assert_eq!(codec.max_response_size(), 16 * 1024);
    /// ```
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            max_response_size: MAX_RESPONSE_SIZE,
        }
    }

    /// Override the response size limit.
    #[must_use]
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn max_response_size(&self) -> usize {
        self.max_response_size
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_response_size {
            return Err(Error::FrameTooLarge {
                size,
                max: self.max_response_size,
            });
        }
        Ok(())
    }
}

impl Decoder for AuthorizationCodec {
    type Item = AuthorizationStatus;
    type Error = Error;

    /// Decode the server reply once it is complete.
    ///
    /// Returns `Ok(None)` while more bytes are needed, including when the
    /// reply has no `Content-Length` and can only end at end of stream.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }
        self.check_size(src.len())?;

        match find_crlf(src) {
            Some(end) => {
                let line = std::str::from_utf8(&src[..end]).map_err(|_| {
                    Error::BadStatusLine("status line is not UTF-8".to_string())
                })?;
                parse_status_line(line)?;
            }
            None if src.len() > MAX_STATUS_LINE_LENGTH => {
                return Err(Error::BadStatusLine("status line too long".to_string()));
            }
            None => return Ok(None),
        }

        if find_head_boundary(src).is_none() {
            return Ok(None);
        }

        let head = parse_head(src)?;
        let Some(length) = head.content_length else {
            return Ok(None);
        };

        let frame_len = head.body_offset + length;
        self.check_size(frame_len)?;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(frame_len);
        parse_status_body(&frame[head.body_offset..]).map(Some)
    }

    /// Decode whatever remains when the server closes the connection.
    ///
    /// An empty stream means the status line never arrived.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>> {
        if buf.is_empty() {
            return Err(Error::BadStatusLine("empty response".to_string()));
        }

        if let Some(status) = self.decode(buf)? {
            return Ok(Some(status));
        }

        let status = parse_response(buf);
        buf.clear();
        status.map(Some)
    }
}

impl Encoder<AuthorizationRequest> for AuthorizationCodec {
    type Error = Error;

    /// Write the request as a single HTTP/1.1 POST.
    ///
    /// # Errors
    ///
    /// Fails if the body cannot be built (for example a visitor request
    /// without visitors). Nothing is written in that case.
    fn encode(&mut self, item: AuthorizationRequest, dst: &mut BytesMut) -> Result<()> {
        let body = item.body()?;

        let mut head = String::with_capacity(192);
        write!(
            head,
            "POST {path} HTTP/1.1\r\n\
             Host: {host}\r\n\
             User-Agent: portaria/{VERSION}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {length}\r\n\
             Connection: close\r\n\
             \r\n",
            path = item.endpoint().path(),
            host = self.host,
            length = body.len(),
        )
        .map_err(|e| Error::Encode(e.to_string()))?;

        dst.reserve(head.len() + body.len());
        dst.extend_from_slice(head.as_bytes());
        dst.extend_from_slice(body.as_bytes());

        Ok(())
    }
}
