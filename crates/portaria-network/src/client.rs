//! HTTP client for the authorization server.
//!
//! Each request is one short-lived TCP connection: connect, write one
//! POST, read one response, close. The [`AuthorizationCodec`] frames both
//! directions.
//!
//! # Architecture
//!
//! ```text
//! AccessController
//!     │
//!     └─> Authorizer (trait)
//!             │
//!             └─> AuthorizationClient ───(TCP)───> Authorization Server
//!                    │
//!                    └─> AuthorizationCodec (HTTP/1.1 framing)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use portaria_core::{Side, SiteId, TagId};
//! use portaria_network::{AuthorizationClient, AuthorizationClientConfig};
//! use portaria_protocol::AuthorizationRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = AuthorizationClient::new(AuthorizationClientConfig::default());
//!
//! let status = client
//!     .exchange(&AuthorizationRequest::Unlock {
//!         tag_id: TagId::new("AB12CD34")?,
//!         site_id: SiteId::new("corredor")?,
//!         side: Side::Entering,
//!     })
//!     .await?;
//!
//! println!("server answered: {status}");
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: a failed exchange is reported once
//! - **No keepalive**: the connection is closed after every exchange,
//!   including after parse failures
//!
//! # Timeout Handling
//!
//! Connect, write and read each have the configured timeout (default
//! 3000ms). Flush and shutdown during close have 500ms each.

use crate::{Authorizer, TransportError};
use futures::{SinkExt, StreamExt};
use portaria_core::constants::{
    CLOSE_STEP_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVER_ADDR,
};
use portaria_protocol::{AuthorizationCodec, AuthorizationRequest, AuthorizationStatus};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

/// Configuration for the authorization client
///
/// # Example
///
/// ```
/// use portaria_network::AuthorizationClientConfig;
/// use std::time::Duration;
///
/// let config = AuthorizationClientConfig::new("10.0.0.5:8000")
///     .with_timeout(Duration::from_millis(1500));
///
/// assert_eq!(config.host, "10.0.0.5:8000");
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationClientConfig {
    /// Server address (`host:port`) to connect to
    pub server_addr: String,

    /// Value sent in the `Host` header
    pub host: String,

    /// Timeout for each I/O phase (connect, send, recv)
    pub timeout: Duration,
}

impl AuthorizationClientConfig {
    /// Configuration for `server_addr`, using it as the `Host` header too.
    pub fn new(server_addr: impl Into<String>) -> Self {
        let server_addr = server_addr.into();
        Self {
            host: server_addr.clone(),
            server_addr,
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for AuthorizationClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_ADDR)
    }
}

/// Client for the authorization server.
///
/// `exchange` runs a whole round trip. The individual steps are public
/// for diagnostics tooling.
pub struct AuthorizationClient {
    config: AuthorizationClientConfig,

    /// Framed TCP stream (None if not connected)
    framed: Option<Framed<TcpStream, AuthorizationCodec>>,
}

impl AuthorizationClient {
    /// Create a new client. No connection is opened until needed.
    ///
    /// # Example
    ///
    /// ```
    /// use portaria_network::{AuthorizationClient, AuthorizationClientConfig};
    ///
    /// let client = AuthorizationClient::new(AuthorizationClientConfig::default());
    /// assert!(!client.is_connected());
    /// ```
    pub fn new(config: AuthorizationClientConfig) -> Self {
        debug!(server = %config.server_addr, "Creating authorization client");

        Self {
            config,
            framed: None,
        }
    }

    pub fn config(&self) -> &AuthorizationClientConfig {
        &self.config
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Perform one complete request/response exchange.
    ///
    /// The connection is always closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the server cannot be reached, does
    /// not answer in time, or answers with something other than a success
    /// status line followed by a JSON body with an integer `status`.
    pub async fn exchange(
        &mut self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationStatus, TransportError> {
        let endpoint = request.endpoint();
        let result = self.round_trip(request).await;
        self.close().await;

        match &result {
            Ok(status) => info!(%endpoint, %status, "Authorization response"),
            Err(e) => warn!(%endpoint, error = %e, "Authorization exchange failed"),
        }

        result
    }

    async fn round_trip(
        &mut self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationStatus, TransportError> {
        self.connect().await?;
        self.send_request(request.clone()).await?;
        self.recv_status().await
    }

    /// Connect to the authorization server
    ///
    /// # Errors
    ///
    /// Returns an error if the connection times out or is refused.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        debug!(server = %self.config.server_addr, "Connecting to authorization server");

        let stream = match tokio::time::timeout(
            self.config.timeout,
            TcpStream::connect(self.config.server_addr.as_str()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(server = %self.config.server_addr, error = %e, "Connection failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!("Connection timeout after {}ms", self.timeout_ms());
                return Err(TransportError::ConnectionTimeout(self.timeout_ms()));
            }
        };

        // One small request per connection; Nagle would only add latency.
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        let codec = AuthorizationCodec::new(self.config.host.clone());
        self.framed = Some(Framed::new(stream, codec));

        Ok(())
    }

    /// Write one request.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, the write times out, or the
    /// request cannot be encoded.
    pub async fn send_request(
        &mut self,
        request: AuthorizationRequest,
    ) -> Result<(), TransportError> {
        trace!(endpoint = %request.endpoint(), tag = %request.tag_id(), "Sending request");

        let timeout = self.config.timeout;
        let timeout_ms = self.timeout_ms();
        let framed = self.framed.as_mut().ok_or(TransportError::NotConnected)?;

        match tokio::time::timeout(timeout, framed.send(request)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(TransportError::WriteTimeout(timeout_ms)),
        }
    }

    /// Read one response and extract its status.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, the read times out, or the
    /// response is malformed.
    pub async fn recv_status(&mut self) -> Result<AuthorizationStatus, TransportError> {
        let timeout = self.config.timeout;
        let timeout_ms = self.timeout_ms();
        let framed = self.framed.as_mut().ok_or(TransportError::NotConnected)?;

        match tokio::time::timeout(timeout, framed.next()).await {
            Ok(Some(Ok(status))) => Ok(status),
            Ok(Some(Err(e))) => Err(e.into()),
            Ok(None) => Err(TransportError::ConnectionLost(
                "Server closed connection".to_string(),
            )),
            Err(_) => Err(TransportError::ReadTimeout(timeout_ms)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Close the connection. Idempotent.
    ///
    /// Flush and shutdown are each bounded so a dead peer cannot stall the
    /// controller; failures are logged and the stream is dropped anyway.
    pub async fn close(&mut self) {
        let Some(mut framed) = self.framed.take() else {
            return;
        };

        let step_timeout = Duration::from_millis(CLOSE_STEP_TIMEOUT_MS);

        match tokio::time::timeout(
            step_timeout,
            SinkExt::<AuthorizationRequest>::flush(&mut framed),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Error flushing during close: {}", e),
            Err(_) => debug!("Flush timeout during close ({}ms)", CLOSE_STEP_TIMEOUT_MS),
        }

        let mut stream = framed.into_inner();
        match tokio::time::timeout(step_timeout, stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Error during shutdown: {}", e),
            Err(_) => debug!("Shutdown timeout during close ({}ms)", CLOSE_STEP_TIMEOUT_MS),
        }

        trace!("Connection closed");
    }
}

impl Authorizer for AuthorizationClient {
    async fn send(
        &mut self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationStatus, TransportError> {
        self.exchange(request).await
    }
}
