//! Core constants for the Portaria door controller.
//!
//! This module centralizes the protocol endpoints, wire limits and default
//! timings shared by every crate in the workspace. Runtime configuration
//! (see `portaria-controller` and the `portaria` binary) starts from these
//! defaults.
//!
//! # Usage
//!
//! ```
//! use portaria_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(ENDPOINT_REQUEST_UNLOCK, "/api/request-unlock");
//!
//! let timeout = Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS);
//! assert_eq!(timeout.as_secs(), 3);
//! ```

// ============================================================================
// Protocol Endpoints
// ============================================================================

/// Endpoint for the first round trip of every cycle.
pub const ENDPOINT_REQUEST_UNLOCK: &str = "/api/request-unlock";

/// Endpoint for the password challenge round trip.
pub const ENDPOINT_AUTHENTICATE: &str = "/api/authenticate";

/// Endpoint for authorizing a batch of visitor tags.
pub const ENDPOINT_AUTHORIZE_VISITOR: &str = "/api/authorize-visitor";

/// Default authorization server address (`host:port`).
pub const DEFAULT_SERVER_ADDR: &str = "192.168.88.64:8000";

// ============================================================================
// Network Timeouts (milliseconds)
// ============================================================================

/// Default timeout for each network phase (connect, write, read).
///
/// The server is on the local network; a response that has not arrived
/// after three seconds is treated as a transport failure, which the
/// controller handles as a denial.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Minimum accepted request timeout.
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// Maximum accepted request timeout.
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Timeout for each close step (flush, shutdown).
pub const CLOSE_STEP_TIMEOUT_MS: u64 = 500;

// ============================================================================
// Wire Limits
// ============================================================================

/// Maximum accepted size of a complete response (head and body).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024;

/// Maximum accepted length of the status line, excluding CRLF.
pub const MAX_STATUS_LINE_LENGTH: usize = 256;

/// Length of the hex-encoded password digest (SHA-256).
pub const DIGEST_HEX_LENGTH: usize = 64;

// ============================================================================
// Tag Identifiers
// ============================================================================

/// Minimum UID length in bytes (ISO 14443).
pub const MIN_TAG_BYTES: usize = 4;

/// Maximum UID length in bytes (ISO 14443).
pub const MAX_TAG_BYTES: usize = 10;

/// Minimum tag id length in hex characters.
pub const MIN_TAG_HEX_LENGTH: usize = MIN_TAG_BYTES * 2;

/// Maximum tag id length in hex characters.
pub const MAX_TAG_HEX_LENGTH: usize = MAX_TAG_BYTES * 2;

// ============================================================================
// Controller Defaults
// ============================================================================

/// Site identifier sent as `roomID`.
pub const DEFAULT_SITE_ID: &str = "corredor";

/// Maximum number of visitor tags collected in one cycle.
pub const DEFAULT_MAX_VISITORS: usize = 20;

/// Maximum number of password digits kept; extra digits are ignored.
pub const DEFAULT_MAX_PASSWORD_LENGTH: usize = 16;

/// Interval between reader polls while waiting for a credential.
pub const DEFAULT_READ_POLL_INTERVAL_MS: u64 = 50;

/// How long the lock stays released.
pub const DEFAULT_UNLOCK_DURATION_MS: u64 = 2000;

/// How long the denial indication is held before returning to idle.
pub const DEFAULT_DENIAL_DISPLAY_MS: u64 = 5000;

// ============================================================================
// Door Supervision Defaults
// ============================================================================

/// Number of consecutive sensor samples in one majority vote.
pub const DEFAULT_SAMPLE_WINDOW: usize = 10;

/// Interval between debounced sensor readings.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 50;

/// How long the door may stay open before the alarm sounds.
pub const DEFAULT_OPEN_TIMEOUT_MS: u64 = 15_000;
