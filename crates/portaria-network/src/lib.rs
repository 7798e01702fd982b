//! Network layer for the Portaria door controller.
//!
//! This crate talks to the authorization server. It provides:
//!
//! - [`Authorizer`]: the trait the access controller depends on
//! - [`AuthorizationClient`]: the HTTP/1.1 implementation over TCP
//! - [`MockAuthorizer`]: a scripted implementation for tests and offline runs
//!
//! # Example
//!
//! ```no_run
//! use portaria_network::{AuthorizationClient, AuthorizationClientConfig};
//! use std::time::Duration;
//!
//! let config = AuthorizationClientConfig::new("192.168.88.64:8000")
//!     .with_timeout(Duration::from_millis(3000));
//! let client = AuthorizationClient::new(config);
//! ```

mod authorizer;
mod client;
mod error;
mod mock;

pub use authorizer::Authorizer;
pub use client::{AuthorizationClient, AuthorizationClientConfig};
pub use error::TransportError;
pub use mock::{MockAuthorizer, MockAuthorizerHandle};
