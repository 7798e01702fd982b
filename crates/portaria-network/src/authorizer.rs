//! The seam between the access controller and the authorization server.

#![allow(async_fn_in_trait)]

use crate::TransportError;
use portaria_protocol::{AuthorizationRequest, AuthorizationStatus};

/// Something that can answer authorization requests.
///
/// One call is one complete round trip. Implementations never retry.
pub trait Authorizer: Send {
    /// Send `request` and wait for the server's status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no status could be obtained.
    async fn send(
        &mut self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationStatus, TransportError>;
}
