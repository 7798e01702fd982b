//! Scripted authorizer for tests and offline simulation.

use crate::{Authorizer, TransportError};
use portaria_protocol::{AuthorizationRequest, AuthorizationStatus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct MockState {
    replies: VecDeque<Result<AuthorizationStatus, TransportError>>,
    fallback: AuthorizationStatus,
    latency: Duration,
    requests: Vec<AuthorizationRequest>,
}

/// Authorizer that answers from a script.
///
/// Scripted replies are used in order; once exhausted every request gets
/// the fallback status (`Unknown` unless changed). Every request is
/// recorded.
///
/// # Examples
///
/// ```
/// use portaria_core::{Side, SiteId, TagId};
/// use portaria_network::{Authorizer, MockAuthorizer};
/// use portaria_protocol::{AuthorizationRequest, AuthorizationStatus};
///
/// #[tokio::main]
/// async fn main() {
///     let (mut authorizer, handle) = MockAuthorizer::new();
///     handle.push_status(AuthorizationStatus::PasswordRequired);
///
///     let request = AuthorizationRequest::Unlock {
///         tag_id: TagId::new("AB12CD34").unwrap(),
///         site_id: SiteId::new("corredor").unwrap(),
///         side: Side::Entering,
///     };
///
///     let status = authorizer.send(&request).await.unwrap();
///     assert_eq!(status, AuthorizationStatus::PasswordRequired);
///     assert_eq!(handle.requests(), vec![request]);
/// }
/// ```
#[derive(Debug)]
pub struct MockAuthorizer {
    state: Arc<Mutex<MockState>>,
}

impl MockAuthorizer {
    pub fn new() -> (Self, MockAuthorizerHandle) {
        let state = Arc::new(Mutex::new(MockState {
            replies: VecDeque::new(),
            fallback: AuthorizationStatus::Unknown,
            latency: Duration::ZERO,
            requests: Vec::new(),
        }));

        (
            Self {
                state: Arc::clone(&state),
            },
            MockAuthorizerHandle { state },
        )
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Authorizer for MockAuthorizer {
    async fn send(
        &mut self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationStatus, TransportError> {
        let (reply, latency) = {
            let mut state = lock(&self.state);
            state.requests.push(request.clone());
            let fallback = state.fallback;
            let reply = state.replies.pop_front().unwrap_or(Ok(fallback));
            (reply, state.latency)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        reply
    }
}

/// Script and inspection handle for a [`MockAuthorizer`].
#[derive(Debug, Clone)]
pub struct MockAuthorizerHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockAuthorizerHandle {
    /// Queue a status reply.
    pub fn push_status(&self, status: AuthorizationStatus) {
        lock(&self.state).replies.push_back(Ok(status));
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, error: TransportError) {
        lock(&self.state).replies.push_back(Err(error));
    }

    /// Status returned once the script is exhausted.
    pub fn set_fallback(&self, status: AuthorizationStatus) {
        lock(&self.state).fallback = status;
    }

    /// Delay every reply by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        lock(&self.state).latency = latency;
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        lock(&self.state).requests.clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.state).requests.len()
    }
}
