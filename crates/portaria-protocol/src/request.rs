//! Authorization requests and their canonical JSON bodies.
//!
//! Field names and order are fixed by the server:
//!
//! | Request | Body |
//! |---------|------|
//! | [`Unlock`](AuthorizationRequest::Unlock) | `{"uid":..,"roomID":..,"readerPosition":0}` |
//! | [`Authenticate`](AuthorizationRequest::Authenticate) | `{"uid":..,"password":..}` |
//! | [`AuthorizeVisitors`](AuthorizationRequest::AuthorizeVisitors) | `{"uid":..,"visitorsUids":[..],"roomID":..}` |

use portaria_core::{
    Error, Result, Side, SiteId, TagId,
    constants::{ENDPOINT_AUTHENTICATE, ENDPOINT_AUTHORIZE_VISITOR, ENDPOINT_REQUEST_UNLOCK},
};
use serde::Serialize;
use std::fmt;

/// Server endpoint addressed by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RequestUnlock,
    Authenticate,
    AuthorizeVisitor,
}

impl Endpoint {
    /// Request path on the server.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::RequestUnlock => ENDPOINT_REQUEST_UNLOCK,
            Endpoint::Authenticate => ENDPOINT_AUTHENTICATE,
            Endpoint::AuthorizeVisitor => ENDPOINT_AUTHORIZE_VISITOR,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One request to the authorization server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationRequest {
    /// First request of every cycle.
    Unlock {
        tag_id: TagId,
        site_id: SiteId,
        side: Side,
    },

    /// Password challenge answer. Carries the digest, never the password.
    Authenticate {
        tag_id: TagId,
        password_digest: String,
    },

    /// Visitors admitted together with an authenticated employee.
    AuthorizeVisitors {
        employee_tag_id: TagId,
        visitor_tag_ids: Vec<TagId>,
        site_id: SiteId,
    },
}

#[derive(Serialize)]
struct UnlockBody<'a> {
    uid: &'a str,
    #[serde(rename = "roomID")]
    room_id: &'a str,
    #[serde(rename = "readerPosition")]
    reader_position: u8,
}

#[derive(Serialize)]
struct AuthenticateBody<'a> {
    uid: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct AuthorizeVisitorBody<'a> {
    uid: &'a str,
    #[serde(rename = "visitorsUids")]
    visitors_uids: Vec<&'a str>,
    #[serde(rename = "roomID")]
    room_id: &'a str,
}

impl AuthorizationRequest {
    /// Endpoint this request is sent to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Unlock { .. } => Endpoint::RequestUnlock,
            Self::Authenticate { .. } => Endpoint::Authenticate,
            Self::AuthorizeVisitors { .. } => Endpoint::AuthorizeVisitor,
        }
    }

    /// Tag the request is about (the employee tag for visitor requests).
    #[must_use]
    pub fn tag_id(&self) -> &TagId {
        match self {
            Self::Unlock { tag_id, .. } | Self::Authenticate { tag_id, .. } => tag_id,
            Self::AuthorizeVisitors {
                employee_tag_id, ..
            } => employee_tag_id,
        }
    }

    /// Serialize the canonical JSON body.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyVisitorBatch` for a visitor request without
    /// visitors, or `Error::Encode` if serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_core::{Side, SiteId, TagId};
    /// use portaria_protocol::AuthorizationRequest;
    ///
    /// let request = AuthorizationRequest::Unlock {
    ///     tag_id: TagId::new("AB12CD34").unwrap(),
    ///     site_id: SiteId::new("corredor").unwrap(),
    ///     side: Side::Entering,
    /// };
    ///
    /// assert_eq!(
    ///     request.body().unwrap(),
    ///     r#"{"uid":"AB12CD34","roomID":"corredor","readerPosition":0}"#
    /// );
    /// ```
    pub fn body(&self) -> Result<String> {
        let encoded = match self {
            Self::Unlock {
                tag_id,
                site_id,
                side,
            } => serde_json::to_string(&UnlockBody {
                uid: tag_id.as_str(),
                room_id: site_id.as_str(),
                reader_position: side.reader_position(),
            }),
            Self::Authenticate {
                tag_id,
                password_digest,
            } => serde_json::to_string(&AuthenticateBody {
                uid: tag_id.as_str(),
                password: password_digest,
            }),
            Self::AuthorizeVisitors {
                employee_tag_id,
                visitor_tag_ids,
                site_id,
            } => {
                if visitor_tag_ids.is_empty() {
                    return Err(Error::EmptyVisitorBatch);
                }
                serde_json::to_string(&AuthorizeVisitorBody {
                    uid: employee_tag_id.as_str(),
                    visitors_uids: visitor_tag_ids.iter().map(TagId::as_str).collect(),
                    room_id: site_id.as_str(),
                })
            }
        };

        encoded.map_err(|e| Error::Encode(e.to_string()))
    }
}
