//! Wire contract between the door controller and the authorization server.
//!
//! Three JSON endpoints are called over plain HTTP/1.1 POST. Each request
//! variant has a canonical body ([`AuthorizationRequest::body`]) and every
//! response carries a single integer `status` ([`AuthorizationStatus`]).
//! [`AuthorizationCodec`] frames both directions for `tokio_util`'s
//! `Framed`.

pub mod codec;
pub mod request;
pub mod response;
pub mod status;

pub use codec::AuthorizationCodec;
pub use request::{AuthorizationRequest, Endpoint};
pub use response::{ResponseHead, parse_head, parse_response, parse_status_body, parse_status_line};
pub use status::AuthorizationStatus;
