pub mod constants;
pub mod digest;
pub mod error;
pub mod types;

pub use digest::{PasswordDigest, Sha256Digest};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
