use crate::{
    Result,
    constants::{MAX_TAG_BYTES, MAX_TAG_HEX_LENGTH, MIN_TAG_BYTES, MIN_TAG_HEX_LENGTH},
    digest::PasswordDigest,
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// RFID tag identifier (8-20 hex characters, a whole number of bytes).
///
/// Tag ids are case-insensitive on the wire; they are normalized to
/// uppercase on construction so that two reads of the same tag compare
/// equal regardless of how the reader rendered them.
///
/// # Security
/// Comparison is constant-time, the same way card numbers are compared
/// during authentication.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Create a new tag id with validation.
    ///
    /// The input is trimmed and uppercased before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if:
    /// - The length is not between 8-20 characters
    /// - The length is odd (a UID is always whole bytes)
    /// - The tag contains anything other than hex digits
    pub fn new(tag: &str) -> Result<Self> {
        let tag = tag.trim().to_uppercase();

        let len = tag.len();
        if !(MIN_TAG_HEX_LENGTH..=MAX_TAG_HEX_LENGTH).contains(&len) {
            return Err(Error::InvalidTagId(format!(
                "Tag id must be {MIN_TAG_HEX_LENGTH}-{MAX_TAG_HEX_LENGTH} hex chars, got {len}"
            )));
        }

        if len % 2 != 0 {
            return Err(Error::InvalidTagId(format!(
                "Tag id must have an even number of hex chars, got {len}"
            )));
        }

        if !tag.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidTagId(format!(
                "Tag id must contain only hex digits: {tag}"
            )));
        }

        Ok(TagId(tag))
    }

    /// Create a tag id from the raw UID bytes reported by a reader.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if the UID is not 4-10 bytes long.
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_core::TagId;
    ///
    /// let tag = TagId::from_uid(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
    /// assert_eq!(tag.as_str(), "DEADBEEF");
    /// ```
    pub fn from_uid(uid: &[u8]) -> Result<Self> {
        if !(MIN_TAG_BYTES..=MAX_TAG_BYTES).contains(&uid.len()) {
            return Err(Error::InvalidTagId(format!(
                "UID must be {MIN_TAG_BYTES}-{MAX_TAG_BYTES} bytes, got {}",
                uid.len()
            )));
        }
        Ok(TagId(hex::encode_upper(uid)))
    }

    /// Get the tag id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::new(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::new(&value)
    }
}

impl From<TagId> for String {
    fn from(tag: TagId) -> Self {
        tag.0
    }
}

impl PartialEq for TagId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for TagId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Side of the door a credential was presented on.
///
/// The discriminant is the reader index and the `readerPosition` wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Side {
    Entering = 0,
    Leaving = 1,
}

impl Side {
    /// Both sides in reader enumeration order.
    pub const ALL: [Side; 2] = [Side::Entering, Side::Leaving];

    /// Wire value for `readerPosition`.
    #[inline]
    #[must_use]
    pub fn reader_position(self) -> u8 {
        self as u8
    }

    /// Indicator channel facing the person who presented the tag.
    #[inline]
    #[must_use]
    pub fn active_channel(self) -> IndicatorChannel {
        match self {
            Side::Entering => IndicatorChannel::Outside,
            Side::Leaving => IndicatorChannel::Inside,
        }
    }

    /// Indicator channel on the opposite side, shown as blocked.
    #[inline]
    #[must_use]
    pub fn blocked_channel(self) -> IndicatorChannel {
        self.active_channel().opposite()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Entering => write!(f, "entering"),
            Side::Leaving => write!(f, "leaving"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entering" | "in" | "0" => Ok(Side::Entering),
            "leaving" | "out" | "1" => Ok(Side::Leaving),
            other => Err(Error::Config(format!("Invalid side: {other}"))),
        }
    }
}

/// One of the two tri-color status lights mounted on the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorChannel {
    Inside,
    Outside,
}

impl IndicatorChannel {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            IndicatorChannel::Inside => IndicatorChannel::Outside,
            IndicatorChannel::Outside => IndicatorChannel::Inside,
        }
    }
}

impl fmt::Display for IndicatorChannel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IndicatorChannel::Inside => write!(f, "inside"),
            IndicatorChannel::Outside => write!(f, "outside"),
        }
    }
}

/// A tag presentation: which tag, on which side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub tag_id: TagId,
    pub side: Side,
}

impl Credential {
    #[must_use]
    pub fn new(tag_id: TagId, side: Side) -> Self {
        Self { tag_id, side }
    }
}

/// Identifier of the room this controller guards (`roomID` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// # Errors
    /// Returns `Error::InvalidSiteId` if the id is empty after trimming.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidSiteId("Site id cannot be empty".to_string()));
        }
        Ok(SiteId(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SiteId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        SiteId::new(&value)
    }
}

impl From<SiteId> for String {
    fn from(site: SiteId) -> Self {
        site.0
    }
}

/// A typed password together with its digest.
///
/// The digest is computed once, when the attempt is created. Only the
/// digest ever leaves this type; `Debug` redacts both values.
#[derive(Clone)]
pub struct PasswordAttempt {
    plaintext: String,
    digest: String,
}

impl PasswordAttempt {
    /// Hash `plaintext` with `digest` and keep both.
    pub fn new(plaintext: String, digest: &dyn PasswordDigest) -> Self {
        let digest = digest.digest(&plaintext);
        Self { plaintext, digest }
    }

    /// Hex digest to send to the server.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Returns `true` if the person submitted without typing anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plaintext.is_empty()
    }
}

impl fmt::Debug for PasswordAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordAttempt")
            .field("plaintext", &"<redacted>")
            .field("digest", &"<redacted>")
            .finish()
    }
}
