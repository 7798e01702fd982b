//! Server outcome codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome reported by the authorization server for one request.
///
/// The discriminant is the integer carried in the response's `status`
/// field. Codes outside the table decode to [`Unknown`](Self::Unknown),
/// which the controller treats as a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i8)]
pub enum AuthorizationStatus {
    Unknown = -1,
    Authorized = 0,
    CredentialNotFound = 1,
    InsufficientPrivileges = 2,
    WrongPassword = 3,
    PasswordRequired = 4,
    VisitorTagFound = 5,
    VisitorAuthorized = 6,
    VisitorTagNotFound = 7,
    SiteNotFound = 8,
    DoorOpenTimeout = 9,
}

impl AuthorizationStatus {
    /// Map a wire code onto a status. Total: unknown codes yield `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_protocol::AuthorizationStatus;
    ///
    /// assert_eq!(AuthorizationStatus::from_code(4), AuthorizationStatus::PasswordRequired);
    /// assert_eq!(AuthorizationStatus::from_code(42), AuthorizationStatus::Unknown);
    /// ```
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Authorized,
            1 => Self::CredentialNotFound,
            2 => Self::InsufficientPrivileges,
            3 => Self::WrongPassword,
            4 => Self::PasswordRequired,
            5 => Self::VisitorTagFound,
            6 => Self::VisitorAuthorized,
            7 => Self::VisitorTagNotFound,
            8 => Self::SiteNotFound,
            9 => Self::DoorOpenTimeout,
            _ => Self::Unknown,
        }
    }

    /// Wire code of this status.
    #[inline]
    #[must_use]
    pub fn code(self) -> i8 {
        self as i8
    }

    #[inline]
    #[must_use]
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Human-readable description, used in logs.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Unknown => "unknown error",
            Self::Authorized => "authorized",
            Self::CredentialNotFound => "credential not found",
            Self::InsufficientPrivileges => "insufficient privileges",
            Self::WrongPassword => "wrong password",
            Self::PasswordRequired => "password required",
            Self::VisitorTagFound => "visitor credential found",
            Self::VisitorAuthorized => "visitor authorized",
            Self::VisitorTagNotFound => "visitor credential not found",
            Self::SiteNotFound => "site not found",
            Self::DoorOpenTimeout => "door-open timeout reported",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1, AuthorizationStatus::Unknown)]
    #[case(0, AuthorizationStatus::Authorized)]
    #[case(1, AuthorizationStatus::CredentialNotFound)]
    #[case(2, AuthorizationStatus::InsufficientPrivileges)]
    #[case(3, AuthorizationStatus::WrongPassword)]
    #[case(4, AuthorizationStatus::PasswordRequired)]
    #[case(5, AuthorizationStatus::VisitorTagFound)]
    #[case(6, AuthorizationStatus::VisitorAuthorized)]
    #[case(7, AuthorizationStatus::VisitorTagNotFound)]
    #[case(8, AuthorizationStatus::SiteNotFound)]
    #[case(9, AuthorizationStatus::DoorOpenTimeout)]
    fn test_status_table(#[case] code: i64, #[case] expected: AuthorizationStatus) {
        let status = AuthorizationStatus::from_code(code);
        assert_eq!(status, expected);
        assert_eq!(i64::from(status.code()), code);
    }

    #[rstest]
    #[case(-2)]
    #[case(10)]
    #[case(255)]
    #[case(i64::MAX)]
    #[case(i64::MIN)]
    fn test_out_of_range_is_unknown(#[case] code: i64) {
        assert_eq!(AuthorizationStatus::from_code(code), AuthorizationStatus::Unknown);
    }

    #[test]
    fn test_only_authorized_is_authorized() {
        for code in -1..=9 {
            let status = AuthorizationStatus::from_code(code);
            assert_eq!(status.is_authorized(), code == 0);
        }
    }

    #[test]
    fn test_display_includes_code() {
        assert_eq!(
            AuthorizationStatus::PasswordRequired.to_string(),
            "password required (4)"
        );
    }
}
