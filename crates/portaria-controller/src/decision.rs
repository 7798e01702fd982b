//! Pure decisions of the access cycle.
//!
//! Nothing here touches a device or the network. The controller feeds in
//! what it observed and acts on what comes back. A transport failure is
//! passed as `None` and is handled exactly like a denial.

use portaria_hardware::{KeypadInput, SignalColor};
use portaria_protocol::AuthorizationStatus;
use std::time::Duration;

/// Next step after the unlock round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockDecision {
    Unlock,
    ChallengePassword,
    CollectVisitor,
    Deny,
}

/// Decide what follows the unlock request.
///
/// # Examples
///
/// ```
/// use portaria_controller::decision::{UnlockDecision, on_unlock_response};
/// use portaria_protocol::AuthorizationStatus;
///
/// assert_eq!(
///     on_unlock_response(Some(AuthorizationStatus::PasswordRequired)),
///     UnlockDecision::ChallengePassword
/// );
/// assert_eq!(on_unlock_response(None), UnlockDecision::Deny);
/// ```
pub fn on_unlock_response(status: Option<AuthorizationStatus>) -> UnlockDecision {
    match status {
        Some(AuthorizationStatus::Authorized) => UnlockDecision::Unlock,
        Some(AuthorizationStatus::PasswordRequired) => UnlockDecision::ChallengePassword,
        Some(AuthorizationStatus::VisitorTagFound) => UnlockDecision::CollectVisitor,
        _ => UnlockDecision::Deny,
    }
}

/// Next step after the authenticate round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticateDecision {
    Unlock,
    /// Send the visitor batch, then unlock whatever the server answers.
    AuthorizeVisitors,
    Deny,
}

pub fn on_authenticate_response(
    status: Option<AuthorizationStatus>,
    batch_is_empty: bool,
) -> AuthenticateDecision {
    match status {
        Some(AuthorizationStatus::Authorized) if batch_is_empty => AuthenticateDecision::Unlock,
        Some(AuthorizationStatus::Authorized) => AuthenticateDecision::AuthorizeVisitors,
        _ => AuthenticateDecision::Deny,
    }
}

/// Effect of one key press on the password buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A digit was appended.
    Appended,
    /// The key had no effect (a digit past the maximum length).
    Ignored,
    /// The buffer was emptied.
    Cleared,
    /// Entry is complete.
    Submit,
    /// Entry was abandoned.
    Cancel,
}

impl KeyOutcome {
    /// Returns `true` if the key changed the buffer and deserves feedback.
    pub fn is_accepted(self) -> bool {
        matches!(self, KeyOutcome::Appended | KeyOutcome::Cleared)
    }
}

/// Apply one key press to `buffer`, which never grows past `max_len`.
///
/// `#` and Enter submit, `*` and Cancel abandon, Clear empties the buffer.
///
/// # Examples
///
/// ```
/// use portaria_controller::decision::{KeyOutcome, apply_key};
/// use portaria_hardware::KeypadInput;
///
/// let mut buffer = String::new();
/// assert_eq!(apply_key(&mut buffer, KeypadInput::Digit(1), 4), KeyOutcome::Appended);
/// assert_eq!(apply_key(&mut buffer, KeypadInput::Hash, 4), KeyOutcome::Submit);
/// assert_eq!(buffer, "1");
/// ```
pub fn apply_key(buffer: &mut String, input: KeypadInput, max_len: usize) -> KeyOutcome {
    match input {
        KeypadInput::Digit(d) if d <= 9 && buffer.len() < max_len => {
            buffer.push(char::from(b'0' + d));
            KeyOutcome::Appended
        }
        KeypadInput::Digit(_) => KeyOutcome::Ignored,
        KeypadInput::Clear => {
            buffer.clear();
            KeyOutcome::Cleared
        }
        KeypadInput::Hash | KeypadInput::Enter => KeyOutcome::Submit,
        KeypadInput::Star | KeypadInput::Cancel => KeyOutcome::Cancel,
    }
}

/// Debounce a window of raw sensor samples.
///
/// The door reads open only when open samples outnumber closed ones; a
/// tie or an empty window reads closed.
pub fn majority(samples: &[bool]) -> bool {
    let open = samples.iter().filter(|&&s| s).count();
    open > samples.len() - open
}

/// What the door supervisor shows for a debounced reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorSignal {
    Closed,
    /// Open, still within the allowed time.
    Open,
    /// Open past the allowed time.
    HeldOpen,
}

impl DoorSignal {
    pub fn color(self) -> SignalColor {
        match self {
            DoorSignal::Closed => SignalColor::Blue,
            DoorSignal::Open => SignalColor::Yellow,
            DoorSignal::HeldOpen => SignalColor::Red,
        }
    }

    pub fn alarm(self) -> bool {
        matches!(self, DoorSignal::HeldOpen)
    }
}

pub fn door_signal(open: bool, open_for: Duration, threshold: Duration) -> DoorSignal {
    if !open {
        DoorSignal::Closed
    } else if open_for >= threshold {
        DoorSignal::HeldOpen
    } else {
        DoorSignal::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(AuthorizationStatus::Authorized), UnlockDecision::Unlock)]
    #[case(Some(AuthorizationStatus::PasswordRequired), UnlockDecision::ChallengePassword)]
    #[case(Some(AuthorizationStatus::VisitorTagFound), UnlockDecision::CollectVisitor)]
    #[case(Some(AuthorizationStatus::CredentialNotFound), UnlockDecision::Deny)]
    #[case(Some(AuthorizationStatus::InsufficientPrivileges), UnlockDecision::Deny)]
    #[case(Some(AuthorizationStatus::VisitorAuthorized), UnlockDecision::Deny)]
    #[case(Some(AuthorizationStatus::DoorOpenTimeout), UnlockDecision::Deny)]
    #[case(Some(AuthorizationStatus::Unknown), UnlockDecision::Deny)]
    #[case(None, UnlockDecision::Deny)]
    fn test_unlock_decisions(
        #[case] status: Option<AuthorizationStatus>,
        #[case] expected: UnlockDecision,
    ) {
        assert_eq!(on_unlock_response(status), expected);
    }

    #[rstest]
    #[case(Some(AuthorizationStatus::Authorized), true, AuthenticateDecision::Unlock)]
    #[case(
        Some(AuthorizationStatus::Authorized),
        false,
        AuthenticateDecision::AuthorizeVisitors
    )]
    #[case(Some(AuthorizationStatus::WrongPassword), true, AuthenticateDecision::Deny)]
    #[case(Some(AuthorizationStatus::WrongPassword), false, AuthenticateDecision::Deny)]
    #[case(Some(AuthorizationStatus::PasswordRequired), true, AuthenticateDecision::Deny)]
    #[case(None, false, AuthenticateDecision::Deny)]
    fn test_authenticate_decisions(
        #[case] status: Option<AuthorizationStatus>,
        #[case] batch_is_empty: bool,
        #[case] expected: AuthenticateDecision,
    ) {
        assert_eq!(on_authenticate_response(status, batch_is_empty), expected);
    }

    #[rstest]
    #[case(KeypadInput::Hash, KeyOutcome::Submit)]
    #[case(KeypadInput::Enter, KeyOutcome::Submit)]
    #[case(KeypadInput::Star, KeyOutcome::Cancel)]
    #[case(KeypadInput::Cancel, KeyOutcome::Cancel)]
    fn test_terminal_keys_leave_buffer(#[case] input: KeypadInput, #[case] expected: KeyOutcome) {
        let mut buffer = "12".to_string();
        assert_eq!(apply_key(&mut buffer, input, 16), expected);
        assert_eq!(buffer, "12");
    }

    #[test]
    fn test_digits_stop_at_max_length() {
        let mut buffer = String::new();
        for d in [1, 2, 3] {
            assert_eq!(
                apply_key(&mut buffer, KeypadInput::Digit(d), 2),
                if d < 3 { KeyOutcome::Appended } else { KeyOutcome::Ignored }
            );
        }
        assert_eq!(buffer, "12");
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut buffer = "987".to_string();
        assert_eq!(apply_key(&mut buffer, KeypadInput::Clear, 16), KeyOutcome::Cleared);
        assert!(buffer.is_empty());
        assert!(KeyOutcome::Cleared.is_accepted());
        assert!(!KeyOutcome::Ignored.is_accepted());
    }

    #[rstest]
    #[case(&[], false)]
    #[case(&[true], true)]
    #[case(&[true, false], false)]
    #[case(&[true, true, false], true)]
    #[case(&[false, true, false, true, false, true, false, true, false, true], false)]
    #[case(&[true, true, true, true, true, true, false, false, false, false], true)]
    fn test_majority(#[case] samples: &[bool], #[case] open: bool) {
        assert_eq!(majority(samples), open);
    }

    #[rstest]
    #[case(false, 0, DoorSignal::Closed)]
    #[case(false, 20_000, DoorSignal::Closed)]
    #[case(true, 0, DoorSignal::Open)]
    #[case(true, 14_999, DoorSignal::Open)]
    #[case(true, 15_000, DoorSignal::HeldOpen)]
    #[case(true, 60_000, DoorSignal::HeldOpen)]
    fn test_door_signal(#[case] open: bool, #[case] open_ms: u64, #[case] expected: DoorSignal) {
        let signal = door_signal(
            open,
            Duration::from_millis(open_ms),
            Duration::from_millis(15_000),
        );
        assert_eq!(signal, expected);
    }

    #[test]
    fn test_door_signal_outputs() {
        assert_eq!(DoorSignal::Closed.color(), SignalColor::Blue);
        assert_eq!(DoorSignal::Open.color(), SignalColor::Yellow);
        assert_eq!(DoorSignal::HeldOpen.color(), SignalColor::Red);
        assert!(DoorSignal::HeldOpen.alarm());
        assert!(!DoorSignal::Open.alarm());
    }
}
