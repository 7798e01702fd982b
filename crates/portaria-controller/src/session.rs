//! Per-cycle session state.

use portaria_core::{Credential, TagId};
use portaria_protocol::AuthorizationStatus;

/// Result of offering a tag to a [`VisitorBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorPush {
    Added,
    /// The tag is already in the batch.
    Duplicate,
    /// The batch is at capacity; the tag was dropped.
    Full,
}

/// Ordered, bounded list of visitor tags collected in one cycle.
///
/// # Examples
///
/// ```
/// use portaria_controller::{VisitorBatch, VisitorPush};
/// use portaria_core::TagId;
///
/// let mut batch = VisitorBatch::new(1);
/// let tag = TagId::new("11223344").unwrap();
///
/// assert_eq!(batch.push(tag.clone()), VisitorPush::Added);
/// assert_eq!(batch.push(tag), VisitorPush::Duplicate);
/// assert_eq!(batch.push(TagId::new("55667788").unwrap()), VisitorPush::Full);
/// assert_eq!(batch.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorBatch {
    tags: Vec<TagId>,
    capacity: usize,
}

impl VisitorBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            tags: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `tag` in arrival order.
    ///
    /// A tag already in the batch is not added again (`Duplicate`); a full
    /// batch drops it (`Full`).
    pub fn push(&mut self, tag: TagId) -> VisitorPush {
        if self.tags.contains(&tag) {
            return VisitorPush::Duplicate;
        }
        if self.tags.len() >= self.capacity {
            return VisitorPush::Full;
        }
        self.tags.push(tag);
        VisitorPush::Added
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tags in arrival order.
    pub fn as_slice(&self) -> &[TagId] {
        &self.tags
    }
}

/// State carried through one access cycle.
///
/// Opened by the first read of the cycle and dropped at its outcome.
/// Visitor tags survive the extra `Reading` rounds of the same cycle; every
/// request of the cycle is built from, and answered into, this session.
#[derive(Debug, Clone)]
pub struct ControllerSession {
    credential: Credential,
    employee: Option<TagId>,
    visitors: VisitorBatch,
    last_status: Option<AuthorizationStatus>,
    requests: usize,
}

impl ControllerSession {
    pub fn new(credential: Credential, max_visitors: usize) -> Self {
        Self {
            credential,
            employee: None,
            visitors: VisitorBatch::new(max_visitors),
            last_status: None,
            requests: 0,
        }
    }

    /// Credential captured by the latest `Reading` round.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Replace the credential after another `Reading` round.
    pub fn present(&mut self, credential: Credential) {
        self.credential = credential;
    }

    /// Record the current credential as the employee answering the
    /// password challenge.
    pub fn promote_to_employee(&mut self) {
        self.employee = Some(self.credential.tag_id.clone());
    }

    /// Tag acting for the cycle: the promoted employee, or the current
    /// credential before any challenge.
    pub fn employee(&self) -> &TagId {
        self.employee.as_ref().unwrap_or(&self.credential.tag_id)
    }

    pub fn visitors(&self) -> &VisitorBatch {
        &self.visitors
    }

    /// Offer the current credential's tag to the visitor batch.
    pub fn collect_visitor(&mut self) -> VisitorPush {
        self.visitors.push(self.credential.tag_id.clone())
    }

    /// Status of the latest round trip; `None` after a transport failure
    /// or before any request.
    pub fn last_status(&self) -> Option<AuthorizationStatus> {
        self.last_status
    }

    /// Record the result of one round trip.
    pub fn record_response(&mut self, status: Option<AuthorizationStatus>) {
        self.requests += 1;
        self.last_status = status;
    }

    /// Number of round trips made so far in this cycle.
    pub fn request_count(&self) -> usize {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portaria_core::Side;

    fn tag(s: &str) -> TagId {
        TagId::new(s).unwrap()
    }

    #[test]
    fn test_batch_keeps_arrival_order() {
        let mut batch = VisitorBatch::new(5);
        for t in ["33333333", "11111111", "22222222"] {
            assert_eq!(batch.push(tag(t)), VisitorPush::Added);
        }

        let order: Vec<&str> = batch.as_slice().iter().map(TagId::as_str).collect();
        assert_eq!(order, vec!["33333333", "11111111", "22222222"]);
    }

    #[test]
    fn test_batch_capacity_plus_one_is_dropped() {
        let mut batch = VisitorBatch::new(2);
        batch.push(tag("11111111"));
        batch.push(tag("22222222"));

        assert_eq!(batch.push(tag("33333333")), VisitorPush::Full);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_batch_duplicate_is_case_insensitive() {
        let mut batch = VisitorBatch::new(2);
        batch.push(tag("aabbccdd"));

        assert_eq!(batch.push(tag("AABBCCDD")), VisitorPush::Duplicate);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_zero_capacity_batch() {
        let mut batch = VisitorBatch::new(0);
        assert_eq!(batch.push(tag("11111111")), VisitorPush::Full);
        assert!(batch.is_empty());
    }

    fn credential(s: &str, side: Side) -> Credential {
        Credential::new(tag(s), side)
    }

    #[test]
    fn test_session_tracks_cycle() {
        let mut session = ControllerSession::new(credential("55667788", Side::Entering), 20);
        assert_eq!(session.request_count(), 0);
        assert_eq!(session.last_status(), None);

        session.record_response(Some(AuthorizationStatus::VisitorTagFound));
        assert_eq!(session.collect_visitor(), VisitorPush::Added);

        session.present(credential("AB12CD34", Side::Leaving));
        session.record_response(Some(AuthorizationStatus::PasswordRequired));
        session.promote_to_employee();
        session.record_response(None);

        assert_eq!(session.credential().side, Side::Leaving);
        assert_eq!(session.employee().as_str(), "AB12CD34");
        assert_eq!(session.last_status(), None);
        assert_eq!(session.request_count(), 3);
        assert_eq!(session.visitors().as_slice(), &[tag("55667788")]);
        assert_eq!(session.visitors().capacity(), 20);
    }

    #[test]
    fn test_employee_defaults_to_current_credential() {
        let mut session = ControllerSession::new(credential("11111111", Side::Entering), 2);
        assert_eq!(session.employee().as_str(), "11111111");

        session.present(credential("22222222", Side::Entering));
        assert_eq!(session.employee().as_str(), "22222222");
    }

    #[test]
    fn test_promoted_employee_survives_later_reads() {
        let mut session = ControllerSession::new(credential("AB12CD34", Side::Entering), 2);
        session.promote_to_employee();
        session.present(credential("55667788", Side::Entering));

        assert_eq!(session.employee().as_str(), "AB12CD34");
        assert_eq!(session.credential().tag_id.as_str(), "55667788");
    }
}
