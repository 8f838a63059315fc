use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::errors::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    SetRemote,
    SetOffice,
    Note,
}

impl RequestKind {
    /// Only `SetRemote` mutates the calendar on approval; the other kinds are
    /// recorded and audited but leave the calendar untouched.
    pub fn has_calendar_effect(self) -> bool {
        matches!(self, Self::SetRemote)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// An employee's request for one or more remote-work days, inclusive of both
/// range endpoints. Created through the validator, decided exactly once,
/// never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub id: RequestId,
    pub user_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: RequestKind,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub approver_id: Option<UserId>,
    pub approver_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl RemoteRequest {
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self.status, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }

    /// One-way lifecycle: terminal states never re-open.
    pub fn transition_to(&mut self, next: RequestStatus) -> Result<(), EngineError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(EngineError::InvalidState { request_id: self.id.clone(), status: self.status })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::domain::user::UserId;
    use crate::errors::EngineError;

    use super::{RemoteRequest, RequestId, RequestKind, RequestStatus};

    fn request(status: RequestStatus) -> RemoteRequest {
        RemoteRequest {
            id: RequestId("r-1".to_string()),
            user_id: UserId("u-emp".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 7).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 8).expect("valid date"),
            kind: RequestKind::SetRemote,
            reason: None,
            status,
            approver_id: None,
            approver_comment: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    #[test]
    fn pending_requests_can_be_approved_or_rejected() {
        let mut approved = request(RequestStatus::Pending);
        approved.transition_to(RequestStatus::Approved).expect("pending -> approved");
        assert_eq!(approved.status, RequestStatus::Approved);

        let mut rejected = request(RequestStatus::Pending);
        rejected.transition_to(RequestStatus::Rejected).expect("pending -> rejected");
        assert_eq!(rejected.status, RequestStatus::Rejected);
    }

    #[test]
    fn terminal_states_never_reopen() {
        for terminal in [RequestStatus::Approved, RequestStatus::Rejected] {
            for next in [RequestStatus::Pending, RequestStatus::Approved, RequestStatus::Rejected] {
                let mut decided = request(terminal);
                let error = decided.transition_to(next).expect_err("terminal is one-way");
                assert!(matches!(error, EngineError::InvalidState { status, .. } if status == terminal));
            }
        }
    }

    #[test]
    fn only_set_remote_touches_the_calendar() {
        assert!(RequestKind::SetRemote.has_calendar_effect());
        assert!(!RequestKind::SetOffice.has_calendar_effect());
        assert!(!RequestKind::Note.has_calendar_effect());
    }
}
