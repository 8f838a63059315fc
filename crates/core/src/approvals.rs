use chrono::{DateTime, Utc};

use crate::domain::request::{RemoteRequest, RequestStatus};
use crate::domain::user::{Role, User};
use crate::errors::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// Applies a manager decision in place: authorization first, then the one-way
/// PENDING -> terminal transition. The caller persists and audits the result.
pub fn decide(
    request: &mut RemoteRequest,
    owner: &User,
    actor: &User,
    decision: Decision,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    if actor.role != Role::Manager || owner.manager_id.as_ref() != Some(&actor.id) {
        return Err(EngineError::Forbidden {
            actor: actor.id.clone(),
            action: format!("decide request `{}`", request.id),
        });
    }

    request.transition_to(decision.target_status())?;
    request.approver_id = Some(actor.id.clone());
    request.approver_comment = comment;
    request.decided_at = Some(now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::domain::request::{RemoteRequest, RequestId, RequestKind, RequestStatus};
    use crate::domain::user::{Role, User, UserId};
    use crate::errors::EngineError;

    use super::{decide, Decision};

    fn owner() -> User {
        User {
            id: UserId("u-emp".to_string()),
            role: Role::Employee,
            department: "engineering".to_string(),
            manager_id: Some(UserId("u-mgr".to_string())),
        }
    }

    fn manager(id: &str) -> User {
        User {
            id: UserId(id.to_string()),
            role: Role::Manager,
            department: "engineering".to_string(),
            manager_id: None,
        }
    }

    fn pending() -> RemoteRequest {
        RemoteRequest {
            id: RequestId("r-1".to_string()),
            user_id: UserId("u-emp".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 2).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 2).expect("valid date"),
            kind: RequestKind::SetRemote,
            reason: None,
            status: RequestStatus::Pending,
            approver_id: None,
            approver_comment: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    #[test]
    fn owning_manager_can_approve_with_comment() {
        let mut request = pending();
        let now = Utc::now();

        decide(
            &mut request,
            &owner(),
            &manager("u-mgr"),
            Decision::Approve,
            Some("enjoy".to_string()),
            now,
        )
        .expect("owning manager approves");

        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.approver_id, Some(UserId("u-mgr".to_string())));
        assert_eq!(request.approver_comment.as_deref(), Some("enjoy"));
        assert_eq!(request.decided_at, Some(now));
    }

    #[test]
    fn foreign_manager_is_forbidden() {
        let mut request = pending();

        let error =
            decide(&mut request, &owner(), &manager("u-other"), Decision::Approve, None, Utc::now())
                .expect_err("not this employee's manager");

        assert!(matches!(error, EngineError::Forbidden { .. }));
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn non_managers_cannot_decide() {
        let mut request = pending();
        let mut hr = manager("u-mgr");
        hr.role = Role::Hr;

        let error = decide(&mut request, &owner(), &hr, Decision::Reject, None, Utc::now())
            .expect_err("hr role cannot decide");
        assert!(matches!(error, EngineError::Forbidden { .. }));
    }

    #[test]
    fn decided_requests_stay_decided() {
        let mut request = pending();
        decide(&mut request, &owner(), &manager("u-mgr"), Decision::Reject, None, Utc::now())
            .expect("first decision lands");

        for retry in [Decision::Approve, Decision::Reject] {
            let error =
                decide(&mut request, &owner(), &manager("u-mgr"), retry, None, Utc::now())
                    .expect_err("terminal state is final");
            assert!(matches!(error, EngineError::InvalidState { .. }));
        }
        assert_eq!(request.status, RequestStatus::Rejected);
    }
}
