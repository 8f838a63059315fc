use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::approvals::{self, Decision};
use crate::audit::{
    AuditAction, AuditEntry, AuditRecord, AuditSink, EntityType, InMemoryAuditLog,
};
use crate::dates::{Clock, SystemClock};
use crate::domain::calendar::CalendarDay;
use crate::domain::request::{RemoteRequest, RequestId, RequestKind, RequestStatus};
use crate::domain::user::{User, UserId};
use crate::errors::EngineError;
use crate::policy::PolicySet;
use crate::projector;
use crate::store::{
    CalendarStore, InMemoryCalendarStore, InMemoryRequestStore, RequestStore, UserDirectory,
};
use crate::validator::RequestValidator;

/// A candidate request as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: RequestKind,
    pub reason: Option<String>,
}

/// The policy validation and approval engine. Owns the seeded directory and
/// policies, the in-memory stores, the audit log, and the clock; every
/// operation is synchronous and reports failures as typed results.
///
/// Calls must not interleave: callers in a concurrent setting serialize
/// access so limit counts see a consistent snapshot and each PENDING ->
/// terminal decision is atomic per request id.
pub struct RemoteWorkEngine<K = SystemClock> {
    directory: UserDirectory,
    policies: PolicySet,
    calendar: InMemoryCalendarStore,
    requests: InMemoryRequestStore,
    audit: InMemoryAuditLog,
    clock: K,
}

impl RemoteWorkEngine<SystemClock> {
    pub fn new(directory: UserDirectory, policies: PolicySet) -> Self {
        Self::with_clock(directory, policies, SystemClock)
    }
}

impl<K: Clock> RemoteWorkEngine<K> {
    pub fn with_clock(directory: UserDirectory, policies: PolicySet, clock: K) -> Self {
        Self::from_parts(
            directory,
            policies,
            InMemoryCalendarStore::new(),
            InMemoryRequestStore::new(),
            InMemoryAuditLog::default(),
            clock,
        )
    }

    /// Assembles an engine around stores the process already owns, e.g. ones
    /// pre-seeded with calendar history.
    pub fn from_parts(
        directory: UserDirectory,
        policies: PolicySet,
        calendar: InMemoryCalendarStore,
        requests: InMemoryRequestStore,
        audit: InMemoryAuditLog,
        clock: K,
    ) -> Self {
        Self { directory, policies, calendar, requests, audit, clock }
    }

    /// Validates the candidate range and, on success, records a PENDING
    /// request. Validation has no side effects; the stored request and its
    /// audit entry are the only writes.
    pub fn submit_request(
        &mut self,
        actor: &UserId,
        input: NewRequest,
    ) -> Result<RemoteRequest, EngineError> {
        let user = self.resolve_actor(actor)?;
        let policy = self.policies.resolve(&user);
        let now = self.clock.now();

        RequestValidator::new(&self.calendar).validate(
            &user,
            input.start_date,
            input.end_date,
            input.kind,
            &policy,
            now,
        )?;

        let request = RemoteRequest {
            id: RequestId::generate(),
            user_id: user.id.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            kind: input.kind,
            reason: input.reason,
            status: RequestStatus::Pending,
            approver_id: None,
            approver_comment: None,
            created_at: now,
            decided_at: None,
        };
        self.requests.insert(request.clone());
        self.audit.record(AuditRecord {
            actor_id: user.id,
            entity_type: EntityType::Request,
            entity_id: request.id.0.clone(),
            action: AuditAction::Create,
            old_value: Value::Null,
            new_value: snapshot(&request),
            recorded_at: now,
        });

        Ok(request)
    }

    pub fn approve(
        &mut self,
        actor: &UserId,
        id: &RequestId,
        comment: Option<String>,
    ) -> Result<RemoteRequest, EngineError> {
        self.decide(actor, id, comment, Decision::Approve)
    }

    pub fn reject(
        &mut self,
        actor: &UserId,
        id: &RequestId,
        comment: Option<String>,
    ) -> Result<RemoteRequest, EngineError> {
        self.decide(actor, id, comment, Decision::Reject)
    }

    fn decide(
        &mut self,
        actor: &UserId,
        id: &RequestId,
        comment: Option<String>,
        decision: Decision,
    ) -> Result<RemoteRequest, EngineError> {
        let actor_user = self.resolve_actor(actor)?;
        let mut request = self.requests.get(id).ok_or_else(|| EngineError::NotFound(id.clone()))?;
        // The directory is seeded and immutable, so a stored request always
        // resolves its owner.
        let owner = self
            .directory
            .find(&request.user_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;

        let before = snapshot(&request);
        let now = self.clock.now();
        approvals::decide(&mut request, &owner, &actor_user, decision, comment, now)?;
        self.requests.update(request.clone());

        let action = match decision {
            Decision::Approve => AuditAction::Approve,
            Decision::Reject => AuditAction::Reject,
        };
        self.audit.record(AuditRecord {
            actor_id: actor_user.id.clone(),
            entity_type: EntityType::Request,
            entity_id: request.id.0.clone(),
            action,
            old_value: before,
            new_value: snapshot(&request),
            recorded_at: now,
        });

        if decision == Decision::Approve && request.kind.has_calendar_effect() {
            for mutation in projector::project(&request, &mut self.calendar, now) {
                self.audit.record(AuditRecord {
                    actor_id: actor_user.id.clone(),
                    entity_type: EntityType::CalendarDay,
                    entity_id: format!("{}:{}", mutation.after.user_id, mutation.after.date),
                    action: AuditAction::Project,
                    old_value: mutation.before.as_ref().map(snapshot).unwrap_or(Value::Null),
                    new_value: snapshot(&mutation.after),
                    recorded_at: now,
                });
            }
        }

        Ok(request)
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.directory.find(id)
    }

    pub fn request(&self, id: &RequestId) -> Option<RemoteRequest> {
        self.requests.get(id)
    }

    pub fn requests_for(&self, user: &UserId) -> Vec<RemoteRequest> {
        self.requests.list_for_user(user)
    }

    pub fn pending_requests(&self) -> Vec<RemoteRequest> {
        self.requests.list_by_status(RequestStatus::Pending)
    }

    pub fn calendar_for(&self, user: &UserId) -> Vec<CalendarDay> {
        self.calendar.days_for_user(user)
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }

    fn resolve_actor(&self, actor: &UserId) -> Result<User, EngineError> {
        self.directory.find(actor).cloned().ok_or(EngineError::Unauthorized)
    }
}

fn snapshot<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
