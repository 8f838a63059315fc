use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Request,
    CalendarDay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Approve,
    Reject,
    Project,
}

/// What a component hands to the recorder; the sink assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditRecord {
    pub actor_id: UserId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub action: AuditAction,
    pub old_value: Value,
    pub new_value: Value,
    pub recorded_at: DateTime<Utc>,
}

/// An immutable trail entry. Never mutated or deleted once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: u64,
    pub actor_id: UserId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub action: AuditAction,
    pub old_value: Value,
    pub new_value: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only recorder. Recording never fails and never blocks the engine.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

#[derive(Clone, Default)]
pub struct InMemoryAuditLog {
    next_id: Arc<AtomicU64>,
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn entries(&self) -> Vec<AuditEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, record: AuditRecord) {
        let entry = AuditEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            actor_id: record.actor_id,
            entity_type: record.entity_type,
            entity_id: record.entity_id,
            action: record.action,
            old_value: record.old_value,
            new_value: record.new_value,
            recorded_at: record.recorded_at,
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::{json, Value};

    use crate::domain::user::UserId;

    use super::{AuditAction, AuditRecord, AuditSink, EntityType, InMemoryAuditLog};

    fn record(action: AuditAction) -> AuditRecord {
        AuditRecord {
            actor_id: UserId("u-mgr".to_string()),
            entity_type: EntityType::Request,
            entity_id: "r-1".to_string(),
            action,
            old_value: Value::Null,
            new_value: json!({"status": "pending"}),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn ids_increase_monotonically_in_append_order() {
        let log = InMemoryAuditLog::default();
        log.record(record(AuditAction::Create));
        log.record(record(AuditAction::Approve));
        log.record(record(AuditAction::Project));

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().map(|entry| entry.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[1].action, AuditAction::Approve);
    }

    #[test]
    fn entries_carry_before_and_after_snapshots() {
        let log = InMemoryAuditLog::default();
        log.record(record(AuditAction::Create));

        let entries = log.entries();
        assert_eq!(entries[0].old_value, Value::Null);
        assert_eq!(entries[0].new_value["status"], "pending");
    }
}
