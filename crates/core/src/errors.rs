use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::request::{RequestId, RequestStatus};
use crate::domain::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    PastDate,
    CutoffViolation,
    RequiredOfficeDay,
    WeeklyLimitExceeded,
    MonthlyLimitExceeded,
}

/// A policy check failure, carrying the first offending date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRejection {
    pub kind: RejectionKind,
    pub date: NaiveDate,
}

impl PolicyRejection {
    pub fn reason(&self) -> String {
        match self.kind {
            RejectionKind::PastDate => format!("{} is in the past", self.date),
            RejectionKind::CutoffViolation => {
                format!("{} is inside the booking cutoff window", self.date)
            }
            RejectionKind::RequiredOfficeDay => {
                format!("{} falls on a required office day", self.date)
            }
            RejectionKind::WeeklyLimitExceeded => {
                format!("weekly remote-day limit reached for the week of {}", self.date)
            }
            RejectionKind::MonthlyLimitExceeded => {
                format!("monthly remote-day limit reached for the month of {}", self.date)
            }
        }
    }
}

impl std::fmt::Display for PolicyRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason())
    }
}

/// Every failure the engine can report. All of these are recovered at the
/// validator/state-machine boundary and returned to the caller; none are
/// retried and none are fatal to the process.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("caller identity could not be resolved")]
    Unauthorized,
    #[error("actor `{actor}` is not permitted to {action}")]
    Forbidden { actor: UserId, action: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no request with id `{0}`")]
    NotFound(RequestId),
    #[error("request `{request_id}` is already {status:?}")]
    InvalidState { request_id: RequestId, status: RequestStatus },
    #[error("request rejected by policy: {0}")]
    Rejected(PolicyRejection),
}

impl From<PolicyRejection> for EngineError {
    fn from(rejection: PolicyRejection) -> Self {
        Self::Rejected(rejection)
    }
}
