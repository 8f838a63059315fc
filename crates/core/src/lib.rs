pub mod approvals;
pub mod audit;
pub mod config;
pub mod dates;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod policy;
pub mod projector;
pub mod store;
pub mod validator;

pub use audit::{AuditAction, AuditEntry, AuditRecord, AuditSink, EntityType, InMemoryAuditLog};
pub use dates::{Clock, DateRange, FixedClock, SystemClock};
pub use domain::calendar::{CalendarDay, DayStatus, EntrySource};
pub use domain::policy::RemotePolicy;
pub use domain::request::{RemoteRequest, RequestId, RequestKind, RequestStatus};
pub use domain::user::{Role, User, UserId};
pub use engine::{NewRequest, RemoteWorkEngine};
pub use errors::{EngineError, PolicyRejection, RejectionKind};
pub use policy::PolicySet;
pub use store::{
    CalendarStore, InMemoryCalendarStore, InMemoryRequestStore, RequestStore, UserDirectory,
};
