use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use remoteday_core::{
    CalendarDay, EngineError, NewRequest, RemoteRequest, RemoteWorkEngine, RequestId, RequestKind,
    Role, UserId,
};
use serde::Deserialize;
use serde_json::json;

/// Callers identify themselves with this header; the engine's seeded
/// directory resolves it to a user record.
pub const USER_HEADER: &str = "x-user-id";

/// Engine access is serialized behind one lock so validator counts see a
/// consistent snapshot and each decision is atomic per request id.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Mutex<RemoteWorkEngine>>,
}

impl AppState {
    pub fn new(engine: RemoteWorkEngine) -> Self {
        Self { engine: Arc::new(Mutex::new(engine)) }
    }

    fn engine(&self) -> MutexGuard<'_, RemoteWorkEngine> {
        match self.engine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requests", post(submit_request).get(list_requests))
        .route("/requests/pending", get(list_pending_requests))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/approve", post(approve_request))
        .route("/requests/{id}/reject", post(reject_request))
        .route("/calendar", get(get_calendar))
        .with_state(state)
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubmitRequestBody {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: RequestKind,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DecisionBody {
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiError(EngineError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
            EngineError::Forbidden { .. } => StatusCode::FORBIDDEN,
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidState { .. } => StatusCode::CONFLICT,
            EngineError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self.0 {
            EngineError::Rejected(rejection) => json!({
                "error": self.0.to_string(),
                "rejection": { "kind": rejection.kind, "date": rejection.date },
            }),
            other => json!({ "error": other.to_string() }),
        };

        (self.status(), Json(body)).into_response()
    }
}

pub async fn submit_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubmitRequestBody>,
) -> Result<(StatusCode, Json<RemoteRequest>), ApiError> {
    let caller = caller_id(&headers)?;
    let request = state.engine().submit_request(
        &caller,
        NewRequest {
            start_date: body.start_date,
            end_date: body.end_date,
            kind: body.kind,
            reason: body.reason,
        },
    )?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn approve_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<RemoteRequest>, ApiError> {
    let caller = caller_id(&headers)?;
    let request = state.engine().approve(&caller, &RequestId(id), body.comment)?;
    Ok(Json(request))
}

pub async fn reject_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<RemoteRequest>, ApiError> {
    let caller = caller_id(&headers)?;
    let request = state.engine().reject(&caller, &RequestId(id), body.comment)?;
    Ok(Json(request))
}

pub async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RemoteRequest>>, ApiError> {
    let caller = caller_id(&headers)?;
    let engine = state.engine();
    if engine.user(&caller).is_none() {
        return Err(EngineError::Unauthorized.into());
    }
    Ok(Json(engine.requests_for(&caller)))
}

/// Managers see their reports' pending requests; HR sees all of them.
pub async fn list_pending_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RemoteRequest>>, ApiError> {
    let caller = caller_id(&headers)?;
    let engine = state.engine();
    let caller_user = engine.user(&caller).cloned().ok_or(EngineError::Unauthorized)?;

    let pending = match caller_user.role {
        Role::Hr => engine.pending_requests(),
        Role::Manager => engine
            .pending_requests()
            .into_iter()
            .filter(|request| {
                engine.user(&request.user_id).and_then(|owner| owner.manager_id.as_ref())
                    == Some(&caller)
            })
            .collect(),
        Role::Employee => {
            return Err(EngineError::Forbidden {
                actor: caller,
                action: "list pending requests".to_string(),
            }
            .into());
        }
    };

    Ok(Json(pending))
}

pub async fn get_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<RemoteRequest>, ApiError> {
    let caller = caller_id(&headers)?;
    let engine = state.engine();
    let caller_user = engine.user(&caller).cloned().ok_or(EngineError::Unauthorized)?;

    let id = RequestId(id);
    let request = engine.request(&id).ok_or_else(|| EngineError::NotFound(id.clone()))?;

    // Visible to the owner, the owner's manager, and HR.
    let owner_manager =
        engine.user(&request.user_id).and_then(|owner| owner.manager_id.clone());
    let may_view = request.user_id == caller
        || owner_manager.as_ref() == Some(&caller)
        || caller_user.role == Role::Hr;
    if !may_view {
        return Err(EngineError::Forbidden {
            actor: caller,
            action: format!("view request `{id}`"),
        }
        .into());
    }

    Ok(Json(request))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<CalendarDay>>, ApiError> {
    let caller = caller_id(&headers)?;
    let engine = state.engine();
    if engine.user(&caller).is_none() {
        return Err(EngineError::Unauthorized.into());
    }
    Ok(Json(engine.calendar_for(&caller)))
}

fn caller_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
        .ok_or_else(|| ApiError::from(EngineError::Unauthorized))
}
