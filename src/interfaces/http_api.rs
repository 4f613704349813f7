use std::convert::Infallible;
use std::sync::Arc;

use async_stream::stream as async_stream;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::application::usecases::{
    ActivationResult, CancellationResult, CustomTimerRequest, DismissNotificationUseCase,
    ListTimersUseCase, RequestActivationUseCase, RequestCancellationUseCase,
    StartCustomTimerUseCase,
};
use crate::application::{AppError, Clock, TimerStore};
use crate::domain::UserId;
use crate::infrastructure::event_bus::EventBus;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<TimerStore>,
    pub clock: Arc<dyn Clock>,
    pub api_token: Option<String>,
    pub event_bus: Option<EventBus>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/actions", get(list_actions))
        .route("/users/{user_id}/timers", get(list_timers))
        .route(
            "/users/{user_id}/timers/{action}",
            post(activate).delete(cancel),
        )
        .route("/users/{user_id}/custom-timers", post(start_custom))
        .route(
            "/users/{user_id}/notifications/{action}",
            delete(dismiss),
        )
        .route("/audit", get(recent_audit))
        .route("/notifications/stream", get(stream_notifications))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn list_actions(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    Json(state.store.catalog().list_actions()).into_response()
}

async fn list_timers(
    State(state): State<ApiState>,
    Path(user_id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = ListTimersUseCase {
        store: &state.store,
        clock: state.clock.as_ref(),
    };
    match uc.execute(UserId(user_id)) {
        Ok(v) => Json(v).into_response(),
        Err(e) => error_response(e),
    }
}

async fn activate(
    State(state): State<ApiState>,
    Path((user_id, action)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = RequestActivationUseCase {
        store: &state.store,
        clock: state.clock.as_ref(),
    };
    match uc.execute(UserId(user_id), &action).await {
        Ok(r @ ActivationResult::Started) => (StatusCode::OK, Json(r)).into_response(),
        Ok(r @ ActivationResult::StillCooling { .. }) => {
            (StatusCode::CONFLICT, Json(r)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn cancel(
    State(state): State<ApiState>,
    Path((user_id, action)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = RequestCancellationUseCase {
        store: &state.store,
    };
    match uc.execute(UserId(user_id), &action).await {
        Ok(r @ CancellationResult::Cancelled) => (StatusCode::OK, Json(r)).into_response(),
        Ok(r @ CancellationResult::NotFound) => (StatusCode::NOT_FOUND, Json(r)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn start_custom(
    State(state): State<ApiState>,
    Path(user_id): Path<u64>,
    headers: HeaderMap,
    Json(req): Json<CustomTimerRequest>,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = StartCustomTimerUseCase {
        store: &state.store,
        clock: state.clock.as_ref(),
    };
    match uc.execute(UserId(user_id), &req).await {
        Ok(started) => Json(started).into_response(),
        Err(e) => error_response(e),
    }
}

async fn dismiss(
    State(state): State<ApiState>,
    Path((user_id, action)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let uc = DismissNotificationUseCase {
        store: &state.store,
    };
    match uc.execute(UserId(user_id), &action).await {
        Ok(cancelled) => Json(json!({ "cancelled_pending": cancelled })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct AuditQuery {
    limit: Option<u32>,
}

async fn recent_audit(
    State(state): State<ApiState>,
    Query(q): Query<AuditQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }
    let limit = q.limit.unwrap_or(100).min(500);
    match state.store.recent_audit(limit).await {
        Ok(v) => Json(v).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct StreamQuery {
    user_id: Option<u64>,
}

async fn stream_notifications(
    State(state): State<ApiState>,
    Query(q): Query<StreamQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }

    let Some(bus) = state.event_bus.clone() else {
        return (
            StatusCode::NOT_IMPLEMENTED,
            "notification stream not enabled".to_string(),
        )
            .into_response();
    };

    let user_filter = q.user_id.map(UserId);
    let live = BroadcastStream::new(bus.subscribe()).filter_map(move |msg| {
        let notice = match msg {
            Ok(n) => n,
            Err(_) => return None, // lagged
        };
        if let Some(user) = user_filter {
            if notice.user_id != user {
                return None;
            }
        }
        let data = serde_json::to_string(&notice).ok()?;
        let id = format!("{}:{}:{}", notice.fired_at, notice.user_id, notice.action_name);
        Some(Ok::<SseEvent, Infallible>(
            SseEvent::default().event("expired").id(id).data(data),
        ))
    });

    let out_stream = async_stream! {
        tokio::pin!(live);
        while let Some(item) = live.next().await {
            yield item;
        }
    };

    Sse::new(out_stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn error_response(e: AppError) -> Response {
    let code = match &e {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Storage(_) | AppError::Notifier(_) | AppError::Config(_) => {
            tracing::error!(error = %e, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (code, Json(json!({ "error": e.to_string() }))).into_response()
}

fn check_auth(headers: &HeaderMap, token: &Option<String>) -> Result<(), (StatusCode, String)> {
    let Some(expected) = token else {
        return Ok(());
    }; // no token configured: open access
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if auth == format!("Bearer {}", expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "unauthorized".to_string()))
    }
}
