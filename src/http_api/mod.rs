use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use chrono::Local;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{DateRange, ReviewReport, StoreError, StoreResult, TodoItem, TodoPatch, TodoStore};

/// Shared handle to the store. Every mutating handler holds the write lock
/// across its whole mutate-and-persist call.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<TodoStore>>,
}

impl AppState {
    pub fn new(store: TodoStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Release the store once the server has stopped. If a handler still holds
    /// a clone of the state, the snapshot is flushed instead.
    pub fn shutdown(self) -> StoreResult<()> {
        match Arc::try_unwrap(self.store) {
            Ok(lock) => lock.into_inner().shutdown(),
            Err(shared) => {
                log::warn!("store still shared at shutdown; flushing instead");
                shared.read().flush()
            }
        }
    }

    fn store(&self) -> Arc<RwLock<TodoStore>> {
        self.store.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug, Serialize)]
struct SuccessBody {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct NewTodoPayload {
    content: String,
    #[serde(default)]
    event_type: Option<String>,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidDateFormat(_) => ApiError::Invalid(value.to_string()),
            StoreError::Persistence(_) => {
                log::error!("{value}");
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/todos/clear-all", delete(clear_all))
        .route("/api/todos/review", get(review))
        .route("/api/todos/:date", get(list_todos).post(add_todo))
        .route("/api/todos/:date/:id", delete(delete_todo))
        .route("/api/todos/:date/:id/complete", put(mark_completed))
        .route("/api/todos/:date/:id/update", put(update_todo))
        .route("/api/dates-with-todos", get(dates_with_todos))
        .route("/api/date-range", get(date_range))
        .with_state(state)
}

/// Serve until `signal` resolves, then let in-flight requests finish.
pub async fn serve<F>(addr: SocketAddr, state: AppState, signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_todos(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Json<Vec<TodoItem>> {
    let store = state.store();
    let todos = {
        let guard = store.read();
        guard.get_todos(&date).to_vec()
    };
    Json(todos)
}

async fn add_todo(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<NewTodoPayload>,
) -> Result<Json<TodoItem>, ApiError> {
    let store = state.store();
    let item = {
        let mut guard = store.write();
        guard.add_todo(&date, &payload.content, payload.event_type.as_deref())?
    };
    Ok(Json(item))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, usize)>,
) -> Result<Json<SuccessBody>, ApiError> {
    let store = state.store();
    let success = {
        let mut guard = store.write();
        guard.delete_todo(&date, id)?
    };
    Ok(Json(SuccessBody { success }))
}

async fn mark_completed(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, usize)>,
) -> Result<Json<SuccessBody>, ApiError> {
    let store = state.store();
    let success = {
        let mut guard = store.write();
        guard.mark_completed(&date, id)?
    };
    Ok(Json(SuccessBody { success }))
}

async fn update_todo(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, usize)>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<SuccessBody>, ApiError> {
    let store = state.store();
    let success = {
        let mut guard = store.write();
        guard.update_todo(&date, id, patch)?
    };
    Ok(Json(SuccessBody { success }))
}

async fn dates_with_todos(State(state): State<AppState>) -> Json<Vec<String>> {
    let store = state.store();
    let dates = {
        let guard = store.read();
        guard.dates_with_todos()
    };
    Json(dates)
}

async fn date_range() -> Json<DateRange> {
    Json(DateRange::current())
}

async fn clear_all(State(state): State<AppState>) -> Result<Json<SuccessBody>, ApiError> {
    let store = state.store();
    {
        let mut guard = store.write();
        guard.clear_all()?;
    }
    Ok(Json(SuccessBody { success: true }))
}

async fn review(State(state): State<AppState>) -> Json<ReviewReport> {
    let store = state.store();
    let report = {
        let guard = store.read();
        guard.generate_review(Local::now().naive_local())
    };
    Json(report)
}
