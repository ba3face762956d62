use crate::AppState;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use utoipa::{IntoParams, ToSchema};
use wd_core::RequestContext;
use wd_core::error::TaskError;
use wd_core::types::ReviewTaskId;
use wd_core::types::io::{CreateReviewTaskInput, TaskAccepted, TaskResultOutput, TaskStatusOutput};
use wd_core::types::task::TaskSummary;
use wd_events::types::EventSource;

const DEFAULT_LIST_LIMIT: usize = 20;

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct ListTasksQuery {
    pub owner_id: String,
    pub limit: Option<usize>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", post(create_task).get(list_tasks))
        .route("/tasks/{id}/status", get(task_status))
        .route("/tasks/{id}/result", get(task_result))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateReviewTaskInput,
    responses(
        (status = 200, body = TaskAccepted),
        (status = 404, description = "no change set or no eligible files")
    )
)]
pub(crate) async fn create_task(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateReviewTaskInput>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    match state.warden.tasks().create(&ctx, input).await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    params(ListTasksQuery),
    responses((status = 200, body = Vec<TaskSummary>))
)]
pub(crate) async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let tasks = state.warden.tasks().list(&query.owner_id, limit).await;
    Json(tasks).into_response()
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/status",
    params(("id" = String, Path, description = "Review task ID")),
    responses((status = 200, body = TaskStatusOutput), (status = 404))
)]
pub(crate) async fn task_status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let task_id = match parse_task_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.warden.tasks().status(&task_id).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/result",
    params(("id" = String, Path, description = "Review task ID")),
    responses((status = 200, body = TaskResultOutput), (status = 404))
)]
pub(crate) async fn task_result(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let task_id = match parse_task_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.warden.tasks().result(&task_id).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

fn parse_task_id(raw: &str) -> Result<ReviewTaskId, Response> {
    raw.parse::<ReviewTaskId>().map_err(|err| {
        map_error(
            &wd_core::WardenError::Task(TaskError::InvalidInput {
                message: err.to_string(),
            }),
            None,
        )
        .into_response()
    })
}
