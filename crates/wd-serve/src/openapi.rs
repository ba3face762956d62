use utoipa::OpenApi;

use crate::routes::tasks::ListTasksQuery;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use wd_core::analysis::ProviderConfig;
use wd_core::reports::StoredReport;
use wd_core::types::change::{FileChange, SubjectRef};
use wd_core::types::enums::{ReviewTaskStatus, Severity};
use wd_core::types::ids::{ReportId, ReviewTaskId};
use wd_core::types::io::{
    CreateReviewTaskInput, ReviewRequest, TaskAccepted, TaskResultOutput, TaskStatusOutput,
};
use wd_core::types::report::{AnalysisResult, FailureRecord, Issue, ReviewReport};
use wd_core::types::task::{ReviewTask, TaskSummary};
use wd_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::reviews::run_review,
        crate::routes::tasks::create_task,
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::task_status,
        crate::routes::tasks::task_result,
        crate::routes::events::stream
    ),
    components(schemas(
        ReviewRequest,
        CreateReviewTaskInput,
        TaskAccepted,
        TaskStatusOutput,
        TaskResultOutput,
        TaskSummary,
        ReviewTask,
        ReviewReport,
        AnalysisResult,
        Issue,
        FailureRecord,
        FileChange,
        SubjectRef,
        ProviderConfig,
        StoredReport,
        ListTasksQuery,
        ReviewTaskId,
        ReportId,
        ReviewTaskStatus,
        Severity,
        EventRecord,
        EventSource
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn docs_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Warden API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    (
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
