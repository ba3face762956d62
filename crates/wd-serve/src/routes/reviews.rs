use crate::AppState;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use wd_core::RequestContext;
use wd_core::types::io::ReviewRequest;
use wd_core::types::report::ReviewReport;
use wd_events::types::EventSource;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/reviews", post(run_review))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = ReviewRequest,
    responses(
        (status = 200, body = ReviewReport),
        (status = 400, description = "all files failed analysis"),
        (status = 404, description = "no change set or no eligible files")
    )
)]
pub(crate) async fn run_review(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(request): Json<ReviewRequest>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    match state.warden.reviews().run(&ctx, request).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
