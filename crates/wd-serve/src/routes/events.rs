use crate::AppState;
use crate::sse;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events/stream", get(stream))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events/stream",
    responses((status = 200, description = "SSE stream of event records"))
)]
pub(crate) async fn stream(State(state): State<AppState>) -> Response {
    sse::subscribe(state).await
}
