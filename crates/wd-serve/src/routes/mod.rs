pub mod error;
pub mod events;
pub mod reviews;
pub mod tasks;

use crate::middleware::correlation::correlation_middleware;
use crate::{AppState, openapi};
use axum::Router;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(reviews::router(state.clone()))
        .merge(tasks::router(state.clone()))
        .merge(events::router(state.clone()))
        .merge(openapi::router())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
