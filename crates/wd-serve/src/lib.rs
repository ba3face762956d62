pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod sse;
pub mod sweeper;

use axum::Router;
use wd_core::Warden;
use wd_events::bus::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub warden: Warden,
    pub event_bus: EventBus,
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "warden listening");
    axum::serve(listener, app(state)).await
}
