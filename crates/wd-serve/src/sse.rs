use crate::AppState;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

pub async fn subscribe(state: AppState) -> Response {
    let stream = BroadcastStream::new(state.event_bus.subscribe()).filter_map(|item| async {
        match item {
            Ok(event) => {
                let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
                Some(Ok::<Event, std::convert::Infallible>(Event::default().data(json)))
            }
            // Lagged receivers skip dropped events and keep streaming.
            Err(_) => None,
        }
    });
    Sse::new(stream).into_response()
}
