//! Sync API Handlers
//!
//! Server-push channel for other terminals (admin dashboard, cook display).
//! Every state mutation lands here as a versioned [`shared::SyncPayload`];
//! clients drop payloads whose version is not newer than what they hold.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

/// GET /api/sync/subscribe - 实时同步流 (SSE)
pub async fn subscribe(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(msg) => match Event::default().json_data(&msg) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(err) => {
                        tracing::error!(error = %err, "Failed to encode sync event");
                        continue;
                    }
                },
                // A slow consumer lost messages; it will catch up from the
                // next payload's version gap
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Sync subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
