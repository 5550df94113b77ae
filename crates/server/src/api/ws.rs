//! WebSocket progress feed for a single job.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use musify_core::PublisherMessage;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn job_progress_ws(
    ws: WebSocketUpgrade,
    Path(job_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, job_id))
}

fn message_kind(message: &PublisherMessage) -> &'static str {
    match message {
        PublisherMessage::Progress(_) => "progress",
        PublisherMessage::Terminal(_) => "terminal",
        PublisherMessage::NotFound { .. } => "not_found",
    }
}

/// Forward one job's feed to the client, then close.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, job_id: String) {
    let (mut sender, mut receiver) = socket.split();
    let mut feed = state.publisher().subscribe(&job_id);

    // Track connection metrics
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client subscribed to job {}", job_id);

    loop {
        tokio::select! {
            message = feed.next() => {
                let Some(message) = message else {
                    break;
                };
                WS_MESSAGES_SENT.with_label_values(&[message_kind(&message)]).inc();

                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket send failed, client disconnected");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to serialize progress message: {}", e);
                    }
                }

                if message.is_final() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client closed the subscription");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Client messages carry no meaning here
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    let _ = sender.send(Message::Close(None)).await;
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client for job {} disconnected", job_id);
}
