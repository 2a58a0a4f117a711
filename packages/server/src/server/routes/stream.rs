//! Live push endpoint.
//!
//! Upgrades to a WebSocket, registers the connection in the session
//! registry, and forwards queued push frames - one JSON object per text
//! frame. The channel is push-only; inbound client frames are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Path,
    },
    response::IntoResponse,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domains::notifications::{NotificationRequest, Recipient};
use crate::domains::users::models::User;
use crate::kernel::session_registry::{PushFrame, PushSession};
use crate::server::app::AppState;

/// WebSocket handler - registers a live push connection for the user.
pub async fn stream_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, user_id, socket))
}

async fn handle_socket(state: AppState, user_id: Uuid, mut socket: WebSocket) {
    let (session, mut rx) = PushSession::channel(user_id);
    state.registry.register(session.clone()).await;
    debug!(user_id = %user_id, session_id = %session.id(), "Live push connection opened");

    // Greet the fresh connection (live-push only, never persisted).
    match User::find_by_id(user_id, &state.db_pool).await {
        Ok(Some(user)) => {
            state
                .dispatcher
                .dispatch(NotificationRequest::greeting(Recipient::from(user)))
                .await;
        }
        Ok(None) => {
            warn!(user_id = %user_id, "Live push connection for unknown user");
        }
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load user for greeting");
        }
    }

    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(PushFrame::Payload(value)) => {
                    if socket.send(Message::Text(value.to_string())).await.is_err() {
                        break;
                    }
                }
                Some(PushFrame::Close) | None => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {} // push-only channel
            },
        }
    }

    state.registry.remove(&session).await;
    debug!(user_id = %user_id, session_id = %session.id(), "Live push connection closed");
}
