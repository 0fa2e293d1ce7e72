use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;

use crate::domain::realtime::{ClientEvent, ServerEvent};
use crate::infra::realtime::ConnectionId;
use crate::state::AppState;
use crate::usecase::jobs::participant_job;

// ── GET /realtime ────────────────────────────────────────────────────────────

pub async fn realtime(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket, identity.user_id))
}

async fn handle_socket(state: AppState, mut socket: WebSocket, user_id: Uuid) {
    let (connection_id, mut events) = state.realtime.connect(user_id).await;

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    handle_client_event(&state, connection_id, user_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, %connection_id, "realtime socket error");
                    break;
                }
            },
            outgoing = events.recv() => {
                let Some(event) = outgoing else { break };
                if !send_event(&mut socket, &event).await {
                    break;
                }
            }
        }
    }

    state.realtime.disconnect(connection_id).await;
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode realtime event");
            return true;
        }
    };
    socket.send(Message::Text(text.into())).await.is_ok()
}

async fn handle_client_event(
    state: &AppState,
    connection_id: ConnectionId,
    user_id: Uuid,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(error = %e, %connection_id, "ignoring malformed client event");
            return;
        }
    };
    match event {
        ClientEvent::JoinConversation { conversation_id } => {
            match participant_job(&state.job_repo(), conversation_id, user_id).await {
                Ok(_) => state.realtime.join(connection_id, conversation_id).await,
                Err(e) => {
                    tracing::debug!(error = %e, %conversation_id, %user_id, "join refused");
                }
            }
        }
        ClientEvent::LeaveConversation { conversation_id } => {
            state.realtime.leave(connection_id, conversation_id).await;
        }
        ClientEvent::Typing {
            conversation_id,
            is_typing,
        } => {
            state
                .realtime
                .relay_typing(connection_id, conversation_id, is_typing)
                .await;
        }
    }
}
