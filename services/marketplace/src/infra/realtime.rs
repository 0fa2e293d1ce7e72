//! In-process registry of live client connections and conversation rooms.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::domain::realtime::{ServerEvent, TypingPayload};
use crate::domain::repository::RealtimePort;

pub type ConnectionId = Uuid;

/// Events queued per connection before new ones are dropped.
pub const OUTBOUND_BUFFER: usize = 64;

struct Connection {
    user_id: Uuid,
    tx: mpsc::Sender<ServerEvent>,
    rooms: HashSet<Uuid>,
}

#[derive(Default)]
struct HubState {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<Uuid, HashSet<ConnectionId>>,
}

impl HubState {
    fn deliver(&self, targets: impl IntoIterator<Item = ConnectionId>, event: &ServerEvent) {
        for id in targets {
            let Some(conn) = self.connections.get(&id) else {
                continue;
            };
            match conn.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %id,
                        user_id = %conn.user_id,
                        "realtime queue full, event dropped"
                    );
                }
                // the socket task is shutting down
                Err(TrySendError::Closed(_)) => {}
            }
        }
    }

    fn user_connections(&self, user_id: Uuid) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections
            .iter()
            .filter(move |(_, c)| c.user_id == user_id)
            .map(|(id, _)| *id)
    }
}

#[derive(Clone, Default)]
pub struct RealtimeHub {
    inner: Arc<RwLock<HubState>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`. Events arrive on the receiver.
    pub async fn connect(
        &self,
        user_id: Uuid,
    ) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let id = Uuid::now_v7();
        self.inner.write().await.connections.insert(
            id,
            Connection {
                user_id,
                tx,
                rooms: HashSet::new(),
            },
        );
        tracing::debug!(connection_id = %id, %user_id, "realtime connection opened");
        (id, rx)
    }

    /// Drop the connection and every room membership it held.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut state = self.inner.write().await;
        let Some(conn) = state.connections.remove(&id) else {
            return;
        };
        for room in conn.rooms {
            if let Some(members) = state.rooms.get_mut(&room) {
                members.remove(&id);
                if members.is_empty() {
                    state.rooms.remove(&room);
                }
            }
        }
        tracing::debug!(connection_id = %id, "realtime connection closed");
    }

    pub async fn join(&self, id: ConnectionId, conversation_id: Uuid) {
        let mut state = self.inner.write().await;
        let Some(conn) = state.connections.get_mut(&id) else {
            return;
        };
        conn.rooms.insert(conversation_id);
        state.rooms.entry(conversation_id).or_default().insert(id);
    }

    pub async fn leave(&self, id: ConnectionId, conversation_id: Uuid) {
        let mut state = self.inner.write().await;
        if let Some(conn) = state.connections.get_mut(&id) {
            conn.rooms.remove(&conversation_id);
        }
        if let Some(members) = state.rooms.get_mut(&conversation_id) {
            members.remove(&id);
            if members.is_empty() {
                state.rooms.remove(&conversation_id);
            }
        }
    }

    /// Relay a typing indicator to the room's other users. Only members of
    /// the room may relay into it.
    pub async fn relay_typing(&self, id: ConnectionId, conversation_id: Uuid, is_typing: bool) {
        let state = self.inner.read().await;
        let Some(sender) = state.connections.get(&id) else {
            return;
        };
        if !sender.rooms.contains(&conversation_id) {
            return;
        }
        let event = ServerEvent::UserTyping(TypingPayload {
            conversation_id,
            user_id: sender.user_id,
            is_typing,
        });
        let targets: Vec<ConnectionId> = state
            .rooms
            .get(&conversation_id)
            .into_iter()
            .flatten()
            .copied()
            .filter(|member| {
                state
                    .connections
                    .get(member)
                    .is_some_and(|c| c.user_id != sender.user_id)
            })
            .collect();
        state.deliver(targets, &event);
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

impl RealtimePort for RealtimeHub {
    async fn send_to_user(&self, user_id: Uuid, event: ServerEvent) {
        let state = self.inner.read().await;
        let targets: Vec<ConnectionId> = state.user_connections(user_id).collect();
        state.deliver(targets, &event);
    }

    async fn publish_to_conversation(
        &self,
        conversation_id: Uuid,
        recipient_id: Uuid,
        event: ServerEvent,
    ) {
        let state = self.inner.read().await;
        let mut targets: HashSet<ConnectionId> = state.user_connections(recipient_id).collect();
        if let Some(members) = state.rooms.get(&conversation_id) {
            targets.extend(members.iter().copied());
        }
        state.deliver(targets, &event);
    }
}
