use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;

use crate::domain::types::{ConversationSummary, Message};
use crate::error::MarketplaceError;
use crate::handlers::users::UserSummaryResponse;
use crate::state::AppState;
use crate::usecase::messages::{
    GetConversationUseCase, ListConversationsUseCase, MarkConversationReadUseCase,
    SendMessageUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.job_id,
            sender_id: message.sender_id,
            content: message.content,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    pub other_participant_id: Uuid,
    pub other_participant: Option<UserSummaryResponse>,
    pub last_message: MessageResponse,
    pub unread_count: u64,
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            conversation_id: summary.job_id,
            other_participant_id: summary.other_participant_id,
            other_participant: summary.other_participant.map(Into::into),
            last_message: summary.last_message.into(),
            unread_count: summary.unread_count,
        }
    }
}

// ── POST /messages ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,
    pub content: String,
}

pub async fn send_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), MarketplaceError> {
    let usecase = SendMessageUseCase {
        jobs: state.job_repo(),
        messages: state.message_repo(),
        realtime: state.realtime.clone(),
    };
    let message = usecase
        .execute(body.conversation_id, identity.user_id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

// ── GET /messages/conversations ──────────────────────────────────────────────

pub async fn list_conversations(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationResponse>>, MarketplaceError> {
    let usecase = ListConversationsUseCase {
        jobs: state.job_repo(),
        messages: state.message_repo(),
        users: state.user_repo(),
    };
    let conversations = usecase.execute(identity.user_id).await?;
    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

// ── GET /messages/conversations/{id} ─────────────────────────────────────────

pub async fn get_conversation(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, MarketplaceError> {
    let usecase = GetConversationUseCase {
        jobs: state.job_repo(),
        messages: state.message_repo(),
    };
    let messages = usecase.execute(id, identity.user_id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

// ── POST /messages/conversations/{id}/read ───────────────────────────────────

#[derive(Serialize)]
pub struct MarkedReadResponse {
    pub updated: u64,
}

pub async fn mark_conversation_read(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MarkedReadResponse>, MarketplaceError> {
    let usecase = MarkConversationReadUseCase {
        jobs: state.job_repo(),
        messages: state.message_repo(),
    };
    let updated = usecase.execute(id, identity.user_id).await?;
    Ok(Json(MarkedReadResponse { updated }))
}
