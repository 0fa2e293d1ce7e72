use chrono::Utc;
use uuid::Uuid;

use crate::domain::realtime::ServerEvent;
use crate::domain::repository::{JobRepository, MessageRepository, RealtimePort, UserRepository};
use crate::domain::types::{ConversationSummary, MAX_MESSAGE_CHARS, Message, non_blank};
use crate::error::MarketplaceError;
use crate::usecase::jobs::participant_job;

// ── SendMessage ──────────────────────────────────────────────────────────────

pub struct SendMessageUseCase<J: JobRepository, M: MessageRepository, P: RealtimePort> {
    pub jobs: J,
    pub messages: M,
    pub realtime: P,
}

impl<J: JobRepository, M: MessageRepository, P: RealtimePort> SendMessageUseCase<J, M, P> {
    pub async fn execute(
        &self,
        job_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message, MarketplaceError> {
        let job = participant_job(&self.jobs, job_id, sender_id).await?;
        let content = non_blank(content)
            .ok_or_else(|| MarketplaceError::invalid_input("message must not be blank"))?;
        if content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(MarketplaceError::invalid_input(format!(
                "message exceeds {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let message = Message {
            id: Uuid::now_v7(),
            job_id,
            sender_id,
            content: content.to_owned(),
            is_read: false,
            created_at: Utc::now(),
        };
        self.messages.create(&message).await?;
        self.realtime
            .publish_to_conversation(job_id, job.counterpart(sender_id), ServerEvent::from(&message))
            .await;
        tracing::debug!(message_id = %message.id, %job_id, "message sent");
        Ok(message)
    }
}

// ── ListConversations ────────────────────────────────────────────────────────

pub struct ListConversationsUseCase<J, M, U>
where
    J: JobRepository,
    M: MessageRepository,
    U: UserRepository,
{
    pub jobs: J,
    pub messages: M,
    pub users: U,
}

impl<J, M, U> ListConversationsUseCase<J, M, U>
where
    J: JobRepository,
    M: MessageRepository,
    U: UserRepository,
{
    /// One entry per job with at least one message, most recent first.
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, MarketplaceError> {
        let mut conversations = Vec::new();
        for job in self.jobs.list_for_participant(user_id).await? {
            let Some(last_message) = self.messages.last_message(job.id).await? else {
                continue;
            };
            let other_participant_id = job.counterpart(user_id);
            let other_participant = self
                .users
                .find_by_id(other_participant_id)
                .await?
                .map(|u| u.summary());
            let unread_count = self.messages.count_unread(job.id, user_id).await?;
            conversations.push(ConversationSummary {
                job_id: job.id,
                other_participant,
                other_participant_id,
                last_message,
                unread_count,
            });
        }
        conversations.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
        Ok(conversations)
    }
}

// ── GetConversation ──────────────────────────────────────────────────────────

pub struct GetConversationUseCase<J: JobRepository, M: MessageRepository> {
    pub jobs: J,
    pub messages: M,
}

impl<J: JobRepository, M: MessageRepository> GetConversationUseCase<J, M> {
    pub async fn execute(&self, job_id: Uuid, user_id: Uuid) -> Result<Vec<Message>, MarketplaceError> {
        participant_job(&self.jobs, job_id, user_id).await?;
        self.messages.list_by_job(job_id).await
    }
}

// ── MarkConversationRead ─────────────────────────────────────────────────────

pub struct MarkConversationReadUseCase<J: JobRepository, M: MessageRepository> {
    pub jobs: J,
    pub messages: M,
}

impl<J: JobRepository, M: MessageRepository> MarkConversationReadUseCase<J, M> {
    /// Returns how many messages from the other participant were marked read.
    pub async fn execute(&self, job_id: Uuid, user_id: Uuid) -> Result<u64, MarketplaceError> {
        participant_job(&self.jobs, job_id, user_id).await?;
        self.messages.mark_read(job_id, user_id).await
    }
}
