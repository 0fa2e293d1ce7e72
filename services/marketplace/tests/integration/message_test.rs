use uuid::Uuid;

use fixlane_domain::activity::NotificationKind;
use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::request::RequestStatus;
use fixlane_marketplace::domain::realtime::ServerEvent;
use fixlane_marketplace::domain::types::MAX_MESSAGE_CHARS;
use fixlane_marketplace::error::MarketplaceError;
use fixlane_marketplace::usecase::messages::{
    GetConversationUseCase, ListConversationsUseCase, MarkConversationReadUseCase,
    SendMessageUseCase,
};
use fixlane_marketplace::usecase::notifications::{
    ListNotificationsUseCase, MarkAllNotificationsReadUseCase, MarkNotificationReadUseCase,
    NewNotification, UnreadCountUseCase,
};

use crate::helpers::*;

fn send_usecase(
    store: &MemoryStore,
    realtime: &RecordingRealtime,
) -> SendMessageUseCase<MemoryStore, MemoryStore, RecordingRealtime> {
    SendMessageUseCase {
        jobs: store.clone(),
        messages: store.clone(),
        realtime: realtime.clone(),
    }
}

#[tokio::test]
async fn should_deliver_message_to_counterpart() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = seed_job(&store, RequestStatus::Accepted, JobStatus::Pending);

    let message = send_usecase(&store, &realtime)
        .execute(s.job.id, s.owner.id, "  When can you start?  ")
        .await
        .unwrap();

    assert_eq!(message.content, "When can you start?");
    assert!(!message.is_read);
    let pushed = realtime.events();
    assert_eq!(pushed.len(), 1);
    assert_eq!(
        pushed[0].0,
        Delivery::Conversation {
            conversation_id: s.job.id,
            recipient_id: s.provider.id,
        }
    );
    match &pushed[0].1 {
        ServerEvent::NewMessage(payload) => {
            assert_eq!(payload.id, message.id);
            assert_eq!(payload.conversation_id, s.job.id);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn should_refuse_blank_or_oversized_messages() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = seed_job(&store, RequestStatus::Accepted, JobStatus::Pending);
    let usecase = send_usecase(&store, &realtime);

    let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
    for content in [" \n ", long.as_str()] {
        let result = usecase.execute(s.job.id, s.owner.id, content).await;
        assert!(
            matches!(result, Err(MarketplaceError::InvalidInput(_))),
            "expected InvalidInput, got {result:?}"
        );
    }
    assert!(store.tables().messages.is_empty());
    assert!(realtime.events().is_empty());
}

#[tokio::test]
async fn should_forbid_outsiders_from_the_conversation() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = seed_job(&store, RequestStatus::Accepted, JobStatus::Pending);
    let outsider = Uuid::now_v7();

    let sent = send_usecase(&store, &realtime)
        .execute(s.job.id, outsider, "hi")
        .await;
    let read = GetConversationUseCase {
        jobs: store.clone(),
        messages: store.clone(),
    }
    .execute(s.job.id, outsider)
    .await;

    assert!(
        matches!(sent, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {sent:?}"
    );
    assert!(
        matches!(read, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {read:?}"
    );
}

#[tokio::test]
async fn should_track_unread_messages_per_reader() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = seed_job(&store, RequestStatus::Accepted, JobStatus::Pending);
    let send = send_usecase(&store, &realtime);
    send.execute(s.job.id, s.owner.id, "first").await.unwrap();
    send.execute(s.job.id, s.owner.id, "second").await.unwrap();
    let reply = send
        .execute(s.job.id, s.provider.id, "on my way")
        .await
        .unwrap();
    let list = ListConversationsUseCase {
        jobs: store.clone(),
        messages: store.clone(),
        users: store.clone(),
    };

    let inbox = list.execute(s.provider.id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].job_id, s.job.id);
    assert_eq!(inbox[0].other_participant_id, s.owner.id);
    assert_eq!(
        inbox[0].other_participant.as_ref().map(|u| u.name.as_str()),
        Some("Olivia")
    );
    assert_eq!(inbox[0].unread_count, 2);
    assert_eq!(inbox[0].last_message.id, reply.id);

    let updated = MarkConversationReadUseCase {
        jobs: store.clone(),
        messages: store.clone(),
    }
    .execute(s.job.id, s.provider.id)
    .await
    .unwrap();
    assert_eq!(updated, 2);

    let inbox = list.execute(s.provider.id).await.unwrap();
    assert_eq!(inbox[0].unread_count, 0);
    let owner_inbox = list.execute(s.owner.id).await.unwrap();
    assert_eq!(owner_inbox[0].unread_count, 1);
}

#[tokio::test]
async fn should_omit_jobs_without_messages_from_inbox() {
    let store = MemoryStore::new();
    let s = seed_job(&store, RequestStatus::Accepted, JobStatus::Pending);

    let inbox = ListConversationsUseCase {
        jobs: store.clone(),
        messages: store.clone(),
        users: store.clone(),
    }
    .execute(s.owner.id)
    .await
    .unwrap();

    assert!(inbox.is_empty());
}

#[tokio::test]
async fn should_return_conversation_oldest_first() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = seed_job(&store, RequestStatus::Accepted, JobStatus::Pending);
    let send = send_usecase(&store, &realtime);
    for content in ["one", "two", "three"] {
        send.execute(s.job.id, s.owner.id, content).await.unwrap();
    }

    let messages = GetConversationUseCase {
        jobs: store.clone(),
        messages: store.clone(),
    }
    .execute(s.job.id, s.provider.id)
    .await
    .unwrap();

    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["one", "two", "three"]);
}

#[tokio::test]
async fn should_count_and_clear_notifications() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let user = Uuid::now_v7();
    let sender = notifier(&store, &realtime);
    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let n = sender
            .send(NewNotification {
                user_id: user,
                kind: NotificationKind::OnboardingReminder,
                title: title.to_owned(),
                message: "hello".to_owned(),
                link: None,
            })
            .await
            .unwrap();
        ids.push(n.id);
    }
    assert_eq!(realtime.events().len(), 3);

    let unread = UnreadCountUseCase {
        repo: store.clone(),
    };
    assert_eq!(unread.execute(user).await.unwrap(), 3);

    MarkNotificationReadUseCase {
        repo: store.clone(),
    }
    .execute(ids[0], user)
    .await
    .unwrap();
    assert_eq!(unread.execute(user).await.unwrap(), 2);

    let someone_else = MarkNotificationReadUseCase {
        repo: store.clone(),
    }
    .execute(ids[1], Uuid::now_v7())
    .await;
    assert!(
        matches!(someone_else, Err(MarketplaceError::NotificationNotFound(_))),
        "expected NotificationNotFound, got {someone_else:?}"
    );

    let cleared = MarkAllNotificationsReadUseCase {
        repo: store.clone(),
    }
    .execute(user)
    .await
    .unwrap();
    assert_eq!(cleared, 2);
    assert_eq!(unread.execute(user).await.unwrap(), 0);

    let listed = ListNotificationsUseCase {
        repo: store.clone(),
    }
    .execute(user, PageRequest::default())
    .await
    .unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|n| n.is_read));
}
