use chrono::{Duration, Utc};

use fixlane_domain::activity::NotificationKind;
use fixlane_domain::job::JobStatus;
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::request::RequestStatus;
use fixlane_marketplace::domain::realtime::ServerEvent;
use fixlane_marketplace::domain::webhook::{PAYMENT_INTENT_FAILED, PAYMENT_INTENT_SUCCEEDED};
use fixlane_marketplace::error::MarketplaceError;
use fixlane_marketplace::usecase::webhooks::HandleWebhookUseCase;
use fixlane_testing::fixture::payment_intent_body;
use fixlane_testing::webhook::sign_webhook;

use crate::helpers::*;

fn webhook_usecase(
    store: &MemoryStore,
    realtime: &RecordingRealtime,
    secret: Option<&str>,
) -> HandleWebhookUseCase<MemoryStore, MemoryStore, MemoryStore, RecordingRealtime> {
    HandleWebhookUseCase {
        payments: store.clone(),
        activities: store.clone(),
        notifier: notifier(store, realtime),
        secret: secret.map(str::to_owned),
    }
}

fn seed_payment(store: &MemoryStore, status: PaymentStatus) -> (JobScenario, uuid::Uuid) {
    let s = seed_job(store, RequestStatus::Completed, JobStatus::Completed);
    let payment = test_payment(&s.job, s.quote.amount, status, "pi_hook");
    let payment_id = payment.id;
    store.tables().payments.push(payment);
    (s, payment_id)
}

#[tokio::test]
async fn should_complete_payment_on_succeeded_event() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let (s, _) = seed_payment(&store, PaymentStatus::Pending);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());

    webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await
        .unwrap();

    let tables = store.tables();
    assert_eq!(tables.payments[0].status, PaymentStatus::Completed);
    assert!(tables.payments[0].paid_at.is_some());
    assert_eq!(tables.notifications.len(), 1);
    assert_eq!(tables.notifications[0].kind, NotificationKind::PaymentReceived);
    drop(tables);

    let pushed = realtime.events();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].0, Delivery::User(s.provider.id));
    assert!(matches!(pushed[0].1, ServerEvent::Notification(_)));
}

#[tokio::test]
async fn should_apply_duplicate_delivery_once() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Pending);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());
    let usecase = webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET));

    usecase.execute(&body, &header, now).await.unwrap();
    usecase.execute(&body, &header, now).await.unwrap();

    let tables = store.tables();
    assert_eq!(tables.payments[0].status, PaymentStatus::Completed);
    assert_eq!(tables.notifications.len(), 1);
    assert_eq!(tables.activities.len(), 1);
}

#[tokio::test]
async fn should_mark_pending_payment_failed() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Pending);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_FAILED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());

    webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await
        .unwrap();

    assert_eq!(store.tables().payments[0].status, PaymentStatus::Failed);
}

#[tokio::test]
async fn should_not_fail_a_settled_payment() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Paid);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_FAILED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());

    webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await
        .unwrap();

    assert_eq!(store.tables().payments[0].status, PaymentStatus::Paid);
}

#[tokio::test]
async fn should_recover_failed_payment_on_late_success() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Failed);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());

    webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await
        .unwrap();

    assert_eq!(store.tables().payments[0].status, PaymentStatus::Completed);
}

#[tokio::test]
async fn should_reject_bad_signature_without_side_effects() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Pending);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let header = sign_webhook("whsec_someone_else", &body, now.timestamp());

    let result = webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::WebhookRejected)),
        "expected WebhookRejected, got {result:?}"
    );
    assert_eq!(store.tables().payments[0].status, PaymentStatus::Pending);
}

#[tokio::test]
async fn should_reject_stale_signature() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Pending);
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let signed_at = now - Duration::minutes(10);
    let header = sign_webhook(WEBHOOK_SECRET, &body, signed_at.timestamp());

    let result = webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::WebhookRejected)),
        "expected WebhookRejected, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_when_no_secret_is_configured() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());

    let result = webhook_usecase(&store, &realtime, None)
        .execute(&body, &header, now)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::WebhookRejected)),
        "expected WebhookRejected, got {result:?}"
    );
}

#[tokio::test]
async fn should_acknowledge_unknown_intent_and_event_types() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Pending);
    let now = Utc::now();
    let usecase = webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET));

    for body in [
        payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_unknown"),
        payment_intent_body("charge.refunded", "pi_hook"),
    ] {
        let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());
        usecase.execute(&body, &header, now).await.unwrap();
    }

    assert_eq!(store.tables().payments[0].status, PaymentStatus::Pending);
    assert!(store.tables().notifications.is_empty());
}

#[tokio::test]
async fn should_acknowledge_success_when_feeds_are_unavailable() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    seed_payment(&store, PaymentStatus::Pending);
    store.tables().feeds_down = true;
    let now = Utc::now();
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_hook");
    let header = sign_webhook(WEBHOOK_SECRET, &body, now.timestamp());

    webhook_usecase(&store, &realtime, Some(WEBHOOK_SECRET))
        .execute(&body, &header, now)
        .await
        .unwrap();

    let tables = store.tables();
    assert_eq!(tables.payments[0].status, PaymentStatus::Completed);
    assert!(tables.notifications.is_empty());
    assert!(tables.activities.is_empty());
    drop(tables);
    assert!(realtime.events().is_empty());
}
