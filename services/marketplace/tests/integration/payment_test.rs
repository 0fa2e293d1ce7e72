use std::sync::atomic::Ordering;

use rust_decimal::Decimal;
use uuid::Uuid;

use fixlane_domain::activity::NotificationKind;
use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::request::RequestStatus;
use fixlane_domain::user::Lens;
use fixlane_marketplace::error::MarketplaceError;
use fixlane_marketplace::usecase::payments::{
    CompletePaymentUseCase, CreateChargeUseCase, CreatePayoutUseCase, ListTransactionsUseCase,
    PayoutSummary, SettlePaymentUseCase,
};

use crate::helpers::*;

fn charge_usecase(
    store: &MemoryStore,
    gateway: &MockGateway,
) -> CreateChargeUseCase<MemoryStore, MemoryStore, MemoryStore, MockGateway> {
    CreateChargeUseCase {
        jobs: store.clone(),
        quotes: store.clone(),
        payments: store.clone(),
        gateway: gateway.clone(),
        currency: "usd".to_owned(),
    }
}

fn complete_usecase(
    store: &MemoryStore,
    realtime: &RecordingRealtime,
) -> CompletePaymentUseCase<MemoryStore, MemoryStore, MemoryStore, RecordingRealtime> {
    CompletePaymentUseCase {
        payments: store.clone(),
        activities: store.clone(),
        notifier: notifier(store, realtime),
    }
}

fn completed_job(store: &MemoryStore) -> JobScenario {
    seed_job(store, RequestStatus::Completed, JobStatus::Completed)
}

#[tokio::test]
async fn should_charge_quote_amount_in_minor_units() {
    let store = MemoryStore::new();
    let gateway = MockGateway::default();
    let s = completed_job(&store);

    let outcome = charge_usecase(&store, &gateway)
        .execute(s.job.id, s.owner.id)
        .await
        .unwrap();

    assert_eq!(outcome.amount, Decimal::new(15000, 2));
    assert_eq!(outcome.client_secret, "pi_test_1_secret");
    let request = gateway.last_request().unwrap();
    assert_eq!(request.amount, 15000);
    assert_eq!(request.currency, "usd");
    assert!(
        request
            .metadata
            .contains(&("job_id".to_owned(), s.job.id.to_string()))
    );

    let tables = store.tables();
    assert_eq!(tables.payments.len(), 1);
    let payment = &tables.payments[0];
    assert_eq!(payment.id, outcome.payment_id);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.payment_intent_id, "pi_test_1");
    assert_eq!(payment.paid_at, None);
}

#[tokio::test]
async fn should_refuse_charge_before_job_is_completed() {
    let store = MemoryStore::new();
    let gateway = MockGateway::default();
    let s = seed_job(&store, RequestStatus::InProgress, JobStatus::InProgress);

    let result = charge_usecase(&store, &gateway)
        .execute(s.job.id, s.owner.id)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::InvalidState(_))),
        "expected InvalidState, got {result:?}"
    );
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    assert!(store.tables().payments.is_empty());
}

#[tokio::test]
async fn should_refuse_second_charge_for_same_job() {
    let store = MemoryStore::new();
    let gateway = MockGateway::default();
    let s = completed_job(&store);
    let usecase = charge_usecase(&store, &gateway);

    usecase.execute(s.job.id, s.owner.id).await.unwrap();
    let result = usecase.execute(s.job.id, s.owner.id).await;

    assert!(
        matches!(result, Err(MarketplaceError::PaymentAlreadyExists(id)) if id == s.job.id),
        "expected PaymentAlreadyExists, got {result:?}"
    );
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.tables().payments.len(), 1);
}

#[tokio::test]
async fn should_forbid_charge_by_non_owner() {
    let store = MemoryStore::new();
    let gateway = MockGateway::default();
    let s = completed_job(&store);

    let result = charge_usecase(&store, &gateway)
        .execute(s.job.id, s.provider.id)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_persist_payment_when_gateway_fails() {
    let store = MemoryStore::new();
    let gateway = MockGateway::failing();
    let s = completed_job(&store);

    let result = charge_usecase(&store, &gateway)
        .execute(s.job.id, s.owner.id)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::PaymentGateway(_))),
        "expected PaymentGateway, got {result:?}"
    );
    assert!(store.tables().payments.is_empty());
}

#[tokio::test]
async fn should_complete_payment_once() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = completed_job(&store);
    let payment = test_payment(&s.job, s.quote.amount, PaymentStatus::Pending, "pi_1");
    store.tables().payments.push(payment.clone());
    let usecase = complete_usecase(&store, &realtime);

    let first = usecase.execute(payment.id, s.owner.id).await.unwrap();
    let second = usecase.execute(payment.id, s.owner.id).await.unwrap();

    assert_eq!(first.status, PaymentStatus::Completed);
    assert!(first.paid_at.is_some());
    assert_eq!(second.status, PaymentStatus::Completed);
    let tables = store.tables();
    let received: Vec<_> = tables
        .notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::PaymentReceived)
        .collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].user_id, s.provider.id);
    assert_eq!(tables.activities.len(), 1);
}

#[tokio::test]
async fn should_forbid_completion_by_provider() {
    let store = MemoryStore::new();
    let realtime = RecordingRealtime::default();
    let s = completed_job(&store);
    let payment = test_payment(&s.job, s.quote.amount, PaymentStatus::Pending, "pi_1");
    store.tables().payments.push(payment.clone());

    let result = complete_usecase(&store, &realtime)
        .execute(payment.id, s.provider.id)
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {result:?}"
    );
    assert_eq!(store.tables().payments[0].status, PaymentStatus::Pending);
}

#[tokio::test]
async fn should_summarize_payout_after_settlement() {
    let store = MemoryStore::new();
    let s = completed_job(&store);
    let payment = test_payment(&s.job, s.quote.amount, PaymentStatus::Completed, "pi_1");
    store.tables().payments.push(payment.clone());
    let payout = CreatePayoutUseCase {
        jobs: store.clone(),
        payments: store.clone(),
        platform_fee_percent: 10,
    };

    let early = payout.execute(s.job.id, s.provider.id).await;
    assert!(
        matches!(early, Err(MarketplaceError::InvalidState(_))),
        "expected InvalidState, got {early:?}"
    );

    let settled = SettlePaymentUseCase {
        repo: store.clone(),
    }
    .execute(payment.id)
    .await
    .unwrap();
    assert_eq!(settled.status, PaymentStatus::Paid);

    let summary = payout.execute(s.job.id, s.provider.id).await.unwrap();
    assert_eq!(
        summary,
        PayoutSummary {
            amount: Decimal::new(15000, 2),
            platform_fee: Decimal::new(1500, 2),
            net_amount: Decimal::new(13500, 2),
        }
    );
}

#[tokio::test]
async fn should_forbid_payout_to_non_provider() {
    let store = MemoryStore::new();
    let s = completed_job(&store);
    let payment = test_payment(&s.job, s.quote.amount, PaymentStatus::Paid, "pi_1");
    store.tables().payments.push(payment);

    let result = CreatePayoutUseCase {
        jobs: store.clone(),
        payments: store.clone(),
        platform_fee_percent: 10,
    }
    .execute(s.job.id, s.owner.id)
    .await;

    assert!(
        matches!(result, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_only_settle_completed_payments() {
    let store = MemoryStore::new();
    let s = completed_job(&store);
    let payment = test_payment(&s.job, s.quote.amount, PaymentStatus::Pending, "pi_1");
    store.tables().payments.push(payment.clone());

    let result = SettlePaymentUseCase {
        repo: store.clone(),
    }
    .execute(payment.id)
    .await;

    assert!(
        matches!(result, Err(MarketplaceError::InvalidState(_))),
        "expected InvalidState, got {result:?}"
    );
    let missing = Uuid::now_v7();
    let result = SettlePaymentUseCase {
        repo: store.clone(),
    }
    .execute(missing)
    .await;
    assert!(
        matches!(result, Err(MarketplaceError::PaymentNotFound(id)) if id == missing),
        "expected PaymentNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_list_transactions_through_requested_lens() {
    let store = MemoryStore::new();
    let s = completed_job(&store);
    store.tables().payments.push(test_payment(
        &s.job,
        s.quote.amount,
        PaymentStatus::Paid,
        "pi_1",
    ));
    let usecase = ListTransactionsUseCase {
        repo: store.clone(),
    };

    let earned = usecase
        .execute(s.provider.id, s.provider.roles, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(earned.len(), 1);

    let spent = usecase
        .execute(
            s.provider.id,
            s.provider.roles,
            Some(Lens::Owner),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert!(spent.is_empty());

    let paid = usecase
        .execute(s.owner.id, s.owner.roles, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(paid.len(), 1);
}
