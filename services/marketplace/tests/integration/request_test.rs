use chrono::{Duration, Utc};
use uuid::Uuid;

use fixlane_domain::activity::ActivityKind;
use fixlane_domain::pagination::{PageRequest, Sort};
use fixlane_domain::request::{RequestStatus, Urgency};
use fixlane_domain::user::{Lens, Role};
use fixlane_marketplace::domain::types::{ServiceRequest, User, Vehicle};
use fixlane_marketplace::error::MarketplaceError;
use fixlane_marketplace::usecase::requests::{
    AddRequestImagesUseCase, CancelRequestUseCase, CreateRequestInput, CreateRequestUseCase,
    GetRequestUseCase, ListRequestsInput, ListRequestsUseCase, RemoveRequestImageUseCase,
    UpdateRequestInput, UpdateRequestUseCase,
};

use crate::helpers::*;

pub fn create_usecase(
    store: &MemoryStore,
) -> CreateRequestUseCase<MemoryStore, MemoryStore, MemoryStore> {
    CreateRequestUseCase {
        requests: store.clone(),
        vehicles: store.clone(),
        activities: store.clone(),
    }
}

pub fn request_input(vehicle_id: Uuid) -> CreateRequestInput {
    CreateRequestInput {
        vehicle_id,
        title: "  Brake pads squeal ".to_owned(),
        description: "Front brakes squeal when stopping".to_owned(),
        urgency: None,
    }
}

fn get_usecase(
    store: &MemoryStore,
) -> GetRequestUseCase<MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    GetRequestUseCase {
        requests: store.clone(),
        vehicles: store.clone(),
        users: store.clone(),
        quotes: store.clone(),
    }
}

fn list_input(view: Option<Lens>, sort: Sort, page: PageRequest) -> ListRequestsInput {
    ListRequestsInput {
        view,
        status: None,
        sort,
        page,
    }
}

fn seed_owner(store: &MemoryStore, name: &str) -> (User, Vehicle) {
    let owner = test_user(owner_roles(), name);
    let vehicle = test_vehicle(owner.id);
    let mut tables = store.tables();
    tables.users.push(owner.clone());
    tables.vehicles.push(vehicle.clone());
    (owner, vehicle)
}

/// Stores a request created `minutes_ago` and returns it.
fn seed_request(
    store: &MemoryStore,
    owner: &User,
    vehicle: &Vehicle,
    status: RequestStatus,
    minutes_ago: i64,
) -> ServiceRequest {
    let mut request = test_request(owner.id, vehicle.id, status);
    request.created_at = Utc::now() - Duration::minutes(minutes_ago);
    store.tables().requests.push(request.clone());
    request
}

#[tokio::test]
async fn should_open_request_for_own_vehicle() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");

    let request = create_usecase(&store)
        .execute(owner.id, request_input(vehicle.id))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.title, "Brake pads squeal");
    assert_eq!(request.urgency, Urgency::default());
    let tables = store.tables();
    assert_eq!(tables.requests.len(), 1);
    assert_eq!(tables.activities.len(), 1);
    assert_eq!(tables.activities[0].kind, ActivityKind::RequestCreated);
    assert_eq!(tables.activities[0].entity_id, Some(request.id));
}

#[tokio::test]
async fn should_report_missing_vehicle_on_create() {
    let store = MemoryStore::new();
    let (owner, _) = seed_owner(&store, "Olivia");
    let missing = Uuid::now_v7();

    let result = create_usecase(&store)
        .execute(owner.id, request_input(missing))
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::VehicleNotFound(id)) if id == missing),
        "expected VehicleNotFound, got {result:?}"
    );
    assert!(store.tables().requests.is_empty());
}

#[tokio::test]
async fn should_refuse_request_on_another_owners_vehicle() {
    let store = MemoryStore::new();
    let (_, vehicle) = seed_owner(&store, "Olivia");
    let (intruder, _) = seed_owner(&store, "Otto");

    let result = create_usecase(&store)
        .execute(intruder.id, request_input(vehicle.id))
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {result:?}"
    );
    assert!(store.tables().requests.is_empty());
}

#[tokio::test]
async fn should_reject_blank_title() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let input = CreateRequestInput {
        title: "   ".to_owned(),
        ..request_input(vehicle.id)
    };

    let result = create_usecase(&store).execute(owner.id, input).await;

    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_show_providers_only_quotable_requests_across_owners() {
    let store = MemoryStore::new();
    let (olivia, olivias_car) = seed_owner(&store, "Olivia");
    let (otto, ottos_car) = seed_owner(&store, "Otto");
    let open = seed_request(&store, &olivia, &olivias_car, RequestStatus::Open, 3);
    let quoted = seed_request(&store, &otto, &ottos_car, RequestStatus::Quoted, 2);
    seed_request(&store, &otto, &ottos_car, RequestStatus::Accepted, 1);
    seed_request(&store, &olivia, &olivias_car, RequestStatus::Cancelled, 0);
    let provider = test_user(provider_roles(), "Pat");

    let listed = ListRequestsUseCase {
        repo: store.clone(),
    }
    .execute(
        provider.id,
        provider.roles,
        list_input(None, Sort::Newest, PageRequest::default()),
    )
    .await
    .unwrap();

    let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![quoted.id, open.id]);
}

#[tokio::test]
async fn should_scope_owner_lens_to_the_caller() {
    let store = MemoryStore::new();
    let (olivia, olivias_car) = seed_owner(&store, "Olivia");
    let (otto, ottos_car) = seed_owner(&store, "Otto");
    let mine = [
        seed_request(&store, &olivia, &olivias_car, RequestStatus::Open, 2),
        seed_request(&store, &olivia, &olivias_car, RequestStatus::Completed, 1),
    ];
    seed_request(&store, &otto, &ottos_car, RequestStatus::Open, 0);
    let usecase = ListRequestsUseCase {
        repo: store.clone(),
    };

    let listed = usecase
        .execute(
            olivia.id,
            olivia.roles,
            list_input(None, Sort::Oldest, PageRequest::default()),
        )
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![mine[0].id, mine[1].id]);

    // a user holding both roles can still ask for the owner lens
    let both = olivia.roles.with(Role::Provider);
    let listed = usecase
        .execute(
            olivia.id,
            both,
            list_input(Some(Lens::Owner), Sort::Newest, PageRequest::default()),
        )
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![mine[1].id, mine[0].id]);
}

#[tokio::test]
async fn should_page_request_listing() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let requests: Vec<ServiceRequest> = (0..5)
        .map(|i| seed_request(&store, &owner, &vehicle, RequestStatus::Open, 10 - i))
        .collect();
    let usecase = ListRequestsUseCase {
        repo: store.clone(),
    };

    let second_page = usecase
        .execute(
            owner.id,
            owner.roles,
            list_input(None, Sort::Oldest, PageRequest { page: 2, limit: 2 }),
        )
        .await
        .unwrap();
    let ids: Vec<Uuid> = second_page.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![requests[2].id, requests[3].id]);

    let last_page = usecase
        .execute(
            owner.id,
            owner.roles,
            list_input(None, Sort::Oldest, PageRequest { page: 3, limit: 2 }),
        )
        .await
        .unwrap();
    assert_eq!(last_page.len(), 1);
}

#[tokio::test]
async fn should_return_nothing_for_provider_filtering_unquotable_status() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    seed_request(&store, &owner, &vehicle, RequestStatus::Accepted, 0);
    let provider = test_user(provider_roles(), "Pat");

    let listed = ListRequestsUseCase {
        repo: store.clone(),
    }
    .execute(
        provider.id,
        provider.roles,
        ListRequestsInput {
            status: Some(RequestStatus::Accepted),
            ..list_input(None, Sort::Newest, PageRequest::default())
        },
    )
    .await
    .unwrap();

    assert!(listed.is_empty());
}

#[tokio::test]
async fn should_show_request_detail_to_owner_and_providers() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let request = seed_request(&store, &owner, &vehicle, RequestStatus::Open, 0);
    let provider = test_user(provider_roles(), "Pat");
    let usecase = get_usecase(&store);

    let detail = usecase
        .execute(request.id, owner.id, owner.roles)
        .await
        .unwrap();
    assert_eq!(detail.request.id, request.id);
    assert_eq!(detail.vehicle.map(|v| v.id), Some(vehicle.id));
    assert_eq!(detail.owner.map(|o| o.name), Some("Olivia".to_owned()));
    assert!(detail.quotes.is_empty());

    let detail = usecase
        .execute(request.id, provider.id, provider.roles)
        .await
        .unwrap();
    assert_eq!(detail.request.id, request.id);
}

#[tokio::test]
async fn should_hide_request_from_other_owners() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let request = seed_request(&store, &owner, &vehicle, RequestStatus::Open, 0);
    let (stranger, _) = seed_owner(&store, "Otto");
    let usecase = get_usecase(&store);

    let result = usecase
        .execute(request.id, stranger.id, stranger.roles)
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::Forbidden(_))),
        "expected Forbidden, got {result:?}"
    );

    let missing = Uuid::now_v7();
    let result = usecase.execute(missing, owner.id, owner.roles).await;
    assert!(matches!(result, Err(MarketplaceError::RequestNotFound(id)) if id == missing));
}

#[tokio::test]
async fn should_update_details_while_quotable() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let request = seed_request(&store, &owner, &vehicle, RequestStatus::Quoted, 0);

    let updated = UpdateRequestUseCase {
        repo: store.clone(),
    }
    .execute(
        request.id,
        owner.id,
        UpdateRequestInput {
            title: Some(" Grinding brakes ".to_owned()),
            urgency: Some(Urgency::High),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "Grinding brakes");
    assert_eq!(updated.description, request.description);
    let tables = store.tables();
    assert_eq!(tables.requests[0].title, "Grinding brakes");
    assert_eq!(tables.requests[0].urgency, Urgency::High);
    assert_eq!(tables.requests[0].status, RequestStatus::Quoted);
}

#[tokio::test]
async fn should_refuse_update_from_non_owner_or_after_acceptance() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let open = seed_request(&store, &owner, &vehicle, RequestStatus::Open, 1);
    let accepted = seed_request(&store, &owner, &vehicle, RequestStatus::Accepted, 0);
    let usecase = UpdateRequestUseCase {
        repo: store.clone(),
    };
    let edit = || UpdateRequestInput {
        title: Some("New title".to_owned()),
        ..Default::default()
    };

    let result = usecase.execute(open.id, Uuid::now_v7(), edit()).await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden(_))));

    let result = usecase.execute(accepted.id, owner.id, edit()).await;
    assert!(
        matches!(result, Err(MarketplaceError::InvalidState(_))),
        "expected InvalidState, got {result:?}"
    );

    let result = usecase
        .execute(open.id, owner.id, UpdateRequestInput::default())
        .await;
    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_not_rewrite_request_accepted_during_edit() {
    use fixlane_marketplace::domain::repository::RequestRepository;

    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let mut request = seed_request(&store, &owner, &vehicle, RequestStatus::Quoted, 0);
    // an acceptance lands between the edit's read and its write
    store.tables().requests[0].status = RequestStatus::Accepted;
    request.title = "Changed".to_owned();

    let written = store.update_details(&request).await.unwrap();

    assert!(!written);
    assert_eq!(store.tables().requests[0].title, "Brake pads squeal");
}

#[tokio::test]
async fn should_remove_duplicate_image_urls_one_at_a_time() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let request = seed_request(&store, &owner, &vehicle, RequestStatus::Open, 0);
    let url = "https://cdn.fixlane.test/brakes.jpg";

    let images = AddRequestImagesUseCase {
        repo: store.clone(),
    }
    .execute(
        request.id,
        owner.id,
        vec![url.to_owned(), " ".to_owned(), url.to_owned()],
    )
    .await
    .unwrap();
    assert_eq!(images.len(), 2);
    assert_ne!(images[0].id, images[1].id);

    let remove = RemoveRequestImageUseCase {
        repo: store.clone(),
    };
    remove
        .execute(request.id, images[0].id, owner.id)
        .await
        .unwrap();

    let left = store.tables().images.clone();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, images[1].id);
    assert_eq!(left[0].url, url);

    let result = remove.execute(request.id, images[0].id, owner.id).await;
    assert!(matches!(result, Err(MarketplaceError::ImageNotFound(_))));
}

#[tokio::test]
async fn should_restrict_images_to_the_owner() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let request = seed_request(&store, &owner, &vehicle, RequestStatus::Open, 0);
    let provider = test_user(provider_roles(), "Pat");

    let result = AddRequestImagesUseCase {
        repo: store.clone(),
    }
    .execute(
        request.id,
        provider.id,
        vec!["https://cdn.fixlane.test/a.jpg".to_owned()],
    )
    .await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden(_))));

    let result = AddRequestImagesUseCase {
        repo: store.clone(),
    }
    .execute(request.id, owner.id, vec!["  ".to_owned()])
    .await;
    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
    assert!(store.tables().images.is_empty());
}

#[tokio::test]
async fn should_cancel_quotable_request_once() {
    let store = MemoryStore::new();
    let (owner, vehicle) = seed_owner(&store, "Olivia");
    let request = seed_request(&store, &owner, &vehicle, RequestStatus::Quoted, 0);
    let usecase = CancelRequestUseCase {
        repo: store.clone(),
    };

    usecase.execute(request.id, owner.id).await.unwrap();
    assert_eq!(store.tables().requests[0].status, RequestStatus::Cancelled);

    let result = usecase.execute(request.id, owner.id).await;
    assert!(matches!(result, Err(MarketplaceError::InvalidState(_))));
}
