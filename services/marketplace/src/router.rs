use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use fixlane_core::health::healthz;
use fixlane_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    activities::list_activities,
    health::readyz,
    jobs::{cancel_job, complete_job, confirm_job, get_job, list_jobs, start_job},
    maintenance::{create_maintenance, delete_maintenance, list_maintenance},
    messages::{get_conversation, list_conversations, mark_conversation_read, send_message},
    notifications::{
        list_notifications, mark_all_notifications_read, mark_notification_read, unread_count,
    },
    payments::{
        complete_payment, create_charge, create_payout, list_transactions, settle_payment,
    },
    platform::{platform_settings, platform_stats},
    providers::{featured_providers, get_provider, list_providers},
    quotes::{accept_quote, create_quote, list_my_quotes, list_request_quotes, reject_quote},
    realtime::realtime,
    requests::{
        add_request_images, cancel_request, create_request, get_request, list_requests,
        remove_request_image, update_request,
    },
    users::{create_user, get_me, update_me, update_provider_profile},
    vehicles::{create_vehicle, delete_vehicle, get_vehicle, list_vehicles, update_vehicle},
    webhooks::stripe_webhook,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users", post(create_user))
        .route("/users/@me", get(get_me))
        .route("/users/@me", patch(update_me))
        .route("/users/@me/provider-profile", put(update_provider_profile))
        // Vehicles
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles", post(create_vehicle))
        .route("/vehicles/{id}", get(get_vehicle))
        .route("/vehicles/{id}", patch(update_vehicle))
        .route("/vehicles/{id}", delete(delete_vehicle))
        // Maintenance
        .route("/vehicles/{id}/maintenance", get(list_maintenance))
        .route("/vehicles/{id}/maintenance", post(create_maintenance))
        .route(
            "/vehicles/{id}/maintenance/{record_id}",
            delete(delete_maintenance),
        )
        // Requests
        .route("/requests", get(list_requests))
        .route("/requests", post(create_request))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}", patch(update_request))
        .route("/requests/{id}/images", post(add_request_images))
        .route(
            "/requests/{id}/images/{image_id}",
            delete(remove_request_image),
        )
        .route("/requests/{id}/cancel", post(cancel_request))
        // Quotes
        .route("/quotes", post(create_quote))
        .route("/quotes/mine", get(list_my_quotes))
        .route("/quotes/request/{request_id}", get(list_request_quotes))
        .route("/quotes/{id}/accept", post(accept_quote))
        .route("/quotes/{id}/reject", post(reject_quote))
        // Jobs
        .route("/jobs", get(list_jobs))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/start", post(start_job))
        .route("/jobs/{id}/complete", post(complete_job))
        .route("/jobs/{id}/confirm", post(confirm_job))
        .route("/jobs/{id}/cancel", post(cancel_job))
        // Payments
        .route("/payments", get(list_transactions))
        .route("/payments/charge/{job_id}", post(create_charge))
        .route("/payments/complete/{payment_id}", post(complete_payment))
        .route("/payments/payout/{job_id}", post(create_payout))
        .route("/payments/settle/{payment_id}", post(settle_payment))
        // Webhooks
        .route("/webhooks/stripe", post(stripe_webhook))
        // Messages
        .route("/messages", post(send_message))
        .route("/messages/conversations", get(list_conversations))
        .route("/messages/conversations/{id}", get(get_conversation))
        .route(
            "/messages/conversations/{id}/read",
            post(mark_conversation_read),
        )
        // Notifications
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", put(mark_all_notifications_read))
        .route("/notifications/{id}/read", put(mark_notification_read))
        // Activities
        .route("/activities", get(list_activities))
        // Providers
        .route("/providers", get(list_providers))
        .route("/providers/public/featured", get(featured_providers))
        .route("/providers/{id}", get(get_provider))
        // Platform
        .route("/platform/stats", get(platform_stats))
        .route("/platform/settings", get(platform_settings))
        // Realtime
        .route("/realtime", get(realtime))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
