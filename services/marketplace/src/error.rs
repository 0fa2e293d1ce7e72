use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use fixlane_core::error::error_response;

/// Marketplace service error variants.
///
/// Messages embed the offending id so clients and logs can correlate.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("user {0} not found")]
    UserNotFound(Uuid),
    #[error("vehicle {0} not found")]
    VehicleNotFound(Uuid),
    #[error("maintenance record {0} not found")]
    MaintenanceRecordNotFound(Uuid),
    #[error("service request {0} not found")]
    RequestNotFound(Uuid),
    #[error("image {0} not found")]
    ImageNotFound(Uuid),
    #[error("quote {0} not found")]
    QuoteNotFound(Uuid),
    #[error("job {0} not found")]
    JobNotFound(Uuid),
    #[error("payment {0} not found")]
    PaymentNotFound(Uuid),
    #[error("notification {0} not found")]
    NotificationNotFound(Uuid),
    #[error("provider {0} not found")]
    ProviderNotFound(Uuid),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("payment already exists for job {0}")]
    PaymentAlreadyExists(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid webhook")]
    WebhookRejected,
    #[error("payment gateway error")]
    PaymentGateway(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::VehicleNotFound(_) => "VEHICLE_NOT_FOUND",
            Self::MaintenanceRecordNotFound(_) => "MAINTENANCE_RECORD_NOT_FOUND",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::ImageNotFound(_) => "IMAGE_NOT_FOUND",
            Self::QuoteNotFound(_) => "QUOTE_NOT_FOUND",
            Self::JobNotFound(_) => "JOB_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            Self::ProviderNotFound(_) => "PROVIDER_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::PaymentAlreadyExists(_) => "PAYMENT_ALREADY_EXISTS",
            Self::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
            Self::Conflict(_) => "CONFLICT",
            Self::WebhookRejected => "WEBHOOK_REJECTED",
            Self::PaymentGateway(_) => "PAYMENT_GATEWAY",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound(_)
            | Self::VehicleNotFound(_)
            | Self::MaintenanceRecordNotFound(_)
            | Self::RequestNotFound(_)
            | Self::ImageNotFound(_)
            | Self::QuoteNotFound(_)
            | Self::JobNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::NotificationNotFound(_)
            | Self::ProviderNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidInput(_)
            | Self::InvalidState(_)
            | Self::PaymentAlreadyExists(_)
            | Self::WebhookRejected => StatusCode::BAD_REQUEST,
            Self::UserAlreadyExists(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::PaymentGateway(e) => {
                tracing::warn!(error = ?e, kind = "PAYMENT_GATEWAY", "payment gateway call failed")
            }
            _ => {}
        }
        error_response(self.status(), self.kind(), self.to_string())
    }
}
