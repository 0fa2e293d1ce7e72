//! User feed and notification kinds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Category of an append-only activity line in a user's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    VehicleAdded,
    RequestCreated,
    QuoteSubmitted,
    QuoteAccepted,
    JobCompleted,
    PaymentCompleted,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VehicleAdded => "vehicle_added",
            Self::RequestCreated => "request_created",
            Self::QuoteSubmitted => "quote_submitted",
            Self::QuoteAccepted => "quote_accepted",
            Self::JobCompleted => "job_completed",
            Self::PaymentCompleted => "payment_completed",
        }
    }
}

impl FromStr for ActivityKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vehicle_added" => Ok(Self::VehicleAdded),
            "request_created" => Ok(Self::RequestCreated),
            "quote_submitted" => Ok(Self::QuoteSubmitted),
            "quote_accepted" => Ok(Self::QuoteAccepted),
            "job_completed" => Ok(Self::JobCompleted),
            "payment_completed" => Ok(Self::PaymentCompleted),
            other => Err(UnknownVariant::new("activity kind", other)),
        }
    }
}

/// Category of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OnboardingReminder,
    QuoteReceived,
    QuoteAccepted,
    QuoteRejected,
    JobStatusChanged,
    PaymentReceived,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnboardingReminder => "onboarding_reminder",
            Self::QuoteReceived => "quote_received",
            Self::QuoteAccepted => "quote_accepted",
            Self::QuoteRejected => "quote_rejected",
            Self::JobStatusChanged => "job_status_changed",
            Self::PaymentReceived => "payment_received",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onboarding_reminder" => Ok(Self::OnboardingReminder),
            "quote_received" => Ok(Self::QuoteReceived),
            "quote_accepted" => Ok(Self::QuoteAccepted),
            "quote_rejected" => Ok(Self::QuoteRejected),
            "job_status_changed" => Ok(Self::JobStatusChanged),
            "payment_received" => Ok(Self::PaymentReceived),
            other => Err(UnknownVariant::new("notification kind", other)),
        }
    }
}
