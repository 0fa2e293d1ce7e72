//! Job domain types and the job state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;
use crate::request::RequestStatus;

/// Lifecycle of a job created from an accepted quote.
///
/// `pending → in_progress → pending_confirmation → completed`, with
/// `cancelled` reachable from any non-terminal state. `pending_confirmation`
/// is where the provider has marked the work done and the owner still has
/// to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    PendingConfirmation,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::PendingConfirmation,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Pending, InProgress)
            | (InProgress, PendingConfirmation)
            | (PendingConfirmation, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// The request status that moves together with this job status, if any.
    pub fn request_status(self) -> Option<RequestStatus> {
        match self {
            Self::InProgress => Some(RequestStatus::InProgress),
            Self::Completed => Some(RequestStatus::Completed),
            Self::Cancelled => Some(RequestStatus::Cancelled),
            Self::Pending | Self::PendingConfirmation => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownVariant::new("job status", other)),
        }
    }
}
