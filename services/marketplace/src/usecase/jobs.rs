use chrono::Utc;
use uuid::Uuid;

use fixlane_domain::activity::{ActivityKind, NotificationKind};
use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::user::{Lens, RoleSet};

use crate::domain::repository::{
    ActivityRepository, JobRepository, NotificationRepository, RealtimePort,
};
use crate::domain::types::Job;
use crate::error::MarketplaceError;
use crate::usecase::activities::record_activity;
use crate::usecase::notifications::{NewNotification, Notifier};

/// Load a job the caller participates in.
pub async fn participant_job<J: JobRepository>(
    repo: &J,
    job_id: Uuid,
    user_id: Uuid,
) -> Result<Job, MarketplaceError> {
    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or(MarketplaceError::JobNotFound(job_id))?;
    if !job.is_participant(user_id) {
        return Err(MarketplaceError::forbidden(
            "only the job's owner and provider can do this",
        ));
    }
    Ok(job)
}

// ── ListJobs ─────────────────────────────────────────────────────────────────

pub struct ListJobsUseCase<J: JobRepository> {
    pub repo: J,
}

impl<J: JobRepository> ListJobsUseCase<J> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        roles: RoleSet,
        view: Option<Lens>,
        status: Option<JobStatus>,
        page: PageRequest,
    ) -> Result<Vec<Job>, MarketplaceError> {
        self.repo
            .list(user_id, roles.lens(view), status, page.clamped())
            .await
    }
}

// ── GetJob ───────────────────────────────────────────────────────────────────

pub struct GetJobUseCase<J: JobRepository> {
    pub repo: J,
}

impl<J: JobRepository> GetJobUseCase<J> {
    pub async fn execute(&self, job_id: Uuid, user_id: Uuid) -> Result<Job, MarketplaceError> {
        participant_job(&self.repo, job_id, user_id).await
    }
}

// ── TransitionJob ────────────────────────────────────────────────────────────

/// A status change requested by one of the job's participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Start,
    RequestCompletion,
    ConfirmCompletion,
    Cancel,
}

impl JobAction {
    pub fn target(self) -> JobStatus {
        match self {
            Self::Start => JobStatus::InProgress,
            Self::RequestCompletion => JobStatus::PendingConfirmation,
            Self::ConfirmCompletion => JobStatus::Completed,
            Self::Cancel => JobStatus::Cancelled,
        }
    }

    fn allowed(self, job: &Job, user_id: Uuid) -> bool {
        match self {
            Self::Start | Self::RequestCompletion => job.provider_id == user_id,
            Self::ConfirmCompletion => job.owner_id == user_id,
            Self::Cancel => job.is_participant(user_id),
        }
    }
}

pub struct TransitionJobUseCase<J, A, N, P>
where
    J: JobRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub jobs: J,
    pub activities: A,
    pub notifier: Notifier<N, P>,
}

impl<J, A, N, P> TransitionJobUseCase<J, A, N, P>
where
    J: JobRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub async fn execute(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        action: JobAction,
    ) -> Result<Job, MarketplaceError> {
        let mut job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(MarketplaceError::JobNotFound(job_id))?;
        if !action.allowed(&job, user_id) {
            return Err(MarketplaceError::forbidden(format!(
                "caller may not {action:?} job {job_id}"
            )));
        }
        let target = action.target();
        if !job.status.can_transition_to(target) {
            return Err(MarketplaceError::invalid_state(format!(
                "job {job_id} is {}, cannot move to {target}",
                job.status
            )));
        }

        let now = Utc::now();
        if !self.jobs.transition(&job, target, now).await? {
            return Err(MarketplaceError::invalid_state(format!(
                "job {job_id} changed status concurrently"
            )));
        }
        tracing::info!(%job_id, from = %job.status, to = %target, "job transitioned");

        job.status = target;
        job.updated_at = now;
        match action {
            JobAction::Start => job.started_at = Some(now),
            JobAction::ConfirmCompletion => job.completed_at = Some(now),
            JobAction::RequestCompletion | JobAction::Cancel => {}
        }

        let (recipient, title, message) = match action {
            JobAction::Start => (job.owner_id, "Work started", "Your provider has started the job"),
            JobAction::RequestCompletion => (
                job.owner_id,
                "Please confirm completion",
                "Your provider marked the job as done. Confirm to complete it.",
            ),
            JobAction::ConfirmCompletion => (
                job.provider_id,
                "Job completed",
                "The owner confirmed the job is complete",
            ),
            JobAction::Cancel => (
                job.counterpart(user_id),
                "Job cancelled",
                "The job was cancelled",
            ),
        };
        self.notifier
            .notify(NewNotification {
                user_id: recipient,
                kind: NotificationKind::JobStatusChanged,
                title: title.to_owned(),
                message: message.to_owned(),
                link: Some(format!("/jobs/{job_id}")),
            })
            .await;

        if action == JobAction::ConfirmCompletion {
            record_activity(
                &self.activities,
                job.owner_id,
                ActivityKind::JobCompleted,
                "Job completed".to_owned(),
                Some(job_id),
            )
            .await;
        }
        Ok(job)
    }
}
