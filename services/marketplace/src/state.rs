use sea_orm::DatabaseConnection;

use crate::domain::types::PlatformSettings;
use crate::infra::db::{
    DbActivityRepository, DbJobRepository, DbMaintenanceRepository, DbMessageRepository,
    DbNotificationRepository, DbPaymentRepository, DbPlatformStatsRepository, DbQuoteRepository,
    DbRequestRepository, DbUserRepository, DbVehicleRepository,
};
use crate::infra::realtime::RealtimeHub;
use crate::infra::stripe::StripeGateway;
use crate::usecase::notifications::Notifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: StripeGateway,
    pub realtime: RealtimeHub,
    pub settings: PlatformSettings,
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn vehicle_repo(&self) -> DbVehicleRepository {
        DbVehicleRepository {
            db: self.db.clone(),
        }
    }

    pub fn maintenance_repo(&self) -> DbMaintenanceRepository {
        DbMaintenanceRepository {
            db: self.db.clone(),
        }
    }

    pub fn request_repo(&self) -> DbRequestRepository {
        DbRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn quote_repo(&self) -> DbQuoteRepository {
        DbQuoteRepository {
            db: self.db.clone(),
        }
    }

    pub fn job_repo(&self) -> DbJobRepository {
        DbJobRepository {
            db: self.db.clone(),
        }
    }

    pub fn payment_repo(&self) -> DbPaymentRepository {
        DbPaymentRepository {
            db: self.db.clone(),
        }
    }

    pub fn message_repo(&self) -> DbMessageRepository {
        DbMessageRepository {
            db: self.db.clone(),
        }
    }

    pub fn notification_repo(&self) -> DbNotificationRepository {
        DbNotificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn activity_repo(&self) -> DbActivityRepository {
        DbActivityRepository {
            db: self.db.clone(),
        }
    }

    pub fn stats_repo(&self) -> DbPlatformStatsRepository {
        DbPlatformStatsRepository {
            db: self.db.clone(),
        }
    }

    pub fn notifier(&self) -> Notifier<DbNotificationRepository, RealtimeHub> {
        Notifier {
            repo: self.notification_repo(),
            realtime: self.realtime.clone(),
        }
    }
}
