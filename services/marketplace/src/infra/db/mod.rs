//! sea-orm implementations of the repository traits.
//!
//! Status changes are conditional updates (`WHERE status IN (...)`); zero
//! affected rows means another writer got there first.

mod activities;
mod jobs;
mod messages;
mod notifications;
mod payments;
mod platform;
mod quotes;
mod requests;
mod users;
mod vehicles;

pub use activities::DbActivityRepository;
pub use jobs::DbJobRepository;
pub use messages::DbMessageRepository;
pub use notifications::DbNotificationRepository;
pub use payments::DbPaymentRepository;
pub use platform::DbPlatformStatsRepository;
pub use quotes::DbQuoteRepository;
pub use requests::DbRequestRepository;
pub use users::DbUserRepository;
pub use vehicles::{DbMaintenanceRepository, DbVehicleRepository};

use std::str::FromStr;

use anyhow::Context as _;
use sea_orm::{DbErr, SqlErr};

use fixlane_domain::UnknownVariant;

/// Decode a stored status or kind string.
fn parse_column<T>(column: &'static str, value: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .with_context(|| format!("decode column {column}"))
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
