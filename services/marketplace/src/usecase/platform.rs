use crate::domain::repository::PlatformStatsRepository;
use crate::domain::types::{PlatformSettings, PlatformStats};
use crate::error::MarketplaceError;

// ── PlatformStats ────────────────────────────────────────────────────────────

pub struct PlatformStatsUseCase<S: PlatformStatsRepository> {
    pub repo: S,
}

impl<S: PlatformStatsRepository> PlatformStatsUseCase<S> {
    pub async fn execute(&self) -> Result<PlatformStats, MarketplaceError> {
        self.repo.stats().await
    }
}

// ── PlatformSettings ─────────────────────────────────────────────────────────

pub struct PlatformSettingsUseCase<'a> {
    pub settings: &'a PlatformSettings,
}

impl PlatformSettingsUseCase<'_> {
    pub fn execute(&self) -> PlatformSettings {
        self.settings.clone()
    }
}
