use uuid::Uuid;

use fixlane_domain::pagination::PageRequest;

use crate::domain::repository::UserRepository;
use crate::domain::types::{FEATURED_PROVIDER_LIMIT, User, non_blank};
use crate::error::MarketplaceError;

// ── ListProviders ────────────────────────────────────────────────────────────

pub struct ListProvidersUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> ListProvidersUseCase<U> {
    pub async fn execute(
        &self,
        service_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError> {
        let service_type = service_type.and_then(non_blank);
        self.repo.list_providers(service_type, page.clamped()).await
    }
}

// ── FeaturedProviders ────────────────────────────────────────────────────────

pub struct FeaturedProvidersUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> FeaturedProvidersUseCase<U> {
    pub async fn execute(&self) -> Result<Vec<User>, MarketplaceError> {
        self.repo
            .list_featured_providers(FEATURED_PROVIDER_LIMIT)
            .await
    }
}

// ── GetProvider ──────────────────────────────────────────────────────────────

pub struct GetProviderUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> GetProviderUseCase<U> {
    /// Users without the provider capability are reported as missing.
    pub async fn execute(&self, id: Uuid) -> Result<User, MarketplaceError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|u| u.roles.is_provider())
            .ok_or(MarketplaceError::ProviderNotFound(id))
    }
}
