use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use fixlane_domain::activity::NotificationKind;
use fixlane_domain::user::{Role, RoleSet};

use crate::domain::repository::{NotificationRepository, RealtimePort, UserRepository};
use crate::domain::types::{ContactUpdate, User, non_blank};
use crate::error::MarketplaceError;
use crate::usecase::notifications::{NewNotification, Notifier};

// ── SyncUser ─────────────────────────────────────────────────────────────────

pub struct SyncUserInput {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
}

/// Creates the marketplace profile for a user registered with the auth
/// provider. Providers start with onboarding incomplete and get a reminder.
pub struct SyncUserUseCase<U: UserRepository, N: NotificationRepository, P: RealtimePort> {
    pub users: U,
    pub notifier: Notifier<N, P>,
}

impl<U: UserRepository, N: NotificationRepository, P: RealtimePort> SyncUserUseCase<U, N, P> {
    pub async fn execute(&self, input: SyncUserInput) -> Result<User, MarketplaceError> {
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(MarketplaceError::invalid_input("email is invalid"));
        }
        let name = non_blank(&input.name)
            .ok_or_else(|| MarketplaceError::invalid_input("name must not be blank"))?
            .to_owned();
        let roles = if input.roles.is_empty() {
            RoleSet::EMPTY.with(Role::Owner)
        } else {
            input.roles
        };

        if self.users.find_by_id(input.id).await?.is_some()
            || self.users.find_by_email(&email).await?.is_some()
        {
            return Err(MarketplaceError::UserAlreadyExists(email));
        }

        let now = Utc::now();
        let user = User {
            id: input.id,
            email,
            name,
            roles,
            phone: None,
            address: None,
            business_name: None,
            service_types: vec![],
            rating: Decimal::ZERO,
            review_count: 0,
            is_verified: false,
            provider_onboarding_complete: false,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;

        if user.roles.is_provider() {
            self.notifier
                .notify(NewNotification {
                    user_id: user.id,
                    kind: NotificationKind::OnboardingReminder,
                    title: "Complete your provider profile".to_owned(),
                    message: "Add your business name and services so owners can find you."
                        .to_owned(),
                    link: Some("/provider/onboarding".to_owned()),
                })
                .await;
        }
        Ok(user)
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, MarketplaceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound(user_id))
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

pub struct UpdateMeUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> UpdateMeUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        update: ContactUpdate,
    ) -> Result<User, MarketplaceError> {
        if update.is_empty() {
            return Err(MarketplaceError::invalid_input(
                "at least one of name, phone, address is required",
            ));
        }
        let name = match update.name {
            Some(ref name) => Some(
                non_blank(name)
                    .ok_or_else(|| MarketplaceError::invalid_input("name must not be blank"))?
                    .to_owned(),
            ),
            None => None,
        };
        let update = ContactUpdate { name, ..update };
        self.repo
            .update_contact(user_id, &update)
            .await?
            .ok_or(MarketplaceError::UserNotFound(user_id))
    }
}

// ── UpdateProviderProfile ────────────────────────────────────────────────────

pub struct ProviderProfileInput {
    pub business_name: String,
    pub service_types: Vec<String>,
}

pub struct UpdateProviderProfileUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> UpdateProviderProfileUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        roles: RoleSet,
        input: ProviderProfileInput,
    ) -> Result<User, MarketplaceError> {
        if !roles.is_provider() {
            return Err(MarketplaceError::forbidden(
                "only providers have a provider profile",
            ));
        }
        let business_name = non_blank(&input.business_name)
            .ok_or_else(|| MarketplaceError::invalid_input("business_name must not be blank"))?;
        let service_types: Vec<String> = input
            .service_types
            .iter()
            .filter_map(|s| non_blank(s))
            .map(str::to_owned)
            .collect();
        if service_types.is_empty() {
            return Err(MarketplaceError::invalid_input(
                "at least one service type is required",
            ));
        }
        self.repo
            .complete_provider_profile(user_id, business_name, &service_types)
            .await?
            .ok_or(MarketplaceError::UserNotFound(user_id))
    }
}
