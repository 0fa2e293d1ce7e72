//! Mock auth helpers for integration tests.
//!
//! Services behind the gateway receive `x-fixlane-user-id` and
//! `x-fixlane-user-roles` headers. `MockAuth` builds them directly so no
//! gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use fixlane_auth_types::identity::{X_FIXLANE_USER_ID, X_FIXLANE_USER_ROLES};
use fixlane_domain::user::{Role, RoleSet};
use uuid::Uuid;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub user_id: Uuid,
    pub roles: RoleSet,
}

impl MockAuth {
    pub fn new(user_id: Uuid, roles: RoleSet) -> Self {
        Self { user_id, roles }
    }

    pub fn owner(user_id: Uuid) -> Self {
        Self::new(user_id, RoleSet::EMPTY.with(Role::Owner))
    }

    pub fn provider(user_id: Uuid) -> Self {
        Self::new(user_id, RoleSet::EMPTY.with(Role::Provider))
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, RoleSet::EMPTY.with(Role::Admin))
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_FIXLANE_USER_ID),
            HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
        );
        map.insert(
            HeaderName::from_static(X_FIXLANE_USER_ROLES),
            HeaderValue::from_str(&self.roles.to_string()).unwrap(),
        );
        map
    }
}
