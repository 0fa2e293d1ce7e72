//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use fixlane_domain::user::RoleSet;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

pub const X_FIXLANE_USER_ID: &str = "x-fixlane-user-id";
pub const X_FIXLANE_USER_ROLES: &str = "x-fixlane-user-roles";

/// Caller identity injected by the gateway via `x-fixlane-user-id` and
/// `x-fixlane-user-roles` (comma-separated, e.g. `owner,provider`).
///
/// Returns 401 if either header is absent or malformed. An empty roles
/// header is accepted and yields an empty [`RoleSet`]. Capability checks
/// (403) are done by usecases after extraction.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub roles: RoleSet,
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 declares this as `fn -> impl Future + Send`. Values are read
    // synchronously so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .headers
            .get(X_FIXLANE_USER_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        let roles = parts
            .headers
            .get(X_FIXLANE_USER_ROLES)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| match s.parse::<RoleSet>() {
                Ok(roles) => Some(roles),
                Err(e) => {
                    tracing::debug!(error = %e, "rejecting malformed roles header");
                    None
                }
            });

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let roles = roles.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { user_id, roles })
        }
    }
}
