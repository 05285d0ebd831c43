use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::claims::{CapabilitySet, Claims};
use crate::services::auth::roles::{Capability, Role};

/// Authenticated-request context, placed into request extensions by the
/// authentication middleware and handed to handlers through the extractor.
///
/// Handlers never see raw tokens; this is the whole contract between the
/// middleware and the endpoint layer.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub role: Role,
    pub capabilities: CapabilitySet,
}

impl AuthCtx {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.id,
            role: claims.role,
            capabilities: claims.capabilities,
        }
    }

    /// Per-endpoint authorization guard.
    ///
    /// A plain lookup on the token's capability snapshot; denial is 403,
    /// distinct from the middleware's 401. Call before any mutating side
    /// effect.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.capabilities.allows(capability) {
            Ok(())
        } else {
            warn!(user_id = %self.user_id, role = %self.role, capability = %capability, "permission denied");
            Err(AppError::PermissionDenied)
        }
    }
}

impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable on routes behind the authentication middleware; a
        // missing context means the router wiring is wrong.
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .ok_or(AppError::Internal)
    }
}
