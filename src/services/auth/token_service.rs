use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::repos::user_repo::UserStore;
use crate::services::auth::claims::Claims;
use crate::services::auth::roles::Role;
use crate::services::auth::token_issuer::{AccessTokenIssuer, RefreshTokenIssuer};
use crate::services::auth::token_parser::{TokenParser, parse_refresh_expiry};

/// Access/refresh pair delivered together as one session.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Outcome of a successful pass through the request-time state machine.
#[derive(Debug, Clone)]
pub enum Authenticated {
    /// Access token valid as presented.
    Valid { claims: Claims },

    /// Access token expired but the refresh token still authorized a
    /// renewal: a brand-new access token was minted and must be re-attached
    /// to the response. The refresh token is carried over unchanged.
    Rotated { claims: Claims, access_token: String },
}

impl Authenticated {
    pub fn claims(&self) -> &Claims {
        match self {
            Authenticated::Valid { claims } => claims,
            Authenticated::Rotated { claims, .. } => claims,
        }
    }
}

/// Orchestrates token issuance and the per-request authenticate/rotate
/// decision.
///
/// Holds no mutable state; every operation is a pure function of its inputs
/// plus the injected configuration, except the rotation path's user lookup,
/// which goes through the `UserStore` seam.
#[derive(Clone)]
pub struct TokenService {
    access_issuer: AccessTokenIssuer,
    refresh_issuer: RefreshTokenIssuer,
    parser: TokenParser,
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_issuer", &self.access_issuer)
            .field("refresh_issuer", &self.refresh_issuer)
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &Config, users: Arc<dyn UserStore>) -> Self {
        Self {
            access_issuer: AccessTokenIssuer::new(
                &config.jwt_secret_key,
                config.access_token_ttl_minutes,
            ),
            refresh_issuer: RefreshTokenIssuer::new(
                &config.jwt_refresh_key,
                config.refresh_token_ttl_hours,
            ),
            parser: TokenParser::new(&config.jwt_secret_key),
            users,
        }
    }

    /// Issue a fresh session for an authenticated subject.
    pub fn issue_token_pair(
        &self,
        subject: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let access = self.access_issuer.issue(subject, role, now)?;
        let refresh = self.refresh_issuer.issue(now)?;

        info!(user_id = %subject, role = %role, "issued token pair");
        Ok(TokenPair {
            access: access.token,
            refresh,
        })
    }

    /// The request-time state machine.
    ///
    /// - access parses and `now <= exp`: proceed with its claims.
    /// - access expired, refresh unexpired: look the subject up and mint a
    ///   new access token from the CURRENT persisted role — the stale role
    ///   inside the expired token is never trusted for re-issuance.
    /// - access expired, refresh expired: the session is over.
    ///
    /// Signature/structure failures are never retried, and rotation is
    /// attempted at most once per request. An unparsable refresh token is
    /// malformed client input (401), not a server error.
    pub async fn authenticate(
        &self,
        access_token: &str,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Authenticated, AppError> {
        let claims = self.parser.parse_access_token(access_token).map_err(|e| {
            warn!(error = %e, "access token verification failed");
            AppError::InvalidToken
        })?;

        if !claims.is_expired(now.timestamp()) {
            return Ok(Authenticated::Valid { claims });
        }

        let refresh_exp = parse_refresh_expiry(refresh_token).map_err(|e| {
            warn!(error = %e, "refresh token failed to parse");
            AppError::InvalidToken
        })?;

        if now.timestamp() > refresh_exp {
            debug!(user_id = %claims.id, "refresh token expired, session ended");
            return Err(AppError::SessionEnded);
        }

        self.rotate(&claims, now).await
    }

    /// Mint a replacement access token for the subject of an expired one.
    async fn rotate(&self, expired: &Claims, now: DateTime<Utc>) -> Result<Authenticated, AppError> {
        let user = self
            .users
            .find_by_id(expired.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %expired.id, "subject of expired token no longer exists");
                AppError::SessionEnded
            })?;

        // Re-validate the role from the store. A persisted role outside the
        // registry fails closed as a server fault.
        let role = Role::from_str(&user.role)?;

        let issued = self.access_issuer.issue(user.id, role, now)?;

        info!(user_id = %user.id, role = %role, "rotated access token");
        Ok(Authenticated::Rotated {
            claims: issued.claims,
            access_token: issued.token,
        })
    }
}
