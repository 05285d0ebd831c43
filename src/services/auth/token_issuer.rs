use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use sha2::{Digest, Sha256};
use tracing::error;
use uuid::Uuid;

use crate::services::auth::AuthError;
use crate::services::auth::claims::{CapabilitySet, Claims};
use crate::services::auth::roles::Role;

/// Signed access token together with the claims it embeds, so callers on the
/// rotation path don't have to re-parse what they just minted.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues HS256-signed access tokens carrying the full capability snapshot.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding_key: EncodingKey,
    ttl_minutes: i64,
}

impl std::fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of Debug output.
        f.debug_struct("AccessTokenIssuer")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl AccessTokenIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Issue an access token for `subject` with the capability snapshot
    /// derived from `role` and `exp = now + ttl`.
    ///
    /// `role` is already a parsed enum here; the fail-closed rejection of
    /// unknown role strings happens where untrusted strings enter
    /// (`Role::from_str`), before issuance can be reached.
    pub fn issue(
        &self,
        subject: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedAccessToken, AuthError> {
        let exp = (now + ChronoDuration::minutes(self.ttl_minutes)).timestamp();

        let claims = Claims {
            id: subject,
            role,
            exp,
            capabilities: CapabilitySet::for_role(role),
        };

        let header = Header::new(Algorithm::HS256);
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            AuthError::Signing
        })?;

        Ok(IssuedAccessToken { token, claims })
    }
}

/// Issues opaque refresh tokens, structurally `<hex-digest>.<expiry-epoch>`.
///
/// The digest is a keyed one-way hash over a random nonce; it embeds no
/// identity and cannot be validated beyond its expiry segment. Possession of
/// an unexpired refresh token is purely "permission to renew" — identity
/// always comes from the access token's claims.
#[derive(Clone)]
pub struct RefreshTokenIssuer {
    refresh_key: String,
    ttl_hours: i64,
}

impl std::fmt::Debug for RefreshTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenIssuer")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl RefreshTokenIssuer {
    pub fn new(refresh_key: &str, ttl_hours: i64) -> Self {
        Self {
            refresh_key: refresh_key.to_string(),
            ttl_hours,
        }
    }

    pub fn issue(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        // 32 bytes of entropy per token; rapid back-to-back issuance cannot
        // collide the way a timestamp source could.
        let mut nonce = [0u8; 32];
        getrandom::fill(&mut nonce).map_err(|e| {
            error!(error = %e, "failed to draw refresh-token nonce");
            AuthError::Entropy
        })?;

        let mut hasher = Sha256::new();
        hasher.update(self.refresh_key.as_bytes());
        hasher.update(nonce);
        let digest = hex::encode(hasher.finalize());

        let exp = (now + ChronoDuration::hours(self.ttl_hours)).timestamp();
        Ok(format!("{digest}.{exp}"))
    }
}
