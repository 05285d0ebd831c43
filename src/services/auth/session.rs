use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use tracing::{debug, error};

use crate::config::Config;
use crate::error::AppError;

pub const ACCESS_COOKIE: &str = "access";
pub const REFRESH_COOKIE: &str = "refresh";

/// Fixed browser-side lifetime of the refresh cookie. Decoupled from the
/// refresh token's embedded expiry; the default token TTL (720 h) keeps the
/// two aligned unless overridden.
const REFRESH_COOKIE_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Writes and clears the session cookie pair.
///
/// Both cookies are `HttpOnly`, path `/`, scoped to the configured domain
/// (host-only when empty), and `Secure` in production.
#[derive(Debug, Clone)]
pub struct SessionManager {
    domain: String,
    secure: bool,
    access_ttl_seconds: i64,
}

impl SessionManager {
    pub fn new(config: &Config) -> Self {
        Self {
            domain: config.cookie_domain.clone(),
            secure: config.app_env.is_production(),
            access_ttl_seconds: config.access_token_ttl_minutes * 60,
        }
    }

    /// Deliver a session: the access cookie lives as long as the access
    /// token, the refresh cookie for the fixed 30 days.
    pub fn attach(
        &self,
        headers: &mut HeaderMap,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        let access = self.cookie(ACCESS_COOKIE, access_token, self.access_ttl_seconds)?;
        let refresh = self.cookie(REFRESH_COOKIE, refresh_token, REFRESH_COOKIE_TTL_SECONDS)?;

        headers.append(SET_COOKIE, access);
        headers.append(SET_COOKIE, refresh);

        debug!("access and refresh tokens stored in cookies");
        Ok(())
    }

    /// Destroy the session browser-side: both cookies overwritten with empty
    /// values and `Max-Age=0`.
    pub fn invalidate(&self, headers: &mut HeaderMap) -> Result<(), AppError> {
        let access = self.cookie(ACCESS_COOKIE, "", 0)?;
        let refresh = self.cookie(REFRESH_COOKIE, "", 0)?;

        headers.append(SET_COOKIE, access);
        headers.append(SET_COOKIE, refresh);

        debug!("access and refresh token cookies invalidated");
        Ok(())
    }

    fn cookie(&self, name: &str, value: &str, max_age: i64) -> Result<HeaderValue, AppError> {
        let mut cookie = format!("{name}={value}; Max-Age={max_age}; Path=/");
        if !self.domain.is_empty() {
            cookie.push_str("; Domain=");
            cookie.push_str(&self.domain);
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; HttpOnly");

        HeaderValue::from_str(&cookie).map_err(|e| {
            error!(error = %e, cookie = name, "failed to build session cookie");
            AppError::Internal
        })
    }
}
