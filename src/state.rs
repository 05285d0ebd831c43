use std::sync::Arc;

use sqlx::PgPool;

use crate::repos::user_repo::UserStore;
use crate::services::auth::session::SessionManager;
use crate::services::auth::token_service::TokenService;

/// Shared application context. Clone-cheap: everything inside is an Arc or
/// otherwise cheap to clone, and nothing is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(
        db: PgPool,
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        sessions: SessionManager,
    ) -> Self {
        Self {
            db,
            users,
            tokens,
            sessions,
        }
    }
}
