use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::session::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::services::auth::token_service::Authenticated;
use crate::state::AppState;

/// Protect a router subtree with cookie authentication.
///
/// axum 0.8's `from_fn` cannot take a `State` extractor, so the state is
/// passed explicitly via `from_fn_with_state`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authenticate))
}

/// Request-time authentication state machine.
///
/// Reads the `access`/`refresh` cookie pair and either forwards the request
/// with an `AuthCtx` in its extensions, or terminates it:
/// - either cookie absent → 400 (broken transport, no credential presented)
/// - access token fails verification → 401
/// - access expired, refresh live → rotate once, re-attach cookies on the
///   response (refresh carried over unchanged), proceed with the new claims
/// - access expired, refresh expired → 401, session ended
async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());

    let access = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingToken)?;
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingToken)?;

    let outcome = state.tokens.authenticate(&access, &refresh, Utc::now()).await?;

    req.extensions_mut()
        .insert(AuthCtx::from_claims(outcome.claims()));

    match outcome {
        Authenticated::Valid { .. } => Ok(next.run(req).await),
        Authenticated::Rotated { access_token, .. } => {
            let mut res = next.run(req).await;
            state
                .sessions
                .attach(res.headers_mut(), &access_token, &refresh)?;
            Ok(res)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use async_trait::async_trait;
    use axum::{
        Json, Router,
        http::{Request, StatusCode, header},
        routing::{get, post},
    };
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::{AppEnv, Config};
    use crate::repos::error::RepoResult;
    use crate::repos::user_repo::{NewUser, UserRecord, UserStore};
    use crate::services::auth::roles::{Capability, Role};
    use crate::services::auth::session::SessionManager;
    use crate::services::auth::token_service::TokenService;

    struct StubUsers {
        records: Mutex<HashMap<Uuid, UserRecord>>,
    }

    impl StubUsers {
        fn with_user(id: Uuid, role: &str) -> Self {
            let record = UserRecord {
                id,
                first_name: "Test".to_string(),
                last_name: None,
                email: format!("{id}@example.com"),
                password_hash: String::new(),
                role: role.to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            Self {
                records: Mutex::new(HashMap::from([(id, record)])),
            }
        }
    }

    #[async_trait]
    impl UserStore for StubUsers {
        async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
            Ok(self.records.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, user: NewUser) -> RepoResult<UserRecord> {
            let record = UserRecord {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.records
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(record)
        }
    }

    fn test_config() -> Config {
        Config {
            addr: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
            app_env: AppEnv::Development,
            database_url: "postgres://localhost/unused".to_string(),
            cors_allowed_origins: Vec::new(),
            cookie_domain: String::new(),
            jwt_secret_key: "test-secret".to_string(),
            access_token_ttl_minutes: 15,
            jwt_refresh_key: "test-refresh".to_string(),
            refresh_token_ttl_hours: 72,
        }
    }

    fn test_state(users: StubUsers) -> AppState {
        let config = test_config();
        let users: Arc<dyn UserStore> = Arc::new(users);
        let tokens = Arc::new(TokenService::new(&config, Arc::clone(&users)));
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState::new(db, users, tokens, SessionManager::new(&config))
    }

    /// Protected router with one mutating endpoint that records whether its
    /// side effect ran.
    fn test_router(state: AppState, side_effect: Arc<AtomicBool>) -> Router {
        let protected = Router::new()
            .route(
                "/api/whoami",
                get(|ctx: AuthCtx| async move { Json(json!({ "id": ctx.user_id })) }),
            )
            .route(
                "/api/products",
                post(move |ctx: AuthCtx| {
                    let side_effect = Arc::clone(&side_effect);
                    async move {
                        ctx.require(Capability::ProductCreate)?;
                        side_effect.store(true, Ordering::SeqCst);
                        Ok::<_, AppError>(Json(json!({ "error": false })))
                    }
                }),
            );
        apply(protected, state.clone()).with_state(state)
    }

    fn request(path: &str, method: &str, cookies: Option<(&str, &str)>) -> Request<Body> {
        let mut builder = Request::builder().uri(path).method(method);
        if let Some((access, refresh)) = cookies {
            builder = builder.header(header::COOKIE, format!("access={access}; refresh={refresh}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_cookies_are_a_400_not_a_401() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "user"));
        let router = test_router(state, Arc::new(AtomicBool::new(false)));

        let res = router
            .oneshot(request("/api/whoami", "GET", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn garbage_access_token_is_a_401() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "user"));
        let router = test_router(state, Arc::new(AtomicBool::new(false)));

        let res = router
            .oneshot(request("/api/whoami", "GET", Some(("garbage", "digest.123"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_session_reaches_the_handler_with_identity() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "user"));
        let pair = state
            .tokens
            .issue_token_pair(subject, Role::User, Utc::now())
            .unwrap();
        let router = test_router(state, Arc::new(AtomicBool::new(false)));

        let res = router
            .oneshot(request("/api/whoami", "GET", Some((&pair.access, &pair.refresh))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["id"], json!(subject));
    }

    #[tokio::test]
    async fn expired_access_with_live_refresh_rotates_and_reattaches_cookies() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "user"));
        let issued_at = Utc::now() - ChronoDuration::minutes(20);
        let pair = state
            .tokens
            .issue_token_pair(subject, Role::User, issued_at)
            .unwrap();
        let router = test_router(state, Arc::new(AtomicBool::new(false)));

        let res = router
            .oneshot(request("/api/whoami", "GET", Some((&pair.access, &pair.refresh))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let cookies: Vec<String> = res
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);

        // New access token, old refresh token carried over.
        let access_cookie = cookies.iter().find(|c| c.starts_with("access=")).unwrap();
        assert!(!access_cookie.contains(&pair.access));
        let refresh_cookie = cookies.iter().find(|c| c.starts_with("refresh=")).unwrap();
        assert!(refresh_cookie.contains(&pair.refresh));
    }

    #[tokio::test]
    async fn exhausted_session_is_a_401_and_no_cookie_is_set() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "user"));
        let issued_at = Utc::now() - ChronoDuration::hours(100);
        let pair = state
            .tokens
            .issue_token_pair(subject, Role::User, issued_at)
            .unwrap();
        let router = test_router(state, Arc::new(AtomicBool::new(false)));

        let res = router
            .oneshot(request("/api/whoami", "GET", Some((&pair.access, &pair.refresh))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(res).await["msg"], json!("session ended"));
    }

    #[tokio::test]
    async fn capability_denial_is_a_403_and_the_side_effect_never_runs() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "user"));
        let pair = state
            .tokens
            .issue_token_pair(subject, Role::User, Utc::now())
            .unwrap();
        let side_effect = Arc::new(AtomicBool::new(false));
        let router = test_router(state, Arc::clone(&side_effect));

        let res = router
            .oneshot(request("/api/products", "POST", Some((&pair.access, &pair.refresh))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(!side_effect.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn admin_passes_the_same_capability_gate() {
        let subject = Uuid::new_v4();
        let state = test_state(StubUsers::with_user(subject, "admin"));
        let pair = state
            .tokens
            .issue_token_pair(subject, Role::Admin, Utc::now())
            .unwrap();
        let side_effect = Arc::new(AtomicBool::new(false));
        let router = test_router(state, Arc::clone(&side_effect));

        let res = router
            .oneshot(request("/api/products", "POST", Some((&pair.access, &pair.refresh))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(side_effect.load(Ordering::SeqCst));
    }
}
