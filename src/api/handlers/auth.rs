use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::dto::auth::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, RenewResponse, TokensBody,
    UserSummary,
};
use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::user_repo::NewUser;
use crate::services::auth::password;
use crate::services::auth::roles::Role;
use crate::state::AppState;

/// POST /api/auth/register — create a `user`-role account and open its
/// first session.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    create_account(state, req, Role::User, "User created successfully").await
}

/// POST /api/auth/create-admin — same flow with the `admin` role.
pub async fn create_admin(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    create_account(state, req, Role::Admin, "Admin created successfully").await
}

async fn create_account(
    state: AppState,
    req: RegisterRequest,
    role: Role,
    msg: &'static str,
) -> Result<Response, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let password_hash = password::hash(&req.password)?;
    let user = state
        .users
        .insert(NewUser {
            id: Uuid::new_v4(),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            email: req.email.trim().to_string(),
            password_hash,
            role: role.as_str().to_string(),
        })
        .await?;

    info!(user_id = %user.id, role = %role, "user created");

    let pair = state.tokens.issue_token_pair(user.id, role, Utc::now())?;

    let mut res = (
        StatusCode::OK,
        Json(RegisterResponse {
            error: false,
            msg,
            user: user.id,
        }),
    )
        .into_response();
    state
        .sessions
        .attach(res.headers_mut(), &pair.access, &pair.refresh)?;

    Ok(res)
}

/// POST /api/auth/login — verify credentials and open a session.
///
/// "email not found" and "wrong password" produce the same rejection; the
/// endpoint must not confirm which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let user = state
        .users
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(|| {
            warn!("login attempt for unknown email");
            AppError::InvalidCredentials
        })?;

    // A persisted role outside the registry fails closed before any token
    // can be minted for it.
    let role: Role = user.role.parse()?;

    if !password::verify(&user.password_hash, &req.password) {
        warn!(user_id = %user.id, "password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let pair = state.tokens.issue_token_pair(user.id, role, Utc::now())?;

    info!(user_id = %user.id, "login succeeded");

    let mut res = (
        StatusCode::OK,
        Json(LoginResponse {
            error: false,
            tokens: TokensBody {
                access: pair.access.clone(),
            },
            user: UserSummary {
                id: user.id,
                email: user.email,
                role: user.role,
            },
        }),
    )
        .into_response();
    state
        .sessions
        .attach(res.headers_mut(), &pair.access, &pair.refresh)?;

    Ok(res)
}

/// POST /api/auth/logout — destroy the session browser-side.
pub async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut res = StatusCode::NO_CONTENT.into_response();
    state.sessions.invalidate(res.headers_mut())?;
    Ok(res)
}

/// POST /api/renew-token — explicit re-issue of the whole pair for an
/// authenticated subject; both cookies are replaced.
pub async fn renew_token(
    State(state): State<AppState>,
    ctx: AuthCtx,
) -> Result<Response, AppError> {
    let pair = state
        .tokens
        .issue_token_pair(ctx.user_id, ctx.role, Utc::now())?;

    info!(user_id = %ctx.user_id, "token pair renewed");

    let mut res = (
        StatusCode::OK,
        Json(RenewResponse {
            error: false,
            tokens: TokensBody {
                access: pair.access.clone(),
            },
        }),
    )
        .into_response();
    state
        .sessions
        .attach(res.headers_mut(), &pair.access, &pair.refresh)?;

    Ok(res)
}
