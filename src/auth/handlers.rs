use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    routing::{delete, get, post},
    Router,
};
use tracing::{info, instrument, warn};

use super::dto::{CreateUserRequest, LoginRequest, PublicUser};
use super::extractors::{AuthSession, SignedToken, AUTH_HEADER};
use super::password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN};
use super::repo::User;
use super::sessions::{self, RevokeOutcome};
use super::token::{TokenKeys, AUTH_SCOPE};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/login", post(login))
        .route("/users/me", get(me))
        .route("/users/me/token", delete(logout))
}

fn auth_header(token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(token)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("token not header-safe: {e}")))?;
    headers.insert(HeaderName::from_static(AUTH_HEADER), value);
    Ok(headers)
}

/// Sign a fresh token for the user and record it in the session registry.
/// The registry insert must land before the response is sent, otherwise the
/// client would hold a token its first request rejects.
async fn open_session(state: &AppState, user_id: uuid::Uuid) -> Result<String, ApiError> {
    let keys = TokenKeys::from_ref(state);
    let token = keys.sign(user_id, AUTH_SCOPE).map_err(ApiError::Internal)?;
    sessions::register(&state.db, user_id, AUTH_SCOPE, &token).await?;
    Ok(token)
}

#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(HeaderMap, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    // A concurrent insert still trips the unique index and maps to Conflict.
    let user = User::create(&state.db, &payload.email, &hash).await?;

    let token = open_session(&state, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((auth_header(&token)?, Json(PublicUser::from(&user))))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password must be indistinguishable.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::InvalidCredentials
        })?;

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = open_session(&state, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((auth_header(&token)?, Json(PublicUser::from(&user))))
}

#[instrument(skip(session))]
async fn me(session: AuthSession) -> Json<PublicUser> {
    Json(PublicUser::from(&session.user))
}

#[instrument(skip(state, signed))]
async fn logout(
    State(state): State<AppState>,
    signed: SignedToken,
) -> Result<(), ApiError> {
    match sessions::revoke(&state.db, signed.user_id, &signed.token).await? {
        RevokeOutcome::Revoked => {
            info!(user_id = %signed.user_id, "session revoked");
            Ok(())
        }
        RevokeOutcome::NotFound => {
            warn!(user_id = %signed.user_id, "logout token not in registry");
            Err(ApiError::Validation("token not found".into()))
        }
    }
}
