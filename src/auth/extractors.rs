use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::repo::User;
use super::sessions;
use super::token::{TokenKeys, AUTH_SCOPE};
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "x-auth";

fn header_token(parts: &Parts) -> Result<String, ApiError> {
    parts
        .headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or(ApiError::Unauthenticated)
}

/// Fully-authenticated request identity: the token verified, the session is
/// live in the registry, and the user record still exists.
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = header_token(parts)?;

        let keys = TokenKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "rejected token");
            ApiError::Unauthenticated
        })?;
        if claims.access != AUTH_SCOPE {
            warn!(access = %claims.access, "unexpected token scope");
            return Err(ApiError::Unauthenticated);
        }

        // The registry, not the signature, decides session liveness.
        let active = sessions::is_active(&state.db, claims.sub, &token)
            .await
            .map_err(ApiError::from)?;
        if !active {
            warn!(user_id = %claims.sub, "token not in session registry");
            return Err(ApiError::Unauthenticated);
        }

        let user = User::find_by_id(&state.db, claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(AuthSession { user, token })
    }
}

/// Identity proven by signature alone, without the registry-liveness check.
///
/// Used by logout: a token that was already revoked must reach the registry
/// and fail there with a 400, rather than being turned away with a 401.
pub struct SignedToken {
    pub user_id: Uuid,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for SignedToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = header_token(parts)?;

        let keys = TokenKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "rejected token");
            ApiError::Unauthenticated
        })?;
        if claims.access != AUTH_SCOPE {
            return Err(ApiError::Unauthenticated);
        }

        Ok(SignedToken {
            user_id: claims.sub,
            token,
        })
    }
}
