use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

/// The only access scope issued by this service.
pub const AUTH_SCOPE: &str = "auth";

/// Payload signed into every issued token. `iat` is recorded so that
/// successive logins produce distinct token strings, but it is never
/// validated: tokens do not expire, and session liveness is decided by
/// the registry instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub access: String,
    pub iat: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// HMAC signing/verification keys derived from the server-wide secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_secret(&state.config.auth.secret)
    }
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: Uuid, access: &str) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            access: access.to_string(),
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, access, "token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;
        debug!(user_id = %data.claims.sub, access = %data.claims.access, "token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = TokenKeys::from_secret("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, AUTH_SCOPE).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.access, AUTH_SCOPE);
    }

    #[test]
    fn verify_rejects_foreign_secret() {
        let ours = TokenKeys::from_secret("dev-secret");
        let theirs = TokenKeys::from_secret("another-secret");
        let token = theirs.sign(Uuid::new_v4(), AUTH_SCOPE).expect("sign");
        assert_eq!(
            ours.verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = TokenKeys::from_secret("dev-secret");
        assert_eq!(keys.verify("not-a-token").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let keys = TokenKeys::from_secret("dev-secret");
        let token = keys.sign(Uuid::new_v4(), AUTH_SCOPE).expect("sign");
        // Swap the payload segment for one signed under a different user.
        let other = keys.sign(Uuid::new_v4(), AUTH_SCOPE).expect("sign");
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(keys.verify(&spliced).is_err());
    }
}
