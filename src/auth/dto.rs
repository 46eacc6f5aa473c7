use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client. Field names mirror the
/// document-store wire shape clients already expect.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
}

impl From<&crate::auth::repo::User> for PublicUser {
    fn from(user: &crate::auth::repo::User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_wire_shape() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("_id").is_some());
        assert_eq!(value["email"], "test@example.com");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
