use serde::Deserialize;

/// Settings for the token signer. The secret is the only input: issued
/// tokens never expire, so there is no TTL to configure.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            secret: std::env::var("JWT_SECRET")?,
        };
        Ok(Self { database_url, auth })
    }
}
