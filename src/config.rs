use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres when set, the in-memory store otherwise.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    /// JSON array of foods loaded into the in-memory store at startup.
    pub foods_seed_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutrilog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutrilog-users".into()),
        };
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let foods_seed_path = std::env::var("FOODS_SEED_PATH").ok().map(PathBuf::from);
        Ok(Self {
            database_url,
            db_max_connections,
            jwt,
            foods_seed_path,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
            },
            foods_seed_path: None,
        }
    }
}
