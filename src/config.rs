use std::env;

use anyhow::Context;

use crate::models::theme::ThemeMode;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub identity_jwt_secret: String,
    pub identity_issuer: Option<String>,

    pub default_theme: ThemeMode,
    pub submission_window_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse::<u16>()
                .context("PORT must be a number")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),

            identity_jwt_secret: env::var("IDENTITY_JWT_SECRET")
                .context("IDENTITY_JWT_SECRET must be set")?,
            identity_issuer: env::var("IDENTITY_ISSUER").ok().filter(|s| !s.is_empty()),

            default_theme: env::var("DEFAULT_THEME")
                .unwrap_or_else(|_| "light".into())
                .parse::<ThemeMode>()
                .map_err(|e| anyhow::anyhow!("DEFAULT_THEME: {e}"))?,
            submission_window_ms: env::var("SUBMISSION_WINDOW_MS")
                .unwrap_or_else(|_| "2000".into())
                .parse::<u64>()
                .context("SUBMISSION_WINDOW_MS must be a number")?,
        })
    }

    /// Configuration for tests and local tooling: in-memory store, fixed secret.
    pub fn for_secret(secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:8081".into(),
            identity_jwt_secret: secret.into(),
            identity_issuer: None,
            default_theme: ThemeMode::Light,
            submission_window_ms: 2000,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
