use std::{env, net::SocketAddr};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub cookie_secret: String,
    pub session_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://travel.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-travel-journal-cookie-secret".to_string());

        let session_ttl_days = match env::var("SESSION_TTL_DAYS") {
            Ok(raw) => parse_ttl_days(&raw)?,
            Err(_) => 30,
        };

        Ok(Self {
            database_url,
            listen_addr,
            cookie_secret,
            session_ttl_days,
        })
    }
}

fn parse_ttl_days(raw: &str) -> Result<i64, AppError> {
    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|err| AppError::Config(format!("invalid SESSION_TTL_DAYS: {err}")))?;
    if days <= 0 {
        return Err(AppError::Config(
            "SESSION_TTL_DAYS must be a positive number of days".into(),
        ));
    }
    Ok(days)
}
