use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tracing::warn;

const DEV_SECRET: &str = "dev-secret-change-me";

/// Everything deployment-specific, resolved once at startup. The route set
/// itself never branches on the environment.
pub struct Config {
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub addr: SocketAddr,
    /// Explicit allow-list; `None` means permissive CORS.
    pub cors_origins: Option<Vec<HeaderValue>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_path: PathBuf = std::env::var("CRECHE_DB_PATH")
            .unwrap_or_else(|_| "creche.db".into())
            .into();

        let jwt_secret = std::env::var("CRECHE_JWT_SECRET").unwrap_or_default();
        let jwt_secret = if jwt_secret.is_empty() || jwt_secret == DEV_SECRET {
            if std::env::var("CRECHE_ENV").as_deref() == Ok("production") {
                anyhow::bail!("CRECHE_JWT_SECRET must be set to a real secret in production");
            }
            warn!("CRECHE_JWT_SECRET unset; using the development secret");
            DEV_SECRET.to_string()
        } else {
            jwt_secret
        };

        let host = std::env::var("CRECHE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("CRECHE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("CRECHE_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("CRECHE_HOST/CRECHE_PORT do not form a valid address")?;

        let cors_origins = match std::env::var("CRECHE_CORS_ORIGINS") {
            Ok(list) if !list.trim().is_empty() => {
                let origins = list
                    .split(',')
                    .map(|origin| {
                        origin
                            .trim()
                            .parse::<HeaderValue>()
                            .with_context(|| format!("invalid CORS origin '{}'", origin.trim()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Some(origins)
            }
            _ => None,
        };

        Ok(Self {
            db_path,
            jwt_secret,
            addr,
            cors_origins,
        })
    }
}
