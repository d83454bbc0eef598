use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{HandlerError, Result};

pub const DEFAULT_PUBLIC_URL_BASE: &str = "https://s3.amazonaws.com";
pub const DEFAULT_JPEG_QUALITY: u8 = 75;
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Environment variables as the Lambda sees them. Field names map to the
/// upper-cased variable names (`target_bucket` <- `TARGET_BUCKET`).
#[derive(Debug, Deserialize)]
struct RawConfig {
    target_bucket: String,
    public_url_base: Option<String>,
    jpeg_quality: Option<u8>,
    db_host: Option<String>,
    db_port: Option<u16>,
    db_user: Option<String>,
    db_pass: Option<SecretString>,
    db_name: Option<String>,
}

/// Connection settings for the `uploads` table. Present only when `DB_HOST`
/// is set, which switches the handler into recording mode.
#[derive(Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
}

#[derive(Debug)]
pub struct HandlerConfig {
    pub target_bucket: String,
    pub public_url_base: String,
    pub jpeg_quality: u8,
    pub database: Option<DatabaseConfig>,
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_iter(std::env::vars())
    }

    pub fn from_iter<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw = envy::from_iter::<_, RawConfig>(vars).map_err(|e| HandlerError::Config(e.to_string()))?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        if raw.target_bucket.trim().is_empty() {
            return Err(HandlerError::Config("TARGET_BUCKET must not be empty".to_string()));
        }

        let jpeg_quality = raw.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY);
        if !(1..=100).contains(&jpeg_quality) {
            return Err(HandlerError::Config(format!(
                "JPEG_QUALITY must be within 1..=100, got {jpeg_quality}"
            )));
        }

        let public_url_base = raw
            .public_url_base
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let database = match raw.db_host.filter(|host| !host.is_empty()) {
            None => None,
            Some(host) => Some(DatabaseConfig {
                host,
                port: raw.db_port.unwrap_or(DEFAULT_DB_PORT),
                user: required("DB_USER", raw.db_user)?,
                password: raw
                    .db_pass
                    .ok_or_else(|| HandlerError::Config("DB_PASS is required when DB_HOST is set".to_string()))?,
                name: required("DB_NAME", raw.db_name)?,
            }),
        };

        Ok(Self {
            target_bucket: raw.target_bucket,
            public_url_base,
            jpeg_quality,
            database,
        })
    }
}

fn required(var: &str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| HandlerError::Config(format!("{var} is required when DB_HOST is set")))
}
