// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Built once at startup and handed to the token service and password
//! hasher. The signing secret never appears in `Debug` output.

use jsonwebtoken::Algorithm;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Minimum length of the HMAC signing secret, in bytes.
pub const MIN_SECRET_KEY_BYTES: usize = 32;

const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;
const DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 7;
/// One day.
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 24 * 60;
/// One year.
pub const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 365;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// GCP project for Firestore; `None` selects the in-memory store
    pub gcp_project_id: Option<String>,
    /// OAuth client ID that Google ID tokens must be issued for
    pub google_client_id: Option<String>,

    // --- Token & password settings ---
    /// JWT signing algorithm (HMAC family only)
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_expire_days: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,

    // --- Secrets ---
    /// JWT signing key (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("frontend_url", &self.frontend_url)
            .field("port", &self.port)
            .field("gcp_project_id", &self.gcp_project_id)
            .field("google_client_id", &self.google_client_id)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("refresh_token_expire_days", &self.refresh_token_expire_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("jwt_signing_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            port: DEFAULT_PORT,
            gcp_project_id: None,
            google_client_id: None,
            jwt_algorithm: Algorithm::HS256,
            access_token_expire_minutes: DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            refresh_token_expire_days: DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS,
            // Lowest cost bcrypt accepts; keeps tests fast.
            bcrypt_cost: 4,
            jwt_signing_key: b"test_jwt_signing_key_at_least_32_bytes!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_signing_key = lookup("SECRET_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?
            .into_bytes();

        if jwt_signing_key.len() < MIN_SECRET_KEY_BYTES {
            return Err(ConfigError::Invalid {
                name: "SECRET_KEY",
                reason: format!("must be at least {MIN_SECRET_KEY_BYTES} bytes"),
            });
        }

        let jwt_algorithm = match lookup("ALGORITHM") {
            Some(raw) => parse_hmac_algorithm(raw.trim())?,
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes = parse_bounded(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            MAX_ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        let refresh_token_expire_days = parse_bounded(
            &lookup,
            "REFRESH_TOKEN_EXPIRE_DAYS",
            DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS,
            MAX_REFRESH_TOKEN_EXPIRE_DAYS,
        )?;

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    reason: format!("not a number: {raw}"),
                })?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        reason: "must be between 4 and 31".to_string(),
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            gcp_project_id: lookup("GCP_PROJECT_ID").filter(|v| !v.trim().is_empty()),
            google_client_id: lookup("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            jwt_algorithm,
            access_token_expire_minutes,
            refresh_token_expire_days,
            bcrypt_cost,
            jwt_signing_key,
        })
    }
}

fn parse_hmac_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(raw).map_err(|_| ConfigError::Invalid {
        name: "ALGORITHM",
        reason: format!("unknown algorithm: {raw}"),
    })?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::Invalid {
            name: "ALGORITHM",
            reason: format!("{other:?} requires a key pair; only HS256/HS384/HS512 are supported"),
        }),
    }
}

/// Parse an integer in `1..=max`, or return `default` when unset.
fn parse_bounded<F>(
    lookup: &F,
    name: &'static str,
    default: i64,
    max: i64,
) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("must be an integer between 1 and {max}, got {raw}"),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
