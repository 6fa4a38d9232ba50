// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed access and refresh tokens.
//!
//! Tokens are HMAC-signed JWTs whose subject is the user's email. Expiry
//! is checked here rather than by `jsonwebtoken` so that it is strict: a
//! token is dead from the second its `exp` is reached, with no leeway.

use crate::config::Config;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user email)
    #[serde(default)]
    pub sub: String,
    pub typ: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issued at, microseconds since the epoch
    pub iat_us: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Response body for login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("expected a {expected:?} token")]
    WrongType { expected: TokenType },
    #[error("token has no subject")]
    MissingSubject,
    #[error("failed to sign token: {0}")]
    Encoding(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            _ => AppError::InvalidToken,
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => TokenError::MissingSubject,
        _ => TokenError::Malformed,
    }
}

/// Issues and verifies tokens with a single HMAC key.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self {
            algorithm: config.jwt_algorithm,
            encoding_key: EncodingKey::from_secret(&config.jwt_signing_key),
            decoding_key: DecodingKey::from_secret(&config.jwt_signing_key),
            // Out-of-range values saturate; issuing then fails instead of panicking
            access_lifetime: Duration::try_minutes(config.access_token_expire_minutes)
                .unwrap_or(Duration::MAX),
            refresh_lifetime: Duration::try_days(config.refresh_token_expire_days)
                .unwrap_or(Duration::MAX),
        }
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    pub fn issue_access(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, TokenType::Access, Utc::now())
    }

    pub fn issue_refresh(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, TokenType::Refresh, Utc::now())
    }

    /// Issue an access/refresh pair for `subject`.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        Ok(TokenPair {
            access_token: self.issue_at(subject, TokenType::Access, now)?,
            token_type: "bearer".to_string(),
            refresh_token: self.issue_at(subject, TokenType::Refresh, now)?,
        })
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        typ: TokenType,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        let lifetime = match typ {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };

        let exp = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenError::Encoding("token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            typ,
            iat: now.timestamp(),
            iat_us: now.timestamp_micros(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token, optionally requiring a specific type.
    pub fn verify(&self, token: &str, expected: Option<TokenType>) -> Result<Claims, TokenError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(
        &self,
        token: &str,
        expected: Option<TokenType>,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(classify)?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        if claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        if let Some(expected) = expected {
            if claims.typ != expected {
                return Err(TokenError::WrongType { expected });
            }
        }

        Ok(claims)
    }
}
