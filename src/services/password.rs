// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing with bcrypt.
//!
//! bcrypt only looks at the first 72 bytes of its input. Both hashing and
//! verification truncate to that length explicitly so the behaviour does
//! not depend on how the underlying crate treats longer input.

use std::sync::{Arc, OnceLock};

/// Longest prefix of a password that bcrypt consumes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Fixed input for the dummy hash used on unknown-account logins.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing-equalization";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<PasswordError> for crate::error::AppError {
    fn from(err: PasswordError) -> Self {
        crate::error::AppError::Internal(anyhow::Error::new(err))
    }
}

/// Salted one-way password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<OnceLock<String>>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish()
    }
}

fn truncated(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(truncated(password), self.cost)?)
    }

    /// Check a password against a stored hash.
    ///
    /// A malformed stored hash never matches.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(truncated(password), hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }

    /// Burn the same amount of work as a real verification.
    ///
    /// Used when the account does not exist so response timing does not
    /// reveal whether an email is registered. Always returns `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let dummy = self.dummy_hash.get_or_init(|| {
            bcrypt::hash(DUMMY_PASSWORD, self.cost).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to compute dummy hash");
                String::new()
            })
        });
        let _ = self.verify(password, dummy);
        false
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_async(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    ///
    /// With no stored hash, runs [`verify_dummy`](Self::verify_dummy).
    pub async fn verify_async(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        let matches = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await?;
        Ok(matches)
    }
}
