//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier (also used as document ID)
    pub id: Uuid,
    /// Login email, unique and case-sensitive as stored
    pub email: String,
    /// bcrypt hash; `None` for OAuth-only accounts
    pub password_hash: Option<String>,
    /// Display name
    pub full_name: Option<String>,
    /// OAuth provider name, e.g. "google"
    pub oauth_provider: Option<String>,
    /// Provider-assigned account ID
    pub oauth_id: Option<String>,
    /// Tokens issued at or before this instant are rejected
    #[serde(default)]
    pub tokens_valid_after: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// New password-based account.
    pub fn with_password(email: String, password_hash: String, full_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash: Some(password_hash),
            full_name,
            oauth_provider: None,
            oauth_id: None,
            tokens_valid_after: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// New OAuth-only account (no password).
    pub fn with_oauth(
        email: String,
        full_name: Option<String>,
        provider: &str,
        oauth_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash: None,
            full_name,
            oauth_provider: Some(provider.to_string()),
            oauth_id: Some(oauth_id),
            tokens_valid_after: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Whether a token issued at `issued_at_micros` predates the revocation cutoff.
    pub fn is_token_revoked(&self, issued_at_micros: i64) -> bool {
        self.tokens_valid_after
            .is_some_and(|cutoff| issued_at_micros <= cutoff.timestamp_micros())
    }
}

/// Self-service changes to a user record. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
    pub tokens_valid_after: Option<DateTime<Utc>>,
}

impl UserChanges {
    /// Apply the changes to `user`, stamping `updated_at`.
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(provider) = self.oauth_provider {
            user.oauth_provider = Some(provider);
        }
        if let Some(oauth_id) = self.oauth_id {
            user.oauth_id = Some(oauth_id);
        }
        if let Some(cutoff) = self.tokens_valid_after {
            user.tokens_valid_after = Some(cutoff);
        }
        user.updated_at = Some(Utc::now());
    }
}
