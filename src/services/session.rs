// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration, login and token refresh.

use crate::error::AppError;
use crate::models::{User, UserChanges};
use crate::services::identity::user_for_claims;
use crate::services::tokens::{TokenPair, TokenType};
use crate::AppState;
use chrono::Utc;

/// Provider name stored on accounts created through Google sign-in.
pub const GOOGLE_PROVIDER: &str = "google";

/// Create a password-based account.
pub async fn register(
    state: &AppState,
    email: String,
    password: String,
    full_name: Option<String>,
) -> Result<User, AppError> {
    // Skip the hashing work for an obvious duplicate
    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let hash = state.passwords.hash_async(password).await?;
    let user = User::with_password(email, hash, full_name);
    state.db.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Registered user");
    Ok(user)
}

/// Check credentials and issue a token pair.
///
/// Unknown email and wrong password produce the same error and take
/// about the same time.
pub async fn login(state: &AppState, email: &str, password: String) -> Result<TokenPair, AppError> {
    let user = state.db.find_user_by_email(email).await?;
    let stored_hash = user.as_ref().and_then(|u| u.password_hash.clone());

    let matches = state.passwords.verify_async(password, stored_hash).await?;

    let user = match user {
        Some(user) if matches => user,
        _ => {
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(state.tokens.issue_pair(&user.email)?)
}

/// Exchange a refresh token for a new pair.
///
/// The user must still exist and the token must postdate any revocation.
/// Previously issued access tokens are unaffected.
pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<TokenPair, AppError> {
    let claims = state
        .tokens
        .verify(refresh_token, Some(TokenType::Refresh))
        .map_err(|e| {
            tracing::debug!(reason = %e, "Refresh token rejected");
            AppError::from(e)
        })?;

    let user = user_for_claims(state.db.as_ref(), &claims).await?;

    tracing::debug!(user_id = %user.id, "Rotated token pair");
    Ok(state.tokens.issue_pair(&user.email)?)
}

/// Sign in with a Google ID token, creating or linking the account.
pub async fn login_with_google(state: &AppState, id_token: &str) -> Result<TokenPair, AppError> {
    let Some(verifier) = state.google_verifier.as_ref() else {
        return Err(AppError::BadRequest(
            "Google sign-in is not configured".to_string(),
        ));
    };

    let identity = verifier.verify_id_token(id_token).await?;

    let user = if let Some(user) = state
        .db
        .find_user_by_oauth(GOOGLE_PROVIDER, &identity.subject)
        .await?
    {
        user
    } else if let Some(existing) = state.db.find_user_by_email(&identity.email).await? {
        let link = UserChanges {
            oauth_provider: Some(GOOGLE_PROVIDER.to_string()),
            oauth_id: Some(identity.subject.clone()),
            ..Default::default()
        };
        let linked = state
            .db
            .update_user(existing.id, link)
            .await?
            .ok_or(AppError::UserNotFound)?;
        tracing::info!(user_id = %linked.id, "Linked Google account");
        linked
    } else {
        let user = User::with_oauth(
            identity.email,
            identity.name,
            GOOGLE_PROVIDER,
            identity.subject,
        );
        state.db.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, "Registered user via Google");
        user
    };

    Ok(state.tokens.issue_pair(&user.email)?)
}

/// Invalidate every token issued to `user` up to now.
pub async fn revoke_tokens(state: &AppState, user: &User) -> Result<(), AppError> {
    let changes = UserChanges {
        tokens_valid_after: Some(Utc::now()),
        ..Default::default()
    };
    state
        .db
        .update_user(user.id, changes)
        .await?
        .ok_or(AppError::UserNotFound)?;

    tracing::info!(user_id = %user.id, "Revoked all tokens");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryDb;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Config::test_default(), Arc::new(MemoryDb::new()), None)
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = state();
        let user = register(&state, "a@example.com".into(), "password123".into(), None)
            .await
            .unwrap();
        assert_ne!(user.password_hash.as_deref(), Some("password123"));

        let pair = login(&state, "a@example.com", "password123".into())
            .await
            .unwrap();
        let claims = state
            .tokens
            .verify(&pair.access_token, Some(TokenType::Access))
            .unwrap();
        assert_eq!(claims.sub, "a@example.com");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let state = state();
        register(&state, "a@example.com".into(), "password123".into(), None)
            .await
            .unwrap();

        let wrong = login(&state, "a@example.com", "nope".into()).await.unwrap_err();
        let unknown = login(&state, "b@example.com", "password123".into())
            .await
            .unwrap_err();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn oauth_only_account_cannot_use_password() {
        let state = state();
        let user = User::with_oauth("g@example.com".into(), None, GOOGLE_PROVIDER, "123".into());
        state.db.insert_user(&user).await.unwrap();

        assert!(matches!(
            login(&state, "g@example.com", "".into()).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn refresh_requires_live_user() {
        let state = state();
        let user = register(&state, "a@example.com".into(), "password123".into(), None)
            .await
            .unwrap();
        let pair = state.tokens.issue_pair(&user.email).unwrap();

        let rotated = refresh(&state, &pair.refresh_token).await.unwrap();
        assert_eq!(rotated.token_type, "bearer");

        assert!(matches!(
            refresh(&state, &pair.access_token).await,
            Err(AppError::InvalidToken)
        ));

        state.db.delete_user(user.id).await.unwrap();
        assert!(matches!(
            refresh(&state, &pair.refresh_token).await,
            Err(AppError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn google_sign_in_requires_configuration() {
        let state = state();
        assert!(matches!(
            login_with_google(&state, "whatever").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
