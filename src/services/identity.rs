// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map a bearer token to the user it was issued for.

use crate::db::Store;
use crate::error::AppError;
use crate::models::User;
use crate::services::tokens::{Claims, TokenService, TokenType};

/// Load the user named by verified `claims`, honouring revocation.
pub async fn user_for_claims(db: &dyn Store, claims: &Claims) -> Result<User, AppError> {
    let Some(user) = db.find_user_by_email(&claims.sub).await? else {
        tracing::debug!("Token subject has no account");
        return Err(AppError::UserNotFound);
    };

    if user.is_token_revoked(claims.iat_us) {
        tracing::debug!(user_id = %user.id, "Token issued before revocation cutoff");
        return Err(AppError::InvalidToken);
    }

    Ok(user)
}

/// Resolve an access token to its user.
pub async fn resolve_identity(
    tokens: &TokenService,
    db: &dyn Store,
    token: &str,
) -> Result<User, AppError> {
    let claims = tokens
        .verify(token, Some(TokenType::Access))
        .map_err(|e| {
            tracing::debug!(reason = %e, "Access token rejected");
            AppError::from(e)
        })?;

    user_for_claims(db, &claims).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryDb;
    use crate::models::UserChanges;
    use chrono::{Duration, Utc};

    async fn setup() -> (TokenService, MemoryDb, User) {
        let tokens = TokenService::new(&Config::test_default());
        let db = MemoryDb::new();
        let user = User::with_password("alice@example.com".into(), "$2b$04$x".into(), None);
        db.insert_user(&user).await.unwrap();
        (tokens, db, user)
    }

    #[tokio::test]
    async fn resolves_access_token() {
        let (tokens, db, user) = setup().await;
        let token = tokens.issue_access(&user.email).unwrap();

        let resolved = resolve_identity(&tokens, &db, &token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_identity() {
        let (tokens, db, user) = setup().await;
        let token = tokens.issue_refresh(&user.email).unwrap();

        let err = resolve_identity(&tokens, &db, &token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn unknown_subject() {
        let (tokens, db, _) = setup().await;
        let token = tokens.issue_access("nobody@example.com").unwrap();

        let err = resolve_identity(&tokens, &db, &token).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[tokio::test]
    async fn revoked_token_rejected() {
        let (tokens, db, user) = setup().await;
        let issued = Utc::now() - Duration::seconds(10);
        let old = tokens
            .issue_at(&user.email, TokenType::Access, issued)
            .unwrap();

        let cutoff = UserChanges {
            tokens_valid_after: Some(issued),
            ..Default::default()
        };
        db.update_user(user.id, cutoff).await.unwrap();

        // Issued exactly at the cutoff counts as revoked
        let err = resolve_identity(&tokens, &db, &old).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));

        let fresh = tokens.issue_access(&user.email).unwrap();
        assert!(resolve_identity(&tokens, &db, &fresh).await.is_ok());
    }
}
