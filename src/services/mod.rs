// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod access;
pub mod google_oidc;
pub mod identity;
pub mod password;
pub mod session;
pub mod tokens;

pub use google_oidc::{GoogleIdTokenVerifier, GoogleIdentity, OidcError};
pub use identity::resolve_identity;
pub use password::{PasswordError, PasswordHasher};
pub use tokens::{Claims, TokenError, TokenPair, TokenService, TokenType};
