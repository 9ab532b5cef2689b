// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! IBM Cloud App ID authentication for the gateway.
//!
//! ## Auth Flow
//!
//! 1. Frontend fetches `/auth/login-url` and sends the user to App ID
//! 2. App ID redirects back to `/auth/callback?code=...`
//! 3. Gateway:
//!    - Exchanges the code at the token endpoint (`exchange`)
//!    - Resolves the user's claims from the userinfo endpoint
//!    - Returns the token pair and claims to the frontend
//! 4. Frontend sends `Authorization: Bearer <access token>` on protected routes
//! 5. Gateway verifies signature, issuer, audience and expiry against the
//!    App ID public keys and hands the [`ClaimSet`] to the handler
//!
//! ## Security
//!
//! - Full tokens, codes and the client secret are never logged
//! - Every credential failure looks the same to the client
//! - Public keys are cached with TTL; tokens and claims are not
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod exchange;
pub mod extractor;
pub mod identity;
pub mod jwks;
pub mod middleware;
pub mod provider;
pub mod token;
pub mod verifier;

pub use claims::ClaimSet;
pub use error::{AuthError, Rejected};
pub use exchange::{AuthorizationExchanger, TokenPair};
pub use extractor::Auth;
pub use identity::IdentityProvider;
pub use jwks::JwksManager;
pub use middleware::require_auth;
pub use provider::ProviderEndpoints;
pub use token::BearerToken;
pub use verifier::TokenVerifier;
