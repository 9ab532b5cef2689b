// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the provider's published keys.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::{Map, Value};

use super::{AuthError, BearerToken, ClaimSet, JwksManager};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies App ID access tokens locally: signature, issuer, audience and
/// validity window.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: JwksManager,
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    pub fn new(jwks: JwksManager, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Verify a bearer token and return its normalized claims.
    pub async fn verify(&self, token: &BearerToken) -> Result<ClaimSet, AuthError> {
        tracing::debug!(token = %token, len = token.len(), "verifying bearer token");

        let header = decode_header(token.as_str()).map_err(|_| AuthError::MalformedToken)?;

        let (decoding_key, algorithm) = match &header.kid {
            Some(kid) => self.jwks.get_decoding_key(kid).await?,
            None => self.jwks.get_any_decoding_key().await?,
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Map<String, Value>>(token.as_str(), &decoding_key, &validation)
            .map_err(|e| map_decode_error(e.kind()))?;

        ClaimSet::from_claims(token_data.claims).ok_or(AuthError::MalformedToken)
    }
}

fn map_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => AuthError::MalformedToken,
        other => AuthError::InvalidSignatureOrRejected(format!("{other:?}")),
    }
}
