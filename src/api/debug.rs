// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token diagnostics, compiled only with the `debug-endpoints` feature.
//!
//! Unlike the gate these endpoints report the failure kind, so they must
//! never be enabled in production builds.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{
    auth::{AuthError, BearerToken, ClaimSet},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct TokenDiagnostics {
    /// "valid" or "invalid"
    pub status: &'static str,
    pub token_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<ClaimSet>,
}

impl TokenDiagnostics {
    fn from_result(token_length: usize, result: Result<ClaimSet, AuthError>) -> Self {
        match result {
            Ok(claims) => Self {
                status: "valid",
                token_length,
                error_kind: None,
                user_info: Some(claims),
            },
            Err(e) => Self {
                status: "invalid",
                token_length,
                error_kind: Some(e.kind()),
                user_info: None,
            },
        }
    }
}

fn bearer(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
    BearerToken::from_headers(headers)?.ok_or(AuthError::MissingCredential)
}

/// Resolve the caller's token through the userinfo endpoint.
pub async fn userinfo_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<TokenDiagnostics> {
    let token = match bearer(&headers) {
        Ok(token) => token,
        Err(e) => return Json(TokenDiagnostics::from_result(0, Err(e))),
    };
    tracing::info!(token = %token, len = token.len(), "debug: userinfo lookup");
    let result = state.provider.fetch_user_info(&token).await;
    Json(TokenDiagnostics::from_result(token.len(), result))
}

/// Run the caller's token through local verification.
pub async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<TokenDiagnostics> {
    let token = match bearer(&headers) {
        Ok(token) => token,
        Err(e) => return Json(TokenDiagnostics::from_result(0, Err(e))),
    };
    tracing::info!(token = %token, len = token.len(), "debug: verifying frontend token");
    let result = state.provider.verify(&token).await;
    Json(TokenDiagnostics::from_result(token.len(), result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_report_error_kind() {
        let diagnostics = TokenDiagnostics::from_result(12, Err(AuthError::ExpiredToken));
        assert_eq!(diagnostics.status, "invalid");
        assert_eq!(diagnostics.error_kind, Some("expired_token"));
        assert_eq!(diagnostics.token_length, 12);
    }
}
