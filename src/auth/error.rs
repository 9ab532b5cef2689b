// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Outward message for every credential failure.
pub const AUTHENTICATION_FAILED: &str = "authentication failed";

/// Outward message for every transport failure.
pub const PROVIDER_UNAVAILABLE: &str = "identity provider unavailable";

/// Failure taxonomy for verification and code exchange.
///
/// Credential errors all render the same outward body; transport errors are
/// kept distinguishable because the caller may retry them. The `String`
/// payloads are diagnostics for logs and never reach the client.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on a protected request
    #[error("authorization header is missing")]
    MissingCredential,

    /// Empty, implausibly shaped or undecodable token
    #[error("token is malformed")]
    MalformedToken,

    /// Validity window has elapsed
    #[error("token has expired")]
    ExpiredToken,

    /// Bad signature, wrong issuer or audience, revoked, or otherwise refused
    #[error("token was rejected: {0}")]
    InvalidSignatureOrRejected(String),

    /// Provider refused the authorization code (used, expired, redirect mismatch)
    #[error("authorization code was rejected: {0}")]
    InvalidOrExpiredCode(String),

    /// Transport failure, timeout or provider-side 5xx
    #[error("identity provider is unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered successfully but the body is unusable
    #[error("identity provider returned a malformed response: {0}")]
    MalformedProviderResponse(String),

    /// Provider refused this gateway's own client credentials
    /// (`invalid_client`, `unauthorized_client`)
    #[error("identity provider rejected the client credentials: {0}")]
    ClientRejected(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

impl AuthError {
    /// Stable identifier used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::ExpiredToken => "expired_token",
            AuthError::InvalidSignatureOrRejected(_) => "invalid_signature_or_rejected",
            AuthError::InvalidOrExpiredCode(_) => "invalid_or_expired_code",
            AuthError::ProviderUnavailable(_) => "provider_unavailable",
            AuthError::MalformedProviderResponse(_) => "malformed_provider_response",
            AuthError::ClientRejected(_) => "client_rejected",
        }
    }

    /// Whether the failure sits between the gateway and the provider rather
    /// than in the user's credential. These are logged at `error`.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AuthError::ProviderUnavailable(_)
                | AuthError::MalformedProviderResponse(_)
                | AuthError::ClientRejected(_)
        )
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::MalformedProviderResponse(_) => StatusCode::BAD_GATEWAY,
            AuthError::ClientRejected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn public_message(&self) -> &'static str {
        if self.is_transport() {
            PROVIDER_UNAVAILABLE
        } else {
            AUTHENTICATION_FAILED
        }
    }

    /// Emit the diagnostic log line for this failure.
    pub fn log(&self, operation: &'static str) {
        if self.is_transport() {
            tracing::error!(operation, kind = self.kind(), error = %self, "identity provider call failed");
        } else {
            tracing::warn!(operation, kind = self.kind(), error = %self, "credential rejected");
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (
            status,
            Json(AuthErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Rejection produced by the authentication gate.
///
/// Always a 401 with the same body, whatever the underlying failure, so
/// that provider internals are not exposed on protected routes.
#[derive(Debug)]
pub struct Rejected(pub AuthError);

impl IntoResponse for Rejected {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, "Bearer")],
            Json(AuthErrorBody {
                error: AUTHENTICATION_FAILED,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn credential_errors_share_one_body() {
        let errors = [
            AuthError::MissingCredential,
            AuthError::MalformedToken,
            AuthError::ExpiredToken,
            AuthError::InvalidSignatureOrRejected("bad signature".to_string()),
            AuthError::InvalidOrExpiredCode("invalid_grant".to_string()),
        ];
        for error in errors {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
            let body = body_json(response).await;
            assert_eq!(body, serde_json::json!({ "error": "authentication failed" }));
        }
    }

    #[tokio::test]
    async fn transport_errors_are_distinguishable() {
        let response = AuthError::ProviderUnavailable("timed out".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "identity provider unavailable");

        let response =
            AuthError::MalformedProviderResponse("no access_token".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn client_rejection_is_server_error() {
        let response =
            AuthError::ClientRejected("invalid_client: bad secret".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
        let body = body_json(response).await;
        assert_eq!(body["error"], "identity provider unavailable");
    }

    #[tokio::test]
    async fn response_does_not_leak_detail() {
        let response =
            AuthError::InvalidSignatureOrRejected("kid abc not in key set".to_string())
                .into_response();
        let body = body_json(response).await;
        assert!(!body.to_string().contains("kid"));
    }

    #[tokio::test]
    async fn gate_rejection_is_always_401() {
        let response = Rejected(AuthError::ProviderUnavailable("timed out".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "authentication failed");
    }

    #[test]
    fn transport_classification() {
        assert!(AuthError::ProviderUnavailable(String::new()).is_transport());
        assert!(AuthError::MalformedProviderResponse(String::new()).is_transport());
        assert!(AuthError::ClientRejected(String::new()).is_transport());
        assert!(!AuthError::ExpiredToken.is_transport());
        assert!(!AuthError::MissingCredential.is_transport());
    }
}
