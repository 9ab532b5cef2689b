// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OAuth2 authorization-code exchange and userinfo lookup.

use std::fmt;

use reqwest::{header::WWW_AUTHENTICATE, Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::provider::{read_json, transport_error, ProviderEndpoints};
use super::token::redact;
use super::{AuthError, BearerToken, ClaimSet};

/// Tokens returned by a successful code exchange.
///
/// `access_token` is always present and non-empty; everything else is
/// passed through from the provider as-is.
#[derive(Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(redact))
            .field("expires_in", &self.expires_in)
            .field("id_token", &self.id_token.as_deref().map(redact))
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    expires_in: Option<u64>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Accept `expires_in` as an integer, a float or a numeric string.
/// Anything else is dropped rather than failing the whole exchange.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(seconds)
}

/// OAuth2 error body (RFC 6749 section 5.2).
#[derive(Debug, Default, Deserialize)]
struct OAuthErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl fmt::Display for OAuthErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.error_description) {
            (Some(error), Some(description)) => write!(f, "{error}: {description}"),
            (Some(error), None) => f.write_str(error),
            (None, Some(description)) => f.write_str(description),
            (None, None) => f.write_str("no error details"),
        }
    }
}

/// Client side of the App ID token and userinfo endpoints.
#[derive(Clone)]
pub struct AuthorizationExchanger {
    http: Client,
    endpoints: ProviderEndpoints,
    client_id: String,
    secret: SecretString,
}

impl AuthorizationExchanger {
    pub fn new(
        http: Client,
        endpoints: ProviderEndpoints,
        client_id: impl Into<String>,
        secret: SecretString,
    ) -> Self {
        Self {
            http,
            endpoints,
            client_id: client_id.into(),
            secret,
        }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// The code is submitted byte-for-byte as received. The redirect URI is
    /// not checked here; the provider rejects a mismatch.
    pub async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<TokenPair, AuthError> {
        if code.is_empty() {
            return Err(AuthError::InvalidOrExpiredCode(
                "authorization code is empty".to_string(),
            ));
        }

        tracing::debug!(code = %redact(code), code_len = code.len(), "exchanging authorization code");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.client_id.as_str()),
        ];

        let response = self
            .http
            .post(self.endpoints.token())
            .basic_auth(&self.client_id, Some(self.secret.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error("token", e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::ProviderUnavailable(format!(
                "token endpoint returned {status}"
            )));
        }
        if status.is_client_error() {
            let details = oauth_error(response).await;
            if is_client_rejection(status, &details) {
                return Err(AuthError::ClientRejected(format!("{status}: {details}")));
            }
            return Err(AuthError::InvalidOrExpiredCode(format!("{status}: {details}")));
        }
        if !status.is_success() {
            return Err(AuthError::MalformedProviderResponse(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = read_json("token", response).await?;

        let access_token = body
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AuthError::MalformedProviderResponse(
                    "token response did not include access_token".to_string(),
                )
            })?;

        Ok(TokenPair {
            access_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
            id_token: body.id_token,
            token_type: body.token_type,
        })
    }

    /// Resolve claims for an access token through the userinfo endpoint.
    pub async fn fetch_user_info(&self, access_token: &BearerToken) -> Result<ClaimSet, AuthError> {
        tracing::debug!(token = %access_token, "fetching user info");

        let response = self
            .http
            .get(self.endpoints.userinfo())
            .bearer_auth(access_token.as_str())
            .send()
            .await
            .map_err(|e| transport_error("userinfo", e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::ProviderUnavailable(format!(
                "userinfo endpoint returned {status}"
            )));
        }
        if status.is_client_error() {
            return Err(userinfo_rejection(status, response).await);
        }
        if !status.is_success() {
            return Err(AuthError::MalformedProviderResponse(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let claims: Map<String, Value> = read_json("userinfo", response).await?;

        ClaimSet::from_claims(claims).ok_or_else(|| {
            AuthError::MalformedProviderResponse("userinfo did not include sub".to_string())
        })
    }
}

async fn oauth_error(response: Response) -> OAuthErrorResponse {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str(&body).unwrap_or_default()
}

/// The token endpoint authenticates the gateway itself; a refusal of those
/// credentials is an operator problem, not a bad code.
fn is_client_rejection(status: StatusCode, details: &OAuthErrorResponse) -> bool {
    match details.error.as_deref() {
        Some("invalid_client" | "unauthorized_client") => true,
        Some("invalid_grant") => false,
        _ => status == StatusCode::UNAUTHORIZED,
    }
}

async fn userinfo_rejection(status: StatusCode, response: Response) -> AuthError {
    let challenge = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let details = oauth_error(response).await;

    let mentions_expiry = |s: &str| s.to_ascii_lowercase().contains("expired");
    let expired = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        && (mentions_expiry(&challenge) || mentions_expiry(&details.to_string()));

    if expired {
        AuthError::ExpiredToken
    } else {
        AuthError::InvalidSignatureOrRejected(format!("userinfo returned {status}: {details}"))
    }
}
