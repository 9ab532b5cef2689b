// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! App ID OAuth server endpoints and shared HTTP plumbing.
//!
//! Every endpoint hangs off the OAuth server URL
//! `https://{region}.appid.cloud.ibm.com/oauth/v4/{tenant_id}`, which is
//! also the `iss` claim of the tokens it issues.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::AuthError;

/// Scopes requested on the login redirect.
const LOGIN_SCOPE: &str = "openid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    oauth_server_url: String,
}

impl ProviderEndpoints {
    pub fn new(oauth_server_url: impl Into<String>) -> Self {
        let url: String = oauth_server_url.into();
        Self {
            oauth_server_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> &str {
        &self.oauth_server_url
    }

    pub fn authorization(&self) -> String {
        format!("{}/authorization", self.oauth_server_url)
    }

    pub fn token(&self) -> String {
        format!("{}/token", self.oauth_server_url)
    }

    pub fn userinfo(&self) -> String {
        format!("{}/userinfo", self.oauth_server_url)
    }

    pub fn public_keys(&self) -> String {
        format!("{}/publickeys", self.oauth_server_url)
    }

    /// Login redirect for the authorization-code flow. Deterministic, no I/O.
    pub fn login_url(&self, client_id: &str, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.authorization())?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", LOGIN_SCOPE);
        Ok(url.into())
    }
}

/// HTTP client used for every provider call.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

/// Map a transport-level failure. Timeouts are reported as unavailability.
pub(crate) fn transport_error(endpoint: &str, e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::ProviderUnavailable(format!("{endpoint} timed out"))
    } else {
        AuthError::ProviderUnavailable(format!("{endpoint} request failed: {e}"))
    }
}

/// Read a JSON body. Failing to read it (timeouts included) is a transport
/// error; only a body that arrived but does not decode is malformed.
pub(crate) async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> Result<T, AuthError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(endpoint, e))?;
    serde_json::from_slice(&body).map_err(|e| {
        AuthError::MalformedProviderResponse(format!("{endpoint} response is not valid JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hang_off_oauth_server_url() {
        let endpoints =
            ProviderEndpoints::new("https://us-south.appid.cloud.ibm.com/oauth/v4/tenant-1/");
        assert_eq!(
            endpoints.issuer(),
            "https://us-south.appid.cloud.ibm.com/oauth/v4/tenant-1"
        );
        assert_eq!(
            endpoints.token(),
            "https://us-south.appid.cloud.ibm.com/oauth/v4/tenant-1/token"
        );
        assert_eq!(
            endpoints.public_keys(),
            "https://us-south.appid.cloud.ibm.com/oauth/v4/tenant-1/publickeys"
        );
        assert_eq!(
            endpoints.userinfo(),
            "https://us-south.appid.cloud.ibm.com/oauth/v4/tenant-1/userinfo"
        );
    }

    #[test]
    fn login_url_encodes_redirect_uri() {
        let endpoints = ProviderEndpoints::new("https://us-south.appid.cloud.ibm.com/oauth/v4/t");
        let url = endpoints
            .login_url("client-abc", "https://app.example.com/auth/callback")
            .unwrap();
        assert_eq!(
            url,
            "https://us-south.appid.cloud.ibm.com/oauth/v4/t/authorization\
             ?client_id=client-abc&response_type=code\
             &redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback&scope=openid"
        );
    }

    #[test]
    fn login_url_is_deterministic() {
        let endpoints = ProviderEndpoints::new("https://eu-gb.appid.cloud.ibm.com/oauth/v4/t");
        let first = endpoints.login_url("c", "https://x.example/cb").unwrap();
        let second = endpoints.login_url("c", "https://x.example/cb").unwrap();
        assert_eq!(first, second);
    }
}
