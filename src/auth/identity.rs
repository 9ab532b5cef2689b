// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The identity provider handle shared by the gate and the routes.

use crate::config::{ConfigError, ProviderConfig, OAUTH_SERVER_URL_ENV, REGION_ENV};

use super::provider::{http_client, ProviderEndpoints};
use super::{
    AuthError, AuthorizationExchanger, BearerToken, ClaimSet, JwksManager, TokenPair,
    TokenVerifier,
};

/// Built once at startup from [`ProviderConfig`] and shared read-only.
#[derive(Clone)]
pub struct IdentityProvider {
    verifier: TokenVerifier,
    exchanger: AuthorizationExchanger,
    endpoints: ProviderEndpoints,
    redirect_uri: String,
    login_url: String,
}

impl IdentityProvider {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let http = http_client(config.timeout).map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let endpoints = ProviderEndpoints::new(config.oauth_server_url());

        // Blame whichever variable produced the OAuth server URL.
        let url_source = if config.oauth_server_url.is_some() {
            OAUTH_SERVER_URL_ENV
        } else {
            REGION_ENV
        };
        let login_url = endpoints
            .login_url(&config.client_id, &config.redirect_uri)
            .map_err(|e| ConfigError::Invalid {
                name: url_source,
                reason: format!("{e} in {}", endpoints.issuer()),
            })?;

        let jwks = JwksManager::new(endpoints.public_keys(), http.clone());
        let verifier = TokenVerifier::new(jwks, endpoints.issuer(), config.audience());
        let exchanger = AuthorizationExchanger::new(
            http,
            endpoints.clone(),
            config.client_id.clone(),
            config.secret.clone(),
        );

        Ok(Self {
            verifier,
            exchanger,
            endpoints,
            redirect_uri: config.redirect_uri.clone(),
            login_url,
        })
    }

    /// Verify a bearer token and return its claims.
    pub async fn verify(&self, token: &BearerToken) -> Result<ClaimSet, AuthError> {
        self.verifier.verify(token).await
    }

    /// Exchange an authorization code for a token pair.
    pub async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<TokenPair, AuthError> {
        self.exchanger.exchange(code, redirect_uri).await
    }

    /// Resolve claims for an access token via the userinfo endpoint.
    pub async fn fetch_user_info(&self, access_token: &BearerToken) -> Result<ClaimSet, AuthError> {
        self.exchanger.fetch_user_info(access_token).await
    }

    pub fn build_login_url(&self) -> &str {
        &self.login_url
    }

    /// Redirect URI registered for the callback route.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    pub fn jwks(&self) -> &JwksManager {
        self.verifier.jwks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{provider_config, provider_config_at, CLIENT_ID};
    use wiremock::MockServer;

    #[tokio::test]
    async fn login_url_uses_configured_client_and_redirect() {
        let server = MockServer::start().await;
        let provider = IdentityProvider::from_config(&provider_config(&server)).unwrap();

        let url = url::Url::parse(provider.build_login_url()).unwrap();
        assert!(url.path().ends_with("/oauth/v4/tenant-123/authorization"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), CLIENT_ID.to_string())));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "https://app.example.com/auth/callback".to_string()
        )));
    }

    #[test]
    fn bad_derived_url_blames_region() {
        let mut config = provider_config_at("http://127.0.0.1:1");
        config.oauth_server_url = None;
        config.region = "us south".to_string();

        let err = IdentityProvider::from_config(&config).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid { name: REGION_ENV, .. }));
    }

    #[test]
    fn bad_override_url_blames_override() {
        let mut config = provider_config_at("http://127.0.0.1:1");
        config.oauth_server_url = Some("http://exa mple.com/oauth/v4/t".to_string());

        let err = IdentityProvider::from_config(&config).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: OAUTH_SERVER_URL_ENV,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn key_set_url_follows_oauth_server() {
        let server = MockServer::start().await;
        let provider = IdentityProvider::from_config(&provider_config(&server)).unwrap();
        assert_eq!(
            provider.jwks().jwks_url(),
            format!("{}/oauth/v4/tenant-123/publickeys", server.uri())
        );
        assert_eq!(
            provider.endpoints().issuer(),
            format!("{}/oauth/v4/tenant-123", server.uri())
        );
    }
}
