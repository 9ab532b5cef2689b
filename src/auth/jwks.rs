// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Provider public key set fetching and caching.
//!
//! - Keys come from the App ID `publickeys` endpoint (a JWKS document)
//! - Keys are cached with a configurable TTL; tokens and claims never are
//! - An unknown `kid` forces one refresh before the token is rejected, so
//!   key rotation on the provider side is picked up immediately; forced
//!   refreshes are spaced by a minimum interval so unknown `kid`s cannot
//!   drive one provider round trip per request

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;
use super::provider::{read_json, transport_error};

/// Default JWKS cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Minimum age of the cached key set before an unknown `kid` may force a refresh.
const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL (App ID `publickeys` endpoint)
    jwks_url: String,
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl JwksManager {
    pub fn new(jwks_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(None)),
            client,
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the minimum spacing between forced refreshes.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        self.refresh().await
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| transport_error("publickeys", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ProviderUnavailable(format!(
                "HTTP {status} from publickeys endpoint"
            )));
        }

        read_json::<JwkSet>("publickeys", response).await
    }

    /// Get a decoding key for the given key ID.
    pub async fn get_decoding_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = find_key(&jwks, kid) {
            return jwk_to_decoding_key(jwk);
        }

        // Unknown kid: the provider may have rotated its keys.
        if !self.refresh_due().await {
            return Err(AuthError::InvalidSignatureOrRejected(format!(
                "no key with kid {kid} in recently fetched key set"
            )));
        }
        tracing::debug!(kid, "key id not in cached key set, refreshing");
        let jwks = self.refresh().await?;
        let jwk = find_key(&jwks, kid).ok_or_else(|| {
            AuthError::InvalidSignatureOrRejected(format!("no key with kid {kid} in key set"))
        })?;
        jwk_to_decoding_key(jwk)
    }

    /// Get any valid decoding key (for tokens without kid).
    pub async fn get_any_decoding_key(&self) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_jwks().await?;

        jwks.keys
            .iter()
            .find_map(|jwk| jwk_to_decoding_key(jwk).ok())
            .ok_or_else(|| {
                AuthError::InvalidSignatureOrRejected("key set has no usable key".to_string())
            })
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<JwkSet, AuthError> {
        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    /// Whether the cached set is old enough to be force-refreshed.
    async fn refresh_due(&self) -> bool {
        let cache = self.cache.read().await;
        match &*cache {
            Some(entry) => entry.fetched_at.elapsed() >= self.min_refresh_interval,
            None => true,
        }
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        if let Some(entry) = &*cache {
            entry.fetched_at.elapsed() < self.cache_ttl
        } else {
            false
        }
    }
}

fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
                AuthError::MalformedProviderResponse(format!("invalid RSA key: {e}"))
            })?;

            let alg = match jwk.common.key_algorithm {
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                _ => Algorithm::RS256,
            };

            Ok((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let key = DecodingKey::from_ec_components(&ec.x, &ec.y).map_err(|e| {
                AuthError::MalformedProviderResponse(format!("invalid EC key: {e}"))
            })?;

            let alg = match jwk.common.key_algorithm {
                Some(KeyAlgorithm::ES384) => Algorithm::ES384,
                _ => Algorithm::ES256,
            };

            Ok((key, alg))
        }
        _ => Err(AuthError::InvalidSignatureOrRejected(
            "unsupported key type in key set".to_string(),
        )),
    }
}
