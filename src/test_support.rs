// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixtures shared by the unit tests: a signing key matching a published
//! key set, token minting, and a provider wired to a wiremock server.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::IdentityProvider;
use crate::config::ProviderConfig;

pub const KEY_ID: &str = "appid-test-key";
pub const CLIENT_ID: &str = "client-abc";
pub const TENANT_ID: &str = "tenant-123";
pub const REDIRECT_URI: &str = "https://app.example.com/auth/callback";
pub const OAUTH_PATH: &str = "/oauth/v4/tenant-123";

const PRIVATE_KEY_PEM: &str = include_str!("testdata/provider_rsa.pem");

/// Modulus of the fixture key, base64url without padding.
const MODULUS: &str = "sTwvB8vIhkZVdCv0XnWBycGVQGUmzy-8HL4UXavw2ID84S3jwsdojrgAf9rczlTQEVZBqz2rLd-_lXnFAI8BsxBQAvHv69xCM6G83Q0fW8SYMv1FGirRIBH-JZoGUItRQgazd3DIpkLu93WX9jtLNMn9luJ_bfWoIEdtdj0jor_I4jA77WVE3ycqflXFa98uVl00G2Fqd7ynY-wWZv2voSItSaG8D_Tr1W4j-UQ0JPptesvLgXESvmEX85nOkOgFGPVcCSjjHr3yCPIpwu2fG5-QmL4p6NpKgcLWR9waIWvYpKPqL8Np2bcEi9j9sk7kvT-pmB13WnpGocwDudvSUQ";

pub fn jwks_document() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": KEY_ID,
            "n": MODULUS,
            "e": "AQAB"
        }]
    })
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims App ID would put in an access token for the mock server.
pub fn access_claims(server: &MockServer, sub: &str) -> Value {
    json!({
        "iss": format!("{}{}", server.uri(), OAUTH_PATH),
        "aud": [CLIENT_ID],
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "iat": now(),
        "exp": now() + 3600,
        "scope": "openid appid_default"
    })
}

/// Sign claims with the fixture key.
pub fn mint(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(jsonwebtoken::Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

pub fn provider_config(server: &MockServer) -> ProviderConfig {
    provider_config_at(&server.uri())
}

/// Provider settings pointing at an arbitrary base URL.
pub fn provider_config_at(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        region: "us-south".to_string(),
        tenant_id: TENANT_ID.to_string(),
        client_id: CLIENT_ID.to_string(),
        secret: SecretString::from("client-secret".to_string()),
        redirect_uri: REDIRECT_URI.to_string(),
        oauth_server_url: Some(format!("{base_url}{OAUTH_PATH}")),
        audience: None,
        timeout: Duration::from_millis(500),
    }
}

pub fn provider(server: &MockServer) -> IdentityProvider {
    IdentityProvider::from_config(&provider_config(server)).unwrap()
}

/// Serve the fixture key set from the mock provider.
pub async fn mount_public_keys(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{OAUTH_PATH}/publickeys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document()))
        .mount(server)
        .await;
}

/// A provider that sends a 200 status line and headers, then stalls well
/// past the client timeout before the body is complete.
pub async fn stalled_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          Content-Type: application/json\r\n\
                          Content-Length: 100\r\n\r\n\
                          {\"access_tok",
                    )
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(5)).await;
            });
        }
    });
    format!("http://{addr}")
}
