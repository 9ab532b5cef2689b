// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and is
//! read-only afterwards. A missing required value is fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APPID_REGION` | App ID region (e.g. `us-south`) | `us-south` |
//! | `APPID_TENANT_ID` | App ID tenant identifier | Required |
//! | `APPID_CLIENT_ID` | OAuth client identifier | Required |
//! | `APPID_SECRET` | OAuth client secret | Required |
//! | `APPID_REDIRECT_URI` | Redirect URI registered for the callback | Required |
//! | `APPID_OAUTH_SERVER_URL` | Override for the OAuth server URL | Derived from region and tenant |
//! | `APPID_AUDIENCE` | Expected `aud` claim of access tokens | Client ID |
//! | `APPID_TIMEOUT_SECS` | Timeout for every provider call | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CORS_ALLOWED_ORIGINS` | Comma separated origin allow-list | Permissive |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Values are trimmed and a variable that is set but blank counts as unset.

use std::time::Duration;

use secrecy::SecretString;

pub const REGION_ENV: &str = "APPID_REGION";
pub const TENANT_ID_ENV: &str = "APPID_TENANT_ID";
pub const CLIENT_ID_ENV: &str = "APPID_CLIENT_ID";
pub const SECRET_ENV: &str = "APPID_SECRET";
pub const REDIRECT_URI_ENV: &str = "APPID_REDIRECT_URI";
pub const OAUTH_SERVER_URL_ENV: &str = "APPID_OAUTH_SERVER_URL";
pub const AUDIENCE_ENV: &str = "APPID_AUDIENCE";
pub const TIMEOUT_SECS_ENV: &str = "APPID_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_REGION: &str = "us-south";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `RUST_LOG` filter when the variable is absent.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is missing or empty")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Identity provider settings shared by the verifier and the exchanger.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub region: String,
    pub tenant_id: String,
    pub client_id: String,
    pub secret: SecretString,
    pub redirect_uri: String,
    /// Explicit OAuth server URL; derived from region and tenant when unset.
    pub oauth_server_url: Option<String>,
    /// Expected audience; defaults to the client ID.
    pub audience: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// The OAuth server URL, which is also the token issuer.
    pub fn oauth_server_url(&self) -> String {
        match &self.oauth_server_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.appid.cloud.ibm.com/oauth/v4/{}",
                self.region, self.tenant_id
            ),
        }
    }

    pub fn audience(&self) -> &str {
        self.audience.as_deref().unwrap_or(&self.client_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` means permissive CORS.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let timeout = match env.optional(TIMEOUT_SECS_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: TIMEOUT_SECS_ENV,
                    reason: format!("expected a number of seconds, got {raw:?}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: TIMEOUT_SECS_ENV,
                        reason: "timeout must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let oauth_server_url = env.optional(OAUTH_SERVER_URL_ENV);
        if let Some(ref raw) = oauth_server_url {
            url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
                name: OAUTH_SERVER_URL_ENV,
                reason: e.to_string(),
            })?;
        }

        let redirect_uri = env.required(REDIRECT_URI_ENV)?;
        url::Url::parse(&redirect_uri).map_err(|e| ConfigError::Invalid {
            name: REDIRECT_URI_ENV,
            reason: e.to_string(),
        })?;

        let provider = ProviderConfig {
            region: env.or_default(REGION_ENV, DEFAULT_REGION),
            tenant_id: env.required(TENANT_ID_ENV)?,
            client_id: env.required(CLIENT_ID_ENV)?,
            secret: SecretString::from(env.required(SECRET_ENV)?),
            redirect_uri,
            oauth_server_url,
            audience: env.optional(AUDIENCE_ENV),
            timeout,
        };

        let port = match env.optional(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("expected a port number, got {raw:?}"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match env.optional(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::default(),
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(raw) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got {raw:?}"),
                })
            }
        };

        let cors_allowed_origins = env.optional(CORS_ALLOWED_ORIGINS_ENV).map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            server: ServerConfig {
                host: env.or_default(HOST_ENV, DEFAULT_HOST),
                port,
                cors_allowed_origins,
                log_format,
            },
            provider,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }
}
