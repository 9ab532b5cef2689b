// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token handling.

use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Number of leading characters kept when a token is rendered for logs.
const REDACTED_PREFIX_LEN: usize = 8;

/// An opaque bearer credential.
///
/// `Debug` and `Display` only show a short prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Accept a token that looks like an RFC 6750 `b64token`.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        if raw.is_empty() || !raw.bytes().all(is_token_byte) {
            return Err(AuthError::MalformedToken);
        }
        Ok(Self(raw.to_string()))
    }

    /// Extract the token from an `Authorization: Bearer <token>` header.
    ///
    /// Returns `Ok(None)` when there is no header at all.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, AuthError> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| AuthError::MalformedToken)?.trim();
        let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::MalformedToken);
        }
        Self::parse(token.trim()).map(Some)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bounded prefix safe to put in logs.
    pub fn redacted(&self) -> String {
        redact(&self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&self.redacted()).finish()
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Redact any credential-like string down to a short prefix.
pub fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(REDACTED_PREFIX_LEN).collect();
    if prefix.len() < value.len() {
        format!("{prefix}…")
    } else {
        prefix
    }
}

// b64token = 1*( ALPHA / DIGIT / "-" / "." / "_" / "~" / "+" / "/" ) *"="
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'+' | b'/' | b'=')
}
