// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Normalized identity claims.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Identity attributes derived from a verified token or a userinfo call.
///
/// `sub`, `email` and `exp` are lifted into `subject`, `email` and `expiry`;
/// every other provider claim is kept verbatim in `extra`. The set is
/// immutable once built and lives only as long as the request that
/// produced it.
///
/// Serialized with the provider's claim names (`sub`, `email`, `exp`). A
/// claim is either lifted or left in `extra`, never both, so the output has
/// no duplicate keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimSet {
    #[serde(rename = "sub")]
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Unix timestamp (seconds)
    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    expiry: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ClaimSet {
    /// Build from a raw claims object.
    ///
    /// Returns `None` when there is no string `sub` claim.
    pub fn from_claims(mut claims: Map<String, Value>) -> Option<Self> {
        let subject = match claims.remove("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => sub,
            _ => return None,
        };
        let email = match claims.remove("email") {
            Some(Value::String(email)) => Some(email),
            Some(other) => {
                claims.insert("email".to_string(), other);
                None
            }
            None => None,
        };
        let expiry = match claims.get("exp").and_then(Value::as_i64) {
            Some(exp) => {
                claims.remove("exp");
                Some(exp)
            }
            None => None,
        };

        Some(Self {
            subject,
            email,
            expiry,
            extra: claims,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn expiry(&self) -> Option<i64> {
        self.expiry
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Any claim that was not normalized.
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.extra.get(claim)
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn normalizes_standard_claims() {
        let set = ClaimSet::from_claims(claims(json!({
            "sub": "user-1",
            "email": "ada@example.com",
            "exp": 1_900_000_000,
            "iss": "https://us-south.appid.cloud.ibm.com/oauth/v4/t",
            "scope": "openid appid_default"
        })))
        .unwrap();

        assert_eq!(set.subject(), "user-1");
        assert_eq!(set.email(), Some("ada@example.com"));
        assert_eq!(set.expiry(), Some(1_900_000_000));
        assert_eq!(set.get("scope"), Some(&json!("openid appid_default")));
        assert!(set.get("sub").is_none());
    }

    #[test]
    fn requires_subject() {
        assert!(ClaimSet::from_claims(claims(json!({ "email": "a@b.c" }))).is_none());
        assert!(ClaimSet::from_claims(claims(json!({ "sub": 42 }))).is_none());
        assert!(ClaimSet::from_claims(claims(json!({ "sub": "" }))).is_none());
    }

    #[test]
    fn email_and_expiry_are_optional() {
        let set = ClaimSet::from_claims(claims(json!({ "sub": "user-1" }))).unwrap();
        assert_eq!(set.email(), None);
        assert_eq!(set.expiry(), None);
        assert_eq!(set.expires_at(), None);
    }

    #[test]
    fn serializes_with_normalized_keys() {
        let set = ClaimSet::from_claims(claims(json!({
            "sub": "user-1",
            "email": "ada@example.com",
            "exp": 1_700_000_000,
            "name": "Ada"
        })))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({
                "sub": "user-1",
                "email": "ada@example.com",
                "exp": 1_700_000_000,
                "name": "Ada"
            })
        );
    }

    #[test]
    fn serialized_keys_are_never_duplicated() {
        let set = ClaimSet::from_claims(claims(json!({
            "sub": "user-1",
            "subject": "someone-else",
            "email": { "primary": "ada@example.com" },
            "exp": "tomorrow",
            "expiry": 0
        })))
        .unwrap();
        assert_eq!(set.subject(), "user-1");
        assert_eq!(set.email(), None);
        assert_eq!(set.expiry(), None);

        let rendered = serde_json::to_string(&set).unwrap();
        for key in ["\"sub\":", "\"email\":", "\"exp\":", "\"subject\":", "\"expiry\":"] {
            assert_eq!(rendered.matches(key).count(), 1, "{key} in {rendered}");
        }

        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["sub"], "user-1");
        assert_eq!(value["subject"], "someone-else");
        assert_eq!(value["email"], json!({ "primary": "ada@example.com" }));
        assert_eq!(value["exp"], "tomorrow");
    }

    #[test]
    fn expires_at_converts_timestamp() {
        let set =
            ClaimSet::from_claims(claims(json!({ "sub": "u", "exp": 1_700_000_000 }))).unwrap();
        assert_eq!(set.expires_at().unwrap().timestamp(), 1_700_000_000);
    }
}
