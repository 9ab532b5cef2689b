// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated requests.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims is the verified ClaimSet
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{error::Rejected, middleware::authenticate, ClaimSet};
use crate::state::AppState;

/// Extractor for the verified claims of the caller.
///
/// Reuses the result of the `require_auth` middleware when it ran;
/// otherwise runs the gate itself.
pub struct Auth(pub ClaimSet);

impl FromRequestParts<AppState> for Auth {
    type Rejection = Rejected;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<ClaimSet>().cloned() {
            return Ok(Auth(claims));
        }

        match authenticate(&parts.headers, &state.provider).await {
            Ok(claims) => Ok(Auth(claims)),
            Err(e) => {
                e.log("authenticate");
                Err(Rejected(e))
            }
        }
    }
}
