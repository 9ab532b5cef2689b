// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate for protected routes.
//!
//! Each protected request starts `Unauthenticated`. Without an
//! `Authorization` header it is rejected straight away with
//! `MissingCredential` and the provider is never contacted. Otherwise the
//! bearer token is extracted and the request moves to `Verifying`; the
//! verifier's answer decides between `Authenticated` (the [`ClaimSet`] is
//! stored in the request extensions) and `Rejected`.
//!
//! Rejections are uniform 401s. The specific reason only goes to the logs.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/api/protected", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{error::Rejected, AuthError, BearerToken, ClaimSet, IdentityProvider};
use crate::state::AppState;

/// Run the gate against request headers.
pub async fn authenticate(
    headers: &HeaderMap,
    provider: &IdentityProvider,
) -> Result<ClaimSet, AuthError> {
    let token = BearerToken::from_headers(headers)?.ok_or(AuthError::MissingCredential)?;
    provider.verify(&token).await
}

/// Authentication middleware function.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state.provider).await {
        Ok(claims) => {
            tracing::debug!(subject = claims.subject(), "request authenticated");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            e.log("authenticate");
            Rejected(e).into_response()
        }
    }
}
