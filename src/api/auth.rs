// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in endpoints: login URL, OAuth callback and the current user.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::{Auth, AuthError, BearerToken, ClaimSet},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUrlResponse {
    pub login_url: String,
}

/// Query parameters App ID appends when redirecting back.
///
/// Axum decodes them exactly once; the code is used as-is afterwards.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorization code
    pub code: Option<String>,
    /// Opaque value echoed back to the frontend
    pub state: Option<String>,
    /// OAuth error code when the user or provider denied the request
    pub error: Option<String>,
}

/// Token pair plus the claims of the signed-in user.
#[derive(Debug, Serialize, ToSchema)]
pub struct CallbackResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[schema(value_type = Object)]
    pub user_info: ClaimSet,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    #[schema(value_type = Object)]
    pub user: ClaimSet,
    pub message: String,
}

/// Get the App ID login URL.
#[utoipa::path(
    get,
    path = "/auth/login-url",
    tag = "Auth",
    responses((status = 200, description = "Login URL", body = LoginUrlResponse))
)]
pub async fn login_url(State(state): State<AppState>) -> Json<LoginUrlResponse> {
    Json(LoginUrlResponse {
        login_url: state.provider.build_login_url().to_string(),
    })
}

/// Handle the OAuth redirect from App ID.
///
/// Exchanges the code for tokens and resolves the user's claims.
#[utoipa::path(
    get,
    path = "/auth/callback",
    tag = "Auth",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Signed in", body = CallbackResponse),
        (status = 400, description = "Missing authorization code"),
        (status = 401, description = "Authentication failed"),
        (status = 500, description = "Provider rejected the gateway's client credentials"),
        (status = 502, description = "Provider returned an unusable response"),
        (status = 503, description = "Provider unavailable")
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, ApiError> {
    if let Some(error) = query.error {
        let e = AuthError::InvalidOrExpiredCode(format!("authorization denied: {error}"));
        e.log("callback");
        return Err(e.into());
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;

    let provider = &state.provider;
    let tokens = provider
        .exchange(&code, provider.redirect_uri())
        .await
        .inspect_err(|e| e.log("exchange"))?;

    let access_token = BearerToken::parse(&tokens.access_token)
        .map_err(|_| {
            AuthError::MalformedProviderResponse("access_token is not a bearer token".to_string())
        })
        .inspect_err(|e| e.log("exchange"))?;

    let user_info = provider
        .fetch_user_info(&access_token)
        .await
        .inspect_err(|e| e.log("fetch_user_info"))?;

    tracing::info!(subject = user_info.subject(), "user signed in");

    Ok(Json(CallbackResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        state: query.state,
        user_info,
    }))
}

/// Get the current user's claims.
#[utoipa::path(
    get,
    path = "/auth/user",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User claims", body = UserProfileResponse),
        (status = 401, description = "Authentication failed")
    )
)]
pub async fn current_user(Auth(claims): Auth) -> Json<UserProfileResponse> {
    Json(UserProfileResponse {
        user: claims,
        message: "Successfully authenticated with IBM App ID".to_string(),
    })
}
