// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const AUTH_PROVIDER: &str = "IBM App ID";

/// Service banner.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub auth_provider: String,
}

/// Simple health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub auth: String,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Provider public key set ("ok" or "unavailable").
    pub jwks: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service banner", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "API gateway with IBM App ID authentication".to_string(),
        status: "healthy".to_string(),
        auth_provider: AUTH_PROVIDER.to_string(),
    })
}

/// Liveness check.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        auth: AUTH_PROVIDER.to_string(),
    })
}

/// Check if the provider key set is reachable.
async fn check_jwks(state: &AppState) -> bool {
    let jwks = state.provider.jwks();
    if jwks.is_cached().await {
        return true;
    }
    match jwks.refresh().await {
        Ok(_) => true,
        Err(e) => {
            e.log("readiness");
            false
        }
    }
}

/// Readiness check.
///
/// Returns 200 only if the provider key set can be loaded.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let jwks_ok = check_jwks(&state).await;

    let response = ReadyResponse {
        status: if jwks_ok { "ok" } else { "degraded" }.to_string(),
        checks: ReadyChecks {
            service: "ok".to_string(),
            jwks: if jwks_ok { "ok" } else { "unavailable" }.to_string(),
        },
    };

    let status = if jwks_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
