// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sample resource endpoints, one public and one behind the gate.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::Auth;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Item {
    pub id: u32,
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicResponse {
    pub message: String,
    pub data: Vec<Item>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub data: Vec<Item>,
}

fn items(kind: &str, count: u32) -> Vec<Item> {
    (1..=count)
        .map(|id| Item {
            id,
            title: format!("{kind} Item {id}"),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/public",
    tag = "Resources",
    responses((status = 200, description = "Public data", body = PublicResponse))
)]
pub async fn public() -> Json<PublicResponse> {
    Json(PublicResponse {
        message: "This is a public endpoint".to_string(),
        data: items("Public", 2),
    })
}

#[utoipa::path(
    get,
    path = "/api/protected",
    tag = "Resources",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Protected data", body = ProtectedResponse),
        (status = 401, description = "Authentication failed")
    )
)]
pub async fn protected(Auth(claims): Auth) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "This is a protected endpoint".to_string(),
        user_id: claims.subject().to_string(),
        user_email: claims.email().map(str::to_string),
        data: items("Protected", 3),
    })
}
