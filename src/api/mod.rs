// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug_span, Span};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{auth::require_auth, state::AppState};

pub mod auth;
#[cfg(feature = "debug-endpoints")]
pub mod debug;
pub mod health;
pub mod resources;

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/auth/login-url", get(auth::login_url))
        .route("/auth/callback", get(auth::callback))
        .route("/api/public", get(resources::public));

    let protected_routes = Router::new()
        .route("/auth/user", get(auth::current_user))
        .route("/api/protected", get(resources::protected))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let app = public_routes.merge(protected_routes);

    #[cfg(feature = "debug-endpoints")]
    let app = app
        .route("/debug/token", get(debug::userinfo_token))
        .route("/debug/frontend-token", get(debug::verify_token));

    app.with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// CORS policy: permissive unless an origin allow-list is configured.
pub fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = allowed_origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

// Headers stay out of the span: Authorization carries the bearer token.
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method();
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", %method, path, request_id)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::liveness,
        health::readiness,
        auth::login_url,
        auth::callback,
        auth::current_user,
        resources::public,
        resources::protected
    ),
    components(
        schemas(
            health::RootResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::ReadyChecks,
            auth::LoginUrlResponse,
            auth::CallbackResponse,
            auth::UserProfileResponse,
            resources::Item,
            resources::PublicResponse,
            resources::ProtectedResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Auth", description = "Sign-in through IBM App ID"),
        (name = "Resources", description = "Public and protected sample data")
    )
)]
struct ApiDoc;
