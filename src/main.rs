// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use anyhow::Context;
use appid_gateway::{
    api::{cors_layer, router},
    auth::IdentityProvider,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration errors are fatal before anything is served
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.server.log_format);

    let provider = IdentityProvider::from_config(&config.provider)
        .context("failed to initialize identity provider")?;

    tracing::info!(
        region = %config.provider.region,
        tenant_id = %config.provider.tenant_id,
        client_id = %config.provider.client_id,
        issuer = provider.endpoints().issuer(),
        redirect_uri = provider.redirect_uri(),
        timeout_secs = config.provider.timeout.as_secs_f64(),
        "identity provider configured"
    );
    #[cfg(feature = "debug-endpoints")]
    tracing::warn!("debug endpoints enabled; do not run this build in production");

    let state = AppState::new(provider);
    let app = router(
        state,
        cors_layer(config.server.cors_allowed_origins.as_deref()),
    );

    let bind = (config.server.host.as_str(), config.server.port);
    let listener = TcpListener::bind(bind).await.with_context(|| {
        format!("failed to bind {}:{}", config.server.host, config.server.port)
    })?;
    let addr = listener.local_addr().context("failed to read bound address")?;

    tracing::info!(%addr, "App ID gateway listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    Ok(())
}
