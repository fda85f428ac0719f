use anyhow::Context;
use tower_http::cors::CorsLayer;

use wealth_hub::config::ServerConfig;
use wealth_hub::onboarding::{OnboardingManager, OnboardingRouteState, onboarding_routes};
use wealth_hub::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();
    let addr = config.socket_addr()?;

    eprintln!("💰 Wealth Hub v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Onboarding API: http://{}/api/onboarding/status", addr);

    // ── Database ─────────────────────────────────────────────────────────
    let store = store::open(&config)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    eprintln!("   Database: {}", config.db_path.display());

    // ── Onboarding ───────────────────────────────────────────────────────
    let manager = OnboardingManager::restore(&config.session_id, store).await?;
    let status = manager.status().await;
    eprintln!(
        "   Session: {} ({})\n",
        config.session_id,
        if status.onboarding_complete {
            "complete"
        } else {
            "onboarding"
        }
    );

    let app = onboarding_routes(OnboardingRouteState { manager }).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
