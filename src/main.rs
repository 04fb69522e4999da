use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::middleware;
use tokio::net::TcpListener;
use tracing::info;

use vrf_attest_rs::{compose, config, pq, request_id_middleware, routes, signing, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load config
    let config = config::Config::from_env()?;

    let listen_port: u16 = std::env::var("LISTEN_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .map_err(|_| anyhow::anyhow!("LISTEN_PORT must be a valid port number"))?;

    // Initialize the classical signer; a misconfigured secret fails here,
    // not on the first request.
    let signer = signing::EcdsaSigner::from_hex(&config.ecdsa_privkey)
        .context("ECDSA_PRIVKEY is not a valid 32-byte hex secret")?;
    info!(signer_addr = %signer.signer_addr, "ECDSA signer ready");

    // Wire the PQ capability slot with the public stub
    let pq_signer = pq::EnvStubSigner::new(
        config.pq_scheme.clone(),
        config.pq_sig_b64.clone(),
        config.pq_pubkey_b64.clone(),
    )
    .map_err(|e| anyhow::anyhow!(e))?;
    info!(pq_scheme = %config.pq_scheme, "PQ capability slot wired (stub)");

    let composer = compose::Composer::new(
        signer,
        Some(Arc::new(pq_signer)),
        config.pq_scheme.clone(),
        Duration::from_millis(config.pq_timeout_ms),
    );

    // Build app state
    let state = AppState {
        config: Arc::new(config),
        composer: Arc::new(composer),
    };

    // Build router
    let app = routes::build_router()
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state);

    // Bind and serve
    let addr = format!("0.0.0.0:{listen_port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
