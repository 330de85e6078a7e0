//! # Rusty-Posts Binary
//!
//! The entry point that assembles the application: configuration, logging,
//! the SQLite pool, repositories, router, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use configs::{LogFormat, LogSettings, Settings};
use rp_api::{router, AppState};
use rp_auth_argon2::Argon2Hasher;
use rp_db_sqlite::{PoolConfig, SqlitePostRepo, SqliteUserRepo};
use secrecy::ExposeSecret;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = configs::load_dotenv();
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);
    if let Err(e) = dotenv {
        warn!(error = %e, "ignoring unreadable .env file");
    }

    // 1. Initialize Database Implementation
    let pool_config = PoolConfig {
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: settings.database.acquire_timeout(),
        idle_timeout: settings.database.idle_timeout(),
        max_lifetime: settings.database.max_lifetime(),
    };
    let pool = rp_db_sqlite::connect(settings.database.url.expose_secret(), &pool_config)
        .await
        .context("opening database")?;
    info!("DB connection established");

    // 2. Wire the ports. Both repositories share the one pool.
    let state = AppState::new(
        Arc::new(SqliteUserRepo::new(pool.clone())),
        Arc::new(SqlitePostRepo::new(pool.clone())),
        Arc::new(Argon2Hasher::new()),
    );
    let app = router(state, settings.server.request_timeout());

    // 3. Serve until a shutdown signal, then drain for at most the grace period.
    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("🚀 Rusty-Posts starting on http://{addr}");

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(async move { server.await });

    let grace = settings.server.shutdown_grace();
    tokio::select! {
        joined = &mut server => {
            joined.context("server task panicked")?.context("server error")?;
        }
        _ = grace_expired(signalled_rx, grace) => {
            warn!(grace_secs = grace.as_secs(), "in-flight requests did not finish in time, forcing shutdown");
            server.abort();
        }
    }

    pool.close().await;
    info!("Server exited cleanly");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Resolves once the shutdown signal fired and `grace` has elapsed since.
/// Never resolves if the server stops on its own first.
async fn grace_expired(signalled: oneshot::Receiver<()>, grace: Duration) {
    if signalled.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl_c signal received"),
        _ = terminate => info!("terminate signal received"),
    }
    info!("Shutting down server...");
}
