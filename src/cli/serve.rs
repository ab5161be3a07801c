use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use supplychain_assistant::server::{build_router, ServeState};
use supplychain_assistant::AppContext;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Interface to bind (defaults to server.host from config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (defaults to server.port from config)
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn cmd_serve(args: ServeArgs, ctx: &CliContext) -> Result<()> {
    let server = &ctx.config().server;
    let host = args.host.unwrap_or_else(|| server.host.clone());
    let port = args.port.unwrap_or(server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let app_context = ctx.app_context().await?;
    let state = ServeState::from_context(&app_context);
    spawn_policy_reloader(Arc::clone(&app_context));
    let app = build_router(state, &server.cors_origins);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        %addr,
        config = %ctx.config_path().display(),
        origins = ?server.cors_origins,
        "query API listening"
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server exited with error")?;
    info!("query API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Reloads the access policy on SIGHUP. A bad policy file is logged and the
/// running snapshot kept.
#[cfg(unix)]
fn spawn_policy_reloader(app_context: Arc<AppContext>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!(?err, "SIGHUP policy reload unavailable");
            return;
        }
    };
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            if let Err(err) = app_context.reload_policies() {
                warn!("policy reload rejected: {err:#}");
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_policy_reloader(_app_context: Arc<AppContext>) {}
