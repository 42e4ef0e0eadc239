use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use zonekeeper::{
    AppState, SharedState, api, auth, config::AppConfig, db, powerdns::client::PowerDnsClient,
    visibility::Scope,
};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, value_name = "PATH")]
    db_path: PathBuf,
    /// Listen address for the HTTP server
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// PowerDNS API URL
    #[arg(long, value_name = "URL")]
    pdns_url: String,
    /// PowerDNS API key
    #[arg(long, value_name = "KEY")]
    pdns_key: String,
    /// PowerDNS server ID
    #[arg(long, value_name = "ID", default_value = "localhost")]
    pdns_server_id: String,
    /// TTL for records created without an explicit one
    #[arg(long, value_name = "SECONDS", default_value_t = 3600)]
    default_ttl: u32,
    /// Create an elevated-scope user (username:password) if absent, then continue
    #[arg(long, value_name = "USER:PASS")]
    bootstrap_admin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let state = init_shared_state(&cli).await?;

    if let Some(spec) = &cli.bootstrap_admin {
        bootstrap_admin(&state, spec).await?;
    }

    let app = api::create_router(state).layer(CorsLayer::permissive());

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind to {}", cli.listen))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

async fn init_shared_state(cli: &Cli) -> Result<SharedState> {
    if let Some(parent) = cli.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create db directory {}", parent.display()))?;
    }

    let db = db::init_db(&cli.db_path).await?;
    let pdns = PowerDnsClient::new(&cli.pdns_url, &cli.pdns_key, &cli.pdns_server_id);

    Ok(Arc::new(AppState {
        config: AppConfig {
            default_ttl: cli.default_ttl,
        },
        db,
        pdns,
    }))
}

async fn bootstrap_admin(state: &SharedState, spec: &str) -> Result<()> {
    let (username, password) = spec
        .split_once(':')
        .context("--bootstrap-admin expects USER:PASS")?;

    if zonekeeper::db::user_repo::find_by_username(&state.db, username)
        .await?
        .is_some()
    {
        info!("admin user '{username}' already present");
        return Ok(());
    }

    let hash = auth::hash_password(password)?;
    zonekeeper::db::user_repo::insert(&state.db, username, &hash, Scope::All).await?;
    info!("created elevated-scope user '{username}'");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
