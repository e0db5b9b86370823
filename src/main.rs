use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use demo_api::config::{self, Config};
use demo_api::{api, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = cli::Cli::parse();
    let cfg = config::load().context("invalid configuration")?;

    let result = match args.command {
        Some(cli::Commands::Serve {
            host,
            port,
            no_auth,
        }) => {
            let mut cfg = cfg;
            if let Some(host) = host {
                cfg.host = host;
            }
            if let Some(port) = port {
                cfg.port = port;
            }
            if no_auth {
                cfg.auth_enabled = false;
            }
            run_server(cfg).await
        }
        Some(cli::Commands::Token) => print_token(cfg),
        None => run_server(cfg).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "demo_api=debug,tower_http=debug".into()),
    );
    let json = std::env::var("DEMO_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(cfg: Config) -> anyhow::Result<()> {
    tracing::info!(config = ?cfg, "Loading credentials...");
    let state = Arc::new(AppState::from_config(cfg)?);

    if !state.config.auth_enabled {
        tracing::warn!("Authentication is disabled; all routes are public");
    }

    let app = api::router(state.clone());

    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Demo API listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_token(cfg: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(cfg)?;
    let token = state
        .tokens
        .issue(&state.credentials.username, Utc::now())
        .context("failed to sign token")?;
    println!(
        "Token issued for '{}' (valid {}s):\n  Use:   Authorization: Bearer {}",
        state.credentials.username,
        state.tokens.ttl().num_seconds(),
        token
    );
    Ok(())
}
