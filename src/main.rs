//! House Hunter backend server.
//!
//! Boots the HTTP API:
//! - Store: Sled with JSON documents for `users` and `houses`
//! - Sessions: signed tokens (JWT) in an HTTP-only cookie
//! - Networking: Axum + Tokio, credentialed CORS allow-list
//!
//! Usage:
//!   cargo run --bin load_data       # populate sample data
//!   cargo run --bin house-hunter    # start server
//!   # Then drive it with house-cli or curl (cookie-based sessions)

use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use house_hunter::auth::TokenCodec;
use house_hunter::rest::create_router;
use house_hunter::storage::Storage;

#[derive(Parser, Debug)]
#[command(name = "house-hunter")]
#[command(about = "Rental-listing backend", long_about = None)]
struct ServerConfig {
    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Directory of the Sled database.
    #[arg(long, env = "DATA_DIR", default_value = "house_hunter_data")]
    data_dir: String,

    /// Secret used to sign and verify session tokens.
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: String,

    /// Origins allowed to make credentialed cross-origin requests.
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = [
            "http://localhost:5173".to_string(),
            "http://localhost:5174".to_string(),
        ]
    )]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    // The supervising caller: a failed bootstrap is logged and fatal rather
    // than silently swallowed.
    if let Err(err) = run(config).await {
        error!(error = ?err, "server exited with error");
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let storage = Storage::open(&config.data_dir)
        .with_context(|| format!("opening store at {}", config.data_dir))?;
    let codec = TokenCodec::new(&config.access_token_secret);

    // Explicit origin allow-list with credentials; a wildcard would both be
    // rejected by browsers for credentialed requests and reopen the
    // allow-all hole of the early revisions.
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid allowed origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = create_router(storage, codec).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "The server is running");

    axum::serve(listener, app.into_make_service())
        .await
        .context("serving HTTP")?;
    Ok(())
}
