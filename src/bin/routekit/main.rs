//! routekit demo service.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:3000/health
//!   curl http://localhost:3000/api/anon/account/42
//!   curl -X POST -H 'authorization: Bearer user-123' http://localhost:3000/api/anon/account
//!   curl http://localhost:3000/api/auth/profile                                   # 401
//!   curl -H 'authorization: Bearer user-123' http://localhost:3000/api/auth/profile

mod accounts;

use anyhow::Context as _;
use routekit::{health, Config, ManifestLoader, Method, Registrar, Router, Server, TrustedTokenVerifier};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(?config, "configuration loaded");

    let loader = ManifestLoader::new(accounts::handlers());
    let router = Router::new().on(Method::Get, health::PATH, health::status);
    let router = Registrar::new(TrustedTokenVerifier)
        .register_dir(router, &config.routes_dir, &loader)
        .with_context(|| format!("loading routes from {}", config.routes_dir.display()))?;

    Server::new(config.socket_addr()).serve(router).await?;
    Ok(())
}
