use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lobbywatch::api;
use lobbywatch::bootstrap::BootstrapCoalescer;
use lobbywatch::cli;
use lobbywatch::client::CachingClient;
use lobbywatch::limiters::RateLimiter;
use lobbywatch::lobby::LobbyService;
use lobbywatch::remote::HttpRemote;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args and env vars
    let settings = cli::Cli::parse().into_settings();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "lobbywatch={level},tower_http={level}",
                    level = settings.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Socket server listen address setup
    let listen_address: IpAddr = settings
        .listen_address
        .parse::<IpAddr>()
        .context("Invalid listen address")?;
    let socket_address = SocketAddr::from((listen_address, settings.listen_port));

    // Every remote call goes through the limiter and cache
    let rate_limiter = RateLimiter::from_settings(&settings.bucket_settings())?;
    let remote = HttpRemote::new(&settings)?;
    let client = CachingClient::new(
        Arc::new(remote),
        rate_limiter,
        settings.member_cache_ttl(),
    );
    let _sweeper = client.spawn_cache_sweeper(settings.cache_sweep_interval());

    // Registration starts right away; callers wait on it as needed
    let bootstrap = BootstrapCoalescer::start(client.clone());
    let service = LobbyService::new(client, bootstrap);

    let api = api::api(api::AppState {
        service,
        command_prefix: settings.command_prefix.clone(),
    });

    // Start server
    info!("Starting lobbywatch on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(api.into_make_service())
        .await?;

    Ok(())
}
