mod base;
mod lobbies;

use std::borrow::Cow;

use axum::{
    error_handling::HandleErrorLayer, extract::DefaultBodyLimit, http::StatusCode,
    response::IntoResponse, routing, Router,
};
use tokio::time::Duration;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

pub mod paths;

pub use lobbies::{CommandReply, CommandRequest, CreateLobbyRequest};

use crate::lobby::LobbyService;

const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_IN_FLIGHT_REQUESTS: usize = 1024;

#[derive(Clone, Debug)]
pub struct AppState {
    pub service: LobbyService,
    pub command_prefix: String,
}

/// Build the HTTP API in front of a lobby service
pub fn api(state: AppState) -> Router {
    Router::new()
        .route(paths::base::ROOT, routing::get(base::root))
        .route(paths::base::HEALTH, routing::get(base::health))
        .route(paths::base::ABOUT, routing::get(base::about))
        .route(paths::BOOTSTRAP, routing::get(base::bootstrap))
        .route(paths::COMMANDS, routing::post(lobbies::handle_command))
        .route(paths::lobbies::CREATE, routing::post(lobbies::create_lobby))
        .route(paths::lobbies::LOBBY, routing::get(lobbies::get_lobby))
        .route(paths::lobbies::REFRESH, routing::post(lobbies::refresh_lobby))
        .layer(
            ServiceBuilder::new()
                // Handle errors from middleware
                .layer(HandleErrorLayer::new(handle_error))
                .load_shed()
                .concurrency_limit(MAX_IN_FLIGHT_REQUESTS)
                .timeout(Duration::from_secs(10)),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_error(error: BoxError) -> impl IntoResponse {
    if error.is::<tower::timeout::error::Elapsed>() {
        return (StatusCode::REQUEST_TIMEOUT, Cow::from("request timed out"));
    }

    if error.is::<tower::load_shed::error::Overloaded>() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Cow::from("service is overloaded, try again later"),
        );
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Cow::from(format!("Unhandled internal error: {}", error)),
    )
}
