use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use super::AppState;
use crate::commands::{self, Command};
use crate::error::{LobbyError, Result};
use crate::lobby::{Lobby, LobbyOption, LobbyParameters, RosterUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLobbyRequest {
    pub owner: String,
    #[serde(default)]
    pub options: Vec<LobbyOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub author: String,
    #[serde(default)]
    pub is_bot: bool,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandReply {
    Ignored,
    Help { text: String },
    Echo { text: Option<String> },
    Lobby(RosterUpdate),
}

fn log_failure(action: &str, err: &LobbyError) {
    match err {
        LobbyError::Validation(_) | LobbyError::NotFound(_) => {
            event!(Level::DEBUG, message = action, err = %err)
        }
        _ => event!(Level::ERROR, message = action, err = ?err),
    }
}

#[instrument(skip(state), level = "debug")]
pub async fn create_lobby(
    State(state): State<AppState>,
    Json(request): Json<CreateLobbyRequest>,
) -> Result<Json<RosterUpdate>> {
    let parameters = LobbyParameters::from_options(&request.options)?;
    state
        .service
        .create_lobby(request.owner, parameters)
        .await
        .map(Json)
        .map_err(|err| {
            log_failure("Failed creating lobby", &err);
            err
        })
}

#[instrument(skip(state), level = "debug")]
pub async fn get_lobby(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Lobby>> {
    state.service.lobby(&code).map(Json)
}

#[instrument(skip(state), level = "debug")]
pub async fn refresh_lobby(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RosterUpdate>> {
    state.service.refresh(&code).await.map(Json).map_err(|err| {
        log_failure("Failed refreshing lobby", &err);
        err
    })
}

#[instrument(skip(state), level = "debug")]
pub async fn handle_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandReply>> {
    let command = match commands::parse_command(
        &state.command_prefix,
        &request.content,
        request.is_bot,
    ) {
        None => return Ok(Json(CommandReply::Ignored)),
        Some(command) => command?,
    };
    event!(Level::DEBUG, message = "Processing command", content = %request.content);

    let reply = match command {
        Command::Help => CommandReply::Help {
            text: commands::help_text(&state.command_prefix),
        },
        Command::Echo(text) => CommandReply::Echo { text },
        Command::New(options) => {
            let parameters = LobbyParameters::from_options(&options)?;
            let update = state
                .service
                .create_lobby(request.author, parameters)
                .await
                .map_err(|err| {
                    log_failure("Failed creating lobby", &err);
                    err
                })?;
            CommandReply::Lobby(update)
        }
    };
    Ok(Json(reply))
}
