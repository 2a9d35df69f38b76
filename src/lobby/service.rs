use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use super::fan_out::resolve_all;
use super::params::LobbyParameters;
use super::state::{derive_state, LobbyState, Phase};
use crate::bootstrap::BootstrapCoalescer;
use crate::client::CachingClient;
use crate::concurrency_error;
use crate::error::{LobbyError, Result};
use crate::remote::MemberDetail;

const ROSTER_CHANNEL_CAPACITY: usize = 64;

/// A lobby we generated a code for
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lobby {
    pub code: String,
    pub owner: String,
    pub parameters: LobbyParameters,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    pub members: Vec<MemberDetail>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub display_name: String,
    pub level: i64,
}

/// Emitted whenever a lobby's roster is refreshed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterUpdate {
    pub code: String,
    pub owner: String,
    pub phase: Phase,
    pub members: Vec<RosterEntry>,
    pub spots_left: usize,
}

impl RosterUpdate {
    fn new(lobby: &Lobby) -> Self {
        Self {
            code: lobby.code.clone(),
            owner: lobby.owner.clone(),
            phase: lobby.phase,
            members: lobby
                .members
                .iter()
                .map(|member| RosterEntry {
                    display_name: member.display_name.clone(),
                    level: member.level,
                })
                .collect(),
            spots_left: lobby
                .parameters
                .capacity()
                .saturating_sub(lobby.members.len()),
        }
    }
}

type LobbyRegistry = Arc<RwLock<HashMap<String, Lobby>>>;

#[derive(Clone, Debug)]
pub struct LobbyService {
    client: CachingClient,
    bootstrap: BootstrapCoalescer,
    lobbies: LobbyRegistry,
    updates: broadcast::Sender<RosterUpdate>,
}

impl LobbyService {
    pub fn new(client: CachingClient, bootstrap: BootstrapCoalescer) -> Self {
        let (updates, _) = broadcast::channel(ROSTER_CHANNEL_CAPACITY);
        Self {
            client,
            bootstrap,
            lobbies: Arc::new(RwLock::new(HashMap::new())),
            updates,
        }
    }

    pub fn bootstrap(&self) -> &BootstrapCoalescer {
        &self.bootstrap
    }

    pub fn client(&self) -> &CachingClient {
        &self.client
    }

    /// Receive every roster update from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RosterUpdate> {
        self.updates.subscribe()
    }

    /// Generate a code for a new lobby, track it and load its first roster
    #[instrument(skip(self, parameters), level = "debug")]
    pub async fn create_lobby(
        &self,
        owner: String,
        parameters: LobbyParameters,
    ) -> Result<RosterUpdate> {
        let session_id = self.bootstrap.session_id().await?;
        let code = self
            .client
            .generate_code(session_id, &parameters.code_parameters())
            .await?;
        info!("Creating lobby {} for {}", code, owner);

        let lobby = Lobby {
            code: code.clone(),
            owner,
            parameters,
            created_at: Utc::now(),
            phase: Phase::PreGame,
            members: Vec::new(),
        };
        self.lobbies
            .write()
            .map_err(|e| concurrency_error!("Failed to acquire lobby registry lock: {}", e))?
            .insert(code.clone(), lobby);

        self.refresh(&code).await
    }

    pub fn lobby(&self, code: &str) -> Result<Lobby> {
        self.lobbies
            .read()
            .map_err(|e| concurrency_error!("Failed to acquire lobby registry lock: {}", e))?
            .get(code)
            .cloned()
            .ok_or_else(|| LobbyError::NotFound(format!("no lobby with code {}", code)))
    }

    /// Current phase and roster for any code, tracked or not
    pub async fn lobby_state(&self, code: &str) -> Result<LobbyState> {
        let events = self.client.get_event_log(code).await?;
        let derived = derive_state(&events);
        debug!(
            "Lobby {} is in {:?} with {} members",
            code,
            derived.phase,
            derived.members.len()
        );
        let members = resolve_all(&self.client, &derived.members).await?;
        Ok(LobbyState {
            phase: derived.phase,
            members,
        })
    }

    /// Reload a tracked lobby and broadcast the result
    #[instrument(skip(self), level = "debug")]
    pub async fn refresh(&self, code: &str) -> Result<RosterUpdate> {
        // unknown codes never reach the remote
        self.lobby(code)?;
        let state = self.lobby_state(code).await?;

        let update = {
            let mut lobbies = self
                .lobbies
                .write()
                .map_err(|e| concurrency_error!("Failed to acquire lobby registry lock: {}", e))?;
            let lobby = lobbies
                .get_mut(code)
                .ok_or_else(|| LobbyError::NotFound(format!("no lobby with code {}", code)))?;
            lobby.phase = state.phase;
            lobby.members = state.members;
            RosterUpdate::new(lobby)
        };

        // no subscribers is fine
        let _ = self.updates.send(update.clone());
        Ok(update)
    }
}
