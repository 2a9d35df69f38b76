//! Boundary with the remote tournament API.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;

use crate::error::Result;
pub use http::HttpRemote;

pub type ProviderId = i64;
pub type SessionId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickType {
    BlindPick,
    DraftMode,
    AllRandom,
    TournamentDraft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapType {
    SummonersRift,
    HowlingAbyss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpectatorType {
    None,
    Lobbyonly,
    All,
}

/// Settings attached to a generated lobby code
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeParameters {
    pub team_size: u8,
    pub pick_type: PickType,
    pub map_type: MapType,
    pub spectator_type: SpectatorType,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum LobbyEventKind {
    PlayerJoinedGameEvent,
    PlayerQuitGameEvent,
    ChampSelectStartedEvent,
    GameAllocatedToLsmEvent,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEvent {
    pub event_type: LobbyEventKind,
    #[serde(default)]
    pub summoner_id: String,
    #[serde(default)]
    pub timestamp: String,
}

impl LobbyEvent {
    pub fn new(event_type: LobbyEventKind, summoner_id: impl Into<String>) -> Self {
        Self {
            event_type,
            summoner_id: summoner_id.into(),
            timestamp: String::new(),
        }
    }

    pub fn joined(summoner_id: impl Into<String>) -> Self {
        Self::new(LobbyEventKind::PlayerJoinedGameEvent, summoner_id)
    }

    pub fn quit(summoner_id: impl Into<String>) -> Self {
        Self::new(LobbyEventKind::PlayerQuitGameEvent, summoner_id)
    }

    pub fn champ_select_started() -> Self {
        Self::new(LobbyEventKind::ChampSelectStartedEvent, "")
    }

    pub fn game_allocated() -> Self {
        Self::new(LobbyEventKind::GameAllocatedToLsmEvent, "")
    }
}

/// Event log envelope as returned by the remote
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEventLog {
    pub event_list: Vec<LobbyEvent>,
}

/// Immutable once fetched; cached by id
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemberDetail {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "summonerLevel")]
    pub level: i64,
}

/// The five remote operations. Implementations perform the call and nothing
/// else: no rate limiting, caching or retries.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn register_provider(&self) -> Result<ProviderId>;
    async fn register_session(&self, provider_id: ProviderId) -> Result<SessionId>;
    async fn generate_code(
        &self,
        session_id: SessionId,
        parameters: &CodeParameters,
    ) -> Result<Vec<String>>;
    async fn get_event_log(&self, code: &str) -> Result<LobbyEventLog>;
    async fn get_member_detail(&self, member_id: &str) -> Result<MemberDetail>;
}
