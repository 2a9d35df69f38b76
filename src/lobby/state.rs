//! Lobby state derived from the remote event log.
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::remote::{LobbyEvent, LobbyEventKind, MemberDetail};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    PreGame,
    ChampSelect,
    InGame,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PreGame => write!(f, "Pre-Game Lobby"),
            Phase::ChampSelect => write!(f, "Champion Select"),
            Phase::InGame => write!(f, "In Game"),
        }
    }
}

/// Phase and roster before member lookups
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedState {
    pub phase: Phase,
    pub members: Vec<String>,
}

/// Phase and roster with member details, in roster order
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LobbyState {
    pub phase: Phase,
    pub members: Vec<MemberDetail>,
}

/// Phase comes from which kinds of event are present, not from the latest
/// one: an allocated game wins over champion select wherever it appears.
pub fn derive_phase(events: &[LobbyEvent]) -> Phase {
    let kinds: HashSet<&LobbyEventKind> = events.iter().map(|event| &event.event_type).collect();
    if kinds.contains(&LobbyEventKind::GameAllocatedToLsmEvent) {
        Phase::InGame
    } else if kinds.contains(&LobbyEventKind::ChampSelectStartedEvent) {
        Phase::ChampSelect
    } else {
        Phase::PreGame
    }
}

/// Fold the log in order: joins append once, quits remove.
/// Remaining ids keep their join order.
pub fn derive_members(events: &[LobbyEvent]) -> Vec<String> {
    events.iter().fold(Vec::new(), |mut members, event| {
        match event.event_type {
            LobbyEventKind::PlayerJoinedGameEvent => {
                if !members.contains(&event.summoner_id) {
                    members.push(event.summoner_id.clone());
                }
            }
            LobbyEventKind::PlayerQuitGameEvent => {
                members.retain(|id| id != &event.summoner_id);
            }
            _ => {}
        }
        members
    })
}

pub fn derive_state(events: &[LobbyEvent]) -> DerivedState {
    DerivedState {
        phase: derive_phase(events),
        members: derive_members(events),
    }
}
