//! User-configurable lobby options.
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::remote::{CodeParameters, MapType, PickType, SpectatorType};
use crate::validation_error;

pub const MAX_TEAM_SIZE: u8 = 5;

/// One `option=value` pair as typed by a user
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyOption {
    pub option_name: String,
    pub value: String,
}

impl LobbyOption {
    pub fn new(option_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LobbyParameters {
    pub edit_original_only: bool,
    pub map: MapType,
    pub team_size: u8,
    pub pick_type: PickType,
    pub spectator_type: SpectatorType,
}

impl Default for LobbyParameters {
    fn default() -> Self {
        Self {
            edit_original_only: false,
            map: MapType::SummonersRift,
            team_size: MAX_TEAM_SIZE,
            pick_type: PickType::DraftMode,
            spectator_type: SpectatorType::All,
        }
    }
}

impl LobbyParameters {
    /// Defaults with `options` applied in order; the first bad option wins
    pub fn from_options(options: &[LobbyOption]) -> Result<Self> {
        let mut parameters = Self::default();
        for option in options {
            parameters.apply(&option.option_name, &option.value)?;
        }
        Ok(parameters)
    }

    pub fn apply(&mut self, option: &str, value: &str) -> Result<()> {
        match option.to_lowercase().as_str() {
            "editoriginalonly" => {
                self.edit_original_only = match value {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(validation_error!(
                            "Error while parsing value for option 'editOriginalOnly': Value must be either 'true' or 'false'. Got: {}",
                            value
                        ))
                    }
                }
            }
            "teamsize" => {
                let team_size: i64 = value.parse().map_err(|_| {
                    validation_error!(
                        "Error while parsing value for option 'teamSize': Value must be numerical. Got: {}",
                        value
                    )
                })?;
                if team_size < 1 || team_size > i64::from(MAX_TEAM_SIZE) {
                    return Err(validation_error!(
                        "Error while parsing value for option 'teamSize': Value must be between 1 and {}. Got: {}",
                        MAX_TEAM_SIZE,
                        value
                    ));
                }
                self.team_size = team_size as u8;
            }
            "map" => {
                self.map = match value {
                    "summonersrift" => MapType::SummonersRift,
                    "howlingabyss" => MapType::HowlingAbyss,
                    _ => {
                        return Err(validation_error!(
                            "Error while parsing value for option 'map': Value must be either 'summonersrift' or 'howlingabyss'. Got: {}",
                            value
                        ))
                    }
                }
            }
            "picktype" => {
                self.pick_type = match value {
                    "blind" => PickType::BlindPick,
                    "draft" => PickType::DraftMode,
                    "random" => PickType::AllRandom,
                    "tournamentdraft" => PickType::TournamentDraft,
                    _ => {
                        return Err(validation_error!(
                            "Error while parsing value for option 'pickType': Value must be one of [blind|draft|random|tournamentdraft]. Got: {}",
                            value
                        ))
                    }
                }
            }
            "spectatortype" => {
                self.spectator_type = match value {
                    "none" => SpectatorType::None,
                    "lobbyonly" => SpectatorType::Lobbyonly,
                    "all" => SpectatorType::All,
                    _ => {
                        return Err(validation_error!(
                            "Error while parsing value for option 'spectatorType': Value must be one of [none|lobbyonly|all]. Got: {}",
                            value
                        ))
                    }
                }
            }
            _ => return Err(validation_error!("Unrecognized option: {}", option)),
        }
        Ok(())
    }

    pub fn code_parameters(&self) -> CodeParameters {
        CodeParameters {
            team_size: self.team_size,
            pick_type: self.pick_type,
            map_type: self.map,
            spectator_type: self.spectator_type,
        }
    }

    /// Full lobby: two teams
    pub fn capacity(&self) -> usize {
        usize::from(self.team_size) * 2
    }

    pub fn map_label(&self) -> &'static str {
        match self.map {
            MapType::SummonersRift => "Summoner's Rift",
            MapType::HowlingAbyss => "Howling Abyss",
        }
    }

    pub fn pick_type_label(&self) -> &'static str {
        match self.pick_type {
            PickType::BlindPick => "Blind Pick",
            PickType::DraftMode => "Draft Mode",
            PickType::AllRandom => "All Random",
            PickType::TournamentDraft => "Tournament Draft",
        }
    }
}
