//! Chat command parsing.
//!
//! `<prefix> new teamsize=3 map=howlingabyss` creates a lobby,
//! `<prefix> echo <word>` echoes, anything else shows help.
use crate::error::Result;
use crate::lobby::LobbyOption;
use crate::validation_error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Echo(Option<String>),
    New(Vec<LobbyOption>),
}

/// `None` when the message is not addressed to us
pub fn parse_command(
    prefix: &str,
    content: &str,
    author_is_bot: bool,
) -> Option<Result<Command>> {
    if author_is_bot {
        return None;
    }
    let rest = content.strip_prefix(prefix)?;
    // "!inhousefoo" is someone else's command
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut words = rest.split_whitespace();
    let command = words
        .next()
        .map(str::to_lowercase)
        .unwrap_or_else(|| "help".to_string());
    let command = match command.as_str() {
        "echo" => Ok(Command::Echo(words.next().map(str::to_string))),
        "new" => parse_options(words).map(Command::New),
        _ => Ok(Command::Help),
    };
    Some(command)
}

fn parse_options<'a>(words: impl Iterator<Item = &'a str>) -> Result<Vec<LobbyOption>> {
    words
        .map(|word| {
            let parts: Vec<&str> = word.split('=').collect();
            match parts.as_slice() {
                [option, value] => Ok(LobbyOption::new(*option, *value)),
                _ => Err(validation_error!(
                    "Error encountered during argument {}. Arguments must be of the form option=value .",
                    word
                )),
            }
        })
        .collect()
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "League of Legends Inhouse Organizer\n\
         Generates tournament codes for inhouse lobbies and tracks the lobby status.\n\n\
         {prefix} help              Show this message\n\
         {prefix} new [options]     Create a new inhouse lobby. Options are space separated option=value pairs:\n\
         \x20 editoriginalonly   true | false (default false)\n\
         \x20 map                summonersrift | howlingabyss (default summonersrift)\n\
         \x20 teamsize           1-5 (default 5)\n\
         \x20 picktype           blind | draft | random | tournamentdraft (default draft)\n\
         \x20 spectatortype      none | lobbyonly | all (default all)\n",
        prefix = prefix
    )
}
