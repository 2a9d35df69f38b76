//! All Paths are recorded here for use throughout this codebase
pub mod base {
    pub const ROOT: &str = "/";
    pub const HEALTH: &str = "/health";
    pub const ABOUT: &str = "/about";
}

pub const BOOTSTRAP: &str = "/bootstrap";
pub const COMMANDS: &str = "/commands";

pub mod lobbies {
    pub const CREATE: &str = "/lobbies";
    pub const LOBBY: &str = "/lobbies/:code";
    pub const REFRESH: &str = "/lobbies/:code/refresh";
}

pub fn lobby_path(code: &str) -> String {
    lobbies::LOBBY.replace(":code", code)
}

pub fn refresh_path(code: &str) -> String {
    lobbies::REFRESH.replace(":code", code)
}
