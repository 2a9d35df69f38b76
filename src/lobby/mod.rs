pub mod fan_out;
pub mod params;
pub mod service;
pub mod state;

pub use fan_out::resolve_all;
pub use params::{LobbyOption, LobbyParameters};
pub use service::{Lobby, LobbyService, RosterEntry, RosterUpdate};
pub use state::{derive_state, DerivedState, LobbyState, Phase};
