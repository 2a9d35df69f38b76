pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod limiters;
pub mod lobby;
pub mod remote;
pub mod settings;
