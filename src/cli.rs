//! CLI for this application
//!
use reqwest::Url;

use crate::settings::{self, RateLimitPair};

#[derive(Clone, Debug, clap::Parser)]
#[command(name = settings::APP_NAME, version = settings::APP_VERSION)]
pub struct Cli {
    // Server listen address
    #[clap(
        long,
        default_value = "0.0.0.0",
        env("LOBBYWATCH_LISTEN_ADDRESS"),
        help = "IP Address to listen on"
    )]
    pub listen_address: String,

    // HTTP API listen port
    #[clap(
        long,
        default_value = settings::DEFAULT_PORT_HTTP,
        env("LOBBYWATCH_HTTP_LISTEN_PORT"),
        help = "Port to bind the lobbywatch HTTP API to"
    )]
    pub listen_port: u16,

    #[clap(
        long,
        env("RIOT_API_KEY"),
        hide_env_values = true,
        help = "Token sent as X-Riot-Token on every remote call"
    )]
    pub api_key: String,

    #[clap(
        long,
        default_value = settings::DEFAULT_API_BASE_URL,
        env("LOBBYWATCH_API_BASE_URL"),
        help = "Base URL of the remote tournament API"
    )]
    pub api_base_url: Url,

    #[clap(
        long,
        default_value = "info",
        env("LOBBYWATCH_LOG_LEVEL"),
        help = "Log level used when RUST_LOG is not set"
    )]
    pub log_level: String,

    #[clap(
        long,
        default_value = settings::DEFAULT_COMMAND_PREFIX,
        env("LOBBYWATCH_COMMAND_PREFIX"),
        help = "Prefix that marks a chat message as a command"
    )]
    pub command_prefix: String,

    // Member lookups are cached for this long
    #[clap(
        long,
        default_value = "86400",
        env("LOBBYWATCH_MEMBER_CACHE_TTL_SECONDS"),
        help = "Seconds a member lookup stays cached"
    )]
    pub member_cache_ttl_seconds: u64,

    #[clap(
        long,
        default_value = "120",
        env("LOBBYWATCH_CACHE_SWEEP_INTERVAL_SECONDS"),
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between sweeps of expired cache entries"
    )]
    pub cache_sweep_interval_seconds: u64,

    #[clap(
        long,
        default_value = "NA",
        env("LOBBYWATCH_REGION"),
        help = "Region to register the tournament provider in"
    )]
    pub region: String,

    #[clap(
        long,
        default_value = "http://localhost:8420/callbacks",
        env("LOBBYWATCH_PROVIDER_CALLBACK_URL"),
        help = "Callback URL registered with the tournament provider"
    )]
    pub provider_callback_url: String,

    #[clap(
        long,
        default_value = "lobbywatch",
        env("LOBBYWATCH_TOURNAMENT_NAME"),
        help = "Name used when registering the tournament session"
    )]
    pub tournament_name: String,

    // Rate limit settings: application-wide quotas
    #[clap(
        long,
        default_value = settings::DEFAULT_APP_RATE_LIMITS,
        env("LOBBYWATCH_APP_RATE_LIMITS"),
        help = "Application quotas as calls:seconds,calls:seconds (short,long)"
    )]
    pub app_rate_limits: RateLimitPair,

    // Rate limit settings: per-method quotas
    #[clap(
        long,
        default_value = settings::DEFAULT_METHOD_RATE_LIMITS,
        env("LOBBYWATCH_METHOD_RATE_LIMITS"),
        help = "Per-method quotas as calls:seconds,calls:seconds (short,long)"
    )]
    pub method_rate_limits: RateLimitPair,
}

impl Cli {
    pub fn into_settings(self) -> settings::Settings {
        settings::Settings {
            listen_address: self.listen_address,
            listen_port: self.listen_port,
            api_key: self.api_key,
            api_base_url: self.api_base_url,
            log_level: self.log_level,
            command_prefix: self.command_prefix,
            member_cache_ttl_seconds: self.member_cache_ttl_seconds,
            cache_sweep_interval_seconds: self.cache_sweep_interval_seconds,
            region: self.region,
            provider_callback_url: self.provider_callback_url,
            tournament_name: self.tournament_name,
            app_rate_limits: self.app_rate_limits,
            method_rate_limits: self.method_rate_limits,
        }
    }
}
