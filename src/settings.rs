//! lobbywatch application settings
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config_error;
use crate::error::LobbyError;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const STANDARD_PORT_HTTP: u16 = 8420;
pub const DEFAULT_PORT_HTTP: &str = "8420";
pub const DEFAULT_API_BASE_URL: &str = "https://americas.api.riotgames.com";
pub const DEFAULT_COMMAND_PREFIX: &str = "!inhouse";
pub const DEFAULT_APP_RATE_LIMITS: &str = "20:1,100:120";
pub const DEFAULT_METHOD_RATE_LIMITS: &str = "10:10,500:600";

/// Bucket shared by every outbound call
pub const APP_BUCKET: &str = "app";

/// Remote calls that carry their own per-method quota
pub const METHOD_BUCKETS: [&str; 4] = [
    "registerProvider",
    "registerSession",
    "generateCode",
    "getEventLog",
];

/// A single quota: `max_calls` permits per sliding `interval_seconds` window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub max_calls: u32,
    pub interval_seconds: u64,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl FromStr for RateLimitSettings {
    type Err = LobbyError;

    /// Parses `calls:seconds`, e.g. `20:1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (calls, seconds) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| config_error!("Rate limit '{}' must look like calls:seconds", s))?;
        let max_calls: u32 = calls
            .parse()
            .map_err(|_| config_error!("Invalid call count in rate limit '{}'", s))?;
        let interval_seconds: u64 = seconds
            .parse()
            .map_err(|_| config_error!("Invalid interval in rate limit '{}'", s))?;
        if max_calls == 0 || interval_seconds == 0 {
            return Err(config_error!(
                "Rate limit '{}' must allow at least one call over a non-empty interval",
                s
            ));
        }
        Ok(Self {
            max_calls,
            interval_seconds,
        })
    }
}

/// Short and long windows for one quota family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitPair {
    pub short: RateLimitSettings,
    pub long: RateLimitSettings,
}

impl FromStr for RateLimitPair {
    type Err = LobbyError;

    /// Parses `calls:seconds,calls:seconds` (short window first)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [short, long] => Ok(Self {
                short: short.parse()?,
                long: long.parse()?,
            }),
            _ => Err(config_error!(
                "Expected exactly two rate limits (short,long), got '{}'",
                s
            )),
        }
    }
}

/// Configuration for a single named bucket
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BucketSettings {
    pub name: String,
    pub limit: RateLimitSettings,
}

pub fn short_bucket(family: &str) -> String {
    format!("{}-short", family)
}

pub fn long_bucket(family: &str) -> String {
    format!("{}-long", family)
}

/// Expand the application and per-method quotas into the full bucket table
pub fn bucket_table(app: RateLimitPair, method: RateLimitPair) -> Vec<BucketSettings> {
    let mut buckets = vec![
        BucketSettings {
            name: short_bucket(APP_BUCKET),
            limit: app.short,
        },
        BucketSettings {
            name: long_bucket(APP_BUCKET),
            limit: app.long,
        },
    ];
    for family in METHOD_BUCKETS {
        buckets.push(BucketSettings {
            name: short_bucket(family),
            limit: method.short,
        });
        buckets.push(BucketSettings {
            name: long_bucket(family),
            limit: method.long,
        });
    }
    buckets
}

#[derive(Clone, Debug)]
pub struct Settings {
    // Server listen address
    pub listen_address: String,

    // HTTP API listen port
    pub listen_port: u16,

    // Remote API: auth token sent on every call
    pub api_key: String,

    // Remote API base URL
    pub api_base_url: Url,

    // Default log verbosity when RUST_LOG is unset
    pub log_level: String,

    // Chat command prefix
    pub command_prefix: String,

    // Member detail cache
    pub member_cache_ttl_seconds: u64,
    pub cache_sweep_interval_seconds: u64,

    // Provider/session registration
    pub region: String,
    pub provider_callback_url: String,
    pub tournament_name: String,

    // Quotas
    pub app_rate_limits: RateLimitPair,
    pub method_rate_limits: RateLimitPair,
}

impl Settings {
    pub fn bucket_settings(&self) -> Vec<BucketSettings> {
        bucket_table(self.app_rate_limits, self.method_rate_limits)
    }

    pub fn member_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.member_cache_ttl_seconds)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_seconds)
    }
}
