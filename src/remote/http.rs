use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use super::{
    CodeParameters, LobbyEventLog, MemberDetail, ProviderId, RemoteApi, SessionId,
};
use crate::config_error;
use crate::error::{LobbyError, RemoteError, Result};
use crate::settings::Settings;

pub const AUTH_HEADER: &str = "x-riot-token";

pub mod paths {
    //! Path segments appended to the configured base URL
    pub const PROVIDERS: &[&str] = &["lol", "tournament", "v4", "providers"];
    pub const TOURNAMENTS: &[&str] = &["lol", "tournament", "v4", "tournaments"];
    pub const CODES: &[&str] = &["lol", "tournament", "v4", "codes"];
    pub const LOBBY_EVENTS: &[&str] = &["lol", "tournament", "v4", "lobby-events", "by-code"];
    pub const SUMMONERS: &[&str] = &["lol", "summoner", "v4", "summoners"];
}

#[derive(Serialize)]
struct ProviderRegistration<'a> {
    region: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRegistration<'a> {
    provider_id: ProviderId,
    name: &'a str,
}

/// `RemoteApi` over HTTP. Every request carries the auth header.
#[derive(Clone, Debug)]
pub struct HttpRemote {
    client: Client,
    base_url: Url,
    region: String,
    provider_callback_url: String,
    tournament_name: String,
}

impl HttpRemote {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&settings.api_key)
            .map_err(|e| config_error!("API key is not a valid header value: {}", e))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, auth);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: settings.api_base_url.clone(),
            region: settings.region.clone(),
            provider_callback_url: settings.provider_callback_url.clone(),
            tournament_name: settings.tournament_name.clone(),
        })
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    /// Any path already on the base URL is kept.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| config_error!("API base URL {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn url_for(&self, prefix: &[&str], id: &str) -> Result<Url> {
        let mut segments = prefix.to_vec();
        segments.push(id);
        self.url(&segments)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Remote call failed with {}: {}", status, body);
            return Err(LobbyError::Remote(RemoteError::new(
                Some(status.as_u16()),
                body,
            )));
        }
        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn register_provider(&self) -> Result<ProviderId> {
        let body = ProviderRegistration {
            region: &self.region,
            url: &self.provider_callback_url,
        };
        self.send(self.client.post(self.url(paths::PROVIDERS)?).json(&body))
            .await
    }

    async fn register_session(&self, provider_id: ProviderId) -> Result<SessionId> {
        let body = SessionRegistration {
            provider_id,
            name: &self.tournament_name,
        };
        self.send(self.client.post(self.url(paths::TOURNAMENTS)?).json(&body))
            .await
    }

    async fn generate_code(
        &self,
        session_id: SessionId,
        parameters: &CodeParameters,
    ) -> Result<Vec<String>> {
        let request = self
            .client
            .post(self.url(paths::CODES)?)
            .query(&[("count", "1".to_string()), ("tournamentId", session_id.to_string())])
            .json(parameters);
        self.send(request).await
    }

    async fn get_event_log(&self, code: &str) -> Result<LobbyEventLog> {
        let url = self.url_for(paths::LOBBY_EVENTS, code)?;
        debug!("Fetching event log for {}", code);
        self.send(self.client.get(url)).await
    }

    async fn get_member_detail(&self, member_id: &str) -> Result<MemberDetail> {
        let url = self.url_for(paths::SUMMONERS, member_id)?;
        self.send(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_settings() -> Settings {
        Settings {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 8420,
            api_key: "RGAPI-test".to_string(),
            api_base_url: Url::parse("https://example.invalid").unwrap(),
            log_level: "info".to_string(),
            command_prefix: "!inhouse".to_string(),
            member_cache_ttl_seconds: 60,
            cache_sweep_interval_seconds: 120,
            region: "NA".to_string(),
            provider_callback_url: "http://localhost/callbacks".to_string(),
            tournament_name: "test server".to_string(),
            app_rate_limits: crate::settings::DEFAULT_APP_RATE_LIMITS.parse().unwrap(),
            method_rate_limits: crate::settings::DEFAULT_METHOD_RATE_LIMITS.parse().unwrap(),
        }
    }

    #[test]
    fn builds_urls_from_base() {
        let remote = HttpRemote::new(&get_settings()).unwrap();
        let url = remote.url_for(paths::LOBBY_EVENTS, "NA04-code").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.invalid/lol/tournament/v4/lobby-events/by-code/NA04-code"
        );
    }

    #[test]
    fn keeps_base_url_path_prefix() {
        for base in ["http://proxy.local/riot/", "http://proxy.local/riot"] {
            let mut settings = get_settings();
            settings.api_base_url = Url::parse(base).unwrap();
            let remote = HttpRemote::new(&settings).unwrap();
            assert_eq!(
                remote.url(paths::PROVIDERS).unwrap().as_str(),
                "http://proxy.local/riot/lol/tournament/v4/providers"
            );
        }
    }

    #[test]
    fn ids_are_percent_encoded() {
        let remote = HttpRemote::new(&get_settings()).unwrap();
        let url = remote.url_for(paths::SUMMONERS, "a b/../c?d").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.invalid/lol/summoner/v4/summoners/a%20b%2F..%2Fc%3Fd"
        );
    }

    #[test]
    fn rejects_unprintable_api_key() {
        let mut settings = get_settings();
        settings.api_key = "bad\nkey".to_string();
        assert!(matches!(
            HttpRemote::new(&settings),
            Err(LobbyError::Config(_))
        ));
    }
}
