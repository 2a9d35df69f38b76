//! Scripted in-memory remote shared by the integration tests
#![allow(dead_code)]
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use lobbywatch::client::CachingClient;
use lobbywatch::error::{LobbyError, RemoteError, Result};
use lobbywatch::limiters::RateLimiter;
use lobbywatch::remote::{
    CodeParameters, LobbyEvent, LobbyEventLog, MemberDetail, ProviderId, RemoteApi, SessionId,
};
use lobbywatch::settings::{self, BucketSettings};

pub const PROVIDER_ID: ProviderId = 7;
pub const SESSION_ID: SessionId = 4242;

#[derive(Default)]
pub struct FakeRemote {
    pub provider_calls: AtomicUsize,
    pub session_calls: AtomicUsize,
    pub code_calls: AtomicUsize,
    pub event_log_calls: AtomicUsize,
    pub member_calls: AtomicUsize,

    pub fail_provider: AtomicBool,
    pub fail_session: AtomicBool,
    pub no_codes: AtomicBool,
    pub registration_delay: Mutex<Duration>,

    pub event_logs: Mutex<HashMap<String, Vec<LobbyEvent>>>,
    pub failing_members: Mutex<HashSet<String>>,
    pub member_delays: Mutex<HashMap<String, Duration>>,
    pub last_code_parameters: Mutex<Option<CodeParameters>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_event_log(&self, code: &str, events: Vec<LobbyEvent>) {
        self.event_logs
            .lock()
            .unwrap()
            .insert(code.to_string(), events);
    }

    pub fn fail_member(&self, id: &str) {
        self.failing_members.lock().unwrap().insert(id.to_string());
    }

    pub fn heal_member(&self, id: &str) {
        self.failing_members.lock().unwrap().remove(id);
    }

    pub fn delay_member(&self, id: &str, delay: Duration) {
        self.member_delays
            .lock()
            .unwrap()
            .insert(id.to_string(), delay);
    }

    pub fn delay_registration(&self, delay: Duration) {
        *self.registration_delay.lock().unwrap() = delay;
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn registration_pause(&self) {
        let delay = *self.registration_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

pub fn member(id: &str) -> MemberDetail {
    MemberDetail {
        id: id.to_string(),
        display_name: format!("Player {}", id),
        level: id.len() as i64 * 10,
    }
}

fn remote_failure(message: &str) -> LobbyError {
    LobbyError::Remote(RemoteError::new(Some(500), message))
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn register_provider(&self) -> Result<ProviderId> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        self.registration_pause().await;
        if self.fail_provider.load(Ordering::SeqCst) {
            return Err(remote_failure("provider registration rejected"));
        }
        Ok(PROVIDER_ID)
    }

    async fn register_session(&self, provider_id: ProviderId) -> Result<SessionId> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(provider_id, PROVIDER_ID);
        self.registration_pause().await;
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(remote_failure("session registration rejected"));
        }
        Ok(SESSION_ID)
    }

    async fn generate_code(
        &self,
        session_id: SessionId,
        parameters: &CodeParameters,
    ) -> Result<Vec<String>> {
        let n = self.code_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(session_id, SESSION_ID);
        *self.last_code_parameters.lock().unwrap() = Some(parameters.clone());
        if self.no_codes.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![format!("CODE-{}", n)])
    }

    async fn get_event_log(&self, code: &str) -> Result<LobbyEventLog> {
        self.event_log_calls.fetch_add(1, Ordering::SeqCst);
        let event_list = self
            .event_logs
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or_default();
        Ok(LobbyEventLog { event_list })
    }

    async fn get_member_detail(&self, member_id: &str) -> Result<MemberDetail> {
        self.member_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.member_delays.lock().unwrap().get(member_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_members.lock().unwrap().contains(member_id) {
            return Err(remote_failure("member lookup failed"));
        }
        Ok(member(member_id))
    }
}

/// The production bucket table
pub fn default_buckets() -> Vec<BucketSettings> {
    settings::bucket_table(
        settings::DEFAULT_APP_RATE_LIMITS.parse().unwrap(),
        settings::DEFAULT_METHOD_RATE_LIMITS.parse().unwrap(),
    )
}

pub fn client_with(
    remote: &Arc<FakeRemote>,
    buckets: &[BucketSettings],
    ttl: Duration,
) -> CachingClient {
    let limiter = RateLimiter::from_settings(buckets).unwrap();
    CachingClient::new(remote.clone(), limiter, ttl)
}

pub fn client(remote: &Arc<FakeRemote>) -> CachingClient {
    client_with(remote, &default_buckets(), Duration::from_secs(3600))
}

pub fn available(client: &CachingClient, bucket: &str) -> u32 {
    client
        .rate_limiter()
        .bucket(bucket)
        .unwrap()
        .available()
        .unwrap()
}
