//! The only path to the remote API.
//!
//! Every call type is bound to a fixed set of buckets which must all grant
//! before the call goes out. Member lookups are additionally cached by id:
//! a cache hit skips both the limiter and the remote.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::TtlCache;
use crate::error::{RemoteError, Result};
use crate::limiters::RateLimiter;
use crate::remote::{
    CodeParameters, LobbyEvent, MemberDetail, ProviderId, RemoteApi, SessionId,
};

/// Remote call types and the buckets each must clear
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallType {
    RegisterProvider,
    RegisterSession,
    GenerateCode,
    GetEventLog,
    GetMemberDetail,
}

impl CallType {
    pub fn buckets(&self) -> &'static [&'static str] {
        match self {
            CallType::RegisterProvider => &[
                "registerProvider-short",
                "registerProvider-long",
                "app-short",
                "app-long",
            ],
            CallType::RegisterSession => &[
                "registerSession-short",
                "registerSession-long",
                "app-short",
                "app-long",
            ],
            CallType::GenerateCode => &[
                "generateCode-short",
                "generateCode-long",
                "app-short",
                "app-long",
            ],
            CallType::GetEventLog => &[
                "getEventLog-short",
                "getEventLog-long",
                "app-short",
                "app-long",
            ],
            CallType::GetMemberDetail => &["app-short", "app-long"],
        }
    }
}

/// Result of a member lookup; `cached` marks a cache hit
#[derive(Clone, Debug)]
pub struct MemberLookup {
    pub member_id: String,
    pub detail: MemberDetail,
    pub cached: bool,
}

#[derive(Clone)]
pub struct CachingClient {
    remote: Arc<dyn RemoteApi>,
    rate_limiter: Arc<RateLimiter>,
    member_cache: TtlCache<String, MemberDetail>,
}

impl std::fmt::Debug for CachingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingClient")
            .field("rate_limiter", &self.rate_limiter)
            .field("member_cache_ttl", &self.member_cache.ttl())
            .finish()
    }
}

impl CachingClient {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        rate_limiter: RateLimiter,
        member_cache_ttl: Duration,
    ) -> Self {
        Self {
            remote,
            rate_limiter: Arc::new(rate_limiter),
            member_cache: TtlCache::new(member_cache_ttl),
        }
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn member_cache(&self) -> &TtlCache<String, MemberDetail> {
        &self.member_cache
    }

    /// Periodically evict expired member lookups
    pub fn spawn_cache_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        info!("Sweeping member cache every {}s", interval.as_secs());
        self.member_cache.spawn_sweeper(interval)
    }

    async fn admit(&self, call: CallType) -> Result<()> {
        self.rate_limiter.wait_for(call.buckets()).await
    }

    pub async fn register_provider(&self) -> Result<ProviderId> {
        self.admit(CallType::RegisterProvider).await?;
        self.remote.register_provider().await
    }

    pub async fn register_session(&self, provider_id: ProviderId) -> Result<SessionId> {
        self.admit(CallType::RegisterSession).await?;
        self.remote.register_session(provider_id).await
    }

    /// Exactly one code is requested; an empty answer is a remote error
    pub async fn generate_code(
        &self,
        session_id: SessionId,
        parameters: &CodeParameters,
    ) -> Result<String> {
        self.admit(CallType::GenerateCode).await?;
        let codes = self.remote.generate_code(session_id, parameters).await?;
        codes.into_iter().next().ok_or_else(|| {
            error!("Code generation for session {} returned no codes", session_id);
            RemoteError::new(None, "code generation returned no codes").into()
        })
    }

    pub async fn get_event_log(&self, code: &str) -> Result<Vec<LobbyEvent>> {
        self.admit(CallType::GetEventLog).await?;
        Ok(self.remote.get_event_log(code).await?.event_list)
    }

    /// Cached lookup; a failure leaves no cache entry
    pub async fn get_member_detail(&self, member_id: &str) -> Result<MemberDetail> {
        let lookup = self.lookup_member_detail(member_id).await?;
        if !lookup.cached {
            self.member_cache
                .insert(member_id.to_string(), lookup.detail.clone())?;
        }
        Ok(lookup.detail)
    }

    /// Like `get_member_detail`, but a fresh result is handed back to the
    /// caller instead of being stored; see `commit_member_details`.
    pub async fn lookup_member_detail(&self, member_id: &str) -> Result<MemberLookup> {
        if let Some(detail) = self.member_cache.get(&member_id.to_string())? {
            debug!("Cache hit for member {}", member_id);
            return Ok(MemberLookup {
                member_id: member_id.to_string(),
                detail,
                cached: true,
            });
        }
        debug!("Cache miss for member {}", member_id);
        self.admit(CallType::GetMemberDetail).await?;
        let detail = self.remote.get_member_detail(member_id).await?;
        Ok(MemberLookup {
            member_id: member_id.to_string(),
            detail,
            cached: false,
        })
    }

    /// Store the fresh results of a batch of lookups
    pub fn commit_member_details<'a, I>(&self, lookups: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a MemberLookup>,
    {
        for lookup in lookups.into_iter().filter(|lookup| !lookup.cached) {
            self.member_cache
                .insert(lookup.member_id.clone(), lookup.detail.clone())?;
        }
        Ok(())
    }
}
