use std::collections::HashMap;

use tracing::debug;

use super::token_bucket::{Grant, TokenBucket};
use crate::config_error;
use crate::error::Result;
use crate::settings::BucketSettings;

/// Registry of named buckets.
/// A request names several buckets and may proceed only once every one of
/// them has granted a permit. The registry holds no queue of its own: each
/// bucket queues its waiters FIFO.
///
/// Acquisition across buckets is not atomic. Permits granted by the faster
/// buckets stay spent while a slower bucket in the same request is still
/// queued, and are never given back.
#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
    buckets: HashMap<String, TokenBucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &[BucketSettings]) -> Result<Self> {
        let mut limiter = Self::new();
        for bucket in settings {
            limiter.add_bucket(TokenBucket::from_settings(bucket)?)?;
        }
        Ok(limiter)
    }

    /// Register a bucket; names are unique
    pub fn add_bucket(&mut self, bucket: TokenBucket) -> Result<()> {
        if self.buckets.contains_key(bucket.name()) {
            return Err(config_error!("Bucket {} registered twice", bucket.name()));
        }
        self.buckets.insert(bucket.name().to_string(), bucket);
        Ok(())
    }

    pub fn bucket(&self, name: &str) -> Option<&TokenBucket> {
        self.buckets.get(name)
    }

    pub fn bucket_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.buckets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Completes once every named bucket has granted this request a permit.
    ///
    /// All names are resolved before any permit is taken, so an unknown name
    /// fails without spending anything. Every bucket is then asked at once;
    /// queued buckets are awaited afterwards.
    pub async fn wait_for(&self, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Err(config_error!("A rate-limited call must name at least one bucket"));
        }
        let buckets = names
            .iter()
            .map(|name| {
                self.buckets
                    .get(*name)
                    .ok_or_else(|| config_error!("Unknown rate limit bucket: {}", name))
            })
            .collect::<Result<Vec<_>>>()?;

        let grants = buckets
            .iter()
            .map(|bucket| bucket.request())
            .collect::<Result<Vec<Grant>>>()?;
        let queued = grants.iter().filter(|grant| !grant.is_ready()).count();
        if queued > 0 {
            debug!("Waiting on {} of {} buckets: {:?}", queued, names.len(), names);
        }
        for grant in grants {
            grant.granted().await?;
        }
        Ok(())
    }
}
