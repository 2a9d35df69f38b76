//! Sliding-window token bucket.
//!
//! Every permit carries its own expiry: a permit consumed at `t` comes back
//! at `t + window`, regardless of when the other permits were consumed. This
//! is not a periodic refill of the whole bucket.
//!
//! When a permit comes back and somebody is queued, the permit is handed
//! straight to the oldest waiter and never shows up as available.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{error, info, trace};

use crate::{concurrency_error, config_error};
use crate::error::Result;
use crate::settings::BucketSettings;

/// One named quota: `capacity` permits per sliding `window`
#[derive(Clone, Debug)]
pub struct TokenBucket {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    capacity: u32,
    window: Duration,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    available: u32,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Result of asking a bucket for a permit.
///
/// A `Queued` grant already holds its place in line; awaiting it only waits
/// for the hand-off.
#[derive(Debug)]
pub enum Grant {
    Ready,
    Queued(oneshot::Receiver<()>),
}

impl Grant {
    pub fn is_ready(&self) -> bool {
        matches!(self, Grant::Ready)
    }

    /// Wait until the permit is held
    pub async fn granted(self) -> Result<()> {
        match self {
            Grant::Ready => Ok(()),
            Grant::Queued(receiver) => receiver
                .await
                .map_err(|_| concurrency_error!("Bucket dropped a queued permit request")),
        }
    }
}

impl TokenBucket {
    /// A bucket that can never grant is a configuration error
    pub fn new(name: impl Into<String>, capacity: u32, window: Duration) -> Result<Self> {
        let name = name.into();
        if capacity == 0 {
            return Err(config_error!("Bucket {} must allow at least one permit", name));
        }
        info!(
            "Creating bucket {} with sliding window {}ms and {} permits",
            name,
            window.as_millis(),
            capacity
        );
        Ok(Self {
            inner: Arc::new(Inner {
                name,
                capacity,
                window,
                state: Mutex::new(BucketState {
                    available: capacity,
                    waiters: VecDeque::new(),
                }),
            }),
        })
    }

    pub fn from_settings(settings: &BucketSettings) -> Result<Self> {
        Self::new(
            settings.name.clone(),
            settings.limit.max_calls,
            settings.limit.window(),
        )
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn capacity(&self) -> u32 {
        self.inner.capacity
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Permits free right now
    pub fn available(&self) -> Result<u32> {
        Ok(self.inner.lock()?.available)
    }

    /// Requests queued behind an exhausted bucket
    pub fn waiting(&self) -> Result<usize> {
        Ok(self.inner.lock()?.waiters.len())
    }

    /// Take a permit if one is free, otherwise join the queue.
    /// Either way the request is irrevocable: a `Ready` grant has already
    /// spent its permit.
    pub fn request(&self) -> Result<Grant> {
        let mut state = self.inner.lock()?;
        if state.available > 0 {
            state.available -= 1;
            trace!(
                "Bucket {} has {} permits remaining",
                self.inner.name,
                state.available
            );
            drop(state);
            schedule_renewal(Arc::clone(&self.inner));
            Ok(Grant::Ready)
        } else {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            trace!(
                "Bucket {} exhausted, {} requests waiting",
                self.inner.name,
                state.waiters.len()
            );
            Ok(Grant::Queued(receiver))
        }
    }

    /// Completes once a permit is held
    pub async fn acquire(&self) -> Result<()> {
        self.request()?.granted().await
    }
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, BucketState>> {
        self.state
            .lock()
            .map_err(|e| concurrency_error!("Failed to acquire bucket {} lock: {}", self.name, e))
    }

    /// A permit's window elapsed: give it to the oldest live waiter or put it back.
    fn renew(self: &Arc<Self>) {
        let mut state = match self.lock() {
            Ok(state) => state,
            Err(err) => {
                error!("Dropping renewal: {}", err);
                return;
            }
        };
        let mut handed_off = false;
        while let Some(waiter) = state.waiters.pop_front() {
            // a waiter whose caller went away forfeits its place
            if waiter.send(()).is_ok() {
                handed_off = true;
                break;
            }
        }
        if handed_off {
            trace!(
                "Bucket {} handed a renewed permit to a waiter, {} still waiting",
                self.name,
                state.waiters.len()
            );
            drop(state);
            schedule_renewal(Arc::clone(self));
        } else {
            state.available += 1;
            trace!(
                "Bucket {} renewed a permit and now has {} remaining",
                self.name,
                state.available
            );
        }
    }
}

fn schedule_renewal(inner: Arc<Inner>) {
    tokio::spawn(async move {
        tokio::time::sleep(inner.window).await;
        inner.renew();
    });
}
