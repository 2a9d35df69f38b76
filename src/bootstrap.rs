//! One-time provider + session registration shared by every caller.
//!
//! Registration starts when the coalescer is created and runs exactly once.
//! Its progress is published on a watch channel, which always holds the
//! latest state, so a subscriber arriving after the session id is known
//! reads it immediately.
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, info_span};
use tracing_futures::Instrument;

use crate::bootstrap_error;
use crate::client::CachingClient;
use crate::error::Result;
use crate::remote::{ProviderId, SessionId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BootstrapState {
    Uninitialized,
    AwaitingProvider,
    AwaitingSession { provider_id: ProviderId },
    Ready {
        provider_id: ProviderId,
        session_id: SessionId,
    },
    Failed { reason: String },
}

impl BootstrapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootstrapState::Ready { .. } | BootstrapState::Failed { .. })
    }

    fn resolved(&self) -> Option<Result<SessionId>> {
        match self {
            BootstrapState::Ready { session_id, .. } => Some(Ok(*session_id)),
            BootstrapState::Failed { reason } => Some(Err(bootstrap_error!(reason))),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BootstrapCoalescer {
    state: watch::Receiver<BootstrapState>,
}

impl BootstrapCoalescer {
    /// Kick off registration in the background. Never retried.
    pub fn start(client: CachingClient) -> Self {
        let (sender, receiver) = watch::channel(BootstrapState::Uninitialized);
        tokio::spawn(register(client, sender).instrument(info_span!("bootstrap")));
        Self { state: receiver }
    }

    pub fn state(&self) -> BootstrapState {
        self.state.borrow().clone()
    }

    /// The session id, once registration has finished
    pub async fn session_id(&self) -> Result<SessionId> {
        let mut state = self.state.clone();
        loop {
            if let Some(result) = state.borrow_and_update().resolved() {
                return result;
            }
            if state.changed().await.is_err() {
                return Err(bootstrap_error!(
                    "registration stopped before a session was obtained"
                ));
            }
        }
    }
}

async fn register(client: CachingClient, state: watch::Sender<BootstrapState>) {
    // send_replace publishes even when nobody is subscribed yet
    state.send_replace(BootstrapState::AwaitingProvider);
    let provider_id = match client.register_provider().await {
        Ok(provider_id) => provider_id,
        Err(err) => {
            error!("Provider registration failed: {}", err);
            state.send_replace(BootstrapState::Failed {
                reason: format!("provider registration failed: {}", err),
            });
            return;
        }
    };
    info!("Registered as tournament provider with id {}", provider_id);

    state.send_replace(BootstrapState::AwaitingSession { provider_id });
    match client.register_session(provider_id).await {
        Ok(session_id) => {
            info!("Registered tournament session with id {}", session_id);
            state.send_replace(BootstrapState::Ready {
                provider_id,
                session_id,
            });
        }
        Err(err) => {
            error!("Session registration failed: {}", err);
            state.send_replace(BootstrapState::Failed {
                reason: format!("session registration failed: {}", err),
            });
        }
    }
}
