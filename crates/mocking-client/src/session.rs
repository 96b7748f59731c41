//! Session context: the held bearer token and the sign-out signal
//!
//! A `Session` is created once at startup and shared (`Arc<Session>`) by the
//! client and every view. It mirrors the persisted token in memory and
//! broadcasts `SessionEvent`s:
//! - `SignedIn` after a successful login or refresh
//! - `SignedOut` on logout and when an authenticated request comes back 401
//!
//! The unauthorized path is compare-and-clear under the write lock against the
//! token the failed request carried, so a burst of 401s signs out once and a
//! 401 for a replaced token is ignored.

use mocking_api::Result;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::token_store::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The user asked to log out.
    Logout,
    /// The server rejected the held token.
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { email: Option<String> },
    SignedOut { reason: SignOutReason },
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<String>,
}

pub struct Session {
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Open a session over `store`.
    ///
    /// A persisted token alone makes the session authenticated; it is not
    /// checked against the server.
    pub async fn open(store: Arc<dyn TokenStore>) -> Result<Self> {
        let token = store.load().await?;
        if token.is_some() {
            info!("[Session] Restored persisted token");
        }
        let (events, _) = broadcast::channel(16);
        Ok(Self {
            store,
            state: RwLock::new(SessionState { token, user: None }),
            events,
        })
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Email of the signed-in user, when known in this process.
    pub async fn user(&self) -> Option<String> {
        self.state.read().await.user.clone()
    }

    /// Persist `token` and mark the session authenticated.
    pub async fn sign_in(&self, token: &str, user: Option<String>) -> Result<()> {
        let mut state = self.state.write().await;
        self.store.save(token).await?;
        state.token = Some(token.to_string());
        state.user = user.clone();
        drop(state);

        info!("[Session] Signed in as {}", user.as_deref().unwrap_or("<unknown>"));
        let _ = self.events.send(SessionEvent::SignedIn { email: user });
        Ok(())
    }

    /// Drop the token and user.
    ///
    /// Returns whether the session was authenticated; the `SignedOut` event is
    /// only emitted in that case.
    pub async fn sign_out(&self, reason: SignOutReason) -> Result<bool> {
        let mut state = self.state.write().await;
        let was_authenticated = state.token.take().is_some();
        state.user = None;
        let cleared = self.store.clear().await;
        drop(state);

        if was_authenticated {
            info!("[Session] Signed out ({:?})", reason);
            let _ = self.events.send(SessionEvent::SignedOut { reason });
        }
        cleared.map(|_| was_authenticated)
    }

    /// React to a 401 from a non-auth endpoint that carried `used`.
    ///
    /// Only signs out while the session still holds that token; a 401 for a
    /// token already replaced by a newer login leaves the session alone.
    pub async fn handle_unauthorized(&self, used: Option<&str>) -> bool {
        let mut state = self.state.write().await;
        if state.token.is_none() || state.token.as_deref() != used {
            return false;
        }
        state.token = None;
        state.user = None;
        if let Err(e) = self.store.clear().await {
            warn!("[Session] Failed to clear persisted token: {}", e);
        }
        drop(state);

        info!("[Session] Signed out ({:?})", SignOutReason::Unauthorized);
        let _ = self.events.send(SessionEvent::SignedOut {
            reason: SignOutReason::Unauthorized,
        });
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Session events as a stream; lagged receivers skip missed events.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = SessionEvent> + Send>> {
        Box::pin(BroadcastStream::new(self.events.subscribe()).filter_map(|event| event.ok()))
    }
}
