use crate::core::state::PlayerState;
use derive_more::Display;
use fx_callback::{Callback, MultiThreadedCallback, Subscription};
use log::{debug, trace};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The events published by the [PlayerStateStore] after a mutation has completed.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PlayerStateEvent {
    /// Invoked when one or more fields of the state have been changed
    #[display("Player state changed to {}", _0)]
    Changed(PlayerState),
    /// Invoked when the session facts of the state have been reset
    #[display("Player state has been reset to {}", _0)]
    Reset(PlayerState),
}

/// The owner of the canonical [PlayerState].
///
/// The store is a cheap handle which can be cloned and shared between the writer of the state
/// and any number of readers. All field writes of a single mutation are applied under one write
/// guard, so readers never observe a partially updated state.
///
/// # Example
///
/// ```rust,no_run
/// use glide_core::core::state::PlayerStateStore;
///
/// async fn example() {
///     let store = PlayerStateStore::new();
///     let state = store.get().await;
///
///     assert_eq!(false, state.is_playing);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PlayerStateStore {
    inner: Arc<InnerPlayerStateStore>,
}

impl PlayerStateStore {
    /// Create a new store with the default [PlayerState].
    pub fn new() -> Self {
        Self::with_state(PlayerState::default())
    }

    /// Create a new store which starts from the given state.
    pub fn with_state(state: PlayerState) -> Self {
        Self {
            inner: Arc::new(InnerPlayerStateStore {
                state: RwLock::new(state),
                callbacks: MultiThreadedCallback::new(),
            }),
        }
    }

    /// Get a snapshot of the current player state.
    pub async fn get(&self) -> PlayerState {
        self.inner.state.read().await.clone()
    }

    /// Reset the playback session facts of the state.
    /// The volume is left untouched.
    pub async fn reset(&self) {
        let snapshot = {
            let mut state = self.inner.state.write().await;
            state.reset();
            state.clone()
        };

        debug!("Player state has been reset");
        self.inner
            .callbacks
            .invoke(PlayerStateEvent::Reset(snapshot));
    }

    /// Apply the given mutation atomically to the state.
    ///
    /// # Returns
    ///
    /// It returns `true` when the mutation changed the state, else `false`.
    pub(crate) async fn update<F>(&self, mutation: F) -> bool
    where
        F: FnOnce(&mut PlayerState),
    {
        let snapshot = {
            let mut state = self.inner.state.write().await;
            let previous = state.clone();
            mutation(&mut state);

            if *state == previous {
                return false;
            }
            state.clone()
        };

        trace!("Player state has been updated to {:?}", snapshot);
        self.inner
            .callbacks
            .invoke(PlayerStateEvent::Changed(snapshot));
        true
    }
}

impl Default for PlayerStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Callback<PlayerStateEvent> for PlayerStateStore {
    fn subscribe(&self) -> Subscription<PlayerStateEvent> {
        self.inner.callbacks.subscribe()
    }
}

#[derive(Debug)]
struct InnerPlayerStateStore {
    state: RwLock<PlayerState>,
    callbacks: MultiThreadedCallback<PlayerStateEvent>,
}
