use crate::core::events::{
    basename, EnginePayload, PlayerEvent, PlayerProperty, ProjectorError, Result,
};
use crate::core::state::{PlayerState, PlayerStateStore};
use fx_callback::Subscription;
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// The sole writer of the engine facts within the [PlayerStateStore].
///
/// The projector consumes a single engine event subscription, one event at a time,
/// and applies each event as one atomic mutation of the store.
/// Unknown or malformed events never fail, they're dropped as no-ops.
#[derive(Debug, Clone)]
pub struct EventProjector {
    inner: Arc<InnerEventProjector>,
}

impl EventProjector {
    pub fn new(store: PlayerStateStore) -> Self {
        Self {
            inner: Arc::new(InnerEventProjector {
                store,
                subscribed: Default::default(),
                cancellation_token: Default::default(),
            }),
        }
    }

    /// The store which is being updated by this projector.
    pub fn store(&self) -> &PlayerStateStore {
        &self.inner.store
    }

    /// Start consuming the given engine event subscription.
    /// The events are applied in delivery order within a dedicated task.
    /// Once the engine closes the subscription, a new one can be started.
    ///
    /// # Returns
    ///
    /// It returns [ProjectorError::AlreadySubscribed] when a subscription is still active.
    pub fn start(&self, subscription: Subscription<EnginePayload>) -> Result<()> {
        if self.inner.subscribed.swap(true, Ordering::SeqCst) {
            warn!("Event projector is already subscribed, ignoring new subscription");
            return Err(ProjectorError::AlreadySubscribed);
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.start(subscription).await;
        });
        Ok(())
    }

    /// Apply the given event to the store.
    ///
    /// # Returns
    ///
    /// It returns `true` when the event changed the player state.
    pub async fn apply(&self, event: &PlayerEvent) -> bool {
        self.inner.apply(event).await
    }

    /// Stop consuming the engine event subscription.
    pub fn stop(&self) {
        self.inner.cancellation_token.cancel();
    }
}

/// Project the given event onto the player state.
///
/// Absent values never overwrite the last known value of a field,
/// except for the filename which is cleared when no media is loaded.
pub fn project(state: &mut PlayerState, event: &PlayerEvent) {
    match event {
        PlayerEvent::PropertyChange(property) => match property {
            PlayerProperty::TimePos(Some(time)) => state.current_time = *time,
            PlayerProperty::Duration(Some(duration)) => state.duration = *duration,
            PlayerProperty::Pause(Some(paused)) => state.is_playing = !*paused,
            PlayerProperty::Filename(filename) => {
                state.filename = filename
                    .as_deref()
                    .map(basename)
                    .unwrap_or_default()
                    .to_string()
            }
            PlayerProperty::Volume(Some(volume)) => state.volume = *volume,
            _ => {}
        },
        PlayerEvent::EofReached => {
            state.is_playing = false;
            state.current_time = state.duration;
        }
        PlayerEvent::Unrecognized(_) => {}
    }
}

#[derive(Debug)]
struct InnerEventProjector {
    store: PlayerStateStore,
    subscribed: AtomicBool,
    cancellation_token: CancellationToken,
}

impl InnerEventProjector {
    async fn start(&self, mut subscription: Subscription<EnginePayload>) {
        loop {
            select! {
                _ = self.cancellation_token.cancelled() => break,
                payload = subscription.recv() => match payload {
                    Ok(payload) => self.handle_payload(&payload).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event projector skipped {} lagging engine events", skipped);
                    }
                    Err(RecvError::Closed) => {
                        debug!("Engine event subscription has been closed");
                        self.subscribed.store(false, Ordering::SeqCst);
                        break;
                    }
                },
            }
        }
        debug!("Event projector main loop ended");
    }

    async fn handle_payload(&self, payload: &EnginePayload) {
        let event = PlayerEvent::from(payload);
        if let PlayerEvent::Unrecognized(event_type) = &event {
            trace!("Event projector is ignoring event type {}", event_type);
            return;
        }

        self.apply(&event).await;
    }

    async fn apply(&self, event: &PlayerEvent) -> bool {
        trace!("Event projector is applying {}", event);
        self.store.update(|state| project(state, event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{
        PROPERTY_DURATION, PROPERTY_FILENAME, PROPERTY_PAUSE, PROPERTY_TIME_POS, PROPERTY_VOLUME,
    };
    use crate::core::state::PlayerStateEvent;
    use crate::{init_logger, recv_timeout};
    use fx_callback::{Callback, MultiThreadedCallback};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn property(name: &str, data: Option<Value>) -> PlayerEvent {
        PlayerEvent::from(&EnginePayload::property_change(name, data))
    }

    fn playing_state() -> PlayerState {
        PlayerState {
            is_playing: true,
            current_time: 30.0,
            duration: 60.0,
            filename: "movie.mkv".to_string(),
            volume: 70.0,
        }
    }

    #[test]
    fn test_project_last_write_wins() {
        let mut state = PlayerState::default();

        for time in [1.0, 2.5, 2.0] {
            project(&mut state, &property(PROPERTY_TIME_POS, Some(json!(time))));
        }
        project(&mut state, &property(PROPERTY_VOLUME, Some(json!(55))));
        project(&mut state, &property(PROPERTY_VOLUME, Some(json!(120))));

        assert_eq!(2.0, state.current_time);
        assert_eq!(120.0, state.volume);
    }

    #[test]
    fn test_project_absent_values() {
        let mut state = playing_state();

        for name in [PROPERTY_TIME_POS, PROPERTY_DURATION, PROPERTY_PAUSE, PROPERTY_VOLUME] {
            project(&mut state, &property(name, None));
            project(&mut state, &property(name, Some(Value::Null)));
        }

        assert_eq!(playing_state(), state);
    }

    #[test]
    fn test_project_pause() {
        let mut state = PlayerState::default();

        project(&mut state, &property(PROPERTY_PAUSE, Some(json!(false))));
        assert_eq!(true, state.is_playing);

        project(&mut state, &property(PROPERTY_PAUSE, Some(json!(true))));
        assert_eq!(false, state.is_playing);
    }

    #[test]
    fn test_project_filename() {
        let mut state = PlayerState::default();

        project(
            &mut state,
            &property(PROPERTY_FILENAME, Some(json!("/a/b/c.mp4"))),
        );
        assert_eq!("c.mp4", state.filename);

        project(
            &mut state,
            &property(PROPERTY_FILENAME, Some(json!("C:\\a\\b\\c.mp4"))),
        );
        assert_eq!("c.mp4", state.filename);

        project(&mut state, &property(PROPERTY_FILENAME, None));
        assert_eq!("", state.filename);

        project(&mut state, &property(PROPERTY_FILENAME, Some(json!("x.mkv"))));
        project(&mut state, &property(PROPERTY_FILENAME, Some(json!(""))));
        assert_eq!("", state.filename);
    }

    #[test]
    fn test_project_eof_reached() {
        let mut state = playing_state();
        project(&mut state, &PlayerEvent::EofReached);
        assert_eq!(false, state.is_playing);
        assert_eq!(60.0, state.current_time);

        let mut state = PlayerState {
            is_playing: false,
            ..playing_state()
        };
        project(&mut state, &PlayerEvent::EofReached);
        assert_eq!(false, state.is_playing);
        assert_eq!(60.0, state.current_time);
    }

    #[test]
    fn test_project_unrecognized() {
        let mut state = playing_state();

        project(&mut state, &property("chapter", Some(json!(3))));
        project(&mut state, &PlayerEvent::Unrecognized("idle".to_string()));

        assert_eq!(playing_state(), state);
    }

    #[tokio::test]
    async fn test_apply_scenario() {
        init_logger!();
        let projector = EventProjector::new(PlayerStateStore::new());

        projector
            .apply(&property(PROPERTY_DURATION, Some(json!(120))))
            .await;
        projector
            .apply(&property(PROPERTY_TIME_POS, Some(json!(45))))
            .await;
        projector.apply(&PlayerEvent::EofReached).await;

        let result = projector.store().get().await;
        assert_eq!(120.0, result.current_time);
        assert_eq!(120.0, result.duration);
        assert_eq!(false, result.is_playing);
    }

    #[tokio::test]
    async fn test_start() {
        init_logger!();
        let store = PlayerStateStore::new();
        let mut receiver = store.subscribe();
        let projector = EventProjector::new(store.clone());
        let engine = MultiThreadedCallback::<EnginePayload>::new();

        projector
            .start(engine.subscribe())
            .expect("expected the projector to start");
        engine.invoke(EnginePayload {
            event_type: "idle".to_string(),
            name: None,
            data: None,
        });
        engine.invoke(EnginePayload::property_change(
            PROPERTY_PAUSE,
            Some(json!(false)),
        ));
        engine.invoke(EnginePayload::property_change(
            PROPERTY_FILENAME,
            Some(json!("/media/show.webm")),
        ));

        for _ in 0..2 {
            let event = recv_timeout!(&mut receiver, Duration::from_millis(250));
            assert!(
                matches!(&*event, PlayerStateEvent::Changed(_)),
                "expected PlayerStateEvent::Changed, got {:?} instead",
                event
            );
        }

        let result = store.get().await;
        assert_eq!(true, result.is_playing);
        assert_eq!("show.webm", result.filename);
    }

    #[tokio::test]
    async fn test_start_already_subscribed() {
        init_logger!();
        let projector = EventProjector::new(PlayerStateStore::new());
        let engine = MultiThreadedCallback::<EnginePayload>::new();

        projector
            .start(engine.subscribe())
            .expect("expected the projector to start");
        let result = projector.start(engine.subscribe());

        assert_eq!(Err(ProjectorError::AlreadySubscribed), result);
    }

    #[tokio::test]
    async fn test_start_lagged_subscription() {
        init_logger!();
        let store = PlayerStateStore::new();
        let mut receiver = store.subscribe();
        let projector = EventProjector::new(store.clone());
        let engine = MultiThreadedCallback::<EnginePayload>::new_with_capacity(2);
        let subscription = engine.subscribe();

        for time in [1.0, 2.0, 3.0, 4.0] {
            engine.invoke(EnginePayload::property_change(
                PROPERTY_TIME_POS,
                Some(json!(time)),
            ));
        }
        projector
            .start(subscription)
            .expect("expected the projector to start");

        for _ in 0..2 {
            recv_timeout!(&mut receiver, Duration::from_millis(250));
        }
        let result = store.get().await;
        assert_eq!(4.0, result.current_time);

        engine.invoke(EnginePayload::property_change(
            PROPERTY_DURATION,
            Some(json!(60.0)),
        ));
        recv_timeout!(
            &mut receiver,
            Duration::from_millis(250),
            "expected the projector to keep consuming after lagging"
        );
        let result = store.get().await;
        assert_eq!(60.0, result.duration);
    }

    #[tokio::test]
    async fn test_start_closed_subscription() {
        init_logger!();
        let store = PlayerStateStore::new();
        let mut receiver = store.subscribe();
        let projector = EventProjector::new(store.clone());
        let engine = MultiThreadedCallback::<EnginePayload>::new();

        projector
            .start(engine.subscribe())
            .expect("expected the projector to start");
        drop(engine);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let engine = MultiThreadedCallback::<EnginePayload>::new();
        let result = projector.start(engine.subscribe());
        assert_eq!(Ok(()), result);

        engine.invoke(EnginePayload::property_change(
            PROPERTY_VOLUME,
            Some(json!(40.0)),
        ));
        recv_timeout!(&mut receiver, Duration::from_millis(250));
        let result = store.get().await;
        assert_eq!(40.0, result.volume);
    }

    #[tokio::test]
    async fn test_stop() {
        init_logger!();
        let store = PlayerStateStore::new();
        let projector = EventProjector::new(store.clone());
        let engine = MultiThreadedCallback::<EnginePayload>::new();

        projector
            .start(engine.subscribe())
            .expect("expected the projector to start");
        projector.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.invoke(EnginePayload::property_change(
            PROPERTY_TIME_POS,
            Some(json!(10)),
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let result = store.get().await;
        assert_eq!(0.0, result.current_time);
    }
}
