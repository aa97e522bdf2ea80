use derive_more::Display;
use serde::{Deserialize, Serialize};

const DEFAULT_VOLUME: f64 = 100.0;

/// The last known playback facts reported by the media engine.
///
/// Every field holds the most recently received value for it,
/// fields are not guaranteed to be consistent with each other.
#[derive(Debug, Display, Clone, PartialEq, Serialize, Deserialize)]
#[display(
    "playing: {}, time: {}/{}, filename: {}, volume: {}",
    is_playing,
    current_time,
    duration,
    filename,
    volume
)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Indicates if the engine is actively advancing playback.
    pub is_playing: bool,
    /// The last known playback position in seconds.
    pub current_time: f64,
    /// The last known media length in seconds, 0 when unknown.
    pub duration: f64,
    /// The display name of the loaded media without its path.
    pub filename: String,
    /// The last known volume, nominally between 0-100.
    pub volume: f64,
}

impl PlayerState {
    /// Reset the session facts of the state.
    /// The volume is a user preference and survives the reset.
    pub fn reset(&mut self) {
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.filename.clear();
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            filename: String::new(),
            volume: DEFAULT_VOLUME,
        }
    }
}
