use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The engine event type of a changed observed property.
pub const EVENT_PROPERTY_CHANGE: &str = "property-change";
/// The engine event type of the end of the loaded media.
pub const EVENT_EOF_REACHED: &str = "eof-reached";

pub const PROPERTY_TIME_POS: &str = "time-pos";
pub const PROPERTY_DURATION: &str = "duration";
pub const PROPERTY_PAUSE: &str = "pause";
pub const PROPERTY_FILENAME: &str = "filename";
pub const PROPERTY_VOLUME: &str = "volume";

/// The raw notification as delivered by the engine event channel.
#[derive(Debug, Display, Clone, PartialEq, Serialize, Deserialize)]
#[display("{}", event_type)]
pub struct EnginePayload {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl EnginePayload {
    /// Create a new payload for a property change.
    pub fn property_change<S: Into<String>>(name: S, data: Option<Value>) -> Self {
        Self {
            event_type: EVENT_PROPERTY_CHANGE.to_string(),
            name: Some(name.into()),
            data,
        }
    }

    /// Create a new payload for the end of the loaded media.
    pub fn eof_reached() -> Self {
        Self {
            event_type: EVENT_EOF_REACHED.to_string(),
            name: None,
            data: None,
        }
    }
}

/// A typed engine notification.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PlayerEvent {
    #[display("property-change {}", _0)]
    PropertyChange(PlayerProperty),
    #[display("eof-reached")]
    EofReached,
    /// An event type which isn't known (yet) by the projector.
    #[display("unrecognized event {}", _0)]
    Unrecognized(String),
}

impl From<&EnginePayload> for PlayerEvent {
    fn from(payload: &EnginePayload) -> Self {
        match payload.event_type.as_str() {
            EVENT_PROPERTY_CHANGE => PlayerEvent::PropertyChange(PlayerProperty::from_payload(
                payload.name.as_deref().unwrap_or_default(),
                payload.data.as_ref(),
            )),
            EVENT_EOF_REACHED => PlayerEvent::EofReached,
            other => PlayerEvent::Unrecognized(other.to_string()),
        }
    }
}

/// An observed engine property together with its reported value.
///
/// A value of [None] means the engine reported the property without a usable payload.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PlayerProperty {
    #[display("time-pos={:?}", _0)]
    TimePos(Option<f64>),
    #[display("duration={:?}", _0)]
    Duration(Option<f64>),
    #[display("pause={:?}", _0)]
    Pause(Option<bool>),
    #[display("filename={:?}", _0)]
    Filename(Option<String>),
    #[display("volume={:?}", _0)]
    Volume(Option<f64>),
    #[display("{}", _0)]
    Unrecognized(String),
}

impl PlayerProperty {
    /// Decode the property from its name and raw value.
    /// Values of an unexpected type are treated as absent.
    pub fn from_payload(name: &str, data: Option<&Value>) -> Self {
        match name {
            PROPERTY_TIME_POS => PlayerProperty::TimePos(data.and_then(Value::as_f64)),
            PROPERTY_DURATION => PlayerProperty::Duration(data.and_then(Value::as_f64)),
            PROPERTY_PAUSE => PlayerProperty::Pause(data.and_then(Value::as_bool)),
            PROPERTY_FILENAME => {
                PlayerProperty::Filename(data.and_then(Value::as_str).map(String::from))
            }
            PROPERTY_VOLUME => PlayerProperty::Volume(data.and_then(Value::as_f64)),
            other => PlayerProperty::Unrecognized(other.to_string()),
        }
    }
}

/// Strip every `/` or `\` separated path prefix from the given path.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_engine_payload_deserialize() {
        let value = r#"{"event_type":"property-change","name":"time-pos","data":12.5}"#;

        let result = serde_json::from_str::<EnginePayload>(value).unwrap();

        assert_eq!(
            EnginePayload::property_change(PROPERTY_TIME_POS, Some(json!(12.5))),
            result
        );
    }

    #[test]
    fn test_engine_payload_deserialize_without_optionals() {
        let value = r#"{"event_type":"eof-reached"}"#;

        let result = serde_json::from_str::<EnginePayload>(value).unwrap();

        assert_eq!(EnginePayload::eof_reached(), result);
    }

    #[test]
    fn test_player_event_from_payload() {
        let payload = EnginePayload::property_change(PROPERTY_PAUSE, Some(json!(true)));
        let result = PlayerEvent::from(&payload);
        assert_eq!(
            PlayerEvent::PropertyChange(PlayerProperty::Pause(Some(true))),
            result
        );

        let result = PlayerEvent::from(&EnginePayload::eof_reached());
        assert_eq!(PlayerEvent::EofReached, result);

        let payload = EnginePayload {
            event_type: "idle".to_string(),
            name: None,
            data: None,
        };
        let result = PlayerEvent::from(&payload);
        assert_eq!(PlayerEvent::Unrecognized("idle".to_string()), result);
    }

    #[test]
    fn test_player_property_from_payload() {
        assert_eq!(
            PlayerProperty::TimePos(Some(45.0)),
            PlayerProperty::from_payload(PROPERTY_TIME_POS, Some(&json!(45)))
        );
        assert_eq!(
            PlayerProperty::Duration(None),
            PlayerProperty::from_payload(PROPERTY_DURATION, None)
        );
        assert_eq!(
            PlayerProperty::Volume(None),
            PlayerProperty::from_payload(PROPERTY_VOLUME, Some(&Value::Null))
        );
        assert_eq!(
            PlayerProperty::Filename(Some("/tmp/a.mkv".to_string())),
            PlayerProperty::from_payload(PROPERTY_FILENAME, Some(&json!("/tmp/a.mkv")))
        );
        assert_eq!(
            PlayerProperty::Unrecognized("chapter".to_string()),
            PlayerProperty::from_payload("chapter", Some(&json!(2)))
        );
    }

    #[test]
    fn test_player_property_from_payload_wrong_type() {
        let result = PlayerProperty::from_payload(PROPERTY_TIME_POS, Some(&json!("12")));

        assert_eq!(PlayerProperty::TimePos(None), result);
    }

    #[test]
    fn test_property_change_without_name() {
        let payload = EnginePayload {
            event_type: EVENT_PROPERTY_CHANGE.to_string(),
            name: None,
            data: Some(json!(1)),
        };

        let result = PlayerEvent::from(&payload);

        assert_eq!(
            PlayerEvent::PropertyChange(PlayerProperty::Unrecognized(String::new())),
            result
        );
    }

    #[test]
    fn test_basename() {
        assert_eq!("c.mp4", basename("/a/b/c.mp4"));
        assert_eq!("c.mp4", basename("C:\\a\\b\\c.mp4"));
        assert_eq!("c.mp4", basename("C:\\a/b\\c.mp4"));
        assert_eq!("c.mp4", basename("c.mp4"));
        assert_eq!("", basename(""));
        assert_eq!("", basename("/a/b/"));
    }
}
