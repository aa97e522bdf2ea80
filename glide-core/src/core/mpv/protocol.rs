use crate::core::events::{EnginePayload, EVENT_PROPERTY_CHANGE};
use crate::core::mpv::{MpvError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

const REPLY_SUCCESS: &str = "success";
const PROPERTY_EOF_REACHED: &str = "eof-reached";

/// A command request for the mpv JSON IPC server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MpvRequest {
    pub command: Vec<Value>,
    pub request_id: u64,
}

impl MpvRequest {
    pub fn new(request_id: u64, command: Vec<Value>) -> Self {
        Self {
            command,
            request_id,
        }
    }

    /// Serialize the request into a single newline terminated line.
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// The reply of mpv to a [MpvRequest].
#[derive(Debug, Clone, PartialEq)]
pub struct MpvReply {
    pub request_id: u64,
    pub error: String,
    pub data: Option<Value>,
}

impl MpvReply {
    /// Check if mpv executed the request successfully.
    pub fn is_success(&self) -> bool {
        self.error == REPLY_SUCCESS
    }
}

/// A message received from the mpv JSON IPC server.
#[derive(Debug, Clone, PartialEq)]
pub enum MpvMessage {
    Reply(MpvReply),
    Event(EnginePayload),
}

impl FromStr for MpvMessage {
    type Err = MpvError;

    fn from_str(line: &str) -> Result<Self> {
        let message: RawMpvMessage = serde_json::from_str(line)?;

        if let Some(event) = message.event {
            return Ok(MpvMessage::Event(into_engine_payload(
                event,
                message.name,
                message.data,
            )));
        }

        match message.request_id {
            Some(request_id) => Ok(MpvMessage::Reply(MpvReply {
                request_id,
                error: message.error.unwrap_or_else(|| REPLY_SUCCESS.to_string()),
                data: message.data,
            })),
            None => Err(MpvError::Parsing(format!(
                "message is neither an event nor a reply, {}",
                line
            ))),
        }
    }
}

/// mpv reports the end of the media as an observed property,
/// which is surfaced as a dedicated end of file event.
fn into_engine_payload(event: String, name: Option<String>, data: Option<Value>) -> EnginePayload {
    if event == EVENT_PROPERTY_CHANGE
        && name.as_deref() == Some(PROPERTY_EOF_REACHED)
        && data.as_ref().and_then(Value::as_bool) == Some(true)
    {
        return EnginePayload::eof_reached();
    }

    EnginePayload {
        event_type: event,
        name,
        data,
    }
}

#[derive(Debug, Deserialize)]
struct RawMpvMessage {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    request_id: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}
