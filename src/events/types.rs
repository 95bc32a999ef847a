use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::timestamp;
use crate::serde_helpers::lenient;

/// One event pushed by Asterisk over the events WebSocket.
///
/// Only `event_type` is guaranteed; which of the other fields are present depends on the event.
/// Fields the envelope does not model are ignored when decoding.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Envelope {
    /// Event discriminator, e.g. `StasisStart`
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Stasis application the event was dispatched to
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    /// Identifier of the Asterisk instance that emitted the event
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub asterisk_id: Option<String>,
    /// Arguments passed to the Stasis application (`StasisStart` only)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Channel snapshot, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Value>,
    /// When the event was generated, in the server's offset
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// New variable value (`ChannelVarset`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Variable name (`ChannelVarset`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

impl Envelope {
    /// Creates an envelope carrying only an event type.
    #[must_use]
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            application: None,
            asterisk_id: None,
            args: None,
            channel: None,
            timestamp: None,
            value: None,
            variable: None,
        }
    }

    /// The `id` of the embedded channel snapshot, when there is one.
    #[must_use]
    pub fn channel_id(&self) -> Option<&str> {
        self.channel.as_ref()?.get("id")?.as_str()
    }
}

/// ARI event types.
///
/// The set is open: event names without a dedicated variant decode into
/// [`EventType::Unknown`] so new Asterisk releases never break decoding.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum EventType {
    /// A channel entered a Stasis application
    StasisStart,
    /// A channel left a Stasis application
    StasisEnd,
    /// A channel variable changed
    ChannelVarset,
    /// A channel changed state
    ChannelStateChange,
    /// A DTMF digit was received on a channel
    ChannelDtmfReceived,
    /// A hangup was requested on a channel
    ChannelHangupRequest,
    /// A channel was destroyed
    ChannelDestroyed,
    /// Playback of media started
    PlaybackStarted,
    /// Playback of media finished
    PlaybackFinished,
    /// Any other event type (captures the raw value)
    #[serde(untagged)]
    Unknown(String),
}

impl EventType {
    /// The event name as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::StasisStart => "StasisStart",
            Self::StasisEnd => "StasisEnd",
            Self::ChannelVarset => "ChannelVarset",
            Self::ChannelStateChange => "ChannelStateChange",
            Self::ChannelDtmfReceived => "ChannelDtmfReceived",
            Self::ChannelHangupRequest => "ChannelHangupRequest",
            Self::ChannelDestroyed => "ChannelDestroyed",
            Self::PlaybackStarted => "PlaybackStarted",
            Self::PlaybackFinished => "PlaybackFinished",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        serde_json::from_value(Value::from(name)).unwrap_or_else(|_e| Self::Unknown(name.to_owned()))
    }
}
