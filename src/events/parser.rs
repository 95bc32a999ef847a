use std::error::Error as StdError;
use std::fmt;

use super::types::Envelope;
use crate::error::{Error, Kind};
use crate::serde_helpers::from_slice_with_warnings;
use crate::ws::traits::MessageParser;

/// Error decoding a single event payload.
///
/// Carries the offending payload so it can be logged or inspected by the sink. Decode errors
/// are local to one message and never affect the connection.
#[non_exhaustive]
#[derive(Debug)]
pub struct DecodeError {
    /// The payload that failed to decode, lossily converted to UTF-8
    pub payload: String,
    source: serde_json::Error,
}

impl DecodeError {
    #[must_use]
    pub fn new(payload: &[u8], source: serde_json::Error) -> Self {
        Self {
            payload: String::from_utf8_lossy(payload).into_owned(),
            source,
        }
    }

    /// The underlying JSON error.
    #[must_use]
    pub fn json_error(&self) -> &serde_json::Error {
        &self.source
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode event: {}", self.source)
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::with_source(Kind::Decode, e)
    }
}

/// Decode one raw WebSocket payload into an [`Envelope`].
///
/// Unknown keys are ignored, absent optional fields become `None`, and a `timestamp` that does
/// not follow [`super::timestamp::LAYOUT`] fails the whole envelope.
pub fn decode(payload: &[u8]) -> Result<Envelope, DecodeError> {
    from_slice_with_warnings(payload).map_err(|e| DecodeError::new(payload, e))
}

/// [`MessageParser`] for the events WebSocket.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeParser;

impl MessageParser<Envelope> for EnvelopeParser {
    fn parse(&self, bytes: &[u8]) -> Result<Envelope, DecodeError> {
        decode(bytes)
    }
}
